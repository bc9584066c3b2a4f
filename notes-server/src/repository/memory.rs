use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use std::collections::BTreeMap;

use super::{NoteRepository, RepositoryError};
use crate::models::Note;

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Note>,
}

/// Process-local notes table, ordered and stamped like the PostgreSQL one.
#[derive(Default)]
pub struct MemoryRepository {
    table: RwLock<Table>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row verbatim, keeping its id as the high-water mark.
    #[cfg(test)]
    pub async fn insert_raw(&self, note: Note) {
        let mut table = self.table.write().await;
        table.next_id = table.next_id.max(note.id);
        table.rows.insert(note.id, note);
    }
}

#[async_trait]
impl NoteRepository for MemoryRepository {
    async fn create(
        &self,
        title: String,
        content: String,
        mod_date: DateTime<Utc>,
    ) -> Result<Note, RepositoryError> {
        let mut table = self.table.write().await;
        table.next_id += 1;

        let note = Note {
            id: table.next_id,
            title,
            content,
            mod_date: Some(mod_date),
        };
        table.rows.insert(note.id, note.clone());

        Ok(note)
    }

    async fn update(
        &self,
        id: i64,
        title: String,
        content: String,
        mod_date: DateTime<Utc>,
    ) -> Result<Option<Note>, RepositoryError> {
        let mut table = self.table.write().await;

        Ok(table.rows.get_mut(&id).map(|note| {
            note.title = title;
            note.content = content;
            note.mod_date = Some(match note.mod_date {
                Some(old) => mod_date.max(old + Duration::milliseconds(1)),
                None => mod_date,
            });
            note.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }

    async fn get(&self, id: i64) -> Result<Option<Note>, RepositoryError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Note>, RepositoryError> {
        let mut notes: Vec<Note> = self.table.read().await.rows.values().cloned().collect();

        notes.sort_by(|a, b| match (a.mod_date, b.mod_date) {
            (None, None) => b.id.cmp(&a.id),
            (None, Some(_)) => std::cmp::Ordering::Less,
            (Some(_), None) => std::cmp::Ordering::Greater,
            (Some(x), Some(y)) => y.cmp(&x).then_with(|| b.id.cmp(&a.id)),
        });

        Ok(notes)
    }
}
