use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_postgres::{Client, NoTls, Row};

use super::{NoteRepository, RepositoryError, embedded::migrations};
use crate::models::Note;

const INSERT_NOTE: &str =
    "INSERT INTO notes (title, content, modDate) VALUES ($1, $2, $3) RETURNING id, title, content, modDate";
// Step at least one millisecond past the previous value so successive writes
// stay distinguishable at wire precision
const UPDATE_NOTE: &str = "UPDATE notes SET title = $1, content = $2, \
     modDate = GREATEST($3, modDate + interval '1 millisecond') \
     WHERE id = $4 RETURNING id, title, content, modDate";
const DELETE_NOTE: &str = "DELETE FROM notes WHERE id = $1";
const SELECT_NOTE: &str = "SELECT id, title, content, modDate FROM notes WHERE id = $1";
const SELECT_NOTES: &str =
    "SELECT id, title, content, modDate FROM notes ORDER BY modDate DESC, id DESC";

/// Notes table in PostgreSQL.
///
/// Holds the single client shared by every request; the connection itself is
/// driven on a background task for the lifetime of the process.
pub struct PgRepository {
    client: Client,
}

impl PgRepository {
    pub async fn connect(database_dsn: &str) -> Result<Self, RepositoryError> {
        let (client, con) = tokio_postgres::connect(database_dsn, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = con.await {
                tracing::error!("connection error: {}", e);
            }
        });

        Ok(Self { client })
    }

    pub async fn migrate(&mut self) -> Result<(), RepositoryError> {
        let migrations_report = migrations::runner().run_async(&mut self.client).await?;

        for migration in migrations_report.applied_migrations() {
            tracing::info!(
                "Migration Applied -  Name: {}, Version: {}",
                migration.name(),
                migration.version()
            );
        }

        tracing::info!("DB migrations finished!");

        Ok(())
    }
}

fn note_from_row(row: &Row) -> Note {
    let id: i64 = row.get("id");

    // A bad timestamp must not take the whole row down with it
    let mod_date = match row.try_get::<_, Option<DateTime<Utc>>>("moddate") {
        Ok(mod_date) => mod_date,
        Err(e) => {
            tracing::warn!("failed to decode modDate of note {}: {}", id, e);
            None
        }
    };

    Note {
        id,
        title: row.get("title"),
        content: row.get("content"),
        mod_date,
    }
}

#[async_trait]
impl NoteRepository for PgRepository {
    async fn create(
        &self,
        title: String,
        content: String,
        mod_date: DateTime<Utc>,
    ) -> Result<Note, RepositoryError> {
        let row = self
            .client
            .query_one(INSERT_NOTE, &[&title, &content, &mod_date])
            .await?;

        Ok(note_from_row(&row))
    }

    async fn update(
        &self,
        id: i64,
        title: String,
        content: String,
        mod_date: DateTime<Utc>,
    ) -> Result<Option<Note>, RepositoryError> {
        let row = self
            .client
            .query_opt(UPDATE_NOTE, &[&title, &content, &mod_date, &id])
            .await?;

        Ok(row.as_ref().map(note_from_row))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let rows = self
            .client
            .execute(DELETE_NOTE, &[&id])
            .await?;

        Ok(rows == 1)
    }

    async fn get(&self, id: i64) -> Result<Option<Note>, RepositoryError> {
        let row = self
            .client
            .query_opt(SELECT_NOTE, &[&id])
            .await?;

        Ok(row.as_ref().map(note_from_row))
    }

    async fn list(&self) -> Result<Vec<Note>, RepositoryError> {
        let rows = self.client.query(SELECT_NOTES, &[]).await?;

        Ok(rows.iter().map(note_from_row).collect())
    }
}
