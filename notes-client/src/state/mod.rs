use chrono::{SecondsFormat, Utc};

use crate::{
    api::{CreateNoteRequest, Note, NotesApi, UpdateNoteRequest},
    views::Intent,
};

/// Title sent in place of an empty one.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Pending edits to a note. `id` is `None` when there was nothing selected
/// to edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
}

impl From<&Note> for NoteDraft {
    fn from(note: &Note) -> Self {
        Self {
            id: Some(note.id),
            title: note.title.clone(),
            content: note.content.clone(),
        }
    }
}

/// Local copy of the server's notes plus the current selection.
///
/// Every network failure is logged and leaves the local state as it was.
pub struct NotesController<A> {
    api: A,
    notes: Vec<Note>,
    active_note_id: Option<i64>,
}

impl<A: NotesApi> NotesController<A> {
    pub const fn new(api: A) -> Self {
        Self {
            api,
            notes: Vec::new(),
            active_note_id: None,
        }
    }

    /// Notes in the order they were received; callers sort for display.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub const fn active_note_id(&self) -> Option<i64> {
        self.active_note_id
    }

    pub fn active_note(&self) -> Option<&Note> {
        let id = self.active_note_id?;
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn select(&mut self, id: i64) {
        self.active_note_id = Some(id);
    }

    pub async fn load(&mut self) {
        match self.api.list().await {
            Ok(notes) => {
                tracing::debug!("fetched {} notes", notes.len());
                if self.active_note_id.is_none() {
                    self.active_note_id = notes.first().map(|note| note.id);
                }
                self.notes = notes;
            }
            Err(e) => tracing::error!("failed to fetch notes: {e}"),
        }
    }

    pub async fn add_note(&mut self) {
        match self.api.create(&CreateNoteRequest::default()).await {
            Ok(note) => {
                tracing::info!("created note {}", note.id);
                self.active_note_id = Some(note.id);
                self.notes.push(note);
            }
            Err(e) => tracing::error!("failed to create note: {e}"),
        }
    }

    pub async fn delete_note(&mut self, id: i64) {
        match self.api.delete(id).await {
            Ok(message) => {
                tracing::info!("delete note {id}: {message}");
                self.notes.retain(|note| note.id != id);
                if self.active_note_id == Some(id) {
                    self.active_note_id = None;
                }
            }
            Err(e) => tracing::error!("failed to delete note {id}: {e}"),
        }
    }

    pub async fn update_note(&mut self, draft: NoteDraft) {
        let Some(id) = draft.id else {
            tracing::warn!("refusing to update a note without an id: {draft:?}");
            return;
        };

        let title = if draft.title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            draft.title
        };

        let request = UpdateNoteRequest {
            title,
            content: draft.content,
            mod_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        match self.api.update(id, &request).await {
            Ok(updated) => {
                tracing::debug!("updated note {id}");
                if let Some(note) = self.notes.iter_mut().find(|note| note.id == id) {
                    *note = updated;
                }
            }
            Err(e) => tracing::error!("failed to update note {id}: {e}"),
        }
    }

    pub async fn dispatch(&mut self, intent: Intent) {
        match intent {
            Intent::Select(id) => self.select(id),
            Intent::Add => self.add_note().await,
            Intent::Delete(id) => self.delete_note(id).await,
            Intent::Edit(draft) => self.update_note(draft).await,
        }
    }
}
