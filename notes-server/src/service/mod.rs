use crate::{
    dto::{CreateNoteRequest, NoteResponse, UpdateNoteRequest},
    models::Note,
    repository::{NoteRepository, RepositoryError},
};

use chrono::{SecondsFormat, Utc};

use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Note {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

#[derive(Clone)]
pub struct NoteService {
    repo: Arc<dyn NoteRepository>,
}

/// Converts a stored row to its wire form. A missing timestamp is reported as
/// the current time; the stored value is not touched.
fn to_response(note: Note) -> NoteResponse {
    let mod_date = note.mod_date.unwrap_or_else(|| {
        tracing::warn!(
            "note {} has no usable modDate, substituting current time",
            note.id
        );
        Utc::now()
    });

    NoteResponse {
        id: note.id,
        title: note.title,
        content: note.content,
        mod_date: mod_date.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

impl NoteService {
    pub fn new(repo: Arc<dyn NoteRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_all_notes(&self) -> Result<Vec<NoteResponse>, ServiceError> {
        let notes: Vec<NoteResponse> = self
            .repo
            .list()
            .await?
            .into_iter()
            .map(to_response)
            .collect();

        tracing::info!("fetched {} notes", notes.len());

        Ok(notes)
    }

    pub async fn get_one_note(&self, id: i64) -> Result<NoteResponse, ServiceError> {
        self.repo
            .get(id)
            .await?
            .map(to_response)
            .ok_or(ServiceError::NotFound(id))
    }

    pub async fn create_note(
        &self,
        request: CreateNoteRequest,
    ) -> Result<NoteResponse, ServiceError> {
        let title = request.title.unwrap_or_default();
        let content = request.content.unwrap_or_default();

        let note = to_response(self.repo.create(title, content, Utc::now()).await?);

        tracing::info!("created note: {:?}", note);

        Ok(note)
    }

    pub async fn update_note(
        &self,
        id: i64,
        request: UpdateNoteRequest,
    ) -> Result<NoteResponse, ServiceError> {
        if let Some(hint) = &request.mod_date {
            tracing::debug!("ignoring client modDate hint {} for note {}", hint, id);
        }

        let note = self
            .repo
            .update(id, request.title, request.content, Utc::now())
            .await?
            .map(to_response)
            .ok_or(ServiceError::NotFound(id))?;

        tracing::info!("updated note: {:?}", note);

        Ok(note)
    }

    /// Deleting an id that does not exist is not an error.
    pub async fn delete_note(&self, id: i64) -> Result<(), ServiceError> {
        let removed = self.repo.delete(id).await?;

        tracing::info!("delete note {}: removed = {}", id, removed);

        Ok(())
    }
}
