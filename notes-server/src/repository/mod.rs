mod embedded;
mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::Note;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("{0}")]
    Migration(#[from] refinery::Error),
}

/// Storage for the notes table.
///
/// `list` returns rows ordered by modification date, newest first, with rows
/// lacking a timestamp ahead of all others.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn create(
        &self,
        title: String,
        content: String,
        mod_date: DateTime<Utc>,
    ) -> Result<Note, RepositoryError>;

    /// Replaces title and content. The stored timestamp becomes the later of
    /// `mod_date` and one millisecond past its current value.
    async fn update(
        &self,
        id: i64,
        title: String,
        content: String,
        mod_date: DateTime<Utc>,
    ) -> Result<Option<Note>, RepositoryError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;

    async fn get(&self, id: i64) -> Result<Option<Note>, RepositoryError>;

    async fn list(&self) -> Result<Vec<Note>, RepositoryError>;
}
