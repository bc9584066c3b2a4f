use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

/// A note as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub mod_date: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    pub title: String,
    pub content: String,
    /// Advisory only, the server stamps its own time
    pub mod_date: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct DeleteBody {
    message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server responded with {status}: {message}")]
    Status { status: u16, message: String },
}

/// The four note operations exposed by the server.
#[async_trait]
pub trait NotesApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Note>, ApiError>;

    async fn create(&self, request: &CreateNoteRequest) -> Result<Note, ApiError>;

    async fn update(&self, id: i64, request: &UpdateNoteRequest) -> Result<Note, ApiError>;

    /// Returns the server's confirmation message.
    async fn delete(&self, id: i64) -> Result<String, ApiError>;
}

pub struct HttpNotesApi {
    client: Client,
    base_url: String,
}

impl HttpNotesApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn notes_url(&self) -> String {
        format!("{}/notes", self.base_url)
    }

    fn note_url(&self, id: i64) -> String {
        format!("{}/notes/{id}", self.base_url)
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };

    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl NotesApi for HttpNotesApi {
    async fn list(&self) -> Result<Vec<Note>, ApiError> {
        let response = self.client.get(self.notes_url()).send().await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn create(&self, request: &CreateNoteRequest) -> Result<Note, ApiError> {
        let response = self
            .client
            .post(self.notes_url())
            .json(request)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn update(&self, id: i64, request: &UpdateNoteRequest) -> Result<Note, ApiError> {
        let response = self
            .client
            .put(self.note_url(id))
            .json(request)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn delete(&self, id: i64) -> Result<String, ApiError> {
        let response = self.client.delete(self.note_url(id)).send().await?;
        let body: DeleteBody = check_status(response).await?.json().await?;
        Ok(body.message)
    }
}
