use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    /// Note ID
    pub id: i64,
    /// Note title
    pub title: String,
    /// Note content
    pub content: String,
    /// Last modification time, ISO-8601 in UTC
    #[schema(example = "2024-05-01T12:30:00.000Z")]
    pub mod_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateNoteRequest {
    /// Note title, empty when omitted
    #[serde(default)]
    pub title: Option<String>,
    /// Note content, empty when omitted
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    /// New note title
    #[serde(default)]
    pub title: String,
    /// New note content
    #[serde(default)]
    pub content: String,
    /// Client clock hint, ignored by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mod_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteNoteResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
