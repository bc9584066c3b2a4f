use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_macros::debug_handler;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

use crate::{
    dto::{
        CreateNoteRequest, DeleteNoteResponse, ErrorResponse, NoteResponse, UpdateNoteRequest,
    },
    service::{NoteService, ServiceError},
};

#[derive(OpenApi)]
#[openapi(
    paths(get_all_notes, create_note, get_one_note, update_note, delete_note),
    components(schemas(
        NoteResponse,
        CreateNoteRequest,
        UpdateNoteRequest,
        DeleteNoteResponse,
        ErrorResponse
    )),
    tags(
        (name = "notes", description = "Notes management API")
    )
)]
pub struct ApiDoc;

pub fn router(service: Arc<NoteService>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/notes", get(get_all_notes).post(create_note))
        .route(
            "/notes/{id}",
            get(get_one_note).put(update_note).delete(delete_note),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .with_state(service)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn root() -> Response {
    (StatusCode::OK, "Hello world!").into_response()
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

fn rejection_response(rejection: &JsonRejection) -> Response {
    tracing::warn!("rejected request body: {}", rejection.body_text());
    error_response(rejection.status(), rejection.body_text())
}

/// Both fields are optional, so an absent body (or one sent without a JSON
/// content type) creates an empty note.
fn parse_create_body(body: &[u8]) -> Result<CreateNoteRequest, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateNoteRequest::default());
    }
    serde_json::from_slice(body)
}

fn service_error_response(e: &ServiceError) -> Response {
    match e {
        ServiceError::NotFound(_) => error_response(StatusCode::NOT_FOUND, e.to_string()),
        ServiceError::Storage(_) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[utoipa::path(
    get,
    path = "/notes",
    responses(
        (status = 200, description = "All notes, most recently modified first", body = Vec<NoteResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_all_notes(State(service): State<Arc<NoteService>>) -> Response {
    match service.get_all_notes().await {
        Ok(notes) => (StatusCode::OK, Json(notes)).into_response(),
        Err(e) => {
            tracing::error!("failed to get note entries: {}", e);
            service_error_response(&e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 200, description = "Note created successfully", body = NoteResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn create_note(
    State(service): State<Arc<NoteService>>,
    body: Bytes,
) -> Response {
    let payload = match parse_create_body(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("rejected create body: {}", e);
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid request body: {e}"),
            );
        }
    };

    match service.create_note(payload).await {
        Ok(note) => (StatusCode::OK, Json(note)).into_response(),
        Err(e) => {
            tracing::error!("failed to create note entry: {}", e);
            service_error_response(&e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note found", body = NoteResponse),
        (status = 404, description = "Note not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_one_note(
    State(service): State<Arc<NoteService>>,
    Path(id): Path<i64>,
) -> Response {
    match service.get_one_note(id).await {
        Ok(note) => (StatusCode::OK, Json(note)).into_response(),
        Err(e) => {
            tracing::error!("failed to get note entry: {}", e);
            service_error_response(&e)
        }
    }
}

#[utoipa::path(
    put,
    path = "/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated successfully", body = NoteResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 404, description = "Note not found", body = ErrorResponse),
        (status = 415, description = "Body is not JSON", body = ErrorResponse),
        (status = 422, description = "Body does not match the schema", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn update_note(
    State(service): State<Arc<NoteService>>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(&rejection),
    };

    match service.update_note(id, payload).await {
        Ok(note) => (StatusCode::OK, Json(note)).into_response(),
        Err(e) => {
            tracing::error!("failed to update note entry: {}", e);
            service_error_response(&e)
        }
    }
}

#[utoipa::path(
    delete,
    path = "/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note deleted, or did not exist", body = DeleteNoteResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn delete_note(State(service): State<Arc<NoteService>>, Path(id): Path<i64>) -> Response {
    match service.delete_note(id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(DeleteNoteResponse {
                message: "Note deleted".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to delete note entry: {}", e);
            service_error_response(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> Router {
        let repo = Arc::new(MemoryRepository::new());
        router(Arc::new(NoteService::new(repo)))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("request");

        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, body)
    }

    #[tokio::test]
    async fn create_then_list_returns_the_note() {
        let app = app();

        let (status, created) =
            send(&app, "POST", "/notes", Some(json!({"title": "A", "content": "B"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(created["id"].is_i64());
        assert!(created["modDate"].is_string());

        let (status, listed) = send(&app, "GET", "/notes", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().map(Vec::len), Some(1));
        assert_eq!(listed[0]["title"], "A");
        assert_eq!(listed[0]["content"], "B");
        assert_eq!(listed[0]["modDate"], created["modDate"]);
    }

    #[tokio::test]
    async fn create_accepts_an_empty_body_object() {
        let app = app();

        let (status, created) = send(&app, "POST", "/notes", Some(json!({}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["title"], "");
        assert_eq!(created["content"], "");
    }

    async fn send_raw(
        app: &Router,
        method: &str,
        uri: &str,
        content_type: Option<&str>,
        body: &'static str,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }
        let request = request.body(Body::from(body)).expect("request");

        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, body)
    }

    #[tokio::test]
    async fn create_without_body_makes_an_empty_note() {
        let app = app();

        let (status, created) = send_raw(&app, "POST", "/notes", None, "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["title"], "");
        assert_eq!(created["content"], "");
        assert!(created["id"].is_i64());
    }

    #[tokio::test]
    async fn create_reads_json_sent_without_content_type() {
        let app = app();

        let (status, created) =
            send_raw(&app, "POST", "/notes", None, r#"{"title":"A"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["title"], "A");
        assert_eq!(created["content"], "");
    }

    #[tokio::test]
    async fn create_with_malformed_body_is_400_with_error_body() {
        let app = app();

        let (status, body) = send_raw(
            &app,
            "POST",
            "/notes",
            Some("application/json"),
            "{not json",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        let (_, listed) = send(&app, "GET", "/notes", None).await;
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn update_with_bad_body_reports_json_error() {
        let app = app();
        let (_, created) = send(&app, "POST", "/notes", Some(json!({}))).await;
        let uri = format!("/notes/{}", created["id"]);

        let (status, body) = send_raw(&app, "PUT", &uri, None, "title=x").await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body["error"].is_string());

        let (status, body) =
            send_raw(&app, "PUT", &uri, Some("application/json"), "{oops").await;
        assert!(status.is_client_error());
        assert!(body["error"].is_string());

        let (_, listed) = send(&app, "GET", "/notes", None).await;
        assert_eq!(listed[0]["title"], "");
    }

    #[tokio::test]
    async fn update_unknown_note_is_404_with_error_body() {
        let app = app();

        let (status, body) = send(
            &app,
            "PUT",
            "/notes/42",
            Some(json!({"title": "x", "content": "y"})),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn update_replaces_title_and_content() {
        let app = app();
        let (_, created) = send(&app, "POST", "/notes", Some(json!({}))).await;
        let uri = format!("/notes/{}", created["id"]);

        let (status, updated) = send(
            &app,
            "PUT",
            &uri,
            Some(json!({"title": "Hello", "content": "C", "modDate": "2000-01-01T00:00:00.000Z"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], created["id"]);
        assert_eq!(updated["title"], "Hello");
        assert_eq!(updated["content"], "C");
        assert_ne!(updated["modDate"], "2000-01-01T00:00:00.000Z");
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let app = app();
        let (_, created) = send(&app, "POST", "/notes", Some(json!({}))).await;
        let uri = format!("/notes/{}", created["id"]);

        let (status, body) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Note deleted");

        let (status, body) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Note deleted");

        let (_, listed) = send(&app, "GET", "/notes", None).await;
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn get_one_reports_missing_note() {
        let app = app();

        let (status, body) = send(&app, "GET", "/notes/5", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Note 5 not found");
    }
}
