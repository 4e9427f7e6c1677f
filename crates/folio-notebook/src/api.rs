//! HTTP API for Folio.

use crate::discovery::{list_all_notebooks, notebook_by_id, notebooks_by_author};
use crate::error::Error;
use crate::models::NotebookMetadata;
use crate::node::FolioState;
use crate::versioning::{append_version, load_version_content, NewVersion, SavedNotebook};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

type AppState = Arc<FolioState>;

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    // CORS layer for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/health", get(health))
        // Notebooks
        .route("/api/v1/notebooks", get(list_notebooks).post(create_notebook))
        .route("/api/v1/notebooks/:id", get(get_notebook))
        .route("/api/v1/notebooks/:id/versions", post(append_notebook_version))
        .route(
            "/api/v1/notebooks/:id/versions/:version",
            get(get_version_content),
        )
        .route("/api/v1/authors/:address/notebooks", get(list_author_notebooks))
        // Session
        .route(
            "/api/v1/session/address",
            get(get_session_address)
                .put(put_session_address)
                .delete(delete_session_address),
        )
        .route(
            "/api/v1/session/notebook",
            get(get_session_notebook)
                .put(put_session_notebook)
                .delete(delete_session_notebook),
        )
        .layer(cors)
        .with_state(state)
}

/// Error response: a status plus `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        let status = match &e {
            Error::StorageWrite(_) | Error::StorageRead(_) | Error::Listing(_) => {
                StatusCode::BAD_GATEWAY
            }
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::InvalidInput(_) | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Serialization(_) | Error::Session(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", e);
        }
        Self::new(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

type ApiResult<T> = Result<T, ApiError>;

// --- Health endpoints ---

async fn health() -> &'static str {
    "OK"
}

// --- Notebook endpoints ---

async fn list_notebooks(State(state): State<AppState>) -> Json<Vec<NotebookMetadata>> {
    Json(list_all_notebooks(state.store.as_ref()).await)
}

async fn get_notebook(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<NotebookMetadata>> {
    find_notebook(&state, &id).await.map(Json)
}

async fn list_author_notebooks(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Json<Vec<NotebookMetadata>> {
    Json(notebooks_by_author(state.store.as_ref(), &address).await)
}

#[derive(Debug, Deserialize)]
struct SaveRequest {
    title: String,
    content: String,
    /// Defaults to the active session address
    #[serde(default)]
    author: Option<String>,
}

async fn create_notebook(
    State(state): State<AppState>,
    Json(req): Json<SaveRequest>,
) -> ApiResult<(StatusCode, Json<SavedNotebook>)> {
    let draft = draft_from(&state, req)?;
    let saved = append_version(state.store.as_ref(), &draft, None).await?;
    remember(&state, &saved);
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn append_notebook_version(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SaveRequest>,
) -> ApiResult<(StatusCode, Json<SavedNotebook>)> {
    let draft = draft_from(&state, req)?;
    let existing = find_notebook(&state, &id).await?;
    draft.check_author(&existing)?;
    let saved = append_version(state.store.as_ref(), &draft, Some(&existing)).await?;
    remember(&state, &saved);
    Ok((StatusCode::CREATED, Json(saved)))
}

#[derive(Debug, Serialize)]
struct VersionContent {
    notebook_id: String,
    version: u32,
    content_id: String,
    content: String,
}

async fn get_version_content(
    State(state): State<AppState>,
    Path((id, version)): Path<(String, u32)>,
) -> ApiResult<Json<VersionContent>> {
    let notebook = find_notebook(&state, &id).await?;
    let content = load_version_content(state.store.as_ref(), &notebook, version).await?;
    let content_id = notebook
        .version(version)
        .map(|v| v.content_id.clone())
        .unwrap_or_default();

    Ok(Json(VersionContent {
        notebook_id: notebook.notebook_id,
        version,
        content_id,
        content,
    }))
}

async fn find_notebook(state: &FolioState, id: &str) -> ApiResult<NotebookMetadata> {
    notebook_by_id(state.store.as_ref(), id)
        .await
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("Not found: {}", id)))
}

fn draft_from(state: &FolioState, req: SaveRequest) -> ApiResult<NewVersion> {
    let author = req
        .author
        .filter(|a| !a.trim().is_empty())
        .or_else(|| state.identity.active_address())
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "No account connected"))?;

    let draft = NewVersion::new(req.content, author, req.title);
    draft.validate()?;
    Ok(draft)
}

// A save already succeeded; failing to record the open notebook is not worth failing it.
fn remember(state: &FolioState, saved: &SavedNotebook) {
    if let Err(e) = state.remember_notebook(&saved.metadata.notebook_id) {
        tracing::warn!("Could not record open notebook: {}", e);
    }
}

// --- Session endpoints ---

#[derive(Debug, Serialize, Deserialize)]
struct AddressBody {
    address: Option<String>,
}

#[derive(Debug, Serialize)]
struct AddressChange {
    address: Option<String>,
    changed: bool,
}

async fn get_session_address(State(state): State<AppState>) -> Json<AddressBody> {
    Json(AddressBody {
        address: state.identity.active_address(),
    })
}

async fn put_session_address(
    State(state): State<AppState>,
    Json(body): Json<AddressBody>,
) -> ApiResult<Json<AddressChange>> {
    let address = body
        .address
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "address is required"))?;
    let changed = state.identity.set_active_address(Some(address))?;
    Ok(Json(AddressChange {
        address: state.identity.active_address(),
        changed,
    }))
}

async fn delete_session_address(State(state): State<AppState>) -> ApiResult<StatusCode> {
    state.identity.disconnect()?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize, Deserialize)]
struct NotebookBody {
    notebook_id: Option<String>,
}

async fn get_session_notebook(State(state): State<AppState>) -> ApiResult<Json<NotebookBody>> {
    Ok(Json(NotebookBody {
        notebook_id: state.session.current_notebook()?,
    }))
}

async fn put_session_notebook(
    State(state): State<AppState>,
    Json(body): Json<NotebookBody>,
) -> ApiResult<Json<NotebookBody>> {
    let notebook_id = body
        .notebook_id
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "notebook_id is required"))?;
    state.session.set_current_notebook(&notebook_id)?;
    Ok(Json(NotebookBody {
        notebook_id: state.session.current_notebook()?,
    }))
}

async fn delete_session_notebook(State(state): State<AppState>) -> ApiResult<StatusCode> {
    state.session.clear_current_notebook()?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_storage::StorageError;

    #[test]
    fn error_status_mapping() {
        let cases = [
            (Error::StorageWrite(StorageError::Upload("x".into())), StatusCode::BAD_GATEWAY),
            (
                Error::StorageRead(StorageError::NotFound("x".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (Error::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (Error::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (Error::Session("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status, status);
        }
    }
}
