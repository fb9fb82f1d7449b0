//! Stored-resume handlers: listing, loading, deleting, preview HTML.

use axum::extract::{Path, Query, State};
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{storage_key, ResumeData, ResumeStyle};
use crate::models::stored::{AnalyzedResume, StoredResume};
use crate::platform::KvStore;
use crate::render::{renderer_for, RenderVariant};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ResumeListResponse {
    pub analyzed: Vec<AnalyzedResume>,
    pub built: Vec<ResumeData>,
}

/// GET /api/v1/resumes
///
/// Both record kinds, split. One unreadable record is skipped, not the
/// whole list.
pub async fn handle_list(State(state): State<AppState>) -> Result<Json<ResumeListResponse>, AppError> {
    let items = state.kv.list("resume:*", true).await?;

    let mut analyzed = Vec::new();
    let mut built = Vec::new();
    for item in items {
        match StoredResume::parse(&item.value) {
            Some(StoredResume::Analyzed(record)) => analyzed.push(record),
            Some(StoredResume::Built(doc)) => built.push(doc),
            None => warn!("Skipping unreadable record at {}", item.key),
        }
    }

    Ok(Json(ResumeListResponse { analyzed, built }))
}

/// Loads a stored record or fails the flow: a missing record is NotFound,
/// an unreadable one aborts with an internal error.
pub(crate) async fn fetch_record(kv: &dyn KvStore, id: Uuid) -> Result<StoredResume, AppError> {
    let raw = kv
        .get(&storage_key(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    let record = StoredResume::parse(&raw)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Stored resume {id} is unreadable")))?;
    tracing::debug!("Loaded record {}", record.id());
    Ok(record)
}

/// Loads a builder document specifically.
pub(crate) async fn fetch_built(kv: &dyn KvStore, id: Uuid) -> Result<ResumeData, AppError> {
    match fetch_record(kv, id).await? {
        StoredResume::Built(doc) => Ok(doc),
        StoredResume::Analyzed(_) => Err(AppError::Validation(format!(
            "Resume {id} is an uploaded resume, not a built one"
        ))),
    }
}

/// GET /api/v1/resumes/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StoredResume>, AppError> {
    Ok(Json(fetch_record(state.kv.as_ref(), id).await?))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = state.kv.delete(&storage_key(id)).await?;
    Ok(Json(serde_json::json!({"deleted": deleted})))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PreviewQuery {
    pub style: Option<ResumeStyle>,
    pub variant: Option<RenderVariant>,
}

#[derive(Deserialize)]
pub struct BlobQuery {
    pub path: String,
}

/// GET /api/v1/blobs?path=
///
/// Proxies a stored artifact (uploaded PDF or its page image) back to
/// the client.
pub async fn handle_blob(
    State(state): State<AppState>,
    Query(query): Query<BlobQuery>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let data = state
        .blobs
        .read(&query.path)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Blob {} not found", query.path)))?;

    let content_type = if query.path.ends_with(".png") {
        "image/png"
    } else if query.path.ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    };
    Ok(([(axum::http::header::CONTENT_TYPE, content_type)], data))
}

/// GET /api/v1/resumes/:id/preview
///
/// Rendered HTML in the requested style. The card variant drops links
/// and fills a missing name from the title.
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PreviewQuery>,
) -> Result<Html<String>, AppError> {
    let mut doc = fetch_built(state.kv.as_ref(), id).await?;
    let variant = query.variant.unwrap_or_default();
    if variant == RenderVariant::Card {
        doc.full_name = doc.display_name().to_string();
    }

    let style = query.style.unwrap_or(doc.style);
    let rendered = renderer_for(style).render(&doc, variant);
    Ok(Html(rendered.to_html()))
}
