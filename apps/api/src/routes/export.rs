//! Export and evaluation handlers. Both are gated by advisory in-flight
//! flags; a second trigger while one runs gets a conflict instead of an
//! overlapping pipeline.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use tracing::info;
use uuid::Uuid;

use crate::analyze::{evaluate_built_resume, AnalysisStage};
use crate::errors::AppError;
use crate::export::export_resume_pdf;
use crate::routes::resumes::fetch_built;
use crate::state::AppState;

/// POST /api/v1/resumes/:id/export
///
/// Renders the stored document and streams back `resume-<title>.pdf`.
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let _guard = state
        .flags
        .try_begin_export()
        .ok_or_else(|| AppError::Conflict("An export is already in progress".to_string()))?;

    let doc = fetch_built(state.kv.as_ref(), id).await?;
    let export = export_resume_pdf(&doc, state.rasterizer.as_ref())?;
    info!("Exported resume {id} as {}", export.filename);

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename),
            ),
        ],
        export.bytes,
    ))
}

/// POST /api/v1/resumes/:id/evaluate
///
/// Renders the stored document into the PDF + PNG pair and runs the
/// critique flow over it.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _guard = state
        .flags
        .try_begin_evaluation()
        .ok_or_else(|| AppError::Conflict("An evaluation is already in progress".to_string()))?;

    let doc = fetch_built(state.kv.as_ref(), id).await?;
    let sink = |stage: AnalysisStage| info!("Evaluation: {}", stage.message());
    let record_id = evaluate_built_resume(
        state.kv.as_ref(),
        state.blobs.as_ref(),
        state.ai.as_ref(),
        state.rasterizer.as_ref(),
        &doc,
        &sink,
    )
    .await?;

    Ok(Json(serde_json::json!({"analysisId": record_id})))
}
