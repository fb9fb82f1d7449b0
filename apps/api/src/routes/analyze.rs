//! Upload-and-critique handler.

use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use tracing::info;

use crate::analyze::{run_analysis, AnalysisStage, AnalyzeRequest};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/resumes/analyze
///
/// Multipart form with `company-name`, `job-title`, `job-description`,
/// and the PDF under `file`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut company_name = String::new();
    let mut job_title = String::new();
    let mut job_description = String::new();
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Bad multipart payload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "company-name" => {
                company_name = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
            }
            "job-title" => {
                job_title = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
            }
            "job-description" => {
                job_description = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
            }
            "file" => {
                let file_name = field.file_name().unwrap_or("resume.pdf").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                file = Some((file_name, data));
            }
            _ => {}
        }
    }

    let (file_name, data) =
        file.ok_or_else(|| AppError::Validation("No resume file uploaded".to_string()))?;

    let sink = |stage: AnalysisStage| info!("Analysis: {}", stage.message());
    let id = run_analysis(
        state.kv.as_ref(),
        state.blobs.as_ref(),
        state.ai.as_ref(),
        state.converter.as_ref(),
        AnalyzeRequest {
            company_name,
            job_title,
            job_description,
            file_name,
            data,
        },
        &sink,
    )
    .await?;

    Ok(Json(serde_json::json!({"id": id, "status": "complete"})))
}
