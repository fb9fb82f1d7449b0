//! The critique flows.
//!
//! Upload flow: PDF → blob upload → first-page PNG → image upload → KV
//! record (feedback pending) → AI critique → KV update. Each stage
//! reports an inline status; any failure is terminal for the attempt and
//! leaves whatever record was already written (feedback stays pending),
//! mirroring a user-visible error plus explicit re-trigger.
//!
//! Evaluate flow: a builder resume is rendered through the export
//! pipeline into the same PDF + PNG pair, then joins the upload flow's
//! tail.

pub mod convert;

use bytes::Bytes;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ai::clean_response;
use crate::ai::prompts::feedback_instructions;
use crate::export::raster::DocumentRasterizer;
use crate::export::{export_evaluation_artifacts, ExportError};
use crate::models::resume::{storage_key, ResumeData};
use crate::models::stored::{AnalyzedResume, Feedback, StoredResume};
use crate::platform::{AiClient, BlobStore, KvStore, PlatformError, UploadFile};
use convert::{png_name_for, validate_upload, ConvertError, PdfConverter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    UploadingResume,
    Converting,
    UploadingImage,
    Saving,
    Analyzing,
    Complete,
}

impl AnalysisStage {
    pub fn message(self) -> &'static str {
        match self {
            AnalysisStage::UploadingResume => "Uploading resume...",
            AnalysisStage::Converting => "Converting to image...",
            AnalysisStage::UploadingImage => "Uploading image...",
            AnalysisStage::Saving => "Preparing record...",
            AnalysisStage::Analyzing => "Analyzing...",
            AnalysisStage::Complete => "Analysis complete",
        }
    }
}

/// Stage observer for inline status reporting.
pub type StatusSink<'a> = &'a (dyn Fn(AnalysisStage) + Send + Sync);

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Failed to upload resume")]
    UploadResume,

    #[error("Failed to upload image")]
    UploadImage,

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Failed to parse feedback: {0}")]
    FeedbackParse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub company_name: String,
    pub job_title: String,
    pub job_description: String,
    pub file_name: String,
    pub data: Bytes,
}

/// Runs the upload critique flow end to end, returning the id of the
/// stored record.
pub async fn run_analysis(
    kv: &dyn KvStore,
    blobs: &dyn BlobStore,
    ai: &dyn AiClient,
    converter: &dyn PdfConverter,
    request: AnalyzeRequest,
    status: StatusSink<'_>,
) -> Result<Uuid, AnalyzeError> {
    validate_upload(&request.file_name, &request.data)?;

    status(AnalysisStage::UploadingResume);
    let resume_blob = blobs
        .upload(vec![UploadFile::new(
            request.file_name.clone(),
            "application/pdf",
            request.data.clone(),
        )])
        .await?
        .ok_or(AnalyzeError::UploadResume)?;

    status(AnalysisStage::Converting);
    let page = converter.first_page_png(&request.file_name, &request.data).await?;

    status(AnalysisStage::UploadingImage);
    let image_blob = blobs
        .upload(vec![UploadFile::new(
            png_name_for(&request.file_name),
            "image/png",
            page.png,
        )])
        .await?
        .ok_or(AnalyzeError::UploadImage)?;

    let id = Uuid::new_v4();
    critique_uploaded(
        kv,
        ai,
        AnalyzedResume {
            id,
            resume_path: resume_blob.path,
            image_path: image_blob.path,
            company_name: request.company_name,
            job_title: request.job_title,
            job_description: request.job_description,
            feedback: None,
        },
        status,
    )
    .await?;
    Ok(id)
}

/// Renders a builder resume into PDF + PNG artifacts, uploads them, and
/// runs the same critique tail over the generated document.
pub async fn evaluate_built_resume(
    kv: &dyn KvStore,
    blobs: &dyn BlobStore,
    ai: &dyn AiClient,
    rasterizer: &dyn DocumentRasterizer,
    resume: &ResumeData,
    status: StatusSink<'_>,
) -> Result<Uuid, AnalyzeError> {
    let artifacts = export_evaluation_artifacts(resume, rasterizer)?;

    status(AnalysisStage::UploadingResume);
    let resume_blob = blobs
        .upload(vec![UploadFile::new(
            artifacts.pdf_name,
            "application/pdf",
            Bytes::from(artifacts.pdf),
        )])
        .await?
        .ok_or(AnalyzeError::UploadResume)?;

    status(AnalysisStage::UploadingImage);
    let image_blob = blobs
        .upload(vec![UploadFile::new(
            artifacts.png_name,
            "image/png",
            Bytes::from(artifacts.png),
        )])
        .await?
        .ok_or(AnalyzeError::UploadImage)?;

    // The critique record gets its own id so it never overwrites the
    // builder document living at resume:<id>.
    let record_id = Uuid::new_v4();
    critique_uploaded(
        kv,
        ai,
        AnalyzedResume {
            id: record_id,
            resume_path: resume_blob.path,
            image_path: image_blob.path,
            company_name: String::new(),
            job_title: resume.title.clone(),
            job_description: String::new(),
            feedback: None,
        },
        status,
    )
    .await?;
    Ok(record_id)
}

/// Shared tail: write the pending record, request the critique, parse it,
/// write the completed record.
async fn critique_uploaded(
    kv: &dyn KvStore,
    ai: &dyn AiClient,
    mut record: AnalyzedResume,
    status: StatusSink<'_>,
) -> Result<(), AnalyzeError> {
    status(AnalysisStage::Saving);
    let key = storage_key(record.id);
    save_record(kv, &key, &record).await?;

    status(AnalysisStage::Analyzing);
    let response = ai
        .feedback(
            &record.resume_path,
            &feedback_instructions(&record.job_title, &record.job_description),
        )
        .await?;

    let text = clean_response(response.text());
    let feedback: Feedback = serde_json::from_str(&text).map_err(|e| {
        warn!("Critique response was not valid feedback JSON: {e}");
        AnalyzeError::FeedbackParse(e.to_string())
    })?;

    record.feedback = Some(feedback);
    save_record(kv, &key, &record).await?;

    status(AnalysisStage::Complete);
    info!("Critique stored for record {}", record.id);
    Ok(())
}

async fn save_record(
    kv: &dyn KvStore,
    key: &str,
    record: &AnalyzedResume,
) -> Result<(), AnalyzeError> {
    let payload = serde_json::to_string(&StoredResume::Analyzed(record.clone()))
        .map_err(|e| AnalyzeError::Internal(format!("Failed to serialize record: {e}")))?;
    kv.set(key, &payload).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::memory::{CannedAi, FixedConverter, MemoryBlobs, MemoryKv};
    use std::sync::Mutex;

    const FEEDBACK_JSON: &str = r#"{
        "overallScore": 72,
        "ATS": {"score": 70, "tips": [{"type": "improve", "tip": "Add keywords"}]},
        "toneAndStyle": {"score": 75, "tips": []},
        "content": {"score": 71, "tips": []},
        "structure": {"score": 74, "tips": []},
        "skills": {"score": 69, "tips": []}
    }"#;

    fn request() -> AnalyzeRequest {
        AnalyzeRequest {
            company_name: "Acme".to_string(),
            job_title: "Engineer".to_string(),
            job_description: "Build things".to_string(),
            file_name: "resume.pdf".to_string(),
            data: Bytes::from_static(b"%PDF-1.4 fake"),
        }
    }

    #[tokio::test]
    async fn test_run_analysis_happy_path() {
        let kv = MemoryKv::new();
        let blobs = MemoryBlobs::new();
        let ai = CannedAi::new(vec![FEEDBACK_JSON]);
        let converter = FixedConverter::new(&b"\x89PNG fake"[..]);

        let stages = Mutex::new(Vec::new());
        let sink = |stage: AnalysisStage| stages.lock().unwrap().push(stage);

        let id = run_analysis(&kv, &blobs, &ai, &converter, request(), &sink)
            .await
            .unwrap();

        assert_eq!(
            *stages.lock().unwrap(),
            vec![
                AnalysisStage::UploadingResume,
                AnalysisStage::Converting,
                AnalysisStage::UploadingImage,
                AnalysisStage::Saving,
                AnalysisStage::Analyzing,
                AnalysisStage::Complete,
            ]
        );

        // both the PDF and the PNG landed in blob storage
        assert_eq!(blobs.paths().len(), 2);

        let raw = kv.get(&storage_key(id)).await.unwrap().unwrap();
        match StoredResume::parse(&raw) {
            Some(StoredResume::Analyzed(record)) => {
                assert_eq!(record.feedback.unwrap().overall_score, 72);
                assert_eq!(record.company_name, "Acme");
            }
            other => panic!("expected analyzed record, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_analysis_rejects_non_pdf() {
        let kv = MemoryKv::new();
        let blobs = MemoryBlobs::new();
        let ai = CannedAi::new(vec![FEEDBACK_JSON]);
        let converter = FixedConverter::new(&b"png"[..]);

        let mut bad = request();
        bad.file_name = "resume.docx".to_string();
        let sink = |_stage: AnalysisStage| {};
        let result = run_analysis(&kv, &blobs, &ai, &converter, bad, &sink).await;
        assert!(matches!(result, Err(AnalyzeError::Convert(ConvertError::InvalidType(_)))));
        assert!(blobs.paths().is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_feedback_keeps_pending_record() {
        let kv = MemoryKv::new();
        let blobs = MemoryBlobs::new();
        let ai = CannedAi::new(vec!["this is not json"]);
        let converter = FixedConverter::new(&b"png"[..]);

        let sink = |_stage: AnalysisStage| {};
        let result = run_analysis(&kv, &blobs, &ai, &converter, request(), &sink).await;
        assert!(matches!(result, Err(AnalyzeError::FeedbackParse(_))));

        // the pending record stays in place, feedback unset
        let items = kv.list("resume:*", true).await.unwrap();
        assert_eq!(items.len(), 1);
        match StoredResume::parse(&items[0].value) {
            Some(StoredResume::Analyzed(record)) => assert!(record.feedback.is_none()),
            other => panic!("expected analyzed record, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_evaluate_built_resume_does_not_clobber_builder_record() {
        use crate::export::raster::BlockRasterizer;
        use crate::models::resume::ResumeData;
        use chrono::Utc;

        let kv = MemoryKv::new();
        let blobs = MemoryBlobs::new();
        let ai = CannedAi::new(vec![FEEDBACK_JSON]);

        let now = Utc::now();
        let resume = ResumeData {
            id: Uuid::new_v4(),
            full_name: "Jane".to_string(),
            title: "Dev".to_string(),
            about: "About".to_string(),
            about_raw: String::new(),
            location: String::new(),
            email: String::new(),
            phone: String::new(),
            linkedin: String::new(),
            telegram: String::new(),
            experiences: vec![],
            skills: vec!["React".to_string()],
            languages: vec![],
            recommendations: vec![],
            style: Default::default(),
            created_at: now,
            updated_at: now,
        };
        // builder record already stored
        kv.set(
            &storage_key(resume.id),
            &serde_json::to_string(&StoredResume::Built(resume.clone())).unwrap(),
        )
        .await
        .unwrap();

        let sink = |_stage: AnalysisStage| {};
        let record_id = evaluate_built_resume(&kv, &blobs, &ai, &BlockRasterizer, &resume, &sink)
            .await
            .unwrap();

        assert_ne!(record_id, resume.id);
        let items = kv.list("resume:*", true).await.unwrap();
        assert_eq!(items.len(), 2);
        // artifact names derive from the builder resume's id
        assert!(blobs
            .paths()
            .iter()
            .any(|p| p.contains(&format!("resume-{}", resume.id)) && p.ends_with(".pdf")));
        assert!(blobs
            .paths()
            .iter()
            .any(|p| p.contains(&format!("resume-{}", resume.id)) && p.ends_with(".png")));
    }
}
