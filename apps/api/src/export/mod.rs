//! Export pipeline — styled tree → color compatibility pass → raster
//! capture → paginated PDF and/or PNG.
//!
//! The color pass mutates the tree in place; its override ledger is
//! reverted around the single rasterizer call on success and failure
//! alike, so the tree the caller holds is never left altered. The bracket
//! is not reentrant: nothing else may touch the tree's styles between
//! apply and revert.

pub mod color_fix;
pub mod pdf;
pub mod raster;

use printpdf::image_crate as image;
use thiserror::Error;

use crate::models::resume::ResumeData;
use crate::render::dom::StyledDocument;
use crate::render::{renderer_for, RenderVariant};
use pdf::{artifact_stem, export_filename, PdfError};
use raster::{DocumentRasterizer, RasterError, RasterOptions};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Pdf(#[from] PdfError),
}

#[derive(Debug)]
pub struct PdfExport {
    pub bytes: Vec<u8>,
    pub filename: String,
}

#[derive(Debug)]
pub struct EvaluationArtifacts {
    pub pdf: Vec<u8>,
    pub pdf_name: String,
    pub png: Vec<u8>,
    pub png_name: String,
}

/// Captures the document with the compatibility bracket applied:
/// normalize colors, rasterize, revert overrides. The raster backend gets
/// its own normalized clone as well, since it may recompute styles
/// independently.
pub fn capture_document(
    doc: &mut StyledDocument,
    rasterizer: &dyn DocumentRasterizer,
    options: &RasterOptions,
) -> Result<image::RgbImage, ExportError> {
    tracing::debug!(
        "Capturing document at {}x (cors: {})",
        options.scale,
        options.use_cors
    );
    let ledger = color_fix::apply_color_fix(doc);

    // The backend may recompute styles on its own copy; run the pass
    // there too unless the first one already found nothing.
    let result = if ledger.is_empty() {
        rasterizer.rasterize(doc, options)
    } else {
        let mut backend_copy = doc.clone();
        let _ = color_fix::apply_color_fix(&mut backend_copy);
        rasterizer.rasterize(&backend_copy, options)
    };

    // Restore on both paths before surfacing the outcome.
    color_fix::revert(doc, &ledger);

    Ok(result?)
}

/// Renders and exports a resume as a downloadable multi-page PDF.
pub fn export_resume_pdf(
    resume: &ResumeData,
    rasterizer: &dyn DocumentRasterizer,
) -> Result<PdfExport, ExportError> {
    let renderer = renderer_for(resume.style);
    let mut doc = renderer.render(resume, RenderVariant::Page);
    let capture = capture_document(&mut doc, rasterizer, &RasterOptions::default())?;
    let bytes = pdf::assemble_pdf(&capture, &resume.title)?;
    Ok(PdfExport {
        bytes,
        filename: export_filename(&resume.title),
    })
}

/// Renders a resume into the PDF + PNG pair the evaluation flow uploads.
pub fn export_evaluation_artifacts(
    resume: &ResumeData,
    rasterizer: &dyn DocumentRasterizer,
) -> Result<EvaluationArtifacts, ExportError> {
    let renderer = renderer_for(resume.style);
    let mut doc = renderer.render(resume, RenderVariant::Page);
    let capture = capture_document(&mut doc, rasterizer, &RasterOptions::default())?;

    let stem = artifact_stem(Some(resume.id));
    Ok(EvaluationArtifacts {
        pdf: pdf::assemble_pdf(&capture, &resume.title)?,
        pdf_name: format!("{stem}.pdf"),
        png: pdf::encode_png(&capture)?,
        png_name: format!("{stem}.png"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::dom::StyledNode;
    use raster::BlockRasterizer;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn oklch_doc() -> StyledDocument {
        StyledDocument::new(
            StyledNode::new("div")
                .style("background-color", "#ffffff")
                .child(
                    StyledNode::new("p")
                        .text("content line")
                        .style("color", "oklch(0.21 0.034 264.665)"),
                ),
        )
        .custom_property("--accent", "oklch(0.623 0.214 259.815)")
    }

    #[test]
    fn test_capture_reverts_overrides_on_success() {
        let mut doc = oklch_doc();
        let pristine = doc.clone();
        capture_document(&mut doc, &BlockRasterizer, &RasterOptions::default()).unwrap();
        assert_eq!(doc, pristine);
    }

    struct FailingRasterizer;
    impl DocumentRasterizer for FailingRasterizer {
        fn rasterize(
            &self,
            _doc: &StyledDocument,
            _options: &RasterOptions,
        ) -> Result<image::RgbImage, RasterError> {
            Err(RasterError::Backend("boom".to_string()))
        }
    }

    #[test]
    fn test_capture_reverts_overrides_on_failure() {
        let mut doc = oklch_doc();
        let pristine = doc.clone();
        let result = capture_document(&mut doc, &FailingRasterizer, &RasterOptions::default());
        assert!(result.is_err());
        assert_eq!(doc, pristine);
    }

    struct AssertingRasterizer(AtomicBool);
    impl DocumentRasterizer for AssertingRasterizer {
        fn rasterize(
            &self,
            doc: &StyledDocument,
            options: &RasterOptions,
        ) -> Result<image::RgbImage, RasterError> {
            // The backend must only ever present normalized colors.
            let mut clean = true;
            let mut stack = vec![&doc.root];
            while let Some(node) = stack.pop() {
                let mut properties = node.computed.properties();
                properties.extend(node.inline.properties());
                for property in properties {
                    if let Some(value) = node.effective(&property) {
                        if color_fix::contains_modern_color(value) {
                            clean = false;
                        }
                    }
                }
                stack.extend(node.children.iter());
            }
            self.0.store(clean, Ordering::SeqCst);
            BlockRasterizer.rasterize(doc, options)
        }
    }

    #[test]
    fn test_backend_sees_normalized_colors_only() {
        let mut doc = oklch_doc();
        let rasterizer = AssertingRasterizer(AtomicBool::new(false));
        capture_document(&mut doc, &rasterizer, &RasterOptions::default()).unwrap();
        assert!(rasterizer.0.load(Ordering::SeqCst));
    }
}
