//! PDF assembly — embeds the captured bitmap into A4 portrait pages,
//! tiling the same tall image upward one page height per extra page.
//!
//! Pagination is geometry-only: content rows may straddle a page
//! boundary. That tiling layout is deliberate.

use printpdf::image_crate as image;
use printpdf::{Image, ImageTransform, Mm, PdfDocument};
use thiserror::Error;

pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;

const EMBED_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF assembly failed: {0}")]
    Assembly(String),

    #[error("image encoding failed: {0}")]
    Encode(String),
}

/// Top-based page offsets for an image of the given height: the first
/// page draws at 0, each following page shifts the image up by one page
/// height. An image exactly one page tall yields exactly one page.
pub fn page_offsets(image_height_mm: f64, page_height_mm: f64) -> Vec<f64> {
    let mut offsets = vec![0.0];
    let mut height_left = image_height_mm - page_height_mm;
    while height_left > 0.0 {
        offsets.push(height_left - image_height_mm);
        height_left -= page_height_mm;
    }
    offsets
}

/// Download filename: `resume-<title>.pdf`, falling back to a plain
/// `resume-resume.pdf` when the document has no title.
pub fn export_filename(title: &str) -> String {
    let title = title.trim();
    let stem = if title.is_empty() { "resume" } else { title };
    format!("resume-{stem}.pdf")
}

/// Artifact stem for the evaluation flow uploads.
pub fn artifact_stem(id: Option<uuid::Uuid>) -> String {
    match id {
        Some(id) => format!("resume-{id}"),
        None => "resume-preview".to_string(),
    }
}

/// Embeds `capture` into a paginated A4 document and returns the PDF
/// bytes. The image is fitted to the page width; height overflow tiles
/// onto additional pages.
pub fn assemble_pdf(capture: &image::RgbImage, title: &str) -> Result<Vec<u8>, PdfError> {
    let (px_w, px_h) = capture.dimensions();
    if px_w == 0 || px_h == 0 {
        return Err(PdfError::Assembly("empty capture".to_string()));
    }

    let image_width_mm = PAGE_WIDTH_MM;
    let image_height_mm = (px_h as f64) * image_width_mm / (px_w as f64);
    let offsets = page_offsets(image_height_mm, PAGE_HEIGHT_MM);

    // printpdf sizes embedded images from pixel dimensions at a DPI; scale
    // up to the exact millimeter target.
    let native_width_mm = (px_w as f64) * MM_PER_INCH / EMBED_DPI;
    let native_height_mm = (px_h as f64) * MM_PER_INCH / EMBED_DPI;
    let scale_x = image_width_mm / native_width_mm;
    let scale_y = image_height_mm / native_height_mm;

    let (doc, first_page, first_layer) = PdfDocument::new(
        title,
        Mm(PAGE_WIDTH_MM as f32),
        Mm(PAGE_HEIGHT_MM as f32),
        "content",
    );
    let dynamic = image::DynamicImage::ImageRgb8(capture.clone());

    for (index, offset) in offsets.iter().enumerate() {
        let (page, layer) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH_MM as f32), Mm(PAGE_HEIGHT_MM as f32), "content")
        };
        let layer_ref = doc.get_page(page).get_layer(layer);

        // Offsets are top-based; PDF places from the bottom-left corner.
        let translate_y = PAGE_HEIGHT_MM - offset - image_height_mm;

        let embedded = Image::from_dynamic_image(&dynamic);
        embedded.add_to_layer(
            layer_ref,
            ImageTransform {
                translate_x: Some(Mm(0.0)),
                translate_y: Some(Mm(translate_y as f32)),
                scale_x: Some(scale_x as f32),
                scale_y: Some(scale_y as f32),
                dpi: Some(EMBED_DPI as f32),
                ..Default::default()
            },
        );
    }

    doc.save_to_bytes().map_err(|e| PdfError::Assembly(e.to_string()))
}

/// Encodes the capture as PNG for the evaluation-flow upload.
pub fn encode_png(capture: &image::RgbImage) -> Result<Vec<u8>, PdfError> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(capture.clone())
        .write_to(&mut buffer, image::ImageOutputFormat::Png)
        .map_err(|e| PdfError::Encode(e.to_string()))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_page_height_yields_one_page() {
        let offsets = page_offsets(PAGE_HEIGHT_MM, PAGE_HEIGHT_MM);
        assert_eq!(offsets, vec![0.0]);
    }

    #[test]
    fn test_short_image_yields_one_page() {
        assert_eq!(page_offsets(120.0, PAGE_HEIGHT_MM).len(), 1);
    }

    #[test]
    fn test_tall_image_tiles_upward() {
        // 500mm image: page two shifts the image up by one page height.
        let offsets = page_offsets(500.0, PAGE_HEIGHT_MM);
        assert_eq!(offsets.len(), 2);
        assert_eq!(offsets[0], 0.0);
        assert!((offsets[1] - (500.0 - PAGE_HEIGHT_MM - 500.0)).abs() < 1e-9);
    }

    #[test]
    fn test_three_page_spread() {
        let offsets = page_offsets(700.0, PAGE_HEIGHT_MM);
        assert_eq!(offsets.len(), 3);
        assert!((offsets[1] + PAGE_HEIGHT_MM).abs() < 1e-9);
        // each page shifts exactly one page height further up
        assert!((offsets[1] - offsets[2] - PAGE_HEIGHT_MM).abs() < 1e-9);
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename("Frontend Developer"), "resume-Frontend Developer.pdf");
        assert_eq!(export_filename("  "), "resume-resume.pdf");
    }

    #[test]
    fn test_artifact_stem() {
        assert_eq!(artifact_stem(None), "resume-preview");
        let id = uuid::Uuid::new_v4();
        assert_eq!(artifact_stem(Some(id)), format!("resume-{id}"));
    }

    #[test]
    fn test_assemble_pdf_produces_document() {
        let capture = printpdf::image_crate::RgbImage::from_pixel(100, 140, printpdf::image_crate::Rgb([255, 255, 255]));
        let bytes = assemble_pdf(&capture, "Test").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_encode_png_magic_bytes() {
        let capture = printpdf::image_crate::RgbImage::from_pixel(4, 4, printpdf::image_crate::Rgb([0, 0, 0]));
        let png = encode_png(&capture).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }
}
