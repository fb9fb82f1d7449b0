//! Raster backend seam — turning a styled document into a bitmap is
//! delegated behind `DocumentRasterizer`; the pipeline only fixes options
//! (2x density, opaque white background) and owns the style bracket
//! around the call.

use printpdf::image_crate as image;
use thiserror::Error;

use crate::render::dom::{StyledDocument, StyledNode};

#[derive(Debug, Clone)]
pub struct RasterOptions {
    /// Device-pixel multiplier applied to the capture.
    pub scale: f32,
    /// Forced opaque backdrop behind the captured tree.
    pub background: [u8; 3],
    /// Allow the backend to fetch cross-origin images.
    pub use_cors: bool,
    /// Logical capture width in CSS pixels before scaling.
    pub base_width: u32,
}

impl Default for RasterOptions {
    fn default() -> Self {
        RasterOptions {
            scale: 2.0,
            background: [0xff, 0xff, 0xff],
            use_cors: true,
            base_width: 794, // A4 width at 96dpi
        }
    }
}

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("rasterization failed: {0}")]
    Backend(String),
}

pub trait DocumentRasterizer: Send + Sync {
    fn rasterize(
        &self,
        doc: &StyledDocument,
        options: &RasterOptions,
    ) -> Result<image::RgbImage, RasterError>;
}

/// Built-in backend: flat block layout, one band per text line, colored
/// from the (already normalized) element styles. Good enough for the
/// capture pipeline; a full HTML renderer can be swapped in behind the
/// trait.
#[derive(Default)]
pub struct BlockRasterizer;

const LINE_HEIGHT: u32 = 22;
const BLOCK_GAP: u32 = 8;
const MARGIN: u32 = 32;
const CHARS_PER_LINE: usize = 80;

struct TextBand {
    lines: u32,
    fill: f32,
    color: [u8; 3],
}

fn parse_rgb(value: &str) -> Option<[u8; 3]> {
    let color = csscolorparser::parse(value).ok()?;
    let [r, g, b, _] = color.to_rgba8();
    Some([r, g, b])
}

fn collect_bands(node: &StyledNode, inherited: [u8; 3], out: &mut Vec<TextBand>) {
    let color = node
        .effective("color")
        .and_then(parse_rgb)
        .unwrap_or(inherited);
    if let Some(text) = &node.text {
        let chars = text.chars().count().max(1);
        let lines = chars.div_ceil(CHARS_PER_LINE) as u32;
        let last_line = chars % CHARS_PER_LINE;
        let fill = if last_line == 0 {
            1.0
        } else {
            last_line as f32 / CHARS_PER_LINE as f32
        };
        out.push(TextBand { lines, fill, color });
    }
    for child in &node.children {
        collect_bands(child, color, out);
    }
}

impl DocumentRasterizer for BlockRasterizer {
    fn rasterize(
        &self,
        doc: &StyledDocument,
        options: &RasterOptions,
    ) -> Result<image::RgbImage, RasterError> {
        let mut bands = Vec::new();
        collect_bands(&doc.root, [0x11, 0x11, 0x11], &mut bands);
        if bands.is_empty() {
            return Err(RasterError::Backend("document has no content".to_string()));
        }

        let content_height: u32 = bands
            .iter()
            .map(|b| b.lines * LINE_HEIGHT + BLOCK_GAP)
            .sum::<u32>()
            + 2 * MARGIN;

        let scale = options.scale.max(0.1);
        let width = ((options.base_width as f32) * scale) as u32;
        let height = ((content_height as f32) * scale) as u32;
        let background = doc
            .root
            .effective("background-color")
            .and_then(parse_rgb)
            .unwrap_or(options.background);

        let mut img = image::RgbImage::from_pixel(width, height, image::Rgb(background));

        let text_width = options.base_width.saturating_sub(2 * MARGIN);
        let mut y = MARGIN;
        for band in &bands {
            for line in 0..band.lines {
                let fill = if line + 1 == band.lines { band.fill } else { 1.0 };
                let line_width = ((text_width as f32) * fill) as u32;
                fill_rect(
                    &mut img,
                    (MARGIN as f32 * scale) as u32,
                    ((y + 4) as f32 * scale) as u32,
                    ((line_width as f32) * scale) as u32,
                    ((LINE_HEIGHT - 8) as f32 * scale) as u32,
                    band.color,
                );
                y += LINE_HEIGHT;
            }
            y += BLOCK_GAP;
        }

        Ok(img)
    }
}

fn fill_rect(img: &mut image::RgbImage, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
    let (width, height) = img.dimensions();
    for py in y..(y + h).min(height) {
        for px in x..(x + w).min(width) {
            img.put_pixel(px, py, image::Rgb(color));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::dom::StyledNode;

    #[test]
    fn test_block_rasterizer_scales_with_density() {
        let doc = StyledDocument::new(
            StyledNode::new("div")
                .style("background-color", "#ffffff")
                .child(StyledNode::new("p").text("hello world").style("color", "#111111")),
        );

        let one_x = BlockRasterizer
            .rasterize(&doc, &RasterOptions { scale: 1.0, ..Default::default() })
            .unwrap();
        let two_x = BlockRasterizer.rasterize(&doc, &RasterOptions::default()).unwrap();

        assert_eq!(two_x.width(), one_x.width() * 2);
        assert_eq!(two_x.height(), one_x.height() * 2);
    }

    #[test]
    fn test_block_rasterizer_paints_backdrop() {
        let doc = StyledDocument::new(
            StyledNode::new("div").child(StyledNode::new("p").text("x")),
        );
        let img = BlockRasterizer.rasterize(&doc, &RasterOptions::default()).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_empty_document_errors() {
        let doc = StyledDocument::new(StyledNode::new("div"));
        assert!(BlockRasterizer.rasterize(&doc, &RasterOptions::default()).is_err());
    }
}
