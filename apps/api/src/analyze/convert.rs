//! PDF page rendering seam. Turning the first page of an uploaded PDF
//! into a PNG is delegated behind `PdfConverter`; this module owns only
//! the upload validation in front of it.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Invalid file type: {0}. Expected PDF file.")]
    InvalidType(String),

    #[error("File is empty")]
    Empty,

    #[error("PDF conversion failed: {0}")]
    Backend(String),
}

#[derive(Debug, Clone)]
pub struct ConvertedPage {
    pub png: Bytes,
}

#[async_trait]
pub trait PdfConverter: Send + Sync {
    async fn first_page_png(&self, file_name: &str, data: &Bytes) -> Result<ConvertedPage, ConvertError>;
}

/// Rejects uploads the converter should never see.
pub fn validate_upload(file_name: &str, data: &[u8]) -> Result<(), ConvertError> {
    if data.is_empty() {
        return Err(ConvertError::Empty);
    }
    if !file_name.to_ascii_lowercase().ends_with(".pdf") {
        return Err(ConvertError::InvalidType(file_name.to_string()));
    }
    Ok(())
}

/// Image file name paired with an uploaded PDF: same stem, `.png`.
pub fn png_name_for(file_name: &str) -> String {
    let stem = file_name
        .strip_suffix(".pdf")
        .or_else(|| file_name.strip_suffix(".PDF"))
        .unwrap_or(file_name);
    format!("{stem}.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_upload() {
        assert!(validate_upload("resume.pdf", b"%PDF-1.4").is_ok());
        assert!(validate_upload("resume.PDF", b"%PDF-1.4").is_ok());
        assert!(matches!(validate_upload("resume.pdf", b""), Err(ConvertError::Empty)));
        assert!(matches!(
            validate_upload("resume.docx", b"PK"),
            Err(ConvertError::InvalidType(_))
        ));
    }

    #[test]
    fn test_png_name_for() {
        assert_eq!(png_name_for("resume.pdf"), "resume.png");
        assert_eq!(png_name_for("resume.PDF"), "resume.png");
        assert_eq!(png_name_for("weird"), "weird.png");
    }
}
