//! PDF text extraction and chunking.
//!
//! Turns raw PDF bytes into pages of text fragments, then splits those
//! fragments into bounded-size chunks for submission as assistant messages.

pub mod chunker;
mod pdf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
}

/// A contiguous run of text on a page, as produced by the PDF parser.
/// Fragments are the smallest unit the chunker works with and are never
/// split.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub text: String,
}

/// One page of extracted text.
#[derive(Debug, Clone)]
pub struct Page {
    /// 1-based page number from the source document.
    pub number: usize,
    pub fragments: Vec<Fragment>,
}

impl Page {
    /// All fragment text on this page, concatenated.
    pub fn text(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }
}

/// Result of extracting text from an uploaded document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub filename: String,
    pub pages: Vec<Page>,
}

impl ExtractedDocument {
    /// Total character count across all fragments (Unicode scalar values).
    pub fn total_chars(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| &p.fragments)
            .map(|f| f.text.chars().count())
            .sum()
    }

    pub fn fragment_count(&self) -> usize {
        self.pages.iter().map(|p| p.fragments.len()).sum()
    }
}

/// Extract pages of text fragments from PDF bytes.
///
/// A document with no text layer (scanned or image-only PDF) extracts to
/// zero pages; callers decide whether that is an error.
pub fn extract_document(
    bytes: &[u8],
    filename: &str,
) -> Result<ExtractedDocument, ExtractionError> {
    let pages = pdf::extract_pdf(bytes)?;
    Ok(ExtractedDocument {
        filename: filename.to_string(),
        pages,
    })
}
