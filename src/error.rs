//! Error handling for the CV matcher

use thiserror::Error;

/// Why a downloaded document produced no usable text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    #[error("could not extract text from PDF; it may be a scanned or image-only document (run OCR first)")]
    ScannedPdf,

    #[error("could not extract readable text; supported formats are PDF with a text layer, DOC, DOCX, TXT and Markdown")]
    UnsupportedFormat,

    #[error("CV text too short or unreadable ({chars} characters)")]
    TooShort { chars: usize },
}

#[derive(Error, Debug)]
pub enum CvMatcherError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to download CV from {location}: {reason}")]
    Fetch { location: String, reason: String },

    #[error("Timed out after {secs} seconds fetching {location}")]
    FetchTimeout { location: String, secs: u64 },

    #[error("Document at {location} exceeds the {limit} byte limit")]
    DocumentTooLarge { location: String, limit: u64 },

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionFailure),

    #[error("Invalid shortlist criteria: {0}")]
    CriteriaParse(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CvMatcherError {
    /// Network-level failures a caller may reasonably retry. The core never does.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CvMatcherError::Fetch { .. } | CvMatcherError::FetchTimeout { .. }
        )
    }

    /// True when the document was fetched but yielded no usable text.
    pub fn is_extraction_failure(&self) -> bool {
        matches!(self, CvMatcherError::Extraction(_))
    }
}

pub type Result<T> = std::result::Result<T, CvMatcherError>;
