//! Input processing module
//! Handles document retrieval, format detection and text extraction

pub mod fetcher;
pub mod file_detector;
pub mod manager;
pub mod text_extractor;

pub use fetcher::{DocumentFetcher, FetchedDocument, HttpFetcher, LocalFileFetcher, SourceFetcher};
pub use file_detector::DocumentFormat;
pub use manager::InputManager;
pub use text_extractor::{DocumentExtractor, ExtractedText, ExtractionMethod};
