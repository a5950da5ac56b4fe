//! Text extraction from CV documents
//!
//! Every extractor here is best-effort. PDF and Word handling are byte-level
//! heuristics, not format parsers: compressed PDF streams and binary DOC
//! control structures come out garbled or empty. [`DocumentExtractor`] picks a
//! strategy from the detected format and walks a fixed fallback order until
//! one produces enough text.

use crate::config::{ExtractionConfig, PdfBackend};
use crate::error::{ExtractionFailure, Result};
use crate::input::file_detector::DocumentFormat;
use log::{debug, warn};
use pulldown_cmark::{Event, Parser, Tag};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// A strategy that turns raw document bytes into text.
pub trait TextExtractor: Send + Sync {
    /// Returns whatever text could be recovered; empty when nothing was found.
    fn extract(&self, bytes: &[u8]) -> String;
}

/// Words of this many bytes or fewer are dropped as binary noise.
const MAX_NOISE_WORD_BYTES: usize = 2;

const STREAM_START: &[u8] = b"stream";
const STREAM_END: &[u8] = b"endstream";

static DOCX_RUN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"<w:t[^>]*>([^<]+)</w:t>",
        r"<t[^>]*>([^<]+)</t>",
        r"<text[^>]*>([^<]+)</text>",
        r#"xml:space="preserve">([^<]+)</w:t>"#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("invalid DOCX run pattern"))
    .collect()
});

static DOCX_VISIBLE_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">([A-Za-z0-9\s.,:;!?-]+)<").expect("invalid DOCX fallback pattern"));

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

// ---------------------------------------------------------------------------
// Printable-text scanner
// ---------------------------------------------------------------------------

/// Bytes that may appear inside a word. Each byte is read as a Latin-1 code
/// point, so accented Latin-1 letters count as letters.
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(b, b' ' | b'-' | b'_')
        || matches!(b, 0xAA | 0xB5 | 0xBA | 0xC0..=0xD6 | 0xD8..=0xF6 | 0xF8..=0xFF)
}

/// Accumulates runs of word bytes and emits those longer than the noise limit.
#[derive(Default)]
struct WordScanner {
    output: String,
    word: String,
    word_bytes: usize,
}

impl WordScanner {
    fn feed(&mut self, b: u8) {
        if is_word_byte(b) {
            self.word.push(char::from(b));
            self.word_bytes += 1;
        } else if self.word_bytes > 0 {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.word_bytes > MAX_NOISE_WORD_BYTES {
            self.output.push_str(&self.word);
            self.output.push(' ');
        }
        self.word.clear();
        self.word_bytes = 0;
    }

    fn finish(mut self) -> String {
        self.flush();
        self.output.trim().to_string()
    }
}

/// Scan arbitrary bytes for readable words.
pub fn printable_text(data: &[u8]) -> String {
    let mut scanner = WordScanner::default();
    for &b in data {
        scanner.feed(b);
    }
    scanner.finish()
}

pub struct PrintableTextExtractor;

impl TextExtractor for PrintableTextExtractor {
    fn extract(&self, bytes: &[u8]) -> String {
        printable_text(bytes)
    }
}

// ---------------------------------------------------------------------------
// Plain text and Markdown
// ---------------------------------------------------------------------------

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    fn extract(&self, bytes: &[u8]) -> String {
        let markdown = String::from_utf8_lossy(bytes);
        let mut text = String::new();

        for event in Parser::new(&markdown) {
            match event {
                Event::Text(t) | Event::Code(t) => text.push_str(&t),
                Event::SoftBreak | Event::HardBreak => text.push('\n'),
                Event::End(Tag::Paragraph)
                | Event::End(Tag::Heading(..))
                | Event::End(Tag::Item)
                | Event::End(Tag::CodeBlock(_)) => text.push('\n'),
                _ => {}
            }
        }

        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ---------------------------------------------------------------------------
// PDF
// ---------------------------------------------------------------------------

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Iterates over the bodies between `stream` and `endstream` markers.
struct StreamBodies<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for StreamBodies<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos + find_bytes(self.data.get(self.pos..)?, STREAM_START)?;
        let end = start + find_bytes(&self.data[start..], STREAM_END)?;
        self.pos = end + STREAM_END.len();
        self.data.get(start + STREAM_START.len()..end)
    }
}

/// Scrapes readable words out of every content stream.
pub struct PdfStreamExtractor;

impl TextExtractor for PdfStreamExtractor {
    fn extract(&self, bytes: &[u8]) -> String {
        let mut text = String::new();
        let bodies = StreamBodies { data: bytes, pos: 0 };
        for body in bodies {
            text.push_str(&printable_text(body));
            text.push(' ');
        }
        text.trim().to_string()
    }
}

/// Real PDF parsing through `pdf-extract`.
pub struct PdfLibraryExtractor;

impl TextExtractor for PdfLibraryExtractor {
    fn extract(&self, bytes: &[u8]) -> String {
        // pdf-extract panics on some malformed inputs.
        let outcome = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));
        match outcome {
            Ok(Ok(text)) => text.trim().to_string(),
            Ok(Err(e)) => {
                debug!("pdf-extract failed: {}", e);
                String::new()
            }
            Err(_) => {
                warn!("pdf-extract panicked; falling back to stream scanning");
                String::new()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// DOCX
// ---------------------------------------------------------------------------

/// Pulls run text out of raw WordprocessingML with regular expressions,
/// falling back to any visible text between tags when the runs are too thin.
pub struct DocxXmlExtractor {
    pub min_chars: usize,
}

impl TextExtractor for DocxXmlExtractor {
    fn extract(&self, bytes: &[u8]) -> String {
        let xml = String::from_utf8_lossy(bytes);
        let mut text = String::new();

        for pattern in DOCX_RUN_PATTERNS.iter() {
            for caps in pattern.captures_iter(&xml) {
                if let Some(run) = caps.get(1) {
                    text.push_str(run.as_str());
                    text.push(' ');
                }
            }
        }

        if char_len(&text) < self.min_chars {
            for caps in DOCX_VISIBLE_TEXT.captures_iter(&xml) {
                if let Some(visible) = caps.get(1) {
                    if visible.as_str().len() > MAX_NOISE_WORD_BYTES {
                        text.push_str(visible.as_str());
                        text.push(' ');
                    }
                }
            }
        }

        text.trim().to_string()
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    Verbatim,
    Markdown,
    PdfLibrary,
    PdfStreams,
    PdfRawScan,
    DocxRuns,
    PrintableScan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub format: DocumentFormat,
    pub method: ExtractionMethod,
}

/// Chooses and sequences extractors for one document.
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    min_chars: usize,
    pdf_backend: PdfBackend,
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

impl DocumentExtractor {
    pub fn new(min_chars: usize, pdf_backend: PdfBackend) -> Self {
        Self { min_chars, pdf_backend }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.min_extracted_chars, config.pdf_backend)
    }

    /// Detect the format from the hints and extract.
    pub fn extract(&self, bytes: &[u8], content_type: Option<&str>, location: &str) -> Result<ExtractedText> {
        let format = DocumentFormat::detect(content_type, location);
        debug!("Detected {:?} for {}", format, location);
        self.extract_format(bytes, format)
    }

    pub fn extract_format(&self, bytes: &[u8], format: DocumentFormat) -> Result<ExtractedText> {
        let done = |text: String, method| ExtractedText { text, format, method };

        match format {
            DocumentFormat::Text => {
                return Ok(done(PlainTextExtractor.extract(bytes), ExtractionMethod::Verbatim));
            }
            DocumentFormat::Markdown => {
                return Ok(done(MarkdownExtractor.extract(bytes), ExtractionMethod::Markdown));
            }
            DocumentFormat::Pdf => return self.extract_pdf(bytes).map(|(text, method)| done(text, method)),
            DocumentFormat::Docx => {
                let text = DocxXmlExtractor { min_chars: self.min_chars }.extract(bytes);
                if self.is_enough(&text) {
                    return Ok(done(text, ExtractionMethod::DocxRuns));
                }
                debug!("DOCX run patterns yielded {} chars; scanning raw bytes", char_len(&text));
            }
            DocumentFormat::Doc | DocumentFormat::Unknown => {}
        }

        let text = PrintableTextExtractor.extract(bytes);
        if self.is_enough(&text) {
            Ok(done(text, ExtractionMethod::PrintableScan))
        } else {
            Err(ExtractionFailure::UnsupportedFormat.into())
        }
    }

    fn extract_pdf(&self, bytes: &[u8]) -> Result<(String, ExtractionMethod)> {
        if self.pdf_backend == PdfBackend::Library {
            let text = PdfLibraryExtractor.extract(bytes);
            if self.is_enough(&text) {
                return Ok((text, ExtractionMethod::PdfLibrary));
            }
        }

        let text = PdfStreamExtractor.extract(bytes);
        if self.is_enough(&text) {
            return Ok((text, ExtractionMethod::PdfStreams));
        }

        let text = PrintableTextExtractor.extract(bytes);
        if self.is_enough(&text) {
            Ok((text, ExtractionMethod::PdfRawScan))
        } else {
            Err(ExtractionFailure::ScannedPdf.into())
        }
    }

    fn is_enough(&self, text: &str) -> bool {
        char_len(text) >= self.min_chars
    }
}
