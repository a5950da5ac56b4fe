//! Input manager: fetch a CV, extract its text and gate on length

use crate::config::Config;
use crate::error::{ExtractionFailure, Result};
use crate::input::fetcher::DocumentFetcher;
use crate::input::text_extractor::{char_len, DocumentExtractor, ExtractedText};
use log::{debug, info, warn};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Extracted text by location, bounded in size. First in, first out.
#[derive(Debug, Default)]
struct TextCache {
    entries: HashMap<String, ExtractedText>,
    order: VecDeque<String>,
    capacity: usize,
}

impl TextCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    fn get(&self, location: &str) -> Option<ExtractedText> {
        self.entries.get(location).cloned()
    }

    fn insert(&mut self, location: &str, text: ExtractedText) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(location.to_string(), text).is_some() {
            return;
        }
        self.order.push_back(location.to_string());
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                debug!("Evicting cached text for {}", oldest);
                self.entries.remove(&oldest);
            }
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

pub struct InputManager<F> {
    fetcher: F,
    extractor: DocumentExtractor,
    min_cv_chars: usize,
    cache: Mutex<TextCache>,
    enable_cache: bool,
}

impl<F: DocumentFetcher> InputManager<F> {
    pub fn new(fetcher: F) -> Self {
        Self::from_config(fetcher, &Config::default())
    }

    pub fn from_config(fetcher: F, config: &Config) -> Self {
        Self {
            fetcher,
            extractor: DocumentExtractor::from_config(&config.extraction),
            min_cv_chars: config.extraction.min_cv_chars,
            cache: Mutex::new(TextCache::new(config.extraction.cache_capacity)),
            enable_cache: config.extraction.enable_cache,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn min_cv_chars(&self) -> usize {
        self.min_cv_chars
    }

    /// Download and extract, without any length gate.
    pub async fn extract_text(&self, location: &str) -> Result<ExtractedText> {
        if self.enable_cache {
            if let Some(cached) = self.cached(location) {
                info!("Using cached text for: {}", location);
                return Ok(cached);
            }
        }

        let document = self.fetcher.fetch(location).await?;
        let extracted = self
            .extractor
            .extract(&document.bytes, document.content_type.as_deref(), &document.location)?;

        info!(
            "Extracted {} characters from {} ({:?} via {:?})",
            char_len(&extracted.text),
            location,
            extracted.format,
            extracted.method
        );

        if self.enable_cache {
            if let Ok(mut cache) = self.cache.lock() {
                cache.insert(location, extracted.clone());
            }
        }

        Ok(extracted)
    }

    /// Text suitable for scoring: extraction plus the minimum-length check.
    pub async fn load_cv_text(&self, location: &str) -> Result<String> {
        let extracted = self.extract_text(location).await?;
        self.ensure_usable(extracted.text)
    }

    /// Rejects text whose trimmed length is under the configured minimum.
    pub fn ensure_usable(&self, text: String) -> Result<String> {
        let chars = char_len(text.trim());
        if chars < self.min_cv_chars {
            warn!("CV text too short: {} characters (minimum {})", chars, self.min_cv_chars);
            return Err(ExtractionFailure::TooShort { chars }.into());
        }
        debug!("CV text accepted with {} characters", chars);
        Ok(text)
    }

    fn cached(&self, location: &str) -> Option<ExtractedText> {
        self.cache.lock().ok()?.get(location)
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    pub fn cache_size(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CvMatcherError;
    use crate::testutil::MockFetcher;

    const LONG_TEXT: &str = "Jane Smith, backend engineer. Python, Go and PostgreSQL for six years.";

    #[tokio::test]
    async fn test_text_document_passes_through() {
        let fetcher = MockFetcher::new().with_document("https://cv.example/jane.txt", LONG_TEXT.as_bytes(), None);
        let manager = InputManager::new(fetcher);

        let text = manager.load_cv_text("https://cv.example/jane.txt").await.unwrap();
        assert_eq!(text, LONG_TEXT);
    }

    #[tokio::test]
    async fn test_short_text_rejected() {
        let short = "a".repeat(49);
        let fetcher = MockFetcher::new().with_document("https://cv.example/a.txt", short.as_bytes(), None);
        let manager = InputManager::new(fetcher);

        let err = manager.load_cv_text("https://cv.example/a.txt").await.unwrap_err();
        assert!(matches!(
            err,
            CvMatcherError::Extraction(ExtractionFailure::TooShort { chars: 49 })
        ));
    }

    #[test]
    fn test_whitespace_does_not_count() {
        let padded = format!("   {}   \n\n", "a".repeat(40));
        let manager = InputManager::new(MockFetcher::new());
        assert!(manager.ensure_usable(padded).is_err());
        assert!(manager.ensure_usable("b".repeat(51)).is_ok());
    }

    #[tokio::test]
    async fn test_cache_avoids_second_fetch() {
        let fetcher = MockFetcher::new().with_document("https://cv.example/jane.txt", LONG_TEXT.as_bytes(), None);
        let manager = InputManager::new(fetcher);

        manager.extract_text("https://cv.example/jane.txt").await.unwrap();
        manager.extract_text("https://cv.example/jane.txt").await.unwrap();
        assert_eq!(manager.fetcher().fetch_count(), 1);
        assert_eq!(manager.cache_size(), 1);

        manager.clear_cache();
        assert_eq!(manager.cache_size(), 0);
    }

    #[tokio::test]
    async fn test_cache_evicts_oldest_past_capacity() {
        let mut config = Config::default();
        config.extraction.cache_capacity = 2;
        let fetcher = MockFetcher::new()
            .with_document("https://cv.example/a.txt", LONG_TEXT.as_bytes(), None)
            .with_document("https://cv.example/b.txt", LONG_TEXT.as_bytes(), None)
            .with_document("https://cv.example/c.txt", LONG_TEXT.as_bytes(), None);
        let manager = InputManager::from_config(fetcher, &config);

        for location in ["https://cv.example/a.txt", "https://cv.example/b.txt", "https://cv.example/c.txt"] {
            manager.extract_text(location).await.unwrap();
        }
        assert_eq!(manager.cache_size(), 2);

        // b and c are still cached; a was evicted and is fetched again.
        manager.extract_text("https://cv.example/c.txt").await.unwrap();
        assert_eq!(manager.fetcher().fetch_count(), 3);
        manager.extract_text("https://cv.example/a.txt").await.unwrap();
        assert_eq!(manager.fetcher().fetch_count(), 4);
        assert_eq!(manager.cache_size(), 2);
    }

    #[tokio::test]
    async fn test_cache_disabled() {
        let fetcher = MockFetcher::new().with_document("https://cv.example/jane.txt", LONG_TEXT.as_bytes(), None);
        let manager = InputManager::new(fetcher).with_cache(false);

        manager.extract_text("https://cv.example/jane.txt").await.unwrap();
        manager.extract_text("https://cv.example/jane.txt").await.unwrap();
        assert_eq!(manager.fetcher().fetch_count(), 2);
        assert_eq!(manager.cache_size(), 0);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates() {
        let manager = InputManager::new(MockFetcher::new());
        let err = manager.load_cv_text("https://cv.example/missing.pdf").await.unwrap_err();
        assert!(err.is_retryable());
    }
}
