//! Test utilities: handwritten stand-ins for the fetcher and candidate store.
//!
//! Both use `Arc<Mutex<_>>` so clones share state and tests can assert on
//! what was recorded.

use crate::error::{CvMatcherError, Result};
use crate::input::fetcher::{DocumentFetcher, FetchedDocument};
use crate::processing::search::CandidateStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Serves canned documents by location. Unknown locations fail like a 404.
#[derive(Clone, Default)]
pub struct MockFetcher {
    documents: Arc<Mutex<HashMap<String, FetchedDocument>>>,
    timeouts: Arc<Mutex<Vec<String>>>,
    fetches: Arc<Mutex<usize>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, location: &str, bytes: impl AsRef<[u8]>, content_type: Option<&str>) -> Self {
        self.documents.lock().unwrap().insert(
            location.to_string(),
            FetchedDocument {
                location: location.to_string(),
                bytes: bytes.as_ref().to_vec(),
                content_type: content_type.map(str::to_string),
            },
        );
        self
    }

    /// Make `location` time out.
    pub fn with_timeout(self, location: &str) -> Self {
        self.timeouts.lock().unwrap().push(location.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetches.lock().unwrap()
    }
}

impl DocumentFetcher for MockFetcher {
    async fn fetch(&self, location: &str) -> Result<FetchedDocument> {
        *self.fetches.lock().unwrap() += 1;

        if self.timeouts.lock().unwrap().iter().any(|l| l == location) {
            return Err(CvMatcherError::FetchTimeout {
                location: location.to_string(),
                secs: 30,
            });
        }

        self.documents
            .lock()
            .unwrap()
            .get(location)
            .cloned()
            .ok_or_else(|| CvMatcherError::Fetch {
                location: location.to_string(),
                reason: "status 404".to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Keeps written-back text in memory; last write wins.
#[derive(Clone, Default)]
pub struct MemoryStore {
    texts: Arc<Mutex<HashMap<String, String>>>,
    fail: Arc<Mutex<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every write fails.
    pub fn failing() -> Self {
        let store = Self::default();
        *store.fail.lock().unwrap() = true;
        store
    }

    pub fn saved(&self, candidate_id: &str) -> Option<String> {
        self.texts.lock().unwrap().get(candidate_id).cloned()
    }

    pub fn saved_count(&self) -> usize {
        self.texts.lock().unwrap().len()
    }
}

impl CandidateStore for MemoryStore {
    async fn save_extracted_text(&self, candidate_id: &str, text: &str) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(CvMatcherError::Io(std::io::Error::other("store unavailable")));
        }
        self.texts
            .lock()
            .unwrap()
            .insert(candidate_id.to_string(), text.to_string());
        Ok(())
    }
}
