//! CV matcher library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use config::Config;
pub use error::{CvMatcherError, Result};
pub use processing::{AnalysisEngine, Criteria, MatchResult, SearchQuery, SearchResponse};
