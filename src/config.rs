//! Configuration management for the CV matcher

use crate::error::{CvMatcherError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    /// Response size cap in bytes; 0 disables it.
    pub max_document_bytes: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub min_extracted_chars: usize,
    pub min_cv_chars: usize,
    pub pdf_backend: PdfBackend,
    pub enable_cache: bool,
    /// Most documents kept in the extraction cache; the oldest is evicted first.
    pub cache_capacity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfBackend {
    Heuristic,
    Library,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_limit: usize,
    pub max_limit: usize,
    pub default_score: u32,
    pub query_score_threshold: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_document_bytes: 10 * 1024 * 1024,
            user_agent: format!("cv-matcher/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_extracted_chars: 100,
            min_cv_chars: 50,
            pdf_backend: PdfBackend::Heuristic,
            enable_cache: true,
            cache_capacity: 256,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 100,
            default_score: 50,
            query_score_threshold: 50,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            detailed: false,
            color_output: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| CvMatcherError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CvMatcherError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("cv-matcher")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.extraction.min_cv_chars == 0 {
            return Err(CvMatcherError::Configuration(
                "extraction.min_cv_chars must be greater than zero".to_string(),
            ));
        }
        if self.search.max_limit == 0 {
            return Err(CvMatcherError::Configuration(
                "search.max_limit must be greater than zero".to_string(),
            ));
        }
        if self.search.default_limit > self.search.max_limit {
            return Err(CvMatcherError::Configuration(format!(
                "search.default_limit ({}) exceeds search.max_limit ({})",
                self.search.default_limit, self.search.max_limit
            )));
        }
        Ok(())
    }

    /// The response size cap, if one is configured.
    pub fn document_size_limit(&self) -> Option<u64> {
        self.fetch.size_limit()
    }
}

impl FetchConfig {
    pub fn size_limit(&self) -> Option<u64> {
        match self.max_document_bytes {
            0 => None,
            limit => Some(limit),
        }
    }
}
