//! Years-of-experience estimation

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static STATED_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(\d+)\s*\+?\s*years?\s*(?:of\s*)?experience",
        r"experience[:\s]+(\d+)\s*years?",
        r"(\d+)\s*years?\s*experience",
        r"(\d+)\s*y\.?o\.?e\.?",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("invalid experience pattern"))
    .collect()
});

static YEAR_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:19|20)\d{2}").expect("invalid year pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceSource {
    /// Written out, e.g. "5+ years of experience".
    Stated,
    /// Span between the first and last year mentioned.
    DateRange,
    NotDetected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEstimate {
    pub years: u32,
    pub source: ExperienceSource,
}

/// Years of experience; 0 when nothing could be inferred.
pub fn extract_experience(text: &str) -> u32 {
    estimate_experience(text).years
}

/// The largest explicitly stated figure wins. Without one, the first and
/// last 19xx/20xx tokens in reading order give a span, used only when the
/// later one is greater.
pub fn estimate_experience(text: &str) -> ExperienceEstimate {
    let text_lower = text.to_lowercase();

    let stated = STATED_PATTERNS
        .iter()
        .flat_map(|pattern| pattern.captures_iter(&text_lower))
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .max()
        .unwrap_or(0);

    if stated > 0 {
        return ExperienceEstimate {
            years: stated,
            source: ExperienceSource::Stated,
        };
    }

    let years: Vec<u32> = YEAR_TOKEN
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();

    if let (Some(&start), Some(&end)) = (years.first(), years.last()) {
        if years.len() >= 2 && end > start {
            return ExperienceEstimate {
                years: end - start,
                source: ExperienceSource::DateRange,
            };
        }
    }

    ExperienceEstimate {
        years: 0,
        source: ExperienceSource::NotDetected,
    }
}
