//! Candidate search ranking

use crate::config::SearchConfig;
use crate::error::Result;
use crate::processing::languages::extract_languages;
use crate::processing::matcher::ratio_score;
use crate::processing::skills::SkillAnalyzer;
use serde::{Deserialize, Serialize};
use std::future::Future;

const EXPERIENCE_BONUS: u32 = 20;
const POSITION_BONUS: u32 = 15;
const LANGUAGE_DIVISOR: u32 = 5;
/// Query words this short or shorter never match.
const MAX_IGNORED_QUERY_WORD_BYTES: usize = 2;

/// A candidate as the caller stores it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateRecord {
    pub id: String,
    pub full_name: String,
    pub resume_url: String,
    /// Previously extracted CV text, reused instead of downloading again.
    pub parsed_cv_text: Option<String>,
    pub years_of_experience: u32,
    pub current_position: String,
    pub portfolio_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub status: String,
}

impl CandidateRecord {
    /// Cached text, if there is any worth using.
    pub fn cached_text(&self) -> Option<&str> {
        self.parsed_cv_text.as_deref().filter(|text| !text.is_empty())
    }

    pub fn has_portfolio(&self) -> bool {
        self.portfolio_url.as_deref().is_some_and(|url| !url.is_empty())
    }

    pub fn has_linkedin(&self) -> bool {
        self.linkedin_url.as_deref().is_some_and(|url| !url.is_empty())
    }

    /// Has a CV to read but no text cached for it.
    pub fn needs_reparse(&self) -> bool {
        self.cached_text().is_none() && !self.resume_url.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    /// Free text, split on whitespace.
    pub query: String,
    pub skills: Vec<String>,
    pub min_experience: Option<u32>,
    pub max_experience: Option<u32>,
    pub current_position: String,
    pub languages: Vec<String>,
    pub has_portfolio: Option<bool>,
    pub has_linkedin: Option<bool>,
    pub status: String,
    /// 0 or anything above the configured maximum means the default.
    pub limit: usize,
}

impl SearchQuery {
    /// Whether any criterion that adds to a candidate's score was given.
    pub fn has_scoring_criteria(&self) -> bool {
        !self.skills.is_empty()
            || self.min_experience.is_some()
            || !self.current_position.is_empty()
            || !self.languages.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub candidate_id: String,
    pub full_name: String,
    pub match_score: u32,
    pub matched_skills: Vec<String>,
    pub matched_reasons: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub candidates: Vec<SearchHit>,
    pub count: usize,
    /// Candidates left after filtering, before scoring and truncation.
    pub total: usize,
}

/// Where text extracted during a search or re-parse is written back.
pub trait CandidateStore: Send + Sync {
    fn save_extracted_text(&self, candidate_id: &str, text: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Store that keeps nothing, for callers that persist records themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl CandidateStore for NullStore {
    async fn save_extracted_text(&self, _candidate_id: &str, _text: &str) -> Result<()> {
        Ok(())
    }
}

/// Scoring rules for candidate search. Unlike CV matching, components are
/// added up rather than averaged.
#[derive(Debug, Clone)]
pub struct CandidateRanker {
    settings: SearchConfig,
}

impl Default for CandidateRanker {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl CandidateRanker {
    pub fn new(settings: SearchConfig) -> Self {
        Self { settings }
    }

    pub fn effective_limit(&self, requested: usize) -> usize {
        if requested == 0 || requested > self.settings.max_limit {
            self.settings.default_limit
        } else {
            requested
        }
    }

    /// Record-level filters, applied before any text is needed.
    pub fn passes_filters(&self, record: &CandidateRecord, query: &SearchQuery) -> bool {
        if !query.status.is_empty() && record.status != query.status {
            return false;
        }
        if query.has_portfolio == Some(true) && !record.has_portfolio() {
            return false;
        }
        if query.has_linkedin == Some(true) && !record.has_linkedin() {
            return false;
        }
        if query.min_experience.is_some_and(|min| record.years_of_experience < min) {
            return false;
        }
        if query.max_experience.is_some_and(|max| record.years_of_experience > max) {
            return false;
        }
        if !query.current_position.is_empty()
            && !record
                .current_position
                .to_lowercase()
                .contains(&query.current_position.to_lowercase())
        {
            return false;
        }
        true
    }

    /// Score one candidate whose text is known. `None` means excluded.
    pub fn score(
        &self,
        skills: &SkillAnalyzer,
        record: &CandidateRecord,
        text: &str,
        query: &SearchQuery,
    ) -> Option<SearchHit> {
        let text_lower = text.to_lowercase();
        let mut score = 0u32;
        let mut reasons = Vec::new();
        let mut matched_skills = Vec::new();

        let query_matched = if query.query.trim().is_empty() {
            true
        } else {
            let words: Vec<String> = query.query.to_lowercase().split_whitespace().map(String::from).collect();
            let matched = words
                .iter()
                .filter(|word| word.len() > MAX_IGNORED_QUERY_WORD_BYTES && text_lower.contains(word.as_str()))
                .count();
            let query_score = ratio_score(matched, words.len());

            if matched > 0 && query_score > self.settings.query_score_threshold {
                score += query_score;
                reasons.push(format!("Matched {}/{} search terms", matched, words.len()));
                true
            } else {
                false
            }
        };

        if !query.skills.is_empty() {
            let found = skills.extract_skills(text, &query.skills).required;
            if !found.is_empty() {
                score += ratio_score(found.len(), query.skills.len());
                reasons.push(format!(
                    "Found {}/{} required skills: {}",
                    found.len(),
                    query.skills.len(),
                    found.join(", ")
                ));
            }
            matched_skills = found;
        }

        if let Some(min) = query.min_experience {
            if record.years_of_experience >= min {
                score += EXPERIENCE_BONUS;
                reasons.push(format!(
                    "Has {} years of experience (required: {}+)",
                    record.years_of_experience, min
                ));
            }
        }

        if !query.languages.is_empty() {
            let found = extract_languages(text, &query.languages);
            if !found.is_empty() {
                score += ratio_score(found.len(), query.languages.len()) / LANGUAGE_DIVISOR;
                reasons.push(format!("Found languages: {}", found.join(", ")));
            }
        }

        if !query.current_position.is_empty()
            && record
                .current_position
                .to_lowercase()
                .contains(&query.current_position.to_lowercase())
        {
            score += POSITION_BONUS;
            reasons.push(format!("Current position matches: {}", record.current_position));
        }

        if !query_matched {
            return None;
        }

        if query.has_scoring_criteria() {
            if score == 0 {
                return None;
            }
        } else if score == 0 && query.query.trim().is_empty() {
            score = self.settings.default_score;
        }

        Some(SearchHit {
            candidate_id: record.id.clone(),
            full_name: record.full_name.clone(),
            match_score: score.min(100),
            matched_skills,
            matched_reasons: reasons,
        })
    }

    /// Sort best first, keeping pool order among equal scores, and truncate.
    pub fn finish(&self, mut hits: Vec<SearchHit>, limit: usize, total: usize) -> SearchResponse {
        hits.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        hits.truncate(self.effective_limit(limit));

        SearchResponse {
            count: hits.len(),
            candidates: hits,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> SkillAnalyzer {
        SkillAnalyzer::with_builtin_tables().unwrap()
    }

    fn record(id: &str) -> CandidateRecord {
        CandidateRecord {
            id: id.into(),
            full_name: format!("Candidate {}", id),
            years_of_experience: 4,
            current_position: "Backend Engineer".into(),
            status: "pending".into(),
            ..CandidateRecord::default()
        }
    }

    const TEXT: &str = "Backend engineer. Python, PostgreSQL and Docker. Fluent English and Spanish.";

    #[test]
    fn test_no_criteria_defaults_to_fifty() {
        let hit = CandidateRanker::default()
            .score(&analyzer(), &record("a"), TEXT, &SearchQuery::default())
            .unwrap();
        assert_eq!(hit.match_score, 50);
    }

    #[test]
    fn test_query_must_clear_threshold() {
        let ranker = CandidateRanker::default();
        let query = SearchQuery {
            query: "python docker kotlin".into(),
            ..SearchQuery::default()
        };
        // 2 of 3 words: 66 > 50
        let hit = ranker.score(&analyzer(), &record("a"), TEXT, &query).unwrap();
        assert_eq!(hit.match_score, 66);

        let query = SearchQuery {
            query: "python kotlin scala".into(),
            ..SearchQuery::default()
        };
        assert!(ranker.score(&analyzer(), &record("a"), TEXT, &query).is_none());
    }

    #[test]
    fn test_short_query_words_count_against_score() {
        let query = SearchQuery {
            query: "go python".into(),
            ..SearchQuery::default()
        };
        // "go" can never match, so the best possible score is 50.
        assert!(CandidateRanker::default()
            .score(&analyzer(), &record("a"), TEXT, &query)
            .is_none());
    }

    #[test]
    fn test_components_add_up() {
        let query = SearchQuery {
            skills: vec!["Python".into(), "Rust".into()],
            min_experience: Some(3),
            languages: vec!["Spanish".into()],
            current_position: "backend".into(),
            ..SearchQuery::default()
        };
        let hit = CandidateRanker::default()
            .score(&analyzer(), &record("a"), TEXT, &query)
            .unwrap();
        // 50 + 20 + 100/5 + 15, capped
        assert_eq!(hit.match_score, 100);
        assert_eq!(hit.matched_skills, vec!["Python".to_string()]);
        assert_eq!(hit.matched_reasons.len(), 4);
    }

    #[test]
    fn test_score_is_clamped() {
        let query = SearchQuery {
            query: "python docker".into(),
            skills: vec!["Python".into()],
            min_experience: Some(1),
            ..SearchQuery::default()
        };
        let hit = CandidateRanker::default()
            .score(&analyzer(), &record("a"), TEXT, &query)
            .unwrap();
        assert_eq!(hit.match_score, 100);
    }

    #[test]
    fn test_scoring_criteria_without_any_match_excludes() {
        let query = SearchQuery {
            skills: vec!["Kotlin".into()],
            ..SearchQuery::default()
        };
        assert!(CandidateRanker::default()
            .score(&analyzer(), &record("a"), TEXT, &query)
            .is_none());
    }

    #[test]
    fn test_filters() {
        let ranker = CandidateRanker::default();
        let mut candidate = record("a");

        let query = SearchQuery {
            status: "shortlisted".into(),
            ..SearchQuery::default()
        };
        assert!(!ranker.passes_filters(&candidate, &query));

        let query = SearchQuery {
            has_portfolio: Some(true),
            ..SearchQuery::default()
        };
        assert!(!ranker.passes_filters(&candidate, &query));
        candidate.portfolio_url = Some("https://jane.dev".into());
        assert!(ranker.passes_filters(&candidate, &query));

        let query = SearchQuery {
            min_experience: Some(2),
            max_experience: Some(3),
            ..SearchQuery::default()
        };
        assert!(!ranker.passes_filters(&candidate, &query));

        let query = SearchQuery {
            current_position: "ENGINEER".into(),
            ..SearchQuery::default()
        };
        assert!(ranker.passes_filters(&candidate, &query));
    }

    #[test]
    fn test_finish_is_stable_and_truncates() {
        let hit = |id: &str, score| SearchHit {
            candidate_id: id.into(),
            full_name: String::new(),
            match_score: score,
            matched_skills: vec![],
            matched_reasons: vec![],
        };
        let hits = vec![hit("a", 50), hit("b", 80), hit("c", 50), hit("d", 90)];

        let response = CandidateRanker::default().finish(hits.clone(), 0, 4);
        let order: Vec<_> = response.candidates.iter().map(|h| h.candidate_id.as_str()).collect();
        assert_eq!(order, vec!["d", "b", "a", "c"]);
        assert_eq!(response.count, 4);

        let response = CandidateRanker::default().finish(hits, 2, 4);
        assert_eq!(response.count, 2);
        assert_eq!(response.total, 4);
    }

    #[test]
    fn test_effective_limit() {
        let ranker = CandidateRanker::default();
        assert_eq!(ranker.effective_limit(0), 50);
        assert_eq!(ranker.effective_limit(101), 50);
        assert_eq!(ranker.effective_limit(100), 100);
        assert_eq!(ranker.effective_limit(7), 7);
    }
}
