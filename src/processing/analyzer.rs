//! Main analysis engine: ties fetching, extraction, scoring and search together

use crate::config::Config;
use crate::error::Result;
use crate::input::fetcher::DocumentFetcher;
use crate::input::manager::InputManager;
use crate::input::text_extractor::char_len;
use crate::processing::criteria::Criteria;
use crate::processing::experience::{estimate_experience, ExperienceEstimate};
use crate::processing::matcher::{CvMatcher, MatchResult};
use crate::processing::search::{CandidateRanker, CandidateRecord, CandidateStore, NullStore, SearchQuery, SearchResponse};
use crate::processing::synonyms::SkillTables;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// One candidate's entry in a batch run. Exactly one of `analysis` and
/// `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub candidate_id: String,
    pub candidate_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<MatchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total_analyzed: usize,
    pub failed: usize,
    pub results: Vec<BatchOutcome>,
    pub processing_time_ms: u64,
}

/// Everything that can be read off a CV without criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub candidate_id: String,
    pub full_name: String,
    pub cv_text: Option<String>,
    pub skills: Vec<String>,
    pub job_title: Option<String>,
    pub experience: ExperienceEstimate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReparseSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
}

pub struct AnalysisEngine<F, S = NullStore> {
    input: InputManager<F>,
    matcher: CvMatcher,
    ranker: CandidateRanker,
    store: S,
}

impl<F: DocumentFetcher> AnalysisEngine<F, NullStore> {
    pub fn new(fetcher: F, config: &Config) -> Result<Self> {
        Self::with_store(fetcher, NullStore, config)
    }
}

impl<F: DocumentFetcher, S: CandidateStore> AnalysisEngine<F, S> {
    pub fn with_store(fetcher: F, store: S, config: &Config) -> Result<Self> {
        Self::with_tables(fetcher, store, config, SkillTables::builtin())
    }

    pub fn with_tables(fetcher: F, store: S, config: &Config, tables: Arc<SkillTables>) -> Result<Self> {
        Ok(Self {
            input: InputManager::from_config(fetcher, config),
            matcher: CvMatcher::new(tables)?,
            ranker: CandidateRanker::new(config.search.clone()),
            store,
        })
    }

    pub fn input(&self) -> &InputManager<F> {
        &self.input
    }

    pub fn matcher(&self) -> &CvMatcher {
        &self.matcher
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Download, extract and length-check a CV.
    pub async fn extract_cv_text(&self, location: &str) -> Result<String> {
        self.input.load_cv_text(location).await
    }

    /// Fetch, extract and score one CV. No retries.
    pub async fn match_from_url(&self, location: &str, criteria: &Criteria) -> Result<MatchResult> {
        let text = self.extract_cv_text(location).await?;
        info!("Extracted {} characters from CV", char_len(&text));

        let result = self.matcher.score(&text, criteria);
        info!(
            "CV match for {}: score={}%, skills={:?}, experience={} years",
            location, result.match_score, result.skills, result.experience
        );
        Ok(result)
    }

    /// Score a candidate, preferring its cached text over a fresh download.
    pub async fn match_candidate(&self, record: &CandidateRecord, criteria: &Criteria) -> Result<MatchResult> {
        match record.cached_text() {
            Some(text) => {
                let text = self.input.ensure_usable(text.to_string())?;
                Ok(self.matcher.score(&text, criteria))
            }
            None => self.match_from_url(&record.resume_url, criteria).await,
        }
    }

    /// Analyze every candidate against one set of criteria. A failure is
    /// recorded against its candidate and the run carries on.
    pub async fn analyze_batch(&self, candidates: &[CandidateRecord], criteria: &Criteria) -> BatchReport {
        let start = Instant::now();
        let mut report = BatchReport::default();

        for candidate in candidates {
            info!("Matching CV for {} ({})", candidate.full_name, candidate.id);

            let outcome = match self.match_candidate(candidate, criteria).await {
                Ok(analysis) => BatchOutcome {
                    candidate_id: candidate.id.clone(),
                    candidate_name: candidate.full_name.clone(),
                    match_score: Some(analysis.match_score),
                    analysis: Some(analysis),
                    error: None,
                },
                Err(e) => {
                    error!("Failed to match CV for {}: {}", candidate.full_name, e);
                    report.failed += 1;
                    BatchOutcome {
                        candidate_id: candidate.id.clone(),
                        candidate_name: candidate.full_name.clone(),
                        match_score: None,
                        analysis: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            report.results.push(outcome);
        }

        report.total_analyzed = candidates.len();
        report.processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Analyzed {} candidates ({} failed) in {}ms",
            report.total_analyzed, report.failed, report.processing_time_ms
        );
        report
    }

    /// Skills and experience read off a candidate's CV. Text is taken from
    /// the record when cached, otherwise extracted and written back. An
    /// unreadable CV gives an empty profile rather than an error.
    pub async fn candidate_profile(&self, record: &mut CandidateRecord) -> CandidateProfile {
        let text = match record.cached_text() {
            Some(text) => Some(text.to_string()),
            None if !record.resume_url.is_empty() => match self.input.extract_text(&record.resume_url).await {
                Ok(extracted) => {
                    self.write_back(record, &extracted.text).await;
                    Some(extracted.text)
                }
                Err(e) => {
                    warn!("Could not extract CV for {}: {}", record.id, e);
                    None
                }
            },
            None => None,
        };

        let (skills, job_title, experience) = match text.as_deref().filter(|text| !text.is_empty()) {
            Some(text) => {
                let found = self.matcher.skill_analyzer().extract_skills(text, &[]);
                (found.all(), found.job_title, estimate_experience(text))
            }
            None => (Vec::new(), None, estimate_experience("")),
        };

        CandidateProfile {
            candidate_id: record.id.clone(),
            full_name: record.full_name.clone(),
            cv_text: text,
            skills,
            job_title,
            experience,
        }
    }

    /// Re-extract one candidate's CV and write the text back. Returns the
    /// number of characters stored.
    pub async fn reparse_one(&self, record: &mut CandidateRecord) -> Result<usize> {
        let text = self.extract_cv_text(&record.resume_url).await?;
        self.store.save_extracted_text(&record.id, &text).await?;

        let chars = char_len(&text);
        record.parsed_cv_text = Some(text);
        info!("CV parsed for {} ({} characters)", record.id, chars);
        Ok(chars)
    }

    /// Fill in text for every candidate that has a CV but no cached text.
    pub async fn reparse(&self, records: &mut [CandidateRecord]) -> ReparseSummary {
        let mut summary = ReparseSummary::default();

        for record in records.iter_mut().filter(|r| r.needs_reparse()) {
            summary.total += 1;
            match self.reparse_one(record).await {
                Ok(_) => summary.succeeded += 1,
                Err(e) => {
                    error!("Failed to parse CV for {}: {}", record.id, e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "CV reparsing complete: {} succeeded, {} failed out of {} total",
            summary.succeeded, summary.failed, summary.total
        );
        summary
    }

    /// Rank a pool of candidates. Text extracted along the way is written
    /// back to the records and the store.
    pub async fn search(&self, pool: &mut [CandidateRecord], query: &SearchQuery) -> SearchResponse {
        let mut hits = Vec::new();
        let mut total = 0;

        for record in pool.iter_mut() {
            if !self.ranker.passes_filters(record, query) {
                continue;
            }
            total += 1;

            let Some(text) = self.search_text(record).await else {
                debug!("Skipping {}: no CV text available", record.id);
                continue;
            };

            if let Some(hit) = self.ranker.score(self.matcher.skill_analyzer(), record, &text, query) {
                hits.push(hit);
            }
        }

        let response = self.ranker.finish(hits, query.limit, total);
        info!("Search returned {} of {} candidates", response.count, response.total);
        response
    }

    /// Cached text, or freshly extracted text long enough to be worth
    /// keeping. Extraction failures just leave the candidate out.
    async fn search_text(&self, record: &mut CandidateRecord) -> Option<String> {
        if let Some(text) = record.cached_text() {
            return Some(text.to_string());
        }
        if record.resume_url.is_empty() {
            return None;
        }

        match self.input.extract_text(&record.resume_url).await {
            Ok(extracted) if char_len(&extracted.text) > self.min_cv_chars() => {
                self.write_back(record, &extracted.text).await;
                Some(extracted.text)
            }
            Ok(extracted) => {
                debug!("Ignoring {} characters extracted for {}", char_len(&extracted.text), record.id);
                None
            }
            Err(e) => {
                debug!("Extraction failed for {}: {}", record.id, e);
                None
            }
        }
    }

    async fn write_back(&self, record: &mut CandidateRecord, text: &str) {
        record.parsed_cv_text = Some(text.to_string());
        match self.store.save_extracted_text(&record.id, text).await {
            Ok(()) => debug!("Stored extracted text for {}", record.id),
            Err(e) => warn!("Failed to store extracted text for {}: {}", record.id, e),
        }
    }

    fn min_cv_chars(&self) -> usize {
        self.input.min_cv_chars()
    }
}
