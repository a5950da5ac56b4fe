//! Shortlist criteria and how they are resolved for a job

use crate::error::{CvMatcherError, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// What a recruiter asks of a CV. Every field is optional in JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Criteria {
    pub required_skills: Vec<String>,
    pub min_experience: u32,
    pub required_languages: Vec<String>,
    pub match_job_description: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub job_description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub job_requirements: String,
}

impl Criteria {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CvMatcherError::CriteriaParse(e.to_string()))
    }

    /// Criteria used when a job has none of its own: compare against the
    /// posting text and nothing else.
    pub fn default_for_job(description: &str, requirements: &str) -> Self {
        Self {
            match_job_description: true,
            job_description: description.to_string(),
            job_requirements: requirements.to_string(),
            ..Self::default()
        }
    }

    /// Criteria stored on a job record. Missing, blank or unparseable JSON
    /// falls back to [`Criteria::default_for_job`]; this never fails.
    pub fn resolve_stored(stored: Option<&str>, description: &str, requirements: &str) -> Self {
        let Some(json) = stored.filter(|json| !json.trim().is_empty()) else {
            info!("No stored criteria; analyzing against the job description");
            return Self::default_for_job(description, requirements);
        };

        match Self::from_json(json) {
            Ok(criteria) => criteria.with_job_text(description, requirements),
            Err(e) => {
                warn!("{}; using default criteria", e);
                Self::default_for_job(description, requirements)
            }
        }
    }

    /// No skills, experience or languages were asked for.
    pub fn is_unspecified(&self) -> bool {
        self.required_skills.is_empty() && self.min_experience == 0 && self.required_languages.is_empty()
    }

    /// Request criteria that ask for nothing give way to the job's stored
    /// criteria when those parse. Otherwise the request stands.
    pub fn or_stored(self, stored: Option<&str>, description: &str, requirements: &str) -> Self {
        if !self.is_unspecified() {
            return self;
        }

        match stored.map(Self::from_json) {
            Some(Ok(criteria)) => criteria.with_job_text(description, requirements),
            Some(Err(e)) => {
                warn!("{}; keeping request criteria", e);
                self
            }
            None => self,
        }
    }

    pub fn with_job_text(mut self, description: &str, requirements: &str) -> Self {
        self.job_description = description.to_string();
        self.job_requirements = requirements.to_string();
        self
    }
}
