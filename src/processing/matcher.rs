//! Weighted CV scoring against shortlist criteria

use crate::error::Result;
use crate::processing::criteria::Criteria;
use crate::processing::experience::extract_experience;
use crate::processing::languages::extract_languages;
use crate::processing::skills::SkillAnalyzer;
use crate::processing::synonyms::SkillTables;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const SKILLS_WEIGHT: u32 = 40;
pub const EXPERIENCE_WEIGHT: u32 = 30;
pub const LANGUAGE_WEIGHT: u32 = 20;
pub const JOB_DESCRIPTION_WEIGHT: u32 = 10;

/// Description words this short or shorter are ignored.
const MAX_IGNORED_WORD_CHARS: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_score: u32,
    /// Required skills found, in the order they were asked for.
    pub skills: Vec<String>,
    /// Skills found in the CV that nobody asked for.
    pub discovered_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    /// Estimated years; 0 also means "not detected".
    pub experience: u32,
    pub education: String,
    pub languages: Vec<String>,
    pub summary: String,
    pub match_reason: String,
    pub strengths: Vec<String>,
    pub skills_match: u32,
    pub experience_match: u32,
    pub language_match: u32,
    pub job_description_match: u32,
}

/// Scores extracted CV text. Pure: same text and criteria, same result.
pub struct CvMatcher {
    skills: SkillAnalyzer,
}

impl CvMatcher {
    pub fn new(tables: Arc<SkillTables>) -> Result<Self> {
        Ok(Self {
            skills: SkillAnalyzer::new(tables)?,
        })
    }

    pub fn with_builtin_tables() -> Result<Self> {
        Self::new(SkillTables::builtin())
    }

    pub fn skill_analyzer(&self) -> &SkillAnalyzer {
        &self.skills
    }

    pub fn score(&self, text: &str, criteria: &Criteria) -> MatchResult {
        let text_lower = text.to_lowercase();
        let mut result = MatchResult::default();

        let skill_match = self.skills.extract_skills(text, &criteria.required_skills);
        result.missing_skills = criteria
            .required_skills
            .iter()
            .filter(|skill| !skill_match.required.iter().any(|found| found.eq_ignore_ascii_case(skill)))
            .cloned()
            .collect();
        result.skills_match = ratio_score(skill_match.required.len(), criteria.required_skills.len());
        result.skills = skill_match.required;
        result.discovered_skills = skill_match.discovered;

        result.experience = extract_experience(text);
        result.experience_match = experience_score(result.experience, criteria.min_experience);

        if !criteria.required_languages.is_empty() {
            result.languages = extract_languages(text, &criteria.required_languages);
        }
        result.language_match = ratio_score(result.languages.len(), criteria.required_languages.len());

        result.job_description_match = job_description_score(&text_lower, criteria);

        result.match_score = weighted_score(
            result.skills_match,
            result.experience_match,
            result.language_match,
            result.job_description_match,
        );

        result.summary = summary(&result, criteria);
        result.match_reason = match_reason(&result, criteria);
        result.strengths = strengths(&result, &text_lower);
        result
    }
}

/// `matched * 100 / required`, truncated and capped at 100. Nothing required
/// is full marks.
pub fn ratio_score(matched: usize, required: usize) -> u32 {
    if required == 0 {
        return 100;
    }
    ((matched * 100) / required).min(100) as u32
}

pub fn experience_score(years: u32, min_years: u32) -> u32 {
    if min_years == 0 || years >= min_years {
        100
    } else if years > 0 {
        (u64::from(years) * 100 / u64::from(min_years)) as u32
    } else {
        0
    }
}

/// Share of the longer description and requirement words that occur in the
/// CV. Full marks when the comparison is off or there is nothing to compare.
pub fn job_description_score(text_lower: &str, criteria: &Criteria) -> u32 {
    if !criteria.match_job_description || criteria.job_description.trim().is_empty() {
        return 100;
    }

    let posting = format!("{} {}", criteria.job_description, criteria.job_requirements).to_lowercase();
    let words: Vec<&str> = posting
        .split_whitespace()
        .filter(|word| word.chars().count() > MAX_IGNORED_WORD_CHARS)
        .collect();

    if words.is_empty() {
        return 100;
    }

    let matched = words.iter().filter(|word| text_lower.contains(*word)).count();
    ratio_score(matched, words.len())
}

/// Integer weighted average; the division truncates.
pub fn weighted_score(skills: u32, experience: u32, languages: u32, job_description: u32) -> u32 {
    let total = skills * SKILLS_WEIGHT
        + experience * EXPERIENCE_WEIGHT
        + languages * LANGUAGE_WEIGHT
        + job_description * JOB_DESCRIPTION_WEIGHT;
    (total / 100).min(100)
}

fn summary(result: &MatchResult, criteria: &Criteria) -> String {
    let mut parts = Vec::new();

    if result.experience > 0 {
        parts.push(format!("{} years experience", result.experience));
    }
    if !result.skills.is_empty() {
        parts.push(format!(
            "{}/{} required skills",
            result.skills.len(),
            criteria.required_skills.len()
        ));
    }
    if !result.languages.is_empty() {
        parts.push(format!("{} languages", result.languages.len()));
    }

    if parts.is_empty() {
        "Candidate profile analyzed".to_string()
    } else {
        parts.join(", ")
    }
}

fn match_reason(result: &MatchResult, criteria: &Criteria) -> String {
    let mut reasons = Vec::new();

    if result.skills_match >= 80 {
        reasons.push("Strong skills match");
    } else if result.skills_match >= 50 {
        reasons.push("Partial skills match");
    } else if !criteria.required_skills.is_empty() {
        reasons.push("Missing key skills");
    }

    if result.experience_match >= 100 {
        reasons.push("Meets experience requirement");
    } else if result.experience_match > 0 {
        reasons.push("Below experience requirement");
    }

    if result.language_match >= 100 {
        reasons.push("Meets language requirements");
    } else if !criteria.required_languages.is_empty() {
        reasons.push("Missing language requirements");
    }

    if reasons.is_empty() {
        "Basic profile match".to_string()
    } else {
        reasons.join(". ")
    }
}

fn strengths(result: &MatchResult, text_lower: &str) -> Vec<String> {
    let mut strengths = Vec::new();

    if result.experience >= 5 {
        strengths.push("Extensive experience");
    }
    if result.skills.len() + result.discovered_skills.len() >= 5 {
        strengths.push("Diverse skill set");
    }
    if result.skills_match >= 80 {
        strengths.push("Strong technical match");
    }
    if ["degree", "bachelor", "master"].iter().any(|word| text_lower.contains(word)) {
        strengths.push("Educational background");
    }
    if ["certification", "certified"].iter().any(|word| text_lower.contains(word)) {
        strengths.push("Professional certifications");
    }

    strengths.into_iter().map(String::from).collect()
}
