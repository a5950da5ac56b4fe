//! Skill detection with synonym matching and job-title inference

use crate::error::{CvMatcherError, Result};
use crate::processing::synonyms::{normalize_skill, SkillTables};
use aho_corasick::AhoCorasick;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

/// Well-known technologies reported even when nobody asked for them.
pub const COMMON_SKILLS: &[&str] = &[
    "javascript", "python", "java", "react", "node.js", "sql", "html", "css",
    "typescript", "angular", "vue", "php", "ruby", "go", "rust", "c++", "c#",
    "aws", "docker", "kubernetes", "git", "mongodb", "postgresql", "mysql",
    "agile", "scrum", "api", "rest", "graphql", "microservices",
];

const TITLE_ENDINGS: &str = "developer|engineer|manager|analyst|designer|lead|architect";

static TITLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(r"(?:position|role|title|job)[:\s]+([a-z\s]+(?:{}))", TITLE_ENDINGS),
        format!(r"((?:senior|junior|mid-level)\s*[a-z\s]+(?:{}))", TITLE_ENDINGS),
        format!(r"([a-z\s]+(?:{}))", TITLE_ENDINGS),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("invalid job title pattern"))
    .collect()
});

/// Skills found in one CV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    /// Required skills that were found, in the order they were asked for.
    pub required: Vec<String>,
    /// Well-known and title-inferred skills present in the text but not required.
    pub discovered: Vec<String>,
    /// Job title read from the CV, if any.
    pub job_title: Option<String>,
}

impl SkillMatch {
    /// Required matches followed by discovered ones.
    pub fn all(&self) -> Vec<String> {
        self.required.iter().chain(self.discovered.iter()).cloned().collect()
    }
}

pub struct SkillAnalyzer {
    tables: Arc<SkillTables>,
    common_matcher: AhoCorasick,
}

impl SkillAnalyzer {
    pub fn new(tables: Arc<SkillTables>) -> Result<Self> {
        let common_matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(COMMON_SKILLS)
            .map_err(|e| CvMatcherError::Processing(format!("Failed to build skill matcher: {}", e)))?;

        Ok(Self { tables, common_matcher })
    }

    pub fn with_builtin_tables() -> Result<Self> {
        Self::new(SkillTables::builtin())
    }

    pub fn tables(&self) -> &SkillTables {
        &self.tables
    }

    /// Match `required` skills against `text`, then append discovered skills.
    pub fn extract_skills(&self, text: &str, required: &[String]) -> SkillMatch {
        let text_lower = text.to_lowercase();
        let job_title = extract_job_title(text);
        let inferred = job_title
            .as_deref()
            .map(|title| self.tables.infer_from_title(title))
            .unwrap_or_default();

        if let Some(title) = &job_title {
            debug!("Job title '{}' implies {} skills", title, inferred.len());
        }

        let matched: Vec<String> = required
            .iter()
            .filter(|skill| self.matches_required(&text_lower, skill, &inferred))
            .cloned()
            .collect();

        let mut seen: HashSet<String> = matched.iter().map(|s| s.to_lowercase()).collect();
        let mut discovered = Vec::new();

        for skill in self.common_skills_in(&text_lower) {
            if seen.insert(skill.to_lowercase()) {
                discovered.push(skill.to_string());
            }
        }

        for skill in &inferred {
            if text_lower.contains(skill.as_str()) && seen.insert(skill.to_lowercase()) {
                discovered.push(skill.clone());
            }
        }

        SkillMatch {
            required: matched,
            discovered,
            job_title,
        }
    }

    fn matches_required(&self, text_lower: &str, skill: &str, inferred: &[String]) -> bool {
        let normalized = normalize_skill(skill);
        if normalized.is_empty() {
            return false;
        }

        if mentions(text_lower, &normalized) {
            return true;
        }

        if self
            .tables
            .synonyms_for(skill)
            .iter()
            .map(|synonym| normalize_skill(synonym))
            .any(|synonym| !synonym.is_empty() && mentions(text_lower, &synonym))
        {
            return true;
        }

        // "react native" still counts when only "react" is written.
        if let Some(first) = normalized.split_whitespace().next() {
            if first.len() > 3 && text_lower.contains(first) {
                return true;
            }
        }

        inferred.iter().any(|skill| {
            let skill = skill.to_lowercase();
            skill.contains(normalized.as_str()) || normalized.contains(skill.as_str())
        })
    }

    /// Entries of [`COMMON_SKILLS`] occurring anywhere in the text, in list order.
    fn common_skills_in(&self, text_lower: &str) -> Vec<&'static str> {
        let present: HashSet<usize> = self
            .common_matcher
            .find_overlapping_iter(text_lower)
            .map(|m| m.pattern().as_usize())
            .collect();

        COMMON_SKILLS
            .iter()
            .enumerate()
            .filter(|(index, _)| present.contains(index))
            .map(|(_, skill)| *skill)
            .collect()
    }
}

/// Occurrence of an already lower-cased term. A plain substring test also
/// covers every whole-word hit.
pub(crate) fn mentions(text_lower: &str, term: &str) -> bool {
    !term.is_empty() && text_lower.contains(term)
}

/// Best guess at the candidate's job title.
///
/// Tries a labelled title ("Position: ..."), then a seniority-prefixed one,
/// then any run of words ending in a role noun. Titles of 3 bytes or fewer,
/// or 50 or more, are ignored.
pub fn extract_job_title(text: &str) -> Option<String> {
    let text_lower = text.to_lowercase();

    TITLE_PATTERNS.iter().find_map(|pattern| {
        let title = pattern.captures(&text_lower)?.get(1)?.as_str().trim();
        (title.len() > 3 && title.len() < 50).then(|| title.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> SkillAnalyzer {
        SkillAnalyzer::with_builtin_tables().unwrap()
    }

    fn skills(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_direct_match_keeps_input_order_and_spelling() {
        let result = analyzer().extract_skills("Worked with SQL and Python daily.", &skills(&["Python", "SQL"]));
        assert_eq!(result.required, skills(&["Python", "SQL"]));
    }

    #[test]
    fn test_normalized_match() {
        let result = analyzer().extract_skills("Built SPAs in ReactJS.", &skills(&["React.js"]));
        assert_eq!(result.required, skills(&["React.js"]));
    }

    #[test]
    fn test_synonym_match() {
        let result = analyzer().extract_skills("Deployed services on k8s clusters.", &skills(&["Kubernetes"]));
        assert_eq!(result.required, skills(&["Kubernetes"]));
    }

    #[test]
    fn test_first_word_partial_match() {
        let result = analyzer().extract_skills("Shipped three apps with react.", &skills(&["React Native"]));
        assert_eq!(result.required, skills(&["React Native"]));
    }

    #[test]
    fn test_inferred_from_job_title() {
        // Nothing mentions mentoring, but a senior developer is assumed to do it.
        let text = "Senior developer at Acme, shipping payment services.";
        let result = analyzer().extract_skills(text, &skills(&["Mentoring"]));
        assert_eq!(result.required, skills(&["Mentoring"]));
    }

    #[test]
    fn test_missing_skill() {
        let result = analyzer().extract_skills("Accountant with audit background.", &skills(&["Kotlin"]));
        assert!(result.required.is_empty());
    }

    #[test]
    fn test_bonus_skills_appended_once() {
        let result = analyzer().extract_skills("Python and Docker. Also docker compose.", &skills(&["python"]));
        assert_eq!(result.required, skills(&["python"]));
        assert!(result.discovered.contains(&"docker".to_string()));
        assert!(!result.discovered.iter().any(|s| s.eq_ignore_ascii_case("python")));
    }

    #[test]
    fn test_inferred_skills_present_in_text_are_discovered() {
        let text = "Backend developer. Designs REST endpoints and tunes the database.";
        let result = analyzer().extract_skills(text, &[]);
        assert!(result.discovered.contains(&"database".to_string()));
        assert_eq!(result.job_title.as_deref(), Some("backend developer"));
    }

    #[test]
    fn test_all_orders_required_first() {
        let result = analyzer().extract_skills("Python with docker", &skills(&["Python"]));
        assert_eq!(result.all()[0], "Python");
    }

    #[test]
    fn test_job_title_patterns() {
        assert_eq!(
            extract_job_title("Position: Data Analyst\nLondon").as_deref(),
            Some("data analyst")
        );
        assert_eq!(
            extract_job_title("I am a Senior Software Engineer").as_deref(),
            Some("senior software engineer")
        );
        assert_eq!(extract_job_title("Gardener and beekeeper"), None);
    }

    #[test]
    fn test_job_title_length_window() {
        let long = format!("{} developer", "x".repeat(60));
        assert_eq!(extract_job_title(&long), None);
    }

    #[test]
    fn test_mentions() {
        assert!(mentions("expert in go and sql", "sql"));
        assert!(!mentions("expert in go", "rust"));
        assert!(mentions("c# and .net", "c#"));
        assert!(mentions("modern c++ (17)", "c++"));
        assert!(mentions("node.js backends", "node.js"));
        assert!(!mentions("anything at all", ""));
    }
}
