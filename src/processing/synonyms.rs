//! Skill synonym and job-title inference tables

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

type Table = &'static [(&'static str, &'static [&'static str])];

const SKILL_SYNONYMS: Table = &[
    // Office suite
    ("excel", &["microsoft office", "ms office", "office suite", "spreadsheet", "microsoft excel", "excel spreadsheet", "ms excel", "office excel", "excel 365", "excel 2019", "excel 2016"]),
    ("word", &["microsoft office", "ms office", "office suite", "microsoft word", "ms word", "office word", "word 365", "word 2019"]),
    ("powerpoint", &["microsoft office", "ms office", "office suite", "presentation", "microsoft powerpoint", "ms powerpoint", "ppt", "powerpoint 365"]),
    ("microsoft office", &["excel", "word", "powerpoint", "ms office", "office suite", "outlook", "access", "office 365", "office 2019", "office 2016", "msoffice"]),
    ("ms office", &["excel", "word", "powerpoint", "microsoft office", "office suite", "office 365", "msoffice"]),
    ("office suite", &["microsoft office", "ms office", "excel", "word", "powerpoint", "office 365"]),
    // Languages
    ("react", &["react.js", "reactjs", "react js", "react native"]),
    ("react.js", &["react", "reactjs", "react js"]),
    ("reactjs", &["react", "react.js", "react js"]),
    ("node.js", &["nodejs", "node", "node js"]),
    ("nodejs", &["node.js", "node", "node js"]),
    ("node", &["node.js", "nodejs", "node js"]),
    ("javascript", &["js", "ecmascript", "es6", "es7", "es8", "typescript"]),
    ("js", &["javascript", "ecmascript", "es6", "es7", "es8"]),
    ("typescript", &["ts", "javascript", "js"]),
    ("ts", &["typescript"]),
    ("c++", &["cpp", "c plus plus", "cplusplus"]),
    ("c#", &["csharp", "c sharp", "dotnet", ".net"]),
    (".net", &["dotnet", "c#", "csharp", "asp.net"]),
    ("python", &["py", "python3", "python 3"]),
    // Frameworks
    ("angular", &["angularjs", "angular.js", "angular 2", "angular 2+"]),
    ("angular.js", &["angular", "angularjs", "angular 2", "angular 2+"]),
    ("vue", &["vue.js", "vuejs", "vue js", "vue 3"]),
    ("vue.js", &["vue", "vuejs", "vue js", "vue 3"]),
    ("express", &["express.js", "expressjs", "express js"]),
    // Databases
    ("postgresql", &["postgres", "pg"]),
    ("postgres", &["postgresql", "pg"]),
    ("mongodb", &["mongo", "mongo db", "nosql"]),
    ("mongo", &["mongodb", "mongo db", "nosql"]),
    ("nosql", &["mongodb", "mongo", "mongo db"]),
    ("mysql", &["mariadb", "sql"]),
    ("sql", &["sql server", "mysql", "postgresql", "postgres", "database"]),
    // Cloud and tooling
    ("aws", &["amazon web services", "amazon aws", "ec2", "s3", "lambda", "amazon cloud"]),
    ("docker", &["containerization", "containers", "dockerfile", "docker containers"]),
    ("kubernetes", &["k8s", "kube", "container orchestration"]),
    ("k8s", &["kubernetes", "kube", "container orchestration"]),
    ("git", &["github", "gitlab", "version control", "scm", "source control", "git version control"]),
    // Methodologies
    ("agile", &["scrum", "kanban", "sprint", "agile methodology", "agile development"]),
    ("scrum", &["agile", "sprint", "scrum master", "scrum methodology"]),
    // Web
    ("html", &["html5", "hypertext markup language"]),
    ("html5", &["html", "hypertext markup language"]),
    ("css", &["css3", "stylesheet", "styling"]),
    ("css3", &["css", "stylesheet", "styling"]),
    ("rest", &["rest api", "restful", "restful api"]),
    ("rest api", &["rest", "restful", "restful api"]),
    ("api", &["rest", "rest api", "graphql", "web api", "apis"]),
    // Design tools
    ("photoshop", &["adobe photoshop", "ps", "adobe creative suite"]),
    ("illustrator", &["adobe illustrator", "ai", "adobe creative suite"]),
    ("figma", &["ui design", "ux design", "design tool"]),
];

const DEV_BASE: &[&str] = &[
    "programming", "coding", "software development", "problem solving", "git", "debugging", "algorithms", "data structures",
];

const TITLE_INFERENCE: Table = &[
    ("developer", DEV_BASE),
    ("senior developer", &["programming", "coding", "software development", "problem solving", "git", "debugging", "architecture", "mentoring", "code review", "algorithms", "data structures", "system design", "best practices"]),
    ("software developer", DEV_BASE),
    ("full stack developer", &["javascript", "html", "css", "database", "api", "frontend", "backend", "full stack", "programming", "coding", "git"]),
    ("frontend developer", &["html", "css", "javascript", "ui", "ux", "responsive design", "frontend", "programming", "coding", "git"]),
    ("backend developer", &["api", "database", "server", "backend", "rest", "sql", "programming", "coding", "git"]),
    ("web developer", &["html", "css", "javascript", "web development", "responsive design", "programming", "coding", "git"]),
    ("junior developer", &["programming", "coding", "software development", "problem solving", "git", "debugging", "learning"]),
    ("mid-level developer", DEV_BASE),
    ("lead developer", &["programming", "coding", "software development", "problem solving", "git", "debugging", "architecture", "mentoring", "code review", "leadership", "system design"]),
    ("software engineer", &["programming", "coding", "software development", "problem solving", "git", "debugging", "algorithms", "data structures", "system design"]),
    ("senior engineer", &["programming", "coding", "software development", "problem solving", "git", "debugging", "architecture", "mentoring", "code review", "system design", "algorithms", "data structures"]),
    ("senior software engineer", &["programming", "coding", "software development", "problem solving", "git", "debugging", "architecture", "mentoring", "code review", "system design", "algorithms", "data structures", "best practices"]),
    ("devops engineer", &["docker", "kubernetes", "ci/cd", "cloud", "aws", "infrastructure", "automation", "scripting", "linux"]),
    ("qa engineer", &["testing", "quality assurance", "test automation", "bug tracking", "test cases"]),
    ("qa", &["testing", "quality assurance", "test automation", "bug tracking", "test cases"]),
    ("project manager", &["project management", "agile", "scrum", "planning", "coordination", "communication"]),
    ("product manager", &["product management", "strategy", "planning", "communication", "analytics"]),
    ("team lead", &["leadership", "mentoring", "code review", "planning", "coordination"]),
    ("data analyst", &["sql", "excel", "data analysis", "analytics", "reporting"]),
    ("data scientist", &["python", "sql", "machine learning", "data analysis", "statistics"]),
    ("ui designer", &["ui design", "figma", "photoshop", "illustrator", "design"]),
    ("ux designer", &["ux design", "user research", "wireframing", "prototyping", "figma"]),
    ("graphic designer", &["photoshop", "illustrator", "design", "creative", "adobe creative suite"]),
];

static BUILTIN: LazyLock<Arc<SkillTables>> =
    LazyLock::new(|| Arc::new(SkillTables::from_static(SKILL_SYNONYMS, TITLE_INFERENCE)));

/// An ordered list of `key -> values` rows. Lookups walk rows in order, so
/// results are deterministic.
pub type TableRows = Vec<(String, Vec<String>)>;

/// Read-only lookup tables for skill equivalence and job-title inference.
///
/// Built once and shared; analyzers take them by `Arc` rather than reading a
/// global so tests can substitute their own rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillTables {
    synonyms: TableRows,
    title_inference: TableRows,
}

impl SkillTables {
    pub fn new(synonyms: TableRows, title_inference: TableRows) -> Self {
        Self {
            synonyms: lowercase_rows(synonyms),
            title_inference: lowercase_rows(title_inference),
        }
    }

    /// The tables shipped with the crate.
    pub fn builtin() -> Arc<SkillTables> {
        Arc::clone(&BUILTIN)
    }

    fn from_static(synonyms: Table, title_inference: Table) -> Self {
        let own = |table: Table| -> TableRows {
            table
                .iter()
                .map(|(key, values)| (key.to_string(), values.iter().map(|v| v.to_string()).collect()))
                .collect()
        };
        Self::new(own(synonyms), own(title_inference))
    }

    /// Equivalence class of `skill`.
    ///
    /// A table key yields itself followed by its synonyms. A term that only
    /// appears as a synonym yields the first key listing it plus that key's
    /// synonyms. Anything else yields just the lower-cased term.
    pub fn synonyms_for(&self, skill: &str) -> Vec<String> {
        let skill = skill.trim().to_lowercase();

        if let Some((key, values)) = self.synonyms.iter().find(|(key, _)| *key == skill) {
            return std::iter::once(key.clone()).chain(values.iter().cloned()).collect();
        }

        for (key, values) in &self.synonyms {
            if values.iter().any(|value| *value == skill) {
                return std::iter::once(key.clone()).chain(values.iter().cloned()).collect();
            }
        }

        vec![skill]
    }

    /// Skills implied by a job title. An exact key wins outright; otherwise
    /// every key contained in the title contributes, in table order, without
    /// duplicates.
    pub fn infer_from_title(&self, title: &str) -> Vec<String> {
        let title = title.trim().to_lowercase();
        if title.is_empty() {
            return Vec::new();
        }

        if let Some((_, skills)) = self.title_inference.iter().find(|(key, _)| *key == title) {
            return skills.clone();
        }

        let mut seen = HashSet::new();
        self.title_inference
            .iter()
            .filter(|(key, _)| title.contains(key.as_str()))
            .flat_map(|(_, skills)| skills.iter())
            .filter(|skill| seen.insert(skill.as_str()))
            .cloned()
            .collect()
    }

    pub fn synonym_keys(&self) -> impl Iterator<Item = &str> {
        self.synonyms.iter().map(|(key, _)| key.as_str())
    }

    pub fn title_keys(&self) -> impl Iterator<Item = &str> {
        self.title_inference.iter().map(|(key, _)| key.as_str())
    }
}

impl Default for SkillTables {
    fn default() -> Self {
        Self::from_static(SKILL_SYNONYMS, TITLE_INFERENCE)
    }
}

fn lowercase_rows(rows: TableRows) -> TableRows {
    rows.into_iter()
        .map(|(key, values)| {
            (
                key.trim().to_lowercase(),
                values.into_iter().map(|v| v.trim().to_lowercase()).collect(),
            )
        })
        .collect()
}

/// Canonical form used for matching: lower-case, dots dropped, `-`/`_` as
/// spaces, `+` spelled out, whitespace collapsed.
pub fn normalize_skill(skill: &str) -> String {
    let lowered = skill
        .trim()
        .to_lowercase()
        .replace('.', "")
        .replace(['-', '_'], " ")
        .replace('+', "plus");

    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}
