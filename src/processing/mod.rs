//! CV analysis: skill, language and experience detection, scoring and search

pub mod analyzer;
pub mod criteria;
pub mod experience;
pub mod languages;
pub mod matcher;
pub mod search;
pub mod skills;
pub mod synonyms;

pub use analyzer::{AnalysisEngine, BatchOutcome, BatchReport, CandidateProfile, ReparseSummary};
pub use criteria::Criteria;
pub use matcher::{CvMatcher, MatchResult};
pub use search::{CandidateRecord, CandidateStore, NullStore, SearchHit, SearchQuery, SearchResponse};
pub use synonyms::SkillTables;
