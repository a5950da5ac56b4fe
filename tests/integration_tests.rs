//! Integration tests for the CV matcher

use cv_matcher::config::Config;
use cv_matcher::error::{CvMatcherError, ExtractionFailure};
use cv_matcher::input::{InputManager, LocalFileFetcher, SourceFetcher};
use cv_matcher::processing::{AnalysisEngine, CandidateRecord, Criteria, CvMatcher, SearchQuery};
use cv_matcher::testutil::{MemoryStore, MockFetcher};
use std::io::Write;

fn matcher() -> CvMatcher {
    CvMatcher::with_builtin_tables().unwrap()
}

fn local_engine() -> AnalysisEngine<SourceFetcher> {
    let config = Config::default();
    AnalysisEngine::new(SourceFetcher::new(&config.fetch).unwrap(), &config).unwrap()
}

fn mock_engine(fetcher: MockFetcher, store: MemoryStore) -> AnalysisEngine<MockFetcher, MemoryStore> {
    AnalysisEngine::with_store(fetcher, store, &Config::default()).unwrap()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn load_fixture_candidates() -> Vec<CandidateRecord> {
    let json = std::fs::read_to_string("tests/fixtures/candidates.json").unwrap();
    serde_json::from_str(&json).unwrap()
}

#[tokio::test]
async fn test_text_extraction_from_txt() {
    let engine = local_engine();
    let text = engine.extract_cv_text("tests/fixtures/sample_resume.txt").await.unwrap();

    assert!(text.contains("John Doe"));
    assert!(text.contains("Software Engineer"));
    assert!(text.contains("React"));
    assert!(text.contains("Node.js"));
}

#[tokio::test]
async fn test_text_extraction_from_markdown() {
    let engine = local_engine();
    let text = engine.extract_cv_text("tests/fixtures/sample_resume.md").await.unwrap();

    assert!(text.contains("John Doe"));
    assert!(text.contains("React"));
    // Should not contain markdown formatting
    assert!(!text.contains("**"));
    assert!(!text.contains("##"));
}

#[tokio::test]
async fn test_file_url_fetch() {
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    write!(file, "Maria Lopez, QA engineer with 3 years experience in Selenium and Python").unwrap();
    let location = url::Url::from_file_path(file.path()).unwrap().to_string();

    let manager = InputManager::new(LocalFileFetcher::default());
    let text = manager.load_cv_text(&location).await.unwrap();
    assert!(text.starts_with("Maria Lopez"));
}

#[tokio::test]
async fn test_missing_local_file_is_fetch_error() {
    let engine = local_engine();
    let err = engine.extract_cv_text("tests/fixtures/does_not_exist.pdf").await.unwrap_err();
    assert!(matches!(err, CvMatcherError::Fetch { .. }));
}

#[tokio::test]
async fn test_match_fixture_resume() {
    let engine = local_engine();
    let criteria = Criteria {
        required_skills: strings(&["React", "Node.js", "Python"]),
        min_experience: 5,
        required_languages: strings(&["English", "Spanish"]),
        ..Criteria::default()
    };

    let result = engine.match_from_url("tests/fixtures/sample_resume.txt", &criteria).await.unwrap();
    assert_eq!(result.experience, 6);
    assert_eq!(result.skills, strings(&["React", "Node.js", "Python"]));
    assert_eq!(result.languages, strings(&["English", "Spanish"]));
    assert_eq!(result.match_score, 100);
    assert!(result.strengths.contains(&"Extensive experience".to_string()));
    assert!(result.strengths.contains(&"Educational background".to_string()));
}

#[test]
fn test_score_stays_in_bounds() {
    let texts = [
        "",
        "Gardener",
        "Python SQL Go Rust Docker Kubernetes, 40 years experience, English French German",
    ];
    let criteria = [
        Criteria::default(),
        Criteria {
            required_skills: strings(&["Python", "Haskell", "COBOL"]),
            min_experience: 10,
            required_languages: strings(&["Japanese"]),
            match_job_description: true,
            job_description: "Mainframe modernisation specialist".into(),
            job_requirements: String::new(),
        },
    ];

    for text in texts {
        for criteria in &criteria {
            let result = matcher().score(text, criteria);
            assert!(result.match_score <= 100);
            for component in [result.skills_match, result.experience_match, result.language_match] {
                assert!(component <= 100);
            }
        }
    }
}

#[test]
fn test_empty_criteria_scores_full_marks() {
    let result = matcher().score("Barista who enjoys hiking on weekends and reading novels.", &Criteria::default());
    assert_eq!(result.match_score, 100);
    assert!(result.missing_skills.is_empty());
}

#[test]
fn test_adding_a_required_skill_never_lowers_score() {
    let criteria = Criteria {
        required_skills: strings(&["Docker", "Python"]),
        min_experience: 2,
        ..Criteria::default()
    };
    let base = "Python engineer with 3 years experience building internal tools.";
    let richer = format!("{} Ships everything in Docker.", base);

    let before = matcher().score(base, &criteria);
    let after = matcher().score(&richer, &criteria);
    assert_eq!(before.skills_match, 50);
    assert_eq!(after.skills_match, 100);
    assert!(after.match_score >= before.match_score);
}

#[test]
fn test_synonyms_match_in_both_directions() {
    let kubernetes = Criteria {
        required_skills: strings(&["Kubernetes"]),
        ..Criteria::default()
    };
    let k8s = Criteria {
        required_skills: strings(&["k8s"]),
        ..Criteria::default()
    };

    assert_eq!(matcher().score("deployed k8s clusters", &kubernetes).skills_match, 100);
    assert_eq!(matcher().score("managed kubernetes upgrades", &k8s).skills_match, 100);
}

#[test]
fn test_largest_stated_experience_wins() {
    let text = "3 years experience in QA. Later 5+ years of experience leading teams.";
    let result = matcher().score(text, &Criteria::default());
    assert_eq!(result.experience, 5);
}

#[test]
fn test_minimum_length_gate() {
    let manager = InputManager::new(MockFetcher::new());

    let err = manager.ensure_usable("x".repeat(49)).unwrap_err();
    assert!(matches!(
        err,
        CvMatcherError::Extraction(ExtractionFailure::TooShort { chars: 49 })
    ));
    assert!(manager.ensure_usable("x".repeat(51)).is_ok());
}

#[test]
fn test_full_match_scenario() {
    let criteria = Criteria {
        required_skills: strings(&["Python", "SQL"]),
        min_experience: 3,
        ..Criteria::default()
    };
    let result = matcher().score("Python developer with 4 years experience, SQL expert", &criteria);

    assert_eq!(result.skills_match, 100);
    assert_eq!(result.experience_match, 100);
    assert_eq!(result.language_match, 100);
    assert_eq!(result.match_score, 100);
}

#[test]
fn test_partial_match_scenario_truncates() {
    let criteria = Criteria {
        required_skills: strings(&["Python", "SQL"]),
        min_experience: 3,
        ..Criteria::default()
    };
    let result = matcher().score("Python with 2 years experience in scripting", &criteria);

    assert_eq!(result.skills_match, 50);
    assert_eq!(result.experience_match, 66);
    // (50*40 + 66*30 + 100*20 + 100*10) / 100
    assert_eq!(result.match_score, 69);
}

#[tokio::test]
async fn test_filter_only_search_keeps_pool_order() {
    let engine = mock_engine(MockFetcher::new(), MemoryStore::new());
    let text = "Generalist engineer, comfortable across the stack, mentoring juniors.";
    let mut pool: Vec<CandidateRecord> = ["a", "b", "c"]
        .iter()
        .map(|id| CandidateRecord {
            id: id.to_string(),
            full_name: format!("Candidate {}", id),
            parsed_cv_text: Some(text.to_string()),
            status: "pending".into(),
            ..CandidateRecord::default()
        })
        .collect();

    let query = SearchQuery {
        status: "pending".into(),
        ..SearchQuery::default()
    };
    let response = engine.search(&mut pool, &query).await;

    assert_eq!(response.count, 3);
    assert_eq!(response.total, 3);
    let ids: Vec<&str> = response.candidates.iter().map(|hit| hit.candidate_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert!(response.candidates.iter().all(|hit| hit.match_score == 50));
}

#[tokio::test]
async fn test_search_fixture_pool_by_skills() {
    let engine = mock_engine(MockFetcher::new(), MemoryStore::new());
    let mut pool = load_fixture_candidates();

    let query = SearchQuery {
        skills: strings(&["Docker", "Kubernetes"]),
        ..SearchQuery::default()
    };
    let response = engine.search(&mut pool, &query).await;

    assert_eq!(response.total, 3);
    assert_eq!(response.count, 1);
    assert_eq!(response.candidates[0].candidate_id, "c-1");
    assert_eq!(response.candidates[0].match_score, 100);
    assert_eq!(response.candidates[0].matched_skills, strings(&["Docker", "Kubernetes"]));
}

#[tokio::test]
async fn test_search_record_filters() {
    let engine = mock_engine(MockFetcher::new(), MemoryStore::new());
    let mut pool = load_fixture_candidates();

    let query = SearchQuery {
        has_portfolio: Some(true),
        ..SearchQuery::default()
    };
    let response = engine.search(&mut pool, &query).await;

    assert_eq!(response.total, 1);
    assert_eq!(response.candidates[0].candidate_id, "c-2");
}

#[tokio::test]
async fn test_search_survives_store_failure() {
    let chen = "Chen Wei, platform engineer. Terraform, Kubernetes and Go across three cloud regions.";
    let fetcher = MockFetcher::new().with_document("https://cv.example/chen.pdf", chen, Some("text/plain"));
    let store = MemoryStore::failing();
    let engine = mock_engine(fetcher, store);
    let mut pool = load_fixture_candidates();

    let query = SearchQuery {
        status: "reviewed".into(),
        ..SearchQuery::default()
    };
    let response = engine.search(&mut pool, &query).await;

    assert_eq!(response.count, 1);
    assert_eq!(response.candidates[0].candidate_id, "c-3");
    assert_eq!(pool[2].parsed_cv_text.as_deref(), Some(chen));
    assert_eq!(engine.store().saved_count(), 0);
}

#[tokio::test]
async fn test_timeout_is_retryable() {
    let fetcher = MockFetcher::new().with_timeout("https://cv.example/slow.pdf");
    let engine = mock_engine(fetcher, MemoryStore::new());

    let err = engine
        .match_from_url("https://cv.example/slow.pdf", &Criteria::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CvMatcherError::FetchTimeout { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_reparse_fills_missing_text() {
    let chen = "Chen Wei, platform engineer. Terraform, Kubernetes and Go across three cloud regions.";
    let fetcher = MockFetcher::new().with_document("https://cv.example/chen.pdf", chen, Some("text/plain"));
    let engine = mock_engine(fetcher, MemoryStore::new());
    let mut pool = load_fixture_candidates();

    let summary = engine.reparse(&mut pool).await;
    assert_eq!(summary.total, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(engine.store().saved("c-3").as_deref(), Some(chen));
    assert!(pool.iter().all(|record| !record.needs_reparse()));
}

#[test]
fn test_stored_criteria_resolution() {
    let stored = r#"{"required_skills": ["Go"], "min_experience": 4}"#;
    let criteria = Criteria::resolve_stored(Some(stored), "Build payment APIs", "Go, gRPC");
    assert_eq!(criteria.required_skills, strings(&["Go"]));
    assert_eq!(criteria.job_description, "Build payment APIs");

    let fallback = Criteria::resolve_stored(Some("{broken"), "Build payment APIs", "Go, gRPC");
    assert!(fallback.match_job_description);
    assert!(fallback.is_unspecified());
}
