//! CV matcher: score CVs against hiring criteria and rank candidates

use clap::Parser;
use cv_matcher::cli::{self, Cli, Commands, ConfigAction};
use cv_matcher::config::{Config, OutputFormat};
use cv_matcher::error::{CvMatcherError, Result};
use cv_matcher::input::SourceFetcher;
use cv_matcher::output::{save_report_to_file, truncate_text, ReportGenerator};
use cv_matcher::processing::{AnalysisEngine, CandidateRecord, Criteria, ReparseSummary, SearchQuery, SkillTables};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Load configuration
    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Execute command
    if let Err(e) = run_command(cli.command, config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Match {
            cv,
            criteria,
            skills,
            min_experience,
            languages,
            job_description,
            output,
            save,
        } => {
            let format = output_format(output.as_deref(), &config)?;

            let request = Criteria {
                required_skills: cli::parse_list(skills.as_deref()),
                min_experience: min_experience.unwrap_or(0),
                required_languages: cli::parse_list(languages.as_deref()),
                ..Criteria::default()
            };

            // Flags take precedence over the criteria file.
            let mut criteria = match criteria {
                Some(path) => {
                    let json = read_text(&path)?;
                    let stored = Criteria::from_json(&json)?;
                    request.or_stored(Some(&json), &stored.job_description, &stored.job_requirements)
                }
                None => request,
            };
            if let Some(path) = job_description {
                let description = read_text(&path)?;
                let requirements = criteria.job_requirements.clone();
                criteria = criteria.with_job_text(&description, &requirements);
                criteria.match_job_description = true;
            }

            info!("Matching CV {} against {:?}", cv, criteria.required_skills);
            let engine = build_engine(&config)?;
            let result = engine.match_from_url(&cv, &criteria).await?;

            let generator = ReportGenerator::from_config(&config.output);
            let report = generator.formatter(format).format_match(&result)?;
            println!("{}", report);

            if let Some(path) = save {
                save_report_to_file(&report, &path)?;
                println!("💾 Report saved to {}", path.display());
            }
        }

        Commands::Extract { cv } => {
            let engine = build_engine(&config)?;
            match engine.extract_cv_text(&cv).await {
                Ok(text) => println!("{}", text),
                Err(e) if e.is_extraction_failure() => {
                    println!("❌ Could not read CV text: {}", e);
                    return Err(e);
                }
                Err(e) => return Err(e),
            }
        }

        Commands::Profile { cv, output } => {
            let format = output_format(output.as_deref(), &config)?;
            let engine = build_engine(&config)?;

            let mut record = CandidateRecord {
                id: cv.clone(),
                full_name: cv.clone(),
                resume_url: cv,
                ..CandidateRecord::default()
            };
            let profile = engine.candidate_profile(&mut record).await;

            let generator = ReportGenerator::from_config(&config.output);
            println!("{}", generator.formatter(format).format_profile(&profile)?);
        }

        Commands::Search {
            candidates,
            query,
            skills,
            languages,
            min_experience,
            max_experience,
            position,
            status,
            has_portfolio,
            has_linkedin,
            limit,
            output,
        } => {
            let format = output_format(output.as_deref(), &config)?;
            let mut pool = load_candidates(&candidates)?;

            let query = SearchQuery {
                query,
                skills: cli::parse_list(skills.as_deref()),
                min_experience,
                max_experience,
                current_position: position,
                languages: cli::parse_list(languages.as_deref()),
                has_portfolio: has_portfolio.then_some(true),
                has_linkedin: has_linkedin.then_some(true),
                status,
                limit,
            };

            println!("🔎 Searching {} candidates...", pool.len());
            let engine = build_engine(&config)?;
            let response = engine.search(&mut pool, &query).await;
            save_candidates(&candidates, &pool)?;

            let generator = ReportGenerator::from_config(&config.output);
            println!("{}", generator.formatter(format).format_search(&response)?);
        }

        Commands::Batch {
            candidates,
            criteria,
            job_description,
            job_requirements,
            output,
        } => {
            let format = output_format(output.as_deref(), &config)?;
            let pool = load_candidates(&candidates)?;

            let description = read_optional(job_description.as_deref())?;
            let requirements = read_optional(job_requirements.as_deref())?;
            let stored = read_optional(criteria.as_deref())?;
            let criteria = Criteria::resolve_stored(Some(&stored), &description, &requirements);

            println!("📊 Analyzing {} candidates...", pool.len());
            let engine = build_engine(&config)?;
            let report = engine.analyze_batch(&pool, &criteria).await;

            let generator = ReportGenerator::from_config(&config.output);
            println!("{}", generator.formatter(format).format_batch(&report)?);
        }

        Commands::Reparse { candidates } => {
            let mut pool = load_candidates(&candidates)?;
            let engine = build_engine(&config)?;

            let pending: Vec<usize> = (0..pool.len()).filter(|&i| pool[i].needs_reparse()).collect();
            let progress = ProgressBar::new(pending.len() as u64);
            progress.set_style(
                ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );

            let mut summary = ReparseSummary::default();
            for index in pending {
                let record = &mut pool[index];
                progress.set_message(truncate_text(&record.full_name, 30));
                summary.total += 1;
                match engine.reparse_one(record).await {
                    Ok(_) => summary.succeeded += 1,
                    Err(e) => {
                        progress.println(format!("❌ {}: {}", record.id, e));
                        summary.failed += 1;
                    }
                }
                progress.inc(1);
            }
            progress.finish_and_clear();

            save_candidates(&candidates, &pool)?;
            let generator = ReportGenerator::from_config(&config.output);
            print!("{}", generator.formatter(OutputFormat::Console).format_reparse(&summary)?);
        }

        Commands::Synonyms { skill, title } => {
            let tables = SkillTables::builtin();
            if title {
                let inferred = tables.infer_from_title(&skill);
                if inferred.is_empty() {
                    println!("No skills inferred from \"{}\"", skill);
                    println!("Known titles: {}", tables.title_keys().collect::<Vec<_>>().join(", "));
                } else {
                    println!("🧩 {} → {}", skill, inferred.join(", "));
                }
            } else {
                let class = tables.synonyms_for(&skill);
                if class.len() <= 1 {
                    println!(
                        "No synonyms known for \"{}\" ({} skills have synonyms)",
                        skill,
                        tables.synonym_keys().count()
                    );
                } else {
                    println!("🔗 {} → {}", skill, class.join(", "));
                }
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration\n");
                println!("Config file: {}", Config::config_path().display());
                println!("\nFetch:");
                println!("  Timeout: {}s", config.fetch.timeout_secs);
                match config.document_size_limit() {
                    Some(limit) => println!("  Size limit: {} bytes", limit),
                    None => println!("  Size limit: none"),
                }
                println!("  User agent: {}", config.fetch.user_agent);
                println!("\nExtraction:");
                println!("  Minimum extracted characters: {}", config.extraction.min_extracted_chars);
                println!("  Minimum CV characters: {}", config.extraction.min_cv_chars);
                println!("  PDF backend: {:?}", config.extraction.pdf_backend);
                println!("  Cache: {}", config.extraction.enable_cache);
                println!("  Cache capacity: {}", config.extraction.cache_capacity);
                println!("\nSearch:");
                println!("  Default limit: {}", config.search.default_limit);
                println!("  Max limit: {}", config.search.max_limit);
                println!("  Default score: {}", config.search.default_score);
                println!("  Query threshold: {}", config.search.query_score_threshold);
                println!("\nOutput:");
                println!("  Format: {:?}", config.output.format);
                println!("  Detailed: {}", config.output.detailed);
                println!("  Colors: {}", config.output.color_output);
            }

            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                Config::default().save()?;
                println!("✅ Configuration reset successfully!");
            }
        },
    }

    Ok(())
}

fn build_engine(config: &Config) -> Result<AnalysisEngine<SourceFetcher>> {
    AnalysisEngine::new(SourceFetcher::new(&config.fetch)?, config)
}

fn output_format(flag: Option<&str>, config: &Config) -> Result<OutputFormat> {
    match flag {
        Some(flag) => cli::parse_output_format(flag).map_err(CvMatcherError::InvalidInput),
        None => Ok(config.output.format),
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| CvMatcherError::InvalidInput(format!("{}: {}", path.display(), e)))
}

fn read_optional(path: Option<&Path>) -> Result<String> {
    path.map(read_text).transpose().map(Option::unwrap_or_default)
}

fn load_candidates(path: &Path) -> Result<Vec<CandidateRecord>> {
    let json = read_text(path)?;
    Ok(serde_json::from_str(&json)?)
}

fn save_candidates(path: &Path, pool: &[CandidateRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(pool)?;
    std::fs::write(path, json)?;
    Ok(())
}
