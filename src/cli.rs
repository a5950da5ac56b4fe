//! CLI interface for the CV matcher

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cv-matcher")]
#[command(about = "Score CVs against job criteria and rank candidate pools")]
#[command(long_about = "Fetch CV documents, extract their text, infer skills, languages and experience, and score or rank candidates against hiring criteria")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score one CV against criteria
    Match {
        /// CV location: http(s) URL, file:// URL or local path
        #[arg(long)]
        cv: String,

        /// Criteria JSON file
        #[arg(long)]
        criteria: Option<PathBuf>,

        /// Required skills, comma separated
        #[arg(short, long)]
        skills: Option<String>,

        /// Minimum years of experience
        #[arg(short, long)]
        min_experience: Option<u32>,

        /// Required languages, comma separated
        #[arg(short, long)]
        languages: Option<String>,

        /// Job description file; enables job description matching
        #[arg(short, long)]
        job_description: Option<PathBuf>,

        /// Output format: console, json
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Extract and print the text of a CV
    Extract {
        /// CV location
        #[arg(long)]
        cv: String,
    },

    /// Show skills, job title and experience found in a CV
    Profile {
        /// CV location
        #[arg(long)]
        cv: String,

        /// Output format: console, json
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Rank a pool of candidates
    Search {
        /// Candidates JSON file
        #[arg(long)]
        candidates: PathBuf,

        /// Free-text query
        #[arg(short, long, default_value = "")]
        query: String,

        /// Required skills, comma separated
        #[arg(short, long)]
        skills: Option<String>,

        /// Required languages, comma separated
        #[arg(short, long)]
        languages: Option<String>,

        /// Minimum years of experience
        #[arg(long)]
        min_experience: Option<u32>,

        /// Maximum stated years of experience
        #[arg(long)]
        max_experience: Option<u32>,

        /// Current position contains
        #[arg(long, default_value = "")]
        position: String,

        /// Candidate status equals
        #[arg(long, default_value = "")]
        status: String,

        /// Only candidates with a portfolio link
        #[arg(long)]
        has_portfolio: bool,

        /// Only candidates with a LinkedIn link
        #[arg(long)]
        has_linkedin: bool,

        /// Maximum number of results
        #[arg(long, default_value_t = 0)]
        limit: usize,

        /// Output format: console, json
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Score every candidate in a pool against one criteria set
    Batch {
        /// Candidates JSON file
        #[arg(long)]
        candidates: PathBuf,

        /// Stored criteria JSON file; missing or malformed criteria fall
        /// back to matching the job description
        #[arg(long)]
        criteria: Option<PathBuf>,

        /// Job description file
        #[arg(short, long)]
        job_description: Option<PathBuf>,

        /// Job requirements file
        #[arg(short = 'r', long)]
        job_requirements: Option<PathBuf>,

        /// Output format: console, json
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Fill in missing CV text for a pool of candidates
    Reparse {
        /// Candidates JSON file; updated in place
        #[arg(long)]
        candidates: PathBuf,
    },

    /// Show the synonyms of a skill
    Synonyms {
        /// Skill or job title
        skill: String,

        /// Treat the argument as a job title and show inferred skills
        #[arg(long)]
        title: bool,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<crate::config::OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(crate::config::OutputFormat::Console),
        "json" => Ok(crate::config::OutputFormat::Json),
        _ => Err(format!("Invalid output format: {}. Supported: console, json", format)),
    }
}

/// Split a comma separated argument, dropping blanks.
pub fn parse_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
