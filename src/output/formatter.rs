//! Output formatters: colored console text and JSON

use crate::config::{OutputConfig, OutputFormat};
use crate::error::Result;
use crate::processing::analyzer::{BatchReport, CandidateProfile, ReparseSummary};
use crate::processing::matcher::MatchResult;
use crate::processing::search::SearchResponse;
use colored::{Color, Colorize};
use std::path::Path;

/// Renders analysis results in one output format.
pub trait OutputFormatter {
    fn format_match(&self, result: &MatchResult) -> Result<String>;
    fn format_search(&self, response: &SearchResponse) -> Result<String>;
    fn format_profile(&self, profile: &CandidateProfile) -> Result<String>;
    fn format_batch(&self, report: &BatchReport) -> Result<String>;
    fn format_reparse(&self, summary: &ReparseSummary) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };
        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: u32) -> String {
        let (badge, color) = match score {
            90..=100 => ("EXCELLENT", Color::Green),
            80..=89 => ("VERY GOOD", Color::BrightGreen),
            70..=79 => ("GOOD", Color::Yellow),
            60..=69 => ("FAIR", Color::BrightYellow),
            50..=59 => ("BELOW AVG", Color::Red),
            _ => ("POOR", Color::BrightRed),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_list(&self, label: &str, items: &[String], color: Color) -> String {
        if items.is_empty() {
            return format!("{}: none\n", label);
        }
        format!("{}: {}\n", label, self.colorize(&items.join(", "), color))
    }

    fn format_match_body(&self, result: &MatchResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Match Score: {}% {}\n",
            result.match_score,
            self.format_score_badge(result.match_score)
        ));
        output.push_str(&format!("Summary: {}\n", self.colorize(&result.summary, Color::Cyan)));
        output.push_str(&format!("Reason: {}\n", result.match_reason));

        output.push_str(&self.format_header("Score Breakdown", 3));
        output.push_str(&format!("  Skills:          {:>3}% (weight 40%)\n", result.skills_match));
        output.push_str(&format!("  Experience:      {:>3}% (weight 30%)\n", result.experience_match));
        output.push_str(&format!("  Languages:       {:>3}% (weight 20%)\n", result.language_match));
        output.push_str(&format!("  Job description: {:>3}% (weight 10%)\n", result.job_description_match));

        output.push_str(&self.format_header("Findings", 3));
        output.push_str(&format!("Experience: {} years\n", result.experience));
        output.push_str(&self.format_list("Matched skills", &result.skills, Color::Green));
        output.push_str(&self.format_list("Missing skills", &result.missing_skills, Color::Red));
        if self.detailed {
            output.push_str(&self.format_list("Other skills", &result.discovered_skills, Color::White));
        }
        output.push_str(&self.format_list("Languages", &result.languages, Color::Green));

        if !result.strengths.is_empty() {
            output.push_str(&self.format_header("Strengths", 3));
            for strength in &result.strengths {
                output.push_str(&format!("  • {}\n", self.colorize(strength, Color::Green)));
            }
        }
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_match(&self, result: &MatchResult) -> Result<String> {
        let mut output = self.format_header("CV MATCH ANALYSIS", 1);
        output.push_str(&format!(
            "Generated: {}\n\n",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str(&self.format_match_body(result));
        Ok(output)
    }

    fn format_search(&self, response: &SearchResponse) -> Result<String> {
        let mut output = self.format_header("CANDIDATE SEARCH", 1);
        output.push_str(&format!(
            "Showing {} of {} candidates\n",
            response.count, response.total
        ));

        for (rank, hit) in response.candidates.iter().enumerate() {
            output.push_str(&format!(
                "\n{:>3}. {} ({}) {}% {}\n",
                rank + 1,
                self.colorize(&hit.full_name, Color::Cyan),
                hit.candidate_id,
                hit.match_score,
                self.format_score_badge(hit.match_score)
            ));
            for reason in &hit.matched_reasons {
                output.push_str(&format!("       - {}\n", reason));
            }
            if self.detailed && !hit.matched_skills.is_empty() {
                output.push_str(&format!("       skills: {}\n", hit.matched_skills.join(", ")));
            }
        }
        Ok(output)
    }

    fn format_profile(&self, profile: &CandidateProfile) -> Result<String> {
        let mut output = self.format_header("CANDIDATE PROFILE", 1);
        output.push_str(&format!("Candidate: {} ({})\n", profile.full_name, profile.candidate_id));

        match &profile.cv_text {
            None => {
                output.push_str(&self.colorize("No readable CV text\n", Color::Red));
            }
            Some(text) => {
                if let Some(title) = &profile.job_title {
                    output.push_str(&format!("Job title: {}\n", title));
                }
                output.push_str(&format!(
                    "Experience: {} years ({:?})\n",
                    profile.experience.years, profile.experience.source
                ));
                output.push_str(&self.format_list("Skills", &profile.skills, Color::Green));
                if self.detailed {
                    output.push_str(&self.format_header("CV Text Preview", 3));
                    output.push_str(&truncate_text(text, 500));
                    output.push('\n');
                }
            }
        }
        Ok(output)
    }

    fn format_batch(&self, report: &BatchReport) -> Result<String> {
        let mut output = self.format_header("BATCH ANALYSIS", 1);
        output.push_str(&format!(
            "Analyzed {} candidates, {} failed ({}ms)\n",
            report.total_analyzed, report.failed, report.processing_time_ms
        ));

        for outcome in &report.results {
            match (&outcome.analysis, &outcome.error) {
                (Some(analysis), _) => {
                    output.push_str(&self.format_header(&outcome.candidate_name, 2));
                    output.push_str(&self.format_match_body(analysis));
                }
                (None, Some(error)) => {
                    output.push_str(&self.format_header(&outcome.candidate_name, 2));
                    output.push_str(&format!("{} {}\n", self.colorize("Error:", Color::Red), error));
                }
                (None, None) => {}
            }
        }
        Ok(output)
    }

    fn format_reparse(&self, summary: &ReparseSummary) -> Result<String> {
        Ok(format!(
            "CV reparsing complete: {} succeeded, {} failed out of {} total\n",
            self.colorize(&summary.succeeded.to_string(), Color::Green),
            self.colorize(&summary.failed.to_string(), Color::Red),
            summary.total
        ))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_match(&self, result: &MatchResult) -> Result<String> {
        self.to_json(result)
    }

    fn format_search(&self, response: &SearchResponse) -> Result<String> {
        self.to_json(response)
    }

    fn format_profile(&self, profile: &CandidateProfile) -> Result<String> {
        self.to_json(profile)
    }

    fn format_batch(&self, report: &BatchReport) -> Result<String> {
        self.to_json(report)
    }

    fn format_reparse(&self, summary: &ReparseSummary) -> Result<String> {
        self.to_json(summary)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

/// Holds one formatter per output format.
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::from_config(&OutputConfig::default())
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::with_options(config.color_output, config.detailed, true)
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
        }
    }

    pub fn formatter(&self, format: OutputFormat) -> &dyn OutputFormatter {
        match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

/// Truncate text to at most `max_chars` characters, backing off to a word
/// boundary when there is one.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => {
            let truncated = &text[..cut];
            let end = truncated.rfind(' ').unwrap_or(cut);
            format!("{}...", &text[..end])
        }
    }
}
