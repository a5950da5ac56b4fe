//! Output formatting and report generation

pub mod formatter;

pub use formatter::{save_report_to_file, truncate_text, OutputFormatter, ReportGenerator};
