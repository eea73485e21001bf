//! Report generation.
//!
//! This module renders grading results as Markdown or JSON.

use crate::grading::rank_learners;
use crate::models::{ClassSummary, LearnerRecord, Report, ReportMetadata, SkippedSubmission};
use anyhow::Result;

/// Options that change how a Markdown report looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Decimal places for percentages.
    pub precision: usize,
    /// Whether to list skipped submissions.
    pub include_skipped: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            precision: 2,
            include_skipped: true,
        }
    }
}

impl From<&crate::config::ReportConfig> for MarkdownOptions {
    fn from(config: &crate::config::ReportConfig) -> Self {
        Self {
            precision: config.precision,
            include_skipped: config.include_skipped,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: MarkdownOptions) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Grade Report: {}\n\n", report.metadata.course_name));
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(
        &report.summary,
        &report.learners,
        options.precision,
    ));
    output.push_str(&generate_learners_section(report, options.precision));

    if options.include_skipped {
        output.push_str(&generate_skipped_section(&report.skipped));
    }

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Course:** {} (ID {})\n",
        metadata.course_name, metadata.course_id
    ));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Graded As Of:** {}\n",
        metadata.reference_time.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Late Penalty:** {} points\n",
        metadata.late_penalty
    ));
    section.push_str(&format!(
        "- **Submissions:** {}\n",
        metadata.submissions_total
    ));
    section.push('\n');

    section
}

fn generate_summary_section(
    summary: &ClassSummary,
    learners: &[LearnerRecord],
    precision: usize,
) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Learners | Scored | Skipped | **Class Average** |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | **{}** |\n\n",
        summary.learners,
        summary.scored,
        summary.skipped,
        format_percentage(summary.class_average, precision)
    ));

    if !summary.assignment_means.is_empty() {
        section.push_str("### Assignment Averages\n\n");
        section.push_str("| Assignment | Average |\n");
        section.push_str("|:---|:---:|\n");

        for (assignment_id, mean) in &summary.assignment_means {
            section.push_str(&format!(
                "| {} | {} |\n",
                assignment_id,
                format_percentage(*mean, precision)
            ));
        }
        section.push('\n');
    }

    let ranked = rank_learners(learners);
    if !ranked.is_empty() {
        section.push_str("### Top Learners\n\n");
        section.push_str("| Learner | Average |\n");
        section.push_str("|:---|:---:|\n");

        for record in ranked.into_iter().take(5) {
            section.push_str(&format!(
                "| {} | {} |\n",
                record.id,
                format_percentage(record.avg, precision)
            ));
        }
        section.push('\n');
    }

    section
}

fn generate_learners_section(report: &Report, precision: usize) -> String {
    let mut section = String::new();

    section.push_str("## Learners\n\n");

    if report.learners.is_empty() {
        section.push_str("No submissions could be scored.\n\n");
        return section;
    }

    let columns = report.scored_assignment_ids();

    section.push_str("| Learner |");
    for id in &columns {
        section.push_str(&format!(" {} |", id));
    }
    section.push_str(" **Average** |\n");

    section.push_str("|:---|");
    for _ in &columns {
        section.push_str(":---:|");
    }
    section.push_str(":---:|\n");

    for record in &report.learners {
        section.push_str(&format!("| {} |", record.id));
        for id in &columns {
            let cell = record
                .score(*id)
                .map(|p| format_percentage(p, precision))
                .unwrap_or_else(|| "-".to_string());
            section.push_str(&format!(" {} |", cell));
        }
        section.push_str(&format!(
            " **{}** |\n",
            format_percentage(record.avg, precision)
        ));
    }
    section.push('\n');

    section
}

fn generate_skipped_section(skipped: &[SkippedSubmission]) -> String {
    if skipped.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Skipped Submissions\n\n");
    section.push_str("| Learner | Assignment | Reason |\n");
    section.push_str("|:---|:---|:---|\n");

    for entry in skipped {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            entry.learner_id, entry.assignment_id, entry.reason
        ));
    }
    section.push('\n');

    section
}

/// Format a percentage with a fixed number of decimals.
pub fn format_percentage(value: f64, precision: usize) -> String {
    format!("{:.*}%", precision, value)
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate just the learner records as a JSON array.
pub fn generate_learner_json(records: &[LearnerRecord]) -> Result<String> {
    serde_json::to_string_pretty(records).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Grading, SkipReason};
    use chrono::{TimeZone, Utc};

    fn create_test_report() -> Report {
        let metadata = ReportMetadata {
            course_id: 451,
            course_name: "Introduction to Web Development".to_string(),
            generated_at: Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap(),
            reference_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            late_penalty: 10.0,
            submissions_total: 4,
        };

        let grading = Grading {
            records: vec![
                LearnerRecord {
                    id: 125,
                    scores: [(1, 94.0), (2, 100.0)].into_iter().collect(),
                    avg: 97.0,
                },
                LearnerRecord {
                    id: 132,
                    scores: [(1, 78.0)].into_iter().collect(),
                    avg: 78.0,
                },
            ],
            skipped: vec![SkippedSubmission {
                learner_id: 125,
                assignment_id: 3,
                reason: SkipReason::NotYetDue,
            }],
        };

        Report::new(metadata, grading)
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report, MarkdownOptions::default());

        assert!(markdown.contains("# Grade Report: Introduction to Web Development"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains("## Learners"));
        assert!(markdown.contains("| 125 | 94.00% | 100.00% | **97.00%** |"));
        assert!(markdown.contains("| 132 | 78.00% | - | **78.00%** |"));
        assert!(markdown.contains("## Skipped Submissions"));
        assert!(markdown.contains("| 125 | 3 | Not yet due |"));
    }

    #[test]
    fn test_markdown_respects_options() {
        let report = create_test_report();
        let options = MarkdownOptions {
            precision: 0,
            include_skipped: false,
        };
        let markdown = generate_markdown_report(&report, options);

        assert!(markdown.contains("| 125 | 94% | 100% | **97%** |"));
        assert!(!markdown.contains("## Skipped Submissions"));
    }

    #[test]
    fn test_summary_section_class_average() {
        let report = create_test_report();
        let section = generate_summary_section(&report.summary, &report.learners, 1);

        assert!(section.contains("| 2 | 3 | 1 | **87.5%** |"));
        assert!(section.contains("### Top Learners"));
    }

    #[test]
    fn test_empty_learners_section() {
        let mut report = create_test_report();
        report.learners.clear();

        let section = generate_learners_section(&report, 2);
        assert!(section.contains("No submissions could be scored."));
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(83.33333, 2), "83.33%");
        assert_eq!(format_percentage(-6.0, 1), "-6.0%");
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"course_name\""));
        assert!(json.contains("\"learners\""));
        assert!(json.contains("\"not_yet_due\""));
    }

    #[test]
    fn test_generate_learner_json() {
        let report = create_test_report();
        let json = generate_learner_json(&report.learners).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["id"], 125);
        assert_eq!(value[0]["1"], 94.0);
        assert_eq!(value[0]["avg"], 97.0);
        assert!(value[1].get("2").is_none());
    }
}
