//! Data models for the grade calculator.
//!
//! This module contains the course inputs (course, assignment groups,
//! assignments, submissions) and the records and reports produced from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A course; the scope every assignment group must belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Course identifier.
    pub id: u64,
    /// Display name of the course.
    pub name: String,
}

/// A gradable unit with a due date and maximum points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assignment identifier, unique across all groups of a course.
    pub id: u64,
    /// Display name of the assignment.
    pub name: String,
    /// When the assignment is due.
    #[serde(with = "crate::timestamp")]
    pub due_at: DateTime<Utc>,
    /// Maximum points; zero means the assignment cannot be scored.
    pub points_possible: f64,
}

/// A named collection of assignments belonging to one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentGroup {
    /// Group identifier.
    pub id: u64,
    /// Display name of the group.
    pub name: String,
    /// Course this group claims to belong to.
    pub course_id: u64,
    /// Weight of the group. Carried through but not used by the average.
    #[serde(default)]
    pub group_weight: f64,
    /// Assignments owned by this group, in order.
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

/// The attempt itself: when it was handed in and what it scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionDetail {
    #[serde(with = "crate::timestamp")]
    pub submitted_at: DateTime<Utc>,
    pub score: f64,
}

/// One learner's attempt at one assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Learner who submitted.
    pub learner_id: u64,
    /// Assignment the submission is for.
    pub assignment_id: u64,
    /// Submission time and raw score.
    pub submission: SubmissionDetail,
}

/// All three inputs of a grading run as one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseBundle {
    pub course: Course,
    #[serde(default)]
    pub assignment_groups: Vec<AssignmentGroup>,
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

/// Output for one learner.
///
/// Serializes flat: `{"id": 1, "1": 80.0, "2": 80.0, "avg": 80.0}`, with one
/// key per scored assignment id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearnerRecord {
    /// Learner identifier.
    pub id: u64,
    /// Percentage per scored assignment, keyed by assignment id.
    #[serde(flatten)]
    pub scores: BTreeMap<u64, f64>,
    /// Mean of the scored percentages, 0 when nothing was scored.
    pub avg: f64,
}

impl LearnerRecord {
    /// Percentage recorded for an assignment, if it was scored.
    pub fn score(&self, assignment_id: u64) -> Option<f64> {
        self.scores.get(&assignment_id).copied()
    }
}

/// Why a submission contributed nothing to a learner's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No assignment in any group has the referenced id.
    UnresolvedAssignment,
    /// The assignment is due after the reference time.
    NotYetDue,
    /// The assignment has no points possible.
    UngradableAssignment,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnresolvedAssignment => write!(f, "Unknown assignment"),
            SkipReason::NotYetDue => write!(f, "Not yet due"),
            SkipReason::UngradableAssignment => write!(f, "Zero points possible"),
        }
    }
}

/// A submission that was dropped during scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSubmission {
    pub learner_id: u64,
    pub assignment_id: u64,
    pub reason: SkipReason,
}

/// Successful outcome of one grading run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Grading {
    /// One record per learner with at least one scored submission,
    /// in order of first appearance in the submission list.
    pub records: Vec<LearnerRecord>,
    /// Submissions that were skipped, in input order.
    pub skipped: Vec<SkippedSubmission>,
}

/// Class-wide statistics over a grading run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassSummary {
    /// Number of learners with a record.
    pub learners: usize,
    /// Number of percentages recorded across all learners.
    pub scored: usize,
    /// Number of skipped submissions.
    pub skipped: usize,
    /// Skipped submissions per reason.
    pub skipped_by_reason: BTreeMap<SkipReason, usize>,
    /// Mean of the learner averages.
    pub class_average: f64,
    /// Mean percentage per assignment, over learners who have one.
    pub assignment_means: BTreeMap<u64, f64>,
}

/// Metadata about a grading report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub course_id: u64,
    pub course_name: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Reference time that decided which assignments were due.
    pub reference_time: DateTime<Utc>,
    /// Late penalty in percentage points.
    pub late_penalty: f64,
    /// Number of submissions in the input.
    pub submissions_total: usize,
}

/// The complete grading report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub summary: ClassSummary,
    pub learners: Vec<LearnerRecord>,
    pub skipped: Vec<SkippedSubmission>,
}

impl Report {
    /// Build a report from a grading run, computing its summary.
    pub fn new(metadata: ReportMetadata, grading: Grading) -> Self {
        let summary = crate::grading::summarize(&grading);
        Self {
            metadata,
            summary,
            learners: grading.records,
            skipped: grading.skipped,
        }
    }

    /// Every assignment id that has a percentage for some learner, ascending.
    pub fn scored_assignment_ids(&self) -> Vec<u64> {
        self.summary.assignment_means.keys().copied().collect()
    }
}
