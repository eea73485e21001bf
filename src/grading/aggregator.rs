//! Per-learner score aggregation.
//!
//! Turns a course, its assignment groups and a flat list of submissions into
//! one [`LearnerRecord`] per learner. Groups are validated against the course
//! first; a single mismatch rejects the whole run.

use crate::error::InputIntegrityError;
use crate::models::{
    Assignment, AssignmentGroup, Course, Grading, LearnerRecord, SkipReason, SkippedSubmission,
    Submission, SubmissionDetail,
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, error, warn};

/// Flat deduction, in percentage points, for a submission handed in after
/// the due date.
pub const DEFAULT_LATE_PENALTY: f64 = 10.0;

/// Knobs that change how a submission is scored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringPolicy {
    /// Percentage points subtracted from a late submission. No floor is
    /// applied, so a late percentage can go negative.
    pub late_penalty: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            late_penalty: DEFAULT_LATE_PENALTY,
        }
    }
}

/// Computes learner records for one course.
#[derive(Debug, Clone, Default)]
pub struct ScoreAggregator {
    policy: ScoringPolicy,
}

impl ScoreAggregator {
    /// Create an aggregator with the given policy.
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    /// The policy this aggregator scores with.
    pub fn policy(&self) -> ScoringPolicy {
        self.policy
    }

    /// Score every submission and build one record per learner.
    ///
    /// `now` decides which assignments are due; the clock is never read here.
    /// Records come out in order of each learner's first submission in the
    /// list, scored or not. Learners with nothing scored get no record.
    pub fn compute(
        &self,
        course: &Course,
        groups: &[AssignmentGroup],
        submissions: &[Submission],
        now: DateTime<Utc>,
    ) -> Result<Grading, InputIntegrityError> {
        validate_groups(course, groups)?;

        let index = index_assignments(groups);
        debug!(
            "Indexed {} assignments across {} groups",
            index.len(),
            groups.len()
        );

        let mut order: Vec<u64> = Vec::new();
        let mut scores: HashMap<u64, BTreeMap<u64, f64>> = HashMap::new();
        let mut skipped = Vec::new();

        for submission in submissions {
            let learner = scores.entry(submission.learner_id).or_insert_with(|| {
                order.push(submission.learner_id);
                BTreeMap::new()
            });

            match self.assess(&index, submission, now) {
                Ok(percentage) => {
                    if let Some(previous) = learner.insert(submission.assignment_id, percentage) {
                        debug!(
                            "Learner {} resubmitted assignment {}: {} replaces {}",
                            submission.learner_id, submission.assignment_id, percentage, previous
                        );
                    }
                }
                Err(reason) => skipped.push(SkippedSubmission {
                    learner_id: submission.learner_id,
                    assignment_id: submission.assignment_id,
                    reason,
                }),
            }
        }

        let records = order
            .into_iter()
            .filter_map(|id| {
                scores
                    .remove(&id)
                    .filter(|scores| !scores.is_empty())
                    .map(|scores| {
                        let avg = weighted_average(scores.values());
                        LearnerRecord { id, scores, avg }
                    })
            })
            .collect();

        Ok(Grading { records, skipped })
    }

    /// Decide whether a submission counts and, if so, its percentage.
    fn assess(
        &self,
        index: &HashMap<u64, &Assignment>,
        submission: &Submission,
        now: DateTime<Utc>,
    ) -> Result<f64, SkipReason> {
        let Some(assignment) = index.get(&submission.assignment_id) else {
            debug!(
                "Submission by learner {} references unknown assignment {}, skipping",
                submission.learner_id, submission.assignment_id
            );
            return Err(SkipReason::UnresolvedAssignment);
        };

        if assignment.due_at > now {
            debug!(
                "Assignment ID {} is not due until {}, skipping",
                assignment.id, assignment.due_at
            );
            return Err(SkipReason::NotYetDue);
        }

        if assignment.points_possible <= 0.0 {
            warn!(
                "Assignment ID {} has zero possible points, skipping",
                assignment.id
            );
            return Err(SkipReason::UngradableAssignment);
        }

        let percentage = score_submission(
            assignment,
            &submission.submission,
            self.policy.late_penalty,
        );

        if !percentage.is_finite() {
            warn!(
                "Assignment ID {} gives a non-finite percentage for learner {}, skipping",
                assignment.id, submission.learner_id
            );
            return Err(SkipReason::UngradableAssignment);
        }

        Ok(percentage)
    }
}

/// Compute learner records with the default policy.
///
/// Integrity errors are logged and yield an empty result, so a caller never
/// sees partial data from a run with inconsistent inputs.
pub fn compute_learner_data(
    course: &Course,
    groups: &[AssignmentGroup],
    submissions: &[Submission],
    now: DateTime<Utc>,
) -> Vec<LearnerRecord> {
    match ScoreAggregator::default().compute(course, groups, submissions, now) {
        Ok(grading) => grading.records,
        Err(e) => {
            error!("Error processing learner data: {}", e);
            Vec::new()
        }
    }
}

/// Check that every group belongs to `course`. Stops at the first mismatch.
pub fn validate_groups(
    course: &Course,
    groups: &[AssignmentGroup],
) -> Result<(), InputIntegrityError> {
    match groups.iter().find(|g| g.course_id != course.id) {
        Some(group) => Err(InputIntegrityError::MismatchedCourse {
            group_id: group.id,
            course_id: group.course_id,
            expected: course.id,
        }),
        None => Ok(()),
    }
}

/// Map assignment ids to assignments across all groups.
///
/// Ids are expected to be unique; if one repeats, the first group in order
/// keeps it.
pub fn index_assignments(groups: &[AssignmentGroup]) -> HashMap<u64, &Assignment> {
    let mut index = HashMap::new();

    for assignment in groups.iter().flat_map(|g| &g.assignments) {
        index.entry(assignment.id).or_insert(assignment);
    }

    index
}

/// Percentage for one submission, after the late penalty.
///
/// Assumes `points_possible` is positive. Extreme score to points ratios can
/// overflow to infinity; callers must check the result is finite.
pub fn score_submission(
    assignment: &Assignment,
    detail: &SubmissionDetail,
    late_penalty: f64,
) -> f64 {
    let mut percentage = detail.score / assignment.points_possible * 100.0;

    if detail.submitted_at > assignment.due_at {
        percentage -= late_penalty;
    }

    percentage
}

/// Average of percentages where each assignment is worth 100 points.
///
/// Returns 0 for an empty input.
pub fn weighted_average<'a>(percentages: impl IntoIterator<Item = &'a f64>) -> f64 {
    let mut total_score = 0.0_f64;
    let mut total_possible = 0.0_f64;

    for percentage in percentages {
        total_score += *percentage;
        total_possible += 100.0;
    }

    if total_possible > 0.0 {
        total_score / total_possible * 100.0
    } else {
        0.0
    }
}
