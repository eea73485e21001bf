//! Class-wide statistics over a grading run.

use crate::grading::aggregator::weighted_average;
use crate::models::{ClassSummary, Grading, LearnerRecord, SkipReason, SkippedSubmission};
use std::collections::BTreeMap;

/// Compute class statistics from a grading run.
pub fn summarize(grading: &Grading) -> ClassSummary {
    let mut per_assignment: BTreeMap<u64, Vec<f64>> = BTreeMap::new();

    for record in &grading.records {
        for (assignment_id, percentage) in &record.scores {
            per_assignment
                .entry(*assignment_id)
                .or_default()
                .push(*percentage);
        }
    }

    let scored = per_assignment.values().map(Vec::len).sum();
    let assignment_means = per_assignment
        .iter()
        .map(|(id, percentages)| (*id, mean(percentages)))
        .collect();
    let averages: Vec<f64> = grading.records.iter().map(|r| r.avg).collect();

    ClassSummary {
        learners: grading.records.len(),
        scored,
        skipped: grading.skipped.len(),
        skipped_by_reason: count_by_reason(&grading.skipped),
        class_average: mean(&averages),
        assignment_means,
    }
}

/// Count skipped submissions per reason.
pub fn count_by_reason(skipped: &[SkippedSubmission]) -> BTreeMap<SkipReason, usize> {
    let mut counts = BTreeMap::new();

    for entry in skipped {
        *counts.entry(entry.reason).or_insert(0) += 1;
    }

    counts
}

/// Learners ordered by average, highest first; ties keep the lower id first.
pub fn rank_learners(records: &[LearnerRecord]) -> Vec<&LearnerRecord> {
    let mut ranked: Vec<&LearnerRecord> = records.iter().collect();

    ranked.sort_by(|a, b| {
        b.avg
            .partial_cmp(&a.avg)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    ranked
}

// Percentages are already on a 100-point scale, so the normalized average
// is the plain mean.
fn mean(values: &[f64]) -> f64 {
    weighted_average(values)
}
