//! Error types for grading runs.

use thiserror::Error;

/// The inputs of a grading run are inconsistent with each other.
///
/// Any of these aborts the whole run: no learner gets a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputIntegrityError {
    #[error("AssignmentGroup ID {group_id} belongs to course {course_id}, expected course ID {expected}")]
    MismatchedCourse {
        group_id: u64,
        course_id: u64,
        expected: u64,
    },
}

impl InputIntegrityError {
    /// Id of the assignment group that failed validation.
    pub fn group_id(&self) -> u64 {
        match self {
            InputIntegrityError::MismatchedCourse { group_id, .. } => *group_id,
        }
    }
}
