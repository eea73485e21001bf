//! GradeCalc - per-learner assignment percentages and course averages.
//!
//! The core entry point is [`grading::ScoreAggregator`], which validates a
//! course's assignment groups, scores every submission that is due, applies
//! the late penalty and averages each learner's percentages.
//! [`grading::compute_learner_data`] wraps it for callers that only want the
//! records, returning an empty list when the inputs are inconsistent.

pub mod cli;
pub mod config;
pub mod error;
pub mod grading;
pub mod input;
pub mod models;
pub mod report;
pub mod timestamp;

pub use error::InputIntegrityError;
pub use grading::{compute_learner_data, ScoreAggregator, ScoringPolicy};
pub use models::{
    Assignment, AssignmentGroup, Course, CourseBundle, Grading, LearnerRecord, Submission,
    SubmissionDetail,
};
