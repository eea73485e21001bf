//! Grading: scoring submissions and aggregating them per learner.

pub mod aggregator;
pub mod stats;

pub use aggregator::*;
pub use stats::*;
