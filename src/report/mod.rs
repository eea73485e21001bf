//! Rendering of grading results.

pub mod generator;

pub use generator::*;
