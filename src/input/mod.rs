//! Loading course data.
//!
//! A grading run needs a course, its assignment groups and the learner
//! submissions. These come either from a JSON bundle on disk or from the
//! built-in sample course.

use crate::models::{
    Assignment, AssignmentGroup, Course, CourseBundle, Submission, SubmissionDetail,
};
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use std::path::Path;
use tracing::{debug, info};

/// Load a course bundle from a JSON file.
pub fn load_bundle(path: &Path) -> Result<CourseBundle> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read course data: {}", path.display()))?;

    let bundle = parse_bundle(&content)
        .with_context(|| format!("Failed to parse course data: {}", path.display()))?;

    info!(
        "Loaded course {} ({}) from {}",
        bundle.course.id,
        bundle.course.name,
        path.display()
    );
    debug!(
        "{} assignment groups, {} submissions",
        bundle.assignment_groups.len(),
        bundle.submissions.len()
    );

    Ok(bundle)
}

/// Parse a course bundle from JSON text.
pub fn parse_bundle(content: &str) -> Result<CourseBundle> {
    let bundle: CourseBundle = serde_json::from_str(content)?;
    Ok(bundle)
}

/// The built-in sample course: one homework group with two assignments and
/// one learner who hands in the second one a day late.
pub fn sample_bundle() -> Result<CourseBundle> {
    let course = Course {
        id: 1,
        name: "Web Development".to_string(),
    };

    let assignment_groups = vec![AssignmentGroup {
        id: 1,
        name: "Homework".to_string(),
        course_id: 1,
        group_weight: 50.0,
        assignments: vec![
            Assignment {
                id: 1,
                name: "HTML Basics".to_string(),
                due_at: day(2024, 9, 10)?,
                points_possible: 100.0,
            },
            Assignment {
                id: 2,
                name: "CSS Basics".to_string(),
                due_at: day(2024, 9, 20)?,
                points_possible: 100.0,
            },
        ],
    }];

    let submissions = vec![
        Submission {
            learner_id: 1,
            assignment_id: 1,
            submission: SubmissionDetail {
                submitted_at: day(2024, 9, 9)?,
                score: 80.0,
            },
        },
        Submission {
            learner_id: 1,
            assignment_id: 2,
            submission: SubmissionDetail {
                submitted_at: day(2024, 9, 21)?,
                score: 90.0,
            },
        },
    ];

    Ok(CourseBundle {
        course,
        assignment_groups,
        submissions,
    })
}

fn day(year: i32, month: u32, day: u32) -> Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .with_context(|| format!("Invalid date {:04}-{:02}-{:02}", year, month, day))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join(name)
    }

    #[test]
    fn test_load_fixture() {
        let bundle = load_bundle(&fixture("web_development.json")).unwrap();

        assert_eq!(bundle.course.id, 451);
        assert_eq!(bundle.assignment_groups.len(), 2);
        assert_eq!(bundle.assignment_groups[0].assignments.len(), 3);
        assert_eq!(bundle.submissions.len(), 6);
        assert_eq!(bundle.assignment_groups[1].assignments[0].points_possible, 0.0);
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = load_bundle(Path::new("does/not/exist.json")).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"));
    }

    #[test]
    fn test_load_invalid_timestamp_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "course": {{ "id": 1, "name": "C" }},
                "assignment_groups": [{{
                    "id": 1, "name": "G", "course_id": 1, "group_weight": 10,
                    "assignments": [{{ "id": 1, "name": "A", "due_at": "soon", "points_possible": 10 }}]
                }}],
                "submissions": []
            }}"#
        )
        .unwrap();

        let err = load_bundle(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid timestamp"));
    }

    #[test]
    fn test_bundle_sections_default_to_empty() {
        let bundle = parse_bundle(r#"{ "course": { "id": 9, "name": "Empty" } }"#).unwrap();
        assert!(bundle.assignment_groups.is_empty());
        assert!(bundle.submissions.is_empty());
    }

    #[test]
    fn test_day_rejects_impossible_date() {
        let err = day(2024, 2, 30).unwrap_err();
        assert!(err.to_string().contains("2024-02-30"));
        assert!(day(2024, 2, 29).is_ok());
    }

    #[test]
    fn test_sample_bundle() {
        let bundle = sample_bundle().unwrap();
        assert_eq!(bundle.course.name, "Web Development");
        assert_eq!(bundle.assignment_groups[0].assignments[1].name, "CSS Basics");
        assert_eq!(
            bundle.submissions[1].submission.submitted_at.to_rfc3339(),
            "2024-09-21T00:00:00+00:00"
        );
    }
}
