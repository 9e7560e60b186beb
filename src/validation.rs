//! Checks submitted student records before anything touches the database.
//!
//! Both the JSON API and the htmx form post into a [`StudentSubmission`]. Every field
//! is kept as a loose [`FieldValue`] (forms only ever send strings, JSON clients send
//! anything), so a value of the wrong type fails its rule here instead of failing to
//! deserialize.

use crate::{
    data::student::{NewStudent, StudentChanges},
    error::{RosterError, RosterResult},
};
use serde::{Deserialize, Serialize};

pub const MIN_STUDENT_ID: i32 = 1;
pub const MAX_STUDENT_ID: i32 = 10;
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: &'static str,
    pub msg: &'static str,
}

impl FieldError {
    pub const fn new(path: &'static str, msg: &'static str) -> Self {
        Self { path, msg }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl FieldValue {
    fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) | Self::Other(_) => None,
        }
    }

    //numeric strings are taken exactly as sent, surrounding whitespace makes them invalid
    #[allow(clippy::cast_possible_truncation)]
    fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.is_finite())
                    .map(|f| f as i64)
            }),
            Self::Text(s) => s.parse().ok(),
            Self::Other(_) => None,
        }
    }

    fn as_float(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(s) => s.parse().ok(),
            Self::Other(_) => None,
        };
        value.filter(|f| f.is_finite())
    }
}

/// A raw record as submitted, before any checks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentSubmission {
    pub first_name: Option<FieldValue>,
    pub middle_name: Option<FieldValue>,
    pub last_name: Option<FieldValue>,
    pub student_id: Option<FieldValue>,
    pub score: Option<FieldValue>,
}

struct CommonFields {
    first_name: Option<String>,
    middle_name: Option<String>,
    last_name: Option<String>,
    score: Option<f64>,
}

fn required_name(raw: Option<&FieldValue>) -> Option<String> {
    raw.and_then(FieldValue::as_text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

impl StudentSubmission {
    fn student_id(&self) -> Option<i32> {
        self.student_id
            .as_ref()
            .and_then(FieldValue::as_integer)
            .and_then(|id| i32::try_from(id).ok())
            .filter(|id| (MIN_STUDENT_ID..=MAX_STUDENT_ID).contains(id))
    }

    fn common_fields(&self) -> CommonFields {
        CommonFields {
            first_name: required_name(self.first_name.as_ref()),
            middle_name: required_name(self.middle_name.as_ref()),
            last_name: required_name(self.last_name.as_ref()),
            score: self
                .score
                .as_ref()
                .and_then(FieldValue::as_float)
                .filter(|score| (MIN_SCORE..=MAX_SCORE).contains(score)),
        }
    }
}

/// Validates a record for creation, including the externally supplied id.
pub fn validate_new(submission: &StudentSubmission) -> Result<NewStudent, Vec<FieldError>> {
    let common = submission.common_fields();
    let id = submission.student_id();

    let mut errors = common_errors(&common);
    if id.is_none() {
        errors.insert(
            errors
                .iter()
                .position(|e| e.path == "score")
                .unwrap_or(errors.len()),
            FieldError::new("studentId", "Student ID must be between 1 and 10"),
        );
    }

    match (id, common) {
        (
            Some(id),
            CommonFields {
                first_name: Some(first_name),
                middle_name,
                last_name: Some(last_name),
                score: Some(score),
            },
        ) if errors.is_empty() => Ok(NewStudent {
            id,
            first_name,
            middle_name,
            last_name,
            score,
        }),
        _ => Err(errors),
    }
}

/// Validates a record for update. The id comes from the path, so any `studentId` in
/// the submission is ignored.
pub fn validate_changes(
    submission: &StudentSubmission,
) -> Result<StudentChanges, Vec<FieldError>> {
    let common = submission.common_fields();
    let errors = common_errors(&common);

    match common {
        CommonFields {
            first_name: Some(first_name),
            middle_name,
            last_name: Some(last_name),
            score: Some(score),
        } if errors.is_empty() => Ok(StudentChanges {
            first_name,
            middle_name,
            last_name,
            score,
        }),
        _ => Err(errors),
    }
}

/// Reads an id taken from a URL. Anything that cannot name a stored student is reported
/// the same way as an id nobody has.
pub fn parse_student_id(raw: &str) -> RosterResult<i32> {
    raw.parse().map_err(|_| RosterError::UnknownStudentId {
        raw: raw.to_string(),
    })
}

fn common_errors(common: &CommonFields) -> Vec<FieldError> {
    let mut errors = vec![];
    if common.first_name.is_none() {
        errors.push(FieldError::new("firstName", "First name is required"));
    }
    if common.last_name.is_none() {
        errors.push(FieldError::new("lastName", "Last name is required"));
    }
    if common.score.is_none() {
        errors.push(FieldError::new("score", "Score must be between 0 and 100"));
    }
    errors
}
