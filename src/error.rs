use crate::{maud_conveniences::error_alert, validation::FieldError};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use snafu::Snafu;
use std::num::ParseIntError;

pub type RosterResult<T> = Result<T, RosterError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RosterError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    Migrate { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Missing required env var `{}`", name))]
    MissingEnvVar { name: &'static str },
    #[snafu(display("Unable to parse env var `{}` as a number", name))]
    ParseEnvNumber {
        source: ParseIntError,
        name: &'static str,
    },
    #[snafu(display("Unable to bind to {}", address))]
    Bind {
        source: std::io::Error,
        address: String,
    },
    #[snafu(display("Error serving app"))]
    Serve { source: std::io::Error },
    #[snafu(display("Validation failed"))]
    Validation { errors: Vec<FieldError> },
    #[snafu(display("Student ID already exists"))]
    DuplicateStudent { id: i32 },
    #[snafu(display("Student not found"))]
    MissingStudent { id: i32 },
    #[snafu(display("Student not found"))]
    UnknownStudentId { raw: String },
    #[snafu(display("Malformed request body"))]
    MalformedBody { source: JsonRejection },
    #[snafu(display("Invalid sort field"))]
    InvalidSortField { field: String },
}

impl RosterError {
    pub fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input

        match self {
            Self::OpenDatabase { .. } | Self::Migrate { .. } => ISE,
            Self::MakeQuery { source } => match source {
                sqlx::Error::RowNotFound => NF,
                sqlx::Error::Database(db)
                    if matches!(db.kind(), sqlx::error::ErrorKind::CheckViolation) =>
                {
                    BI
                }
                _ => ISE,
            },
            Self::BadEnvVar { .. } | Self::MissingEnvVar { .. } | Self::ParseEnvNumber { .. } => {
                ISE
            }
            Self::Bind { .. } | Self::Serve { .. } => ISE,
            Self::Validation { .. } => BI,
            Self::DuplicateStudent { .. } => BI,
            Self::MissingStudent { .. } | Self::UnknownStudentId { .. } => NF,
            Self::MalformedBody { source } if source.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            Self::MalformedBody { .. } => BI,
            Self::InvalidSortField { .. } => BI,
        }
    }

    /// The message shown to clients. Internal failures never leak their details.
    pub fn public_message(&self) -> String {
        if self.status_code().is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }

    fn log(&self, status_code: StatusCode) {
        if status_code.is_server_error() {
            error!(?self, "Error!");
        } else {
            warn!(?self, %status_code, "Rejected request");
        }
    }
}

impl IntoResponse for RosterError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        self.log(status_code);

        let body = match &self {
            Self::Validation { errors } => json!({ "errors": errors }),
            _ => json!({ "error": self.public_message() }),
        };

        (status_code, Json(body)).into_response()
    }
}

/// Wraps a [`RosterError`] so that htmx routes get a rendered alert rather than JSON.
#[derive(Debug)]
pub struct HtmlError(pub RosterError);

pub type HtmlResult<T> = Result<T, HtmlError>;

impl From<RosterError> for HtmlError {
    fn from(value: RosterError) -> Self {
        Self(value)
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        let Self(inner) = self;
        let status_code = inner.status_code();
        inner.log(status_code);

        (status_code, error_alert(inner.public_message())).into_response()
    }
}
