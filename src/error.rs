use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudentError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("Student ID {0} already exists")]
    DuplicateId(String),
    #[error("Student {0} not found")]
    NotFound(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StudentError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        StudentError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            StudentError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            StudentError::DuplicateId(_) => StatusCode::BAD_REQUEST,
            StudentError::NotFound(_) => StatusCode::NOT_FOUND,
            StudentError::Csv(_) | StudentError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StudentError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
