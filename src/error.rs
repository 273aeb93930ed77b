use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::store::StoreKind;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid CSV headers")]
    InvalidHeaders {
        expected: BTreeMap<&'static str, &'static str>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    /// A mirrored write committed on some stores and failed on a later one.
    /// The committed stores are not rolled back.
    #[error("Mirror diverged: committed on {committed:?}, failed on {failed}: {source}")]
    PartialMirrorFailure {
        committed: Vec<StoreKind>,
        failed: StoreKind,
        source: Box<AppError>,
    },

    #[error("Script exited with code {code:?}")]
    Script { code: Option<i32>, stderr: String },

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        Self::BadRequest(err.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, error) = match &self {
            Self::Database(e) => {
                tracing::error!("Database error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                    e.to_string(),
                )
            }
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), msg.clone()),
            Self::InvalidHeaders { expected } => {
                let body = Json(json!({
                    "success": false,
                    "message": "Invalid CSV headers",
                    "error": "Header row does not match any known upload schema",
                    "expectedHeaders": expected,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), msg.clone()),
            Self::PartialMirrorFailure {
                committed,
                failed,
                source,
            } => {
                tracing::error!(?committed, %failed, error = %source, "Stores diverged");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Write committed on {committed:?} but failed on {failed}"),
                    source.to_string(),
                )
            }
            Self::Script { code, stderr } => {
                tracing::error!(?code, stderr = %stderr, "ETL script failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Script exited with code {code:?}"),
                    stderr.clone(),
                )
            }
            Self::Config(e) => {
                tracing::error!("Config error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                    e.to_string(),
                )
            }
            Self::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    msg.clone(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
            "error": error,
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
