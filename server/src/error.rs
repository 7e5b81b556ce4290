use ntex::http::StatusCode;
use ntex::web::{HttpResponse, WebResponseError};
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed client input.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl WebResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self, _: &ntex::web::HttpRequest) -> HttpResponse {
        let message = match self {
            AppError::Validation(msg) | AppError::NotFound(msg) => msg.as_str(),
            AppError::Storage(e) => {
                tracing::error!("{}", e);
                "Failed to access leaderboard storage"
            }
        };
        HttpResponse::build(self.status_code()).json(&serde_json::json!({ "error": message }))
    }
}
