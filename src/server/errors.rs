use crate::utils::error::{ErrorCategory, StockError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

impl IntoResponse for StockError {
    fn into_response(self) -> Response {
        match &self {
            StockError::NotFound { .. } => {
                json_error(StatusCode::NOT_FOUND, "not_found", self.to_string())
            }
            StockError::ValidationError { .. } => json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                self.user_friendly_message(),
            ),
            StockError::CsvError(_) => {
                json_error(StatusCode::BAD_REQUEST, "invalid_csv", self.to_string())
            }
            _ => {
                tracing::error!("❌ Request failed ({:?}): {}", self.category(), self);
                let code = match self.category() {
                    ErrorCategory::Configuration => "configuration_error",
                    _ => "store_error",
                };
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    code,
                    self.user_friendly_message(),
                )
            }
        }
    }
}
