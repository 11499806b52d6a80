use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// `{message, results}` envelope used by every single-record endpoint
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub results: Option<T>,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, results: T) -> Self {
        Self {
            message: message.into(),
            results: Some(results),
            status_code: StatusCode::OK,
        }
    }

    pub fn created(message: impl Into<String>, results: T) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            ..Self::success(message, results)
        }
    }
}

impl ApiResponse<()> {
    /// Message without a `results` field, e.g. after a delete
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            results: None,
            status_code: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = match &self.results {
            None => json!({ "message": self.message }),
            Some(results) => match serde_json::to_value(results) {
                Ok(value) => json!({ "message": self.message, "results": value }),
                Err(e) => {
                    tracing::error!("Failed to serialize response data: {}", e);
                    return crate::error::ApiError::internal_server_error("Failed to format response").into_response();
                }
            },
        };

        (self.status_code, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
