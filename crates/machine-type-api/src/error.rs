//! API errors
//!
//! Every error is answered with a Kubernetes `Status` object so `kubectl`
//! style clients can print the message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be decoded
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::Internal(_) => "InternalError",
        }
    }

    /// Kubernetes `Status` describing the failure.
    pub fn to_status(&self) -> Status {
        Status {
            code: Some(i32::from(self.status_code().as_u16())),
            message: Some(self.to_string()),
            reason: Some(self.reason().to_string()),
            status: Some("Failure".to_string()),
            ..Default::default()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_status())).into_response()
    }
}

/// Result type alias for handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_body() {
        let err = ApiError::Internal("failed getting machine-type-updater image".to_string());
        let body = serde_json::to_value(err.to_status()).unwrap();

        assert_eq!(body["kind"], "Status");
        assert_eq!(body["apiVersion"], "v1");
        assert_eq!(body["status"], "Failure");
        assert_eq!(body["reason"], "InternalError");
        assert_eq!(body["code"], 500);
        assert_eq!(body["message"], "failed getting machine-type-updater image");
    }

    #[test]
    fn test_bad_request_code() {
        let err = ApiError::BadRequest("nope".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_status().code, Some(400));
    }
}
