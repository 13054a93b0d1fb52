/*
 * Responsibility
 * - Gate が返す拒否レスポンス (GateRejection) の定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - 内部エラーの詳細はログにのみ出し、body には固定文言だけを返す
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Every way the gate can turn a request away.
///
/// The `Display` text is the exact `error` string sent to the client, so the
/// two 400 variants differ only in the casing of "request".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateRejection {
    // Configured key/endpoint is unusable (per-request fault mode only).
    #[error("Bad request")]
    InvalidConfiguration,
    #[error("Bad Request")]
    BadRequest,
    #[error("Unauthorized")]
    Unauthorized,
    // Unknown authLevel (per-request fault mode only).
    #[error("Server Internal Error")]
    Internal,
}

impl GateRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            GateRejection::InvalidConfiguration | GateRejection::BadRequest => {
                StatusCode::BAD_REQUEST
            }
            GateRejection::Unauthorized => StatusCode::UNAUTHORIZED,
            GateRejection::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };

        (self.status(), Json(body)).into_response()
    }
}
