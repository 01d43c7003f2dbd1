//! Error types: upstream (osu! API) failures and HTTP-facing API errors.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum OsuApiError {
  #[error("osu! API not configured (OSU_CLIENT_ID / OSU_CLIENT_SECRET missing)")]
  Disabled,

  #[error("osu! API request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("osu! API returned HTTP {status}: {message}")]
  Status { status: u16, message: String },

  #[error("osu! API payload rejected: {0}")]
  Payload(#[from] serde_json::Error),
}

/// Errors surfaced to HTTP clients as `{ "error": ..., "code": ... }`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("Unauthorized")]
  Unauthorized,

  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  NotFound(String),

  #[error(transparent)]
  Upstream(#[from] OsuApiError),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Upstream(OsuApiError::Disabled) => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
    }
  }

  pub fn code(&self) -> &'static str {
    match self {
      ApiError::Unauthorized => "unauthorized",
      ApiError::BadRequest(_) => "bad_request",
      ApiError::NotFound(_) => "not_found",
      ApiError::Upstream(OsuApiError::Disabled) => "upstream_disabled",
      ApiError::Upstream(_) => "upstream_failed",
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(target: "dailypp_backend", %status, error = %self, "Request failed");
    } else {
      warn!(target: "dailypp_backend", %status, error = %self, "Request rejected");
    }
    let body = serde_json::json!({ "error": self.to_string(), "code": self.code() });
    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn statuses() {
    assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(ApiError::NotFound("Challenge not found".into()).status(), StatusCode::NOT_FOUND);
    assert_eq!(ApiError::from(OsuApiError::Disabled).status(), StatusCode::SERVICE_UNAVAILABLE);
    let upstream = OsuApiError::Status { status: 500, message: "boom".into() };
    assert_eq!(ApiError::from(upstream).status(), StatusCode::BAD_GATEWAY);
  }

  #[test]
  fn upstream_message_is_transparent() {
    let err = ApiError::from(OsuApiError::Status { status: 404, message: "User not found".into() });
    assert_eq!(err.to_string(), "osu! API returned HTTP 404: User not found");
  }
}
