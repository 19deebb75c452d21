// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP error mapping.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde::{Deserialize, Serialize};
use swp_api_core::SearchError;
use thiserror::Error;

/// Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

#[derive(Debug, Error)]
pub enum ServerError {
	#[error(transparent)]
	Search(#[from] SearchError),
}

impl ServerError {
	pub fn status(&self) -> StatusCode {
		match self {
			ServerError::Search(SearchError::Forbidden) => StatusCode::FORBIDDEN,
			ServerError::Search(SearchError::InvalidEngine(_)) => StatusCode::BAD_REQUEST,
			ServerError::Search(SearchError::InvalidArgument { .. }) => StatusCode::BAD_REQUEST,
			ServerError::Search(SearchError::Engine(_)) => StatusCode::BAD_GATEWAY,
		}
	}

	pub fn code(&self) -> &'static str {
		match self {
			ServerError::Search(err) => err.code(),
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let status = self.status();
		if status.is_server_error() {
			tracing::error!(error = %self, status = status.as_u16(), "Search request failed");
		} else {
			tracing::warn!(error = %self, status = status.as_u16(), "Search request rejected");
		}

		let body = ErrorResponse {
			error: self.code().to_string(),
			message: self.to_string(),
		};
		(status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use swp_api_core::EngineError;

	#[test]
	fn test_status_mapping() {
		assert_eq!(
			ServerError::from(SearchError::Forbidden).status(),
			StatusCode::FORBIDDEN
		);
		assert_eq!(
			ServerError::from(SearchError::InvalidEngine("x".to_string())).status(),
			StatusCode::BAD_REQUEST
		);
		assert_eq!(
			ServerError::from(SearchError::InvalidArgument {
				param: "orderby".to_string(),
				message: "bad".to_string(),
			})
			.status(),
			StatusCode::BAD_REQUEST
		);
		assert_eq!(
			ServerError::from(SearchError::Engine(EngineError::Backend("down".to_string())))
				.status(),
			StatusCode::BAD_GATEWAY
		);
	}

	#[test]
	fn test_codes_follow_search_errors() {
		let err = ServerError::from(SearchError::InvalidEngine("nonexistent".to_string()));
		assert_eq!(err.code(), "invalid-search-engine");
		assert_eq!(err.to_string(), "Invalid search engine: nonexistent");
	}
}
