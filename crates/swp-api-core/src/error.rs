// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for search dispatch.

use thiserror::Error;

/// Result type for dispatcher operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors surfaced to the caller of the search endpoint.
#[derive(Debug, Error)]
pub enum SearchError {
	/// The permission gate denied the request.
	#[error("Sorry, you are not allowed to search")]
	Forbidden,

	/// The requested engine is unknown to the engine registry.
	#[error("Invalid search engine: {0}")]
	InvalidEngine(String),

	/// A strictly validated parameter failed its validator.
	#[error("Invalid parameter {param}: {message}")]
	InvalidArgument { param: String, message: String },

	/// The external search engine failed.
	#[error("Search engine error: {0}")]
	Engine(#[from] EngineError),
}

impl SearchError {
	/// Machine-readable error code used in HTTP error bodies.
	pub fn code(&self) -> &'static str {
		match self {
			SearchError::Forbidden => "forbidden",
			SearchError::InvalidEngine(_) => "invalid-search-engine",
			SearchError::InvalidArgument { .. } => "invalid-argument",
			SearchError::Engine(_) => "search-engine-error",
		}
	}

	/// Map a validator failure on `param` to the caller-facing error.
	pub fn from_validation(param: &str, error: ValidationError) -> Self {
		match error {
			ValidationError::InvalidEngine(name) => SearchError::InvalidEngine(name),
			other => SearchError::InvalidArgument {
				param: param.to_string(),
				message: other.to_string(),
			},
		}
	}
}

/// Failures reported by schema validators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
	#[error("Invalid search engine: {0}")]
	InvalidEngine(String),

	/// A structured sub-query lacks required keys. Recovered by fail-soft entries.
	#[error("malformed sub-query, missing keys: {}", missing.join(", "))]
	MalformedSubQuery { missing: Vec<String> },

	#[error("{0}")]
	Invalid(String),
}

/// Errors raised by the external search collaborators.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("unknown search engine: {0}")]
	UnknownEngine(String),

	#[error("backend failure: {0}")]
	Backend(String),
}
