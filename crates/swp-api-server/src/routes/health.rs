// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Health HTTP handler.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
	pub status: String,
	pub engines: Vec<String>,
}

/// GET /health - Liveness plus the live engine names.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "ok".to_string(),
		engines: state.dispatcher.registry().engine_names(),
	})
}
