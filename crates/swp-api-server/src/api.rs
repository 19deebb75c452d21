// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Router and shared application state.

use std::sync::Arc;

use axum::{routing::get, Router};
use swp_api_config::ServerConfig;
use swp_api_core::{Dispatcher, SiteSettings};
use swp_api_memory::{MemoryEngine, PostProjection};

use crate::policy::policy_from_config;
use crate::routes;

/// Path of the search endpoint: namespace `swp_api`, route `/search`.
pub const SEARCH_PATH: &str = "/swp_api/search";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
	pub fn new(dispatcher: Dispatcher) -> Self {
		Self {
			dispatcher: Arc::new(dispatcher),
		}
	}
}

/// Wire the in-memory backend and the configured policy into a dispatcher.
pub fn create_app_state(config: &ServerConfig, engine: MemoryEngine) -> AppState {
	let engine = Arc::new(engine.with_engines(config.engines.names.iter().cloned()));

	let mut projection = PostProjection::new();
	if let Some(url) = &config.site.url {
		projection = projection.with_base_url(url.clone());
	}

	let dispatcher = Dispatcher::new(engine.clone(), engine, Arc::new(projection))
		.with_site(SiteSettings {
			default_posts_per_page: Some(config.site.default_posts_per_page),
		})
		.with_policy(policy_from_config(&config.policy));

	AppState::new(dispatcher)
}

pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route(SEARCH_PATH, get(routes::search::search))
		.route("/health", get(routes::health::health_check))
		.with_state(state)
}
