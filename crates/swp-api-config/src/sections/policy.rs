// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access and shaping policy for the search endpoint.

use std::net::IpAddr;

use serde::Deserialize;

// Mirrors `swp_api_core::DEFAULT_MAX_POSTS_PER_PAGE`.
const DEFAULT_MAX_POSTS_PER_PAGE: u64 = 50;

/// Policy configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
	/// Ceiling for `posts_per_page`.
	pub max_posts_per_page: u64,
	/// When false every search is refused.
	pub allow_query: bool,
	/// Client addresses allowed to search. Empty means everyone.
	pub allowed_ips: Vec<IpAddr>,
	/// Reverse proxies whose `X-Forwarded-For` entries are believed.
	pub trusted_proxies: Vec<IpAddr>,
	/// Parameters removed from the schema.
	pub disabled_params: Vec<String>,
}

impl Default for PolicyConfig {
	fn default() -> Self {
		Self {
			max_posts_per_page: DEFAULT_MAX_POSTS_PER_PAGE,
			allow_query: true,
			allowed_ips: Vec::new(),
			trusted_proxies: Vec::new(),
			disabled_params: Vec::new(),
		}
	}
}

/// Policy configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyConfigLayer {
	#[serde(default)]
	pub max_posts_per_page: Option<u64>,
	#[serde(default)]
	pub allow_query: Option<bool>,
	#[serde(default)]
	pub allowed_ips: Option<Vec<IpAddr>>,
	#[serde(default)]
	pub trusted_proxies: Option<Vec<IpAddr>>,
	#[serde(default)]
	pub disabled_params: Option<Vec<String>>,
}

impl PolicyConfigLayer {
	pub fn merge(&mut self, other: PolicyConfigLayer) {
		if other.max_posts_per_page.is_some() {
			self.max_posts_per_page = other.max_posts_per_page;
		}
		if other.allow_query.is_some() {
			self.allow_query = other.allow_query;
		}
		if other.allowed_ips.is_some() {
			self.allowed_ips = other.allowed_ips;
		}
		if other.trusted_proxies.is_some() {
			self.trusted_proxies = other.trusted_proxies;
		}
		if other.disabled_params.is_some() {
			self.disabled_params = other.disabled_params;
		}
	}

	pub fn finalize(self) -> PolicyConfig {
		PolicyConfig {
			max_posts_per_page: self.max_posts_per_page.unwrap_or(DEFAULT_MAX_POSTS_PER_PAGE),
			allow_query: self.allow_query.unwrap_or(true),
			allowed_ips: self.allowed_ips.unwrap_or_default(),
			trusted_proxies: self.trusted_proxies.unwrap_or_default(),
			disabled_params: self.disabled_params.unwrap_or_default(),
		}
	}
}
