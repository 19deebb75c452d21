// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The declarative parameter schema of the search endpoint.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::sanitize::Sanitizer;
use crate::validate::{Validator, DATE_QUERY_KEYS, META_QUERY_KEYS, TAX_QUERY_KEYS};

/// Names of the built-in parameters.
pub mod params {
	pub const S: &str = "s";
	pub const ENGINE: &str = "engine";
	pub const POSTS_PER_PAGE: &str = "posts_per_page";
	pub const NOPAGING: &str = "nopaging";
	pub const LOAD_POSTS: &str = "load_posts";
	pub const PAGE: &str = "page";
	pub const POST_IN: &str = "post__in";
	pub const POST_NOT_IN: &str = "post__not_in";
	pub const TAX_QUERY: &str = "tax_query";
	pub const META_QUERY: &str = "meta_query";
	pub const DATE_QUERY: &str = "date_query";
}

/// Page size used when the site does not configure one.
pub const FALLBACK_POSTS_PER_PAGE: u64 = 15;

/// Engine selected when the caller names none.
pub const DEFAULT_ENGINE: &str = "default";

/// Site-level settings owned by the host platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteSettings {
	pub default_posts_per_page: Option<u64>,
}

impl SiteSettings {
	pub fn posts_per_page(&self) -> u64 {
		self.default_posts_per_page
			.unwrap_or(FALLBACK_POSTS_PER_PAGE)
	}
}

/// What happens when an entry's validator fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
	/// Reject the whole request.
	#[default]
	Reject,
	/// Replace the value with an empty map and carry on.
	Degrade,
}

/// Contract of a single accepted parameter.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
	pub name: String,
	pub default: Value,
	pub sanitize: Sanitizer,
	pub validate: Option<Validator>,
	pub on_invalid: FailureMode,
}

impl ParameterSpec {
	pub fn new(name: impl Into<String>, default: Value, sanitize: Sanitizer) -> Self {
		Self {
			name: name.into(),
			default,
			sanitize,
			validate: None,
			on_invalid: FailureMode::Reject,
		}
	}

	pub fn with_validator(mut self, validator: Validator) -> Self {
		self.validate = Some(validator);
		self
	}

	/// Degrade to an empty map instead of rejecting when validation fails.
	pub fn fail_soft(mut self) -> Self {
		self.on_invalid = FailureMode::Degrade;
		self
	}
}

/// Table of accepted parameters, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ParameterSchema {
	entries: BTreeMap<String, ParameterSpec>,
}

impl ParameterSchema {
	/// The endpoint's built-in parameters.
	pub fn builtin(site: &SiteSettings) -> Self {
		let mut schema = Self::default();

		schema.insert(ParameterSpec::new(params::S, json!(""), Sanitizer::text()));
		schema.insert(
			ParameterSpec::new(params::ENGINE, json!(DEFAULT_ENGINE), Sanitizer::text())
				.with_validator(Validator::engine_exists()),
		);
		schema.insert(ParameterSpec::new(
			params::POSTS_PER_PAGE,
			json!(site.posts_per_page()),
			Sanitizer::clamp_to_max(),
		));
		schema.insert(ParameterSpec::new(params::NOPAGING, json!(0), Sanitizer::boolean()));
		schema.insert(ParameterSpec::new(params::LOAD_POSTS, json!(1), Sanitizer::boolean()));
		schema.insert(ParameterSpec::new(params::PAGE, json!(1), Sanitizer::nonneg_int()));
		schema.insert(ParameterSpec::new(params::POST_IN, json!(false), Sanitizer::comma_list()));
		schema.insert(ParameterSpec::new(
			params::POST_NOT_IN,
			json!(false),
			Sanitizer::comma_list(),
		));

		for (name, keys) in [
			(params::TAX_QUERY, TAX_QUERY_KEYS),
			(params::META_QUERY, META_QUERY_KEYS),
			(params::DATE_QUERY, DATE_QUERY_KEYS),
		] {
			schema.insert(
				ParameterSpec::new(name, json!(false), Sanitizer::strip_tags_map())
					.with_validator(Validator::require_keys(keys))
					.fail_soft(),
			);
		}

		schema
	}

	/// Add or replace an entry, returning the one it replaced.
	pub fn insert(&mut self, spec: ParameterSpec) -> Option<ParameterSpec> {
		self.entries.insert(spec.name.clone(), spec)
	}

	pub fn remove(&mut self, name: &str) -> Option<ParameterSpec> {
		self.entries.remove(name)
	}

	pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
		self.entries.get(name)
	}

	pub fn get_mut(&mut self, name: &str) -> Option<&mut ParameterSpec> {
		self.entries.get_mut(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = &ParameterSpec> {
		self.entries.values()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
