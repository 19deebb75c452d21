// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Deployment policy overrides.
//!
//! A [`PolicySet`] is handed to the dispatcher at construction and consulted
//! on every request, so a deployment can reshape the schema, cap page sizes
//! or restrict access without touching the dispatcher.

use std::fmt;
use std::sync::Arc;

use crate::request::SearchRequest;
use crate::schema::{ParameterSchema, SiteSettings};

/// Page-size ceiling applied when no policy overrides it.
pub const DEFAULT_MAX_POSTS_PER_PAGE: u64 = 50;

type SchemaMutator = dyn Fn(&mut ParameterSchema) + Send + Sync;
type MaxPageSizeFn = dyn Fn() -> u64 + Send + Sync;
type PermissionFn = dyn Fn(&SearchRequest) -> bool + Send + Sync;

/// Optional overrides consulted by the dispatcher.
#[derive(Clone, Default)]
pub struct PolicySet {
	schema_mutators: Vec<Arc<SchemaMutator>>,
	max_posts_per_page: Option<Arc<MaxPageSizeFn>>,
	permission: Option<Arc<PermissionFn>>,
}

impl PolicySet {
	/// Adds a schema mutator. Mutators run in registration order on every request.
	pub fn with_schema_mutator(
		mut self,
		mutator: impl Fn(&mut ParameterSchema) + Send + Sync + 'static,
	) -> Self {
		self.schema_mutators.push(Arc::new(mutator));
		self
	}

	/// Overrides the page-size ceiling.
	pub fn with_max_posts_per_page(
		mut self,
		provider: impl Fn() -> u64 + Send + Sync + 'static,
	) -> Self {
		self.max_posts_per_page = Some(Arc::new(provider));
		self
	}

	/// Overrides the permission decision. The last predicate set wins.
	pub fn with_permission(
		mut self,
		predicate: impl Fn(&SearchRequest) -> bool + Send + Sync + 'static,
	) -> Self {
		self.permission = Some(Arc::new(predicate));
		self
	}

	/// Denies every request.
	pub fn deny_all(self) -> Self {
		self.with_permission(|_| false)
	}

	/// Builds the schema for one request: the built-in table, then every mutator.
	pub fn resolve_schema(&self, site: &SiteSettings) -> ParameterSchema {
		let mut schema = ParameterSchema::builtin(site);
		for mutator in &self.schema_mutators {
			mutator(&mut schema);
		}
		schema
	}

	pub fn max_posts_per_page(&self) -> u64 {
		self.max_posts_per_page
			.as_ref()
			.map(|provider| provider())
			.unwrap_or(DEFAULT_MAX_POSTS_PER_PAGE)
	}

	/// The permission gate. Public unless a predicate says otherwise.
	pub fn is_allowed(&self, request: &SearchRequest) -> bool {
		self.permission
			.as_ref()
			.map(|predicate| predicate(request))
			.unwrap_or(true)
	}
}

impl fmt::Debug for PolicySet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PolicySet")
			.field("schema_mutators", &self.schema_mutators.len())
			.field("max_posts_per_page", &self.max_posts_per_page.is_some())
			.field("permission", &self.permission.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sanitize::Sanitizer;
	use crate::schema::{params, ParameterSpec};
	use serde_json::json;
	use std::sync::atomic::{AtomicU64, Ordering};

	#[test]
	fn test_defaults() {
		let policy = PolicySet::default();
		assert_eq!(policy.max_posts_per_page(), DEFAULT_MAX_POSTS_PER_PAGE);
		assert!(policy.is_allowed(&SearchRequest::default()));
		assert_eq!(
			policy.resolve_schema(&SiteSettings::default()).len(),
			ParameterSchema::builtin(&SiteSettings::default()).len()
		);
	}

	#[test]
	fn test_deny_all() {
		let policy = PolicySet::default().deny_all();
		assert!(!policy.is_allowed(&SearchRequest::default()));
	}

	#[test]
	fn test_permission_sees_request() {
		let policy = PolicySet::default()
			.with_permission(|request| request.param("token") == Some(&json!("secret")));

		let mut request = SearchRequest::default();
		assert!(!policy.is_allowed(&request));
		request.insert("token", json!("secret"));
		assert!(policy.is_allowed(&request));
	}

	#[test]
	fn test_schema_mutators_run_in_order() {
		let policy = PolicySet::default()
			.with_schema_mutator(|schema| {
				schema.insert(ParameterSpec::new("orderby", json!("relevance"), Sanitizer::text()));
			})
			.with_schema_mutator(|schema| {
				schema.remove(params::DATE_QUERY);
				if let Some(spec) = schema.get_mut("orderby") {
					spec.default = json!("date");
				}
			});

		let schema = policy.resolve_schema(&SiteSettings::default());
		assert!(!schema.contains(params::DATE_QUERY));
		assert_eq!(schema.get("orderby").unwrap().default, json!("date"));
	}

	#[test]
	fn test_max_provider_is_consulted_each_time() {
		let max = Arc::new(AtomicU64::new(20));
		let source = Arc::clone(&max);
		let policy =
			PolicySet::default().with_max_posts_per_page(move || source.load(Ordering::SeqCst));

		assert_eq!(policy.max_posts_per_page(), 20);
		max.store(5, Ordering::SeqCst);
		assert_eq!(policy.max_posts_per_page(), 5);
	}
}
