// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The search dispatcher.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, error, instrument, warn};

use crate::engine::{CleanArgs, CollectionItem, EngineRegistry, ItemProjection, SearchEngine};
use crate::error::{Result, SearchError};
use crate::policy::PolicySet;
use crate::request::SearchRequest;
use crate::sanitize::SanitizeContext;
use crate::schema::{params, FailureMode, ParameterSchema, SiteSettings};
use crate::validate::ValidateContext;

/// Projected items plus pagination metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
	pub items: Vec<CollectionItem>,
	pub total: Option<u64>,
	pub total_pages: Option<u64>,
}

impl SearchResults {
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

/// Turns raw search requests into engine calls and projected results.
#[derive(Clone)]
pub struct Dispatcher {
	site: SiteSettings,
	policy: PolicySet,
	registry: Arc<dyn EngineRegistry>,
	engine: Arc<dyn SearchEngine>,
	projection: Arc<dyn ItemProjection>,
}

impl Dispatcher {
	pub fn new(
		registry: Arc<dyn EngineRegistry>,
		engine: Arc<dyn SearchEngine>,
		projection: Arc<dyn ItemProjection>,
	) -> Self {
		Self {
			site: SiteSettings::default(),
			policy: PolicySet::default(),
			registry,
			engine,
			projection,
		}
	}

	pub fn with_policy(mut self, policy: PolicySet) -> Self {
		self.policy = policy;
		self
	}

	pub fn with_site(mut self, site: SiteSettings) -> Self {
		self.site = site;
		self
	}

	pub fn policy(&self) -> &PolicySet {
		&self.policy
	}

	pub fn registry(&self) -> &Arc<dyn EngineRegistry> {
		&self.registry
	}

	/// The schema in force right now, after every policy mutator.
	pub fn schema(&self) -> ParameterSchema {
		self.policy.resolve_schema(&self.site)
	}

	/// Serve one request: permission gate, argument cleaning, engine call, projection.
	#[instrument(skip_all, fields(params = request.params().len()))]
	pub async fn handle(&self, request: &SearchRequest) -> Result<SearchResults> {
		if !self.policy.is_allowed(request) {
			warn!("Search request denied by permission policy");
			return Err(SearchError::Forbidden);
		}

		let args = self.clean_args(request)?;

		let outcome = self.engine.search(&args).await.map_err(|e| {
			error!(error = %e, "Search engine failed");
			SearchError::from(e)
		})?;

		let items: Vec<CollectionItem> = outcome
			.items
			.iter()
			.map(|item| {
				let projected = self.projection.project_for_response(item, request);
				self.projection.project_for_collection(projected)
			})
			.collect();

		debug!(items = items.len(), total = ?outcome.total, "Search completed");

		Ok(SearchResults {
			items,
			total: outcome.total,
			total_pages: outcome.total.map(|total| total_pages(total, &args)),
		})
	}

	/// Build the clean argument set for `request`.
	///
	/// Every schema entry appears with its sanitized default, overlaid by the
	/// sanitized and validated values the caller supplied. Keys the schema does
	/// not know never make it into the result.
	pub fn clean_args(&self, request: &SearchRequest) -> Result<CleanArgs> {
		let schema = self.schema();
		let sanitize_ctx = SanitizeContext {
			max_posts_per_page: self.policy.max_posts_per_page(),
		};
		let validate_ctx = ValidateContext {
			registry: self.registry.as_ref(),
		};

		let mut args: BTreeMap<String, Value> = schema
			.iter()
			.map(|spec| (spec.name.clone(), spec.sanitize.apply(&spec.default, &sanitize_ctx)))
			.collect();

		for (name, raw) in request.params() {
			let Some(spec) = schema.get(name) else {
				debug!(param = %name, "Dropping unknown parameter");
				continue;
			};

			let value = spec.sanitize.apply(raw, &sanitize_ctx);
			let outcome = match &spec.validate {
				Some(validator) => validator.apply(&value, &validate_ctx),
				None => Ok(()),
			};

			let value = match outcome {
				Ok(()) => value,
				Err(err) => match spec.on_invalid {
					FailureMode::Degrade => {
						debug!(
							param = %name,
							error = %err,
							"Degrading invalid parameter to empty map"
						);
						Value::Object(Map::new())
					}
					FailureMode::Reject => {
						warn!(param = %name, error = %err, "Rejecting search request");
						return Err(SearchError::from_validation(name, err));
					}
				},
			};

			args.insert(name.clone(), value);
		}

		Ok(CleanArgs::new(args))
	}
}

/// Number of result pages for `total` matches under the clean arguments.
pub fn total_pages(total: u64, args: &CleanArgs) -> u64 {
	if total == 0 {
		return 0;
	}
	if args.bool(params::NOPAGING) {
		return 1;
	}
	let per_page = args.u64(params::POSTS_PER_PAGE).unwrap_or(1).max(1);
	total.div_ceil(per_page)
}
