// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Term-frequency search over a [`MemoryIndex`].

use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use swp_api_core::schema::{params, DEFAULT_ENGINE};
use swp_api_core::{CleanArgs, EngineError, EngineRegistry, SearchEngine, SearchOutcome};
use tracing::{debug, instrument};

use crate::filters::{id_set, matches_date_query, matches_meta_query, matches_tax_query};
use crate::index::{MemoryIndex, Post};
use crate::tokenizer::{count_matches, tokenize};

/// Title hits count this many times a body hit.
const TITLE_WEIGHT: usize = 2;

/// Engine registry and search engine backed by an in-memory index.
///
/// Every configured engine name searches the same index; `default` is always
/// registered.
#[derive(Debug, Clone)]
pub struct MemoryEngine {
	index: Arc<MemoryIndex>,
	engines: Vec<String>,
}

impl MemoryEngine {
	pub fn new(index: MemoryIndex) -> Self {
		Self {
			index: Arc::new(index),
			engines: vec![DEFAULT_ENGINE.to_string()],
		}
	}

	/// Register additional engine names.
	pub fn with_engines<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		for name in names {
			let name = name.into();
			if !self.engines.contains(&name) {
				self.engines.push(name);
			}
		}
		self
	}

	pub fn index(&self) -> &MemoryIndex {
		&self.index
	}

	fn score(post: &Post, terms: &[String]) -> usize {
		count_matches(terms, &post.title) * TITLE_WEIGHT
			+ count_matches(terms, &post.content)
			+ count_matches(terms, &post.excerpt)
	}

	fn passes_filters(post: &Post, args: &CleanArgs) -> bool {
		if let Some(list) = args.list(params::POST_IN) {
			if !id_set(list).contains(&post.id) {
				return false;
			}
		}
		if let Some(list) = args.list(params::POST_NOT_IN) {
			if id_set(list).contains(&post.id) {
				return false;
			}
		}
		if let Some(clause) = args.map(params::TAX_QUERY) {
			if !matches_tax_query(post, clause) {
				return false;
			}
		}
		if let Some(clause) = args.map(params::META_QUERY) {
			if !matches_meta_query(post, clause) {
				return false;
			}
		}
		if let Some(clause) = args.map(params::DATE_QUERY) {
			if !matches_date_query(post, clause) {
				return false;
			}
		}
		true
	}
}

impl EngineRegistry for MemoryEngine {
	fn is_valid_engine(&self, name: &str) -> bool {
		self.engines.iter().any(|engine| engine == name)
	}

	fn engine_names(&self) -> Vec<String> {
		self.engines.clone()
	}
}

#[async_trait]
impl SearchEngine for MemoryEngine {
	#[instrument(skip_all, fields(engine = %args.str(params::ENGINE).unwrap_or_default()))]
	async fn search(&self, args: &CleanArgs) -> Result<SearchOutcome, EngineError> {
		let engine = args
			.str(params::ENGINE)
			.unwrap_or_else(|| DEFAULT_ENGINE.to_string());
		if !self.is_valid_engine(&engine) {
			return Err(EngineError::UnknownEngine(engine));
		}

		let terms = tokenize(&args.str(params::S).unwrap_or_default());

		let mut hits: Vec<(usize, &Post)> = self
			.index
			.posts()
			.iter()
			.filter(|post| post.is_published())
			.filter(|post| Self::passes_filters(post, args))
			.map(|post| (Self::score(post, &terms), post))
			.filter(|(score, _)| terms.is_empty() || *score > 0)
			.collect();

		hits.sort_by_key(|(score, post)| (Reverse(*score), Reverse(post.date), post.id));

		let total = hits.len() as u64;
		let page: Vec<&Post> = if args.bool(params::NOPAGING) {
			hits.into_iter().map(|(_, post)| post).collect()
		} else {
			let per_page = args.u64(params::POSTS_PER_PAGE).unwrap_or(0) as usize;
			let page = args.u64(params::PAGE).unwrap_or(1).max(1) as usize;
			hits.into_iter()
				.skip((page - 1).saturating_mul(per_page))
				.take(per_page)
				.map(|(_, post)| post)
				.collect()
		};

		let items = if args.bool(params::LOAD_POSTS) {
			page.into_iter()
				.map(|post| {
					serde_json::to_value(post).map_err(|e| EngineError::Backend(e.to_string()))
				})
				.collect::<Result<Vec<Value>, _>>()?
		} else {
			page.into_iter().map(|post| json!(post.id)).collect()
		};

		debug!(terms = terms.len(), total, returned = items.len(), "Memory search finished");
		Ok(SearchOutcome::new(items).with_total(total))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn engine() -> MemoryEngine {
		let index = MemoryIndex::from_json(
			r#"[
				{"id": 1, "title": "Cat care", "content": "Feeding your cat", "date": "2024-01-01T00:00:00",
				 "terms": {"category": [{"term_id": 3, "slug": "pets", "name": "Pets"}]}},
				{"id": 2, "title": "Dog care", "content": "Walk the dog, not the cat", "date": "2024-02-01T00:00:00",
				 "terms": {"category": [{"term_id": 3, "slug": "pets", "name": "Pets"}]}, "meta": {"rating": 3}},
				{"id": 3, "title": "Gardening", "content": "Tomatoes", "date": "2023-06-01T00:00:00", "meta": {"rating": 5}},
				{"id": 4, "title": "Cat draft", "content": "cat cat cat", "date": "2024-03-01T00:00:00", "status": "draft"},
				{"id": 5, "title": "Cats everywhere", "content": "Cat", "date": "2022-01-01T00:00:00"}
			]"#,
		)
		.unwrap();
		MemoryEngine::new(index).with_engines(["supplemental"])
	}

	fn args(value: Value) -> CleanArgs {
		let mut base = json!({
			"s": "",
			"engine": "default",
			"posts_per_page": 10,
			"nopaging": false,
			"load_posts": false,
			"page": 1,
			"post__in": false,
			"post__not_in": false,
			"tax_query": false,
			"meta_query": false,
			"date_query": false
		});
		if let (Some(base), Some(overrides)) = (base.as_object_mut(), value.as_object()) {
			for (k, v) in overrides {
				base.insert(k.clone(), v.clone());
			}
		}
		serde_json::from_value(base).unwrap()
	}

	async fn ids(engine: &MemoryEngine, value: Value) -> Vec<Value> {
		engine.search(&args(value)).await.unwrap().items
	}

	#[test]
	fn test_registry() {
		let engine = engine();
		assert!(engine.is_valid_engine("default"));
		assert!(engine.is_valid_engine("supplemental"));
		assert!(!engine.is_valid_engine("nonexistent"));
		assert_eq!(engine.engine_names(), vec!["default", "supplemental"]);
	}

	#[test]
	fn test_with_engines_does_not_duplicate_default() {
		let engine = MemoryEngine::new(MemoryIndex::default()).with_engines(["default", "a", "a"]);
		assert_eq!(engine.engine_names(), vec!["default", "a"]);
	}

	#[tokio::test]
	async fn test_ranking_by_score_then_date() {
		let engine = engine();
		// Post 1: title 1x2 + content 1 = 3; post 2: content 1; post 5: "cats" != "cat", content 1.
		let found = ids(&engine, json!({"s": "cat"})).await;
		assert_eq!(found, vec![json!(1), json!(2), json!(5)]);
	}

	#[tokio::test]
	async fn test_empty_query_lists_published_by_date() {
		let found = ids(&engine(), json!({})).await;
		assert_eq!(found, vec![json!(2), json!(1), json!(3), json!(5)]);
	}

	#[tokio::test]
	async fn test_paging_and_total() {
		let engine = engine();
		let outcome = engine
			.search(&args(json!({"posts_per_page": 3, "page": 2})))
			.await
			.unwrap();
		assert_eq!(outcome.items, vec![json!(5)]);
		assert_eq!(outcome.total, Some(4));

		let all = ids(&engine, json!({"posts_per_page": 1, "nopaging": true})).await;
		assert_eq!(all.len(), 4);

		assert!(ids(&engine, json!({"posts_per_page": 0})).await.is_empty());
	}

	#[tokio::test]
	async fn test_id_filters() {
		let engine = engine();
		assert_eq!(
			ids(&engine, json!({"post__in": ["3", "5", "4"]})).await,
			vec![json!(3), json!(5)]
		);
		assert_eq!(
			ids(&engine, json!({"post__not_in": ["2", "1"]})).await,
			vec![json!(3), json!(5)]
		);
	}

	#[tokio::test]
	async fn test_sub_query_filters() {
		let engine = engine();
		assert_eq!(
			ids(
				&engine,
				json!({"tax_query": {"taxonomy": "category", "field": "slug", "terms": "pets"}})
			)
			.await,
			vec![json!(2), json!(1)]
		);
		assert_eq!(
			ids(
				&engine,
				json!({"meta_query": {"key": "rating", "value": "4", "compare": ">"}})
			)
			.await,
			vec![json!(3)]
		);
		assert_eq!(
			ids(
				&engine,
				json!({"date_query": {"year": "2024", "month": "", "day": ""}})
			)
			.await,
			vec![json!(2), json!(1)]
		);
	}

	#[tokio::test]
	async fn test_empty_sub_query_is_ignored() {
		let found = ids(&engine(), json!({"tax_query": {}})).await;
		assert_eq!(found.len(), 4);
	}

	#[tokio::test]
	async fn test_load_posts_returns_documents() {
		let items = ids(&engine(), json!({"s": "gardening", "load_posts": true})).await;
		assert_eq!(items.len(), 1);
		assert_eq!(items[0]["id"], 3);
		assert_eq!(items[0]["title"], "Gardening");
		assert_eq!(items[0]["post_type"], "post");
	}

	#[tokio::test]
	async fn test_unknown_engine_fails() {
		let err = engine()
			.search(&args(json!({"engine": "other"})))
			.await
			.unwrap_err();
		assert!(matches!(err, EngineError::UnknownEngine(name) if name == "other"));
	}
}
