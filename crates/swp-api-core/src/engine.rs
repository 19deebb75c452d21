// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Collaborator traits and the values that cross them.
//!
//! The dispatcher never ranks or hydrates content. It talks to an
//! [`EngineRegistry`], a [`SearchEngine`] and an [`ItemProjection`], all
//! injected at construction.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::EngineError;
use crate::request::SearchRequest;
use crate::value::{absint, scalar_to_string};

/// The sanitized, schema-filtered argument set handed to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CleanArgs(BTreeMap<String, Value>);

impl CleanArgs {
	pub fn new(args: BTreeMap<String, Value>) -> Self {
		Self(args)
	}

	pub fn get(&self, name: &str) -> Option<&Value> {
		self.0.get(name)
	}

	/// The argument as text. Missing or non-scalar arguments yield `None`.
	pub fn str(&self, name: &str) -> Option<String> {
		self.get(name).and_then(scalar_to_string)
	}

	pub fn bool(&self, name: &str) -> bool {
		match self.get(name) {
			Some(Value::Bool(b)) => *b,
			Some(other) => absint(other) != 0,
			None => false,
		}
	}

	pub fn u64(&self, name: &str) -> Option<u64> {
		self.get(name).map(absint)
	}

	/// The argument as a list. Scalars `false` and `null` count as absent.
	pub fn list(&self, name: &str) -> Option<&Vec<Value>> {
		self.get(name).and_then(Value::as_array)
	}

	/// The argument as a map. Empty maps count as absent.
	pub fn map(&self, name: &str) -> Option<&Map<String, Value>> {
		self.get(name)
			.and_then(Value::as_object)
			.filter(|m| !m.is_empty())
	}

	pub fn contains(&self, name: &str) -> bool {
		self.0.contains_key(name)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn into_inner(self) -> BTreeMap<String, Value> {
		self.0
	}
}

/// What an engine returns for one search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
	/// Raw result items in the engine's order.
	pub items: Vec<Value>,
	/// Total number of matches across all pages, when the engine knows it.
	pub total: Option<u64>,
}

impl SearchOutcome {
	pub fn new(items: Vec<Value>) -> Self {
		Self { items, total: None }
	}

	pub fn with_total(mut self, total: u64) -> Self {
		self.total = Some(total);
		self
	}
}

/// A response-shaped projection of one result item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionItem(pub Map<String, Value>);

impl CollectionItem {
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	pub fn into_value(self) -> Value {
		Value::Object(self.0)
	}
}

impl From<Map<String, Value>> for CollectionItem {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}

/// Knows which engine names are live.
pub trait EngineRegistry: Send + Sync {
	fn is_valid_engine(&self, name: &str) -> bool;

	/// Names of the live engines, for diagnostics.
	fn engine_names(&self) -> Vec<String> {
		Vec::new()
	}
}

/// Executes a search over a clean argument set.
#[async_trait]
pub trait SearchEngine: Send + Sync {
	async fn search(&self, args: &CleanArgs) -> Result<SearchOutcome, EngineError>;
}

/// Shapes raw result items for the response.
pub trait ItemProjection: Send + Sync {
	fn project_for_response(&self, item: &Value, request: &SearchRequest) -> CollectionItem;

	/// Collection-context trimming. Identity unless overridden.
	fn project_for_collection(&self, item: CollectionItem) -> CollectionItem {
		item
	}
}
