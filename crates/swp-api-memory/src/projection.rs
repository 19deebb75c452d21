// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Platform-style response shaping for posts.

use serde_json::{json, Map, Value};
use swp_api_core::value::absint;
use swp_api_core::{CollectionItem, ItemProjection, SearchRequest};

/// Projects raw posts into the shape content platforms return from their
/// post collection endpoints.
#[derive(Debug, Clone, Default)]
pub struct PostProjection {
	base_url: Option<String>,
}

impl PostProjection {
	pub fn new() -> Self {
		Self::default()
	}

	/// Site URL used to build permalinks and `_links` for posts without a stored link.
	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
		self
	}

	fn link_for(&self, id: u64, stored: Option<&Value>) -> Value {
		if let Some(link) = stored.and_then(Value::as_str) {
			return json!(link);
		}
		match &self.base_url {
			Some(base) => json!(format!("{base}/?p={id}")),
			None => json!(format!("/?p={id}")),
		}
	}
}

fn rendered(post: &Map<String, Value>, key: &str) -> Value {
	json!({ "rendered": post.get(key).cloned().unwrap_or_else(|| json!("")) })
}

impl ItemProjection for PostProjection {
	fn project_for_response(&self, item: &Value, _request: &SearchRequest) -> CollectionItem {
		let Value::Object(post) = item else {
			let mut map = Map::new();
			map.insert("id".to_string(), json!(absint(item)));
			return CollectionItem(map);
		};

		let id = post.get("id").map(absint).unwrap_or(0);
		let self_href = match &self.base_url {
			Some(base) => format!("{base}/wp-json/wp/v2/posts/{id}"),
			None => format!("/wp-json/wp/v2/posts/{id}"),
		};

		let mut map = Map::new();
		map.insert("id".to_string(), json!(id));
		map.insert("date".to_string(), post.get("date").cloned().unwrap_or(Value::Null));
		map.insert("slug".to_string(), post.get("slug").cloned().unwrap_or_else(|| json!("")));
		map.insert(
			"type".to_string(),
			post.get("post_type").cloned().unwrap_or_else(|| json!("post")),
		);
		map.insert("link".to_string(), self.link_for(id, post.get("link")));
		map.insert("title".to_string(), rendered(post, "title"));
		map.insert("content".to_string(), rendered(post, "content"));
		map.insert("excerpt".to_string(), rendered(post, "excerpt"));
		map.insert("_links".to_string(), json!({ "self": [{ "href": self_href }] }));
		CollectionItem(map)
	}

	/// Private keys (leading underscore) are not part of collection output.
	fn project_for_collection(&self, item: CollectionItem) -> CollectionItem {
		CollectionItem(
			item.0
				.into_iter()
				.filter(|(key, _)| !key.starts_with('_'))
				.collect(),
		)
	}
}
