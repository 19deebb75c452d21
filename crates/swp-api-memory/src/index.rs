// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Posts held in memory.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::IndexError;

fn default_post_type() -> String {
	"post".to_string()
}

fn default_status() -> String {
	"publish".to_string()
}

/// A taxonomy term attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
	pub term_id: u64,
	pub slug: String,
	#[serde(default)]
	pub name: String,
}

/// One searchable content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
	pub id: u64,
	pub title: String,
	#[serde(default)]
	pub content: String,
	#[serde(default)]
	pub excerpt: String,
	#[serde(default)]
	pub slug: String,
	pub date: NaiveDateTime,
	#[serde(default = "default_post_type")]
	pub post_type: String,
	#[serde(default = "default_status")]
	pub status: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub link: Option<String>,
	/// Terms keyed by taxonomy name.
	#[serde(default)]
	pub terms: BTreeMap<String, Vec<Term>>,
	#[serde(default)]
	pub meta: BTreeMap<String, Value>,
}

impl Post {
	pub fn is_published(&self) -> bool {
		self.status == "publish"
	}
}

/// An immutable collection of posts.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
	posts: Vec<Post>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IndexDocument {
	Posts(Vec<Post>),
	Wrapped { posts: Vec<Post> },
}

impl MemoryIndex {
	/// Build an index, rejecting duplicate ids.
	pub fn from_posts(posts: Vec<Post>) -> Result<Self, IndexError> {
		let mut seen = HashSet::with_capacity(posts.len());
		for post in &posts {
			if !seen.insert(post.id) {
				return Err(IndexError::DuplicateId(post.id));
			}
		}
		Ok(Self { posts })
	}

	/// Parse a JSON document: either an array of posts or `{"posts": [...]}`.
	pub fn from_json(json: &str) -> Result<Self, IndexError> {
		let posts = match serde_json::from_str(json)? {
			IndexDocument::Posts(posts) => posts,
			IndexDocument::Wrapped { posts } => posts,
		};
		debug!(posts = posts.len(), "parsed index document");
		Self::from_posts(posts)
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self, IndexError> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| IndexError::Read {
			path: path.to_path_buf(),
			source: e,
		})?;
		let index = Self::from_json(&content)?;
		info!(path = %path.display(), posts = index.len(), "Loaded search index");
		Ok(index)
	}

	pub fn posts(&self) -> &[Post] {
		&self.posts
	}

	pub fn get(&self, id: u64) -> Option<&Post> {
		self.posts.iter().find(|post| post.id == id)
	}

	pub fn len(&self) -> usize {
		self.posts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.posts.is_empty()
	}
}
