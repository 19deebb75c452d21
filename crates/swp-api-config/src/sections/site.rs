// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Site settings the search endpoint reads from the host.

use serde::Deserialize;

const DEFAULT_POSTS_PER_PAGE: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
	/// Page size used when a request does not name one.
	pub default_posts_per_page: u64,
	/// Public site URL used to build result permalinks.
	pub url: Option<String>,
}

impl Default for SiteConfig {
	fn default() -> Self {
		Self {
			default_posts_per_page: DEFAULT_POSTS_PER_PAGE,
			url: None,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfigLayer {
	#[serde(default)]
	pub default_posts_per_page: Option<u64>,
	#[serde(default)]
	pub url: Option<String>,
}

impl SiteConfigLayer {
	pub fn merge(&mut self, other: SiteConfigLayer) {
		if other.default_posts_per_page.is_some() {
			self.default_posts_per_page = other.default_posts_per_page;
		}
		if other.url.is_some() {
			self.url = other.url;
		}
	}

	pub fn finalize(self) -> SiteConfig {
		SiteConfig {
			default_posts_per_page: self.default_posts_per_page.unwrap_or(DEFAULT_POSTS_PER_PAGE),
			url: self.url,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_page_size() {
		assert_eq!(SiteConfigLayer::default().finalize().default_posts_per_page, 15);
	}

	#[test]
	fn test_custom_page_size() {
		let layer = SiteConfigLayer {
			default_posts_per_page: Some(10),
			url: Some("https://example.com".to_string()),
		};
		let config = layer.finalize();
		assert_eq!(config.default_posts_per_page, 10);
		assert_eq!(config.url.as_deref(), Some("https://example.com"));
	}
}
