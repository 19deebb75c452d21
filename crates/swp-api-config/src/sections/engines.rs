// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Search engine registry configuration.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnginesConfig {
	/// Engine names callers may select. `default` is always live.
	pub names: Vec<String>,
	/// JSON document file backing the in-memory engine.
	pub index_path: Option<PathBuf>,
}

impl Default for EnginesConfig {
	fn default() -> Self {
		Self {
			names: vec!["default".to_string()],
			index_path: None,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnginesConfigLayer {
	#[serde(default)]
	pub names: Option<Vec<String>>,
	#[serde(default)]
	pub index_path: Option<PathBuf>,
}

impl EnginesConfigLayer {
	pub fn merge(&mut self, other: EnginesConfigLayer) {
		if other.names.is_some() {
			self.names = other.names;
		}
		if other.index_path.is_some() {
			self.index_path = other.index_path;
		}
	}

	pub fn finalize(self) -> EnginesConfig {
		let mut names = self.names.unwrap_or_default();
		if !names.iter().any(|name| name == "default") {
			names.insert(0, "default".to_string());
		}
		EnginesConfig {
			names,
			index_path: self.index_path,
		}
	}
}
