// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a [`MemoryIndex`](crate::MemoryIndex).
#[derive(Debug, Error)]
pub enum IndexError {
	#[error("failed to read index file {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse index document: {0}")]
	Parse(#[from] serde_json::Error),

	#[error("duplicate post id {0}")]
	DuplicateId(u64),
}
