// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory reference backend for the search endpoint.
//!
//! [`MemoryEngine`] serves as both the engine registry and the search engine
//! over a [`MemoryIndex`] of posts loaded from a JSON document, and
//! [`PostProjection`] shapes its results the way a content platform would.

pub mod engine;
pub mod error;
mod filters;
pub mod index;
pub mod projection;
mod tokenizer;

pub use engine::MemoryEngine;
pub use error::IndexError;
pub use index::{MemoryIndex, Post, Term};
pub use projection::PostProjection;
