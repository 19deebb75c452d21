// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request validation and dispatch for the `swp_api` search endpoint.
//!
//! This crate provides:
//! - A declarative [`ParameterSchema`] describing every accepted query parameter
//! - Pure [`sanitize`] and [`validate`] functions referenced by schema entries
//! - A [`PolicySet`] of optional overrides (schema mutation, max page size, permission)
//! - The [`Dispatcher`], which turns a raw [`SearchRequest`] into a clean argument
//!   set, calls the external [`SearchEngine`] and projects every result item
//!
//! Search execution, ranking and the content model live behind the collaborator
//! traits in [`engine`]; this crate never ranks anything itself.
//!
//! # Usage
//!
//! ```ignore
//! let dispatcher = Dispatcher::new(registry, engine, projection)
//!     .with_policy(PolicySet::default().with_max_posts_per_page(|| 25));
//!
//! let results = dispatcher.handle(&request).await?;
//! ```

pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod policy;
pub mod request;
pub mod sanitize;
pub mod schema;
pub mod validate;
pub mod value;

pub use dispatcher::{Dispatcher, SearchResults};
pub use engine::{
	CleanArgs, CollectionItem, EngineRegistry, ItemProjection, SearchEngine, SearchOutcome,
};
pub use error::{EngineError, SearchError, ValidationError};
pub use policy::{PolicySet, DEFAULT_MAX_POSTS_PER_PAGE};
pub use request::SearchRequest;
pub use sanitize::{SanitizeContext, Sanitizer};
pub use schema::{params, FailureMode, ParameterSchema, ParameterSpec, SiteSettings};
pub use validate::{ValidateContext, Validator};
