// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP surface of the `swp_api` search endpoint.
//!
//! Exposes `GET /swp_api/search`, backed by a [`swp_api_core::Dispatcher`],
//! and `GET /health`.

pub mod api;
pub mod error;
pub mod policy;
pub mod query;
pub mod routes;
pub mod version;

pub use api::{create_app_state, create_router, AppState, SEARCH_PATH};
pub use error::{ErrorResponse, ServerError};
pub use policy::{client_ip, policy_from_config};
pub use query::parse_query;
