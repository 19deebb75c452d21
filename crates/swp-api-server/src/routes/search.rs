// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Search HTTP handler.

use std::net::SocketAddr;

use axum::{
	extract::{ConnectInfo, Request, State},
	response::{IntoResponse, Response},
	Json,
};
use http::{HeaderMap, HeaderValue};
use swp_api_core::SearchRequest;

use crate::api::AppState;
use crate::error::Result;
use crate::query::parse_query;

pub const TOTAL_HEADER: &str = "x-wp-total";
pub const TOTAL_PAGES_HEADER: &str = "x-wp-totalpages";

/// GET /swp_api/search - Run a search and return the projected items.
///
/// The peer address is read from the request extensions when the server
/// runs with connect info, so the handler also works without it.
pub async fn search(State(state): State<AppState>, request: Request) -> Result<Response> {
	let client_addr = request
		.extensions()
		.get::<ConnectInfo<SocketAddr>>()
		.map(|ConnectInfo(addr)| addr.ip());
	let (parts, _body) = request.into_parts();

	let params = parse_query(parts.uri.query().unwrap_or_default());
	let mut search_request = SearchRequest::new(params).with_headers(parts.headers);
	if let Some(addr) = client_addr {
		search_request = search_request.with_client_addr(addr);
	}

	let results = state.dispatcher.handle(&search_request).await?;

	let mut headers = HeaderMap::new();
	if let Some(total) = results.total {
		headers.insert(TOTAL_HEADER, HeaderValue::from(total));
	}
	if let Some(pages) = results.total_pages {
		headers.insert(TOTAL_PAGES_HEADER, HeaderValue::from(pages));
	}

	Ok((headers, Json(results.items)).into_response())
}
