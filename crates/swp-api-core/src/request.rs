// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The raw, caller-supplied search request.

use std::collections::BTreeMap;
use std::net::IpAddr;

use http::HeaderMap;
use serde_json::Value;

/// Raw parameters plus the request metadata permission predicates may inspect.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
	params: BTreeMap<String, Value>,
	headers: HeaderMap,
	client_addr: Option<IpAddr>,
}

impl SearchRequest {
	pub fn new(params: BTreeMap<String, Value>) -> Self {
		Self {
			params,
			..Default::default()
		}
	}

	pub fn with_headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	pub fn with_client_addr(mut self, addr: IpAddr) -> Self {
		self.client_addr = Some(addr);
		self
	}

	pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
		self.params.insert(name.into(), value)
	}

	pub fn params(&self) -> &BTreeMap<String, Value> {
		&self.params
	}

	pub fn param(&self, name: &str) -> Option<&Value> {
		self.params.get(name)
	}

	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Address of the connected peer, when the host knows it.
	pub fn client_addr(&self) -> Option<IpAddr> {
		self.client_addr
	}
}

impl<K: Into<String>> FromIterator<(K, Value)> for SearchRequest {
	fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
		Self::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
	}
}
