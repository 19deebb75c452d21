// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The partial configuration layer every source produces.

use serde::Deserialize;

use crate::sections::{
	EnginesConfigLayer, HttpConfigLayer, LoggingConfigLayer, PolicyConfigLayer, SiteConfigLayer,
};

/// One source's view of the configuration. Absent sections leave lower layers untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub http: Option<HttpConfigLayer>,
	#[serde(default)]
	pub site: Option<SiteConfigLayer>,
	#[serde(default)]
	pub policy: Option<PolicyConfigLayer>,
	#[serde(default)]
	pub engines: Option<EnginesConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

fn merge_section<T>(base: &mut Option<T>, other: Option<T>, merge: impl FnOnce(&mut T, T))
where
	T: Default,
{
	if let Some(other) = other {
		merge(base.get_or_insert_with(T::default), other);
	}
}

impl ServerConfigLayer {
	/// Overlay `other` on top of `self`, field by field.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_section(&mut self.http, other.http, HttpConfigLayer::merge);
		merge_section(&mut self.site, other.site, SiteConfigLayer::merge);
		merge_section(&mut self.policy, other.policy, PolicyConfigLayer::merge);
		merge_section(&mut self.engines, other.engines, EnginesConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}
