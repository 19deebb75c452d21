// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy hooks built from the `policy` configuration section.

use std::net::IpAddr;

use swp_api_config::PolicyConfig;
use swp_api_core::{PolicySet, SearchRequest};
use tracing::debug;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Address the request came from.
///
/// This is the peer address unless the peer is one of `trusted_proxies`, in
/// which case `X-Forwarded-For` is walked right to left past the trusted hops
/// and the first untrusted entry wins. Without a peer address there is no
/// client address.
pub fn client_ip(request: &SearchRequest, trusted_proxies: &[IpAddr]) -> Option<IpAddr> {
	let peer = request.client_addr()?;
	if !trusted_proxies.contains(&peer) {
		return Some(peer);
	}

	let forwarded: Vec<&str> = request
		.headers()
		.get_all(FORWARDED_FOR)
		.iter()
		.filter_map(|v| v.to_str().ok())
		.flat_map(|v| v.split(','))
		.map(str::trim)
		.collect();

	let mut client = peer;
	for entry in forwarded.iter().rev() {
		let Ok(ip) = entry.parse::<IpAddr>() else {
			break;
		};
		client = ip;
		if !trusted_proxies.contains(&ip) {
			break;
		}
	}
	Some(client)
}

/// Translate configuration into a [`PolicySet`].
pub fn policy_from_config(config: &PolicyConfig) -> PolicySet {
	let max = config.max_posts_per_page;
	let mut policy = PolicySet::default().with_max_posts_per_page(move || max);

	if !config.disabled_params.is_empty() {
		let disabled = config.disabled_params.clone();
		policy = policy.with_schema_mutator(move |schema| {
			for name in &disabled {
				schema.remove(name);
			}
		});
	}

	if !config.allow_query {
		policy = policy.deny_all();
	} else if !config.allowed_ips.is_empty() {
		let allowed = config.allowed_ips.clone();
		let trusted = config.trusted_proxies.clone();
		policy = policy.with_permission(move |request| {
			let ip = client_ip(request, &trusted);
			let permitted = ip.is_some_and(|ip| allowed.contains(&ip));
			if !permitted {
				debug!(client_ip = ?ip, "Client address not in allow-list");
			}
			permitted
		});
	}

	policy
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::HeaderMap;
	use swp_api_core::{params, SiteSettings, DEFAULT_MAX_POSTS_PER_PAGE};

	fn ip(s: &str) -> IpAddr {
		s.parse().unwrap()
	}

	fn forwarded(value: &str) -> HeaderMap {
		let mut headers = HeaderMap::new();
		headers.insert(FORWARDED_FOR, value.parse().unwrap());
		headers
	}

	#[test]
	fn test_default_policy_is_open() {
		let policy = policy_from_config(&PolicyConfig::default());
		assert!(policy.is_allowed(&SearchRequest::default()));
		assert_eq!(policy.max_posts_per_page(), 50);
	}

	#[test]
	fn test_config_default_max_matches_core() {
		assert_eq!(
			PolicyConfig::default().max_posts_per_page,
			DEFAULT_MAX_POSTS_PER_PAGE
		);
	}

	#[test]
	fn test_allow_query_false_denies() {
		let policy = policy_from_config(&PolicyConfig {
			allow_query: false,
			..Default::default()
		});
		let request = SearchRequest::default().with_client_addr(ip("127.0.0.1"));
		assert!(!policy.is_allowed(&request));
	}

	#[test]
	fn test_ip_allow_list() {
		let policy = policy_from_config(&PolicyConfig {
			allowed_ips: vec![ip("10.0.0.1")],
			..Default::default()
		});

		let allowed = SearchRequest::default().with_client_addr(ip("10.0.0.1"));
		let denied = SearchRequest::default().with_client_addr(ip("10.0.0.2"));
		assert!(policy.is_allowed(&allowed));
		assert!(!policy.is_allowed(&denied));
		assert!(!policy.is_allowed(&SearchRequest::default()));
	}

	#[test]
	fn test_forwarded_for_ignored_without_peer() {
		let request = SearchRequest::default().with_headers(forwarded("10.0.0.1"));
		assert_eq!(client_ip(&request, &[]), None);
		assert_eq!(client_ip(&request, &[ip("10.0.0.1")]), None);

		let policy = policy_from_config(&PolicyConfig {
			allowed_ips: vec![ip("10.0.0.1")],
			..Default::default()
		});
		assert!(!policy.is_allowed(&request));
	}

	#[test]
	fn test_forwarded_for_ignored_from_untrusted_peer() {
		let request = SearchRequest::default()
			.with_client_addr(ip("198.51.100.7"))
			.with_headers(forwarded("10.0.0.1"));
		assert_eq!(client_ip(&request, &[ip("192.168.1.1")]), Some(ip("198.51.100.7")));

		let policy = policy_from_config(&PolicyConfig {
			allowed_ips: vec![ip("10.0.0.1")],
			trusted_proxies: vec![ip("192.168.1.1")],
			..Default::default()
		});
		assert!(!policy.is_allowed(&request));
	}

	#[test]
	fn test_forwarded_for_from_trusted_proxy() {
		let trusted = [ip("192.168.1.1"), ip("192.168.1.2")];

		let request = SearchRequest::default()
			.with_client_addr(ip("192.168.1.1"))
			.with_headers(forwarded("6.6.6.6, 10.0.0.1, 192.168.1.2"));
		assert_eq!(client_ip(&request, &trusted), Some(ip("10.0.0.1")));

		let only_proxies = SearchRequest::default()
			.with_client_addr(ip("192.168.1.1"))
			.with_headers(forwarded("192.168.1.2"));
		assert_eq!(client_ip(&only_proxies, &trusted), Some(ip("192.168.1.2")));

		let garbage = SearchRequest::default()
			.with_client_addr(ip("192.168.1.1"))
			.with_headers(forwarded("10.0.0.1, not-an-ip"));
		assert_eq!(client_ip(&garbage, &trusted), Some(ip("192.168.1.1")));

		let policy = policy_from_config(&PolicyConfig {
			allowed_ips: vec![ip("10.0.0.1")],
			trusted_proxies: trusted.to_vec(),
			..Default::default()
		});
		assert!(policy.is_allowed(&request));
		assert!(!policy.is_allowed(&garbage));
	}

	#[test]
	fn test_disabled_params_removed_from_schema() {
		let policy = policy_from_config(&PolicyConfig {
			disabled_params: vec![params::DATE_QUERY.to_string(), params::META_QUERY.to_string()],
			..Default::default()
		});
		let schema = policy.resolve_schema(&SiteSettings::default());
		assert!(!schema.contains(params::DATE_QUERY));
		assert!(!schema.contains(params::META_QUERY));
		assert!(schema.contains(params::TAX_QUERY));
	}

	#[test]
	fn test_max_posts_per_page_from_config() {
		let policy = policy_from_config(&PolicyConfig {
			max_posts_per_page: 7,
			..Default::default()
		});
		assert_eq!(policy.max_posts_per_page(), 7);
	}
}
