// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Query-string decoding with bracket notation.
//!
//! `tax_query[taxonomy]=genre` becomes a nested map, `post__in[]=1` appends
//! to a list and a plain `s=cat` stays a string. A repeated plain key keeps
//! its last value.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Deepest bracket path honoured. Deeper keys are taken literally.
pub const MAX_NESTING: usize = 64;

/// Decode a raw (still percent-encoded) query string into request parameters.
pub fn parse_query(query: &str) -> BTreeMap<String, Value> {
	let mut params: BTreeMap<String, Value> = BTreeMap::new();

	for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
		let (name, path) = split_key(&key);
		if name.is_empty() {
			continue;
		}
		let slot = params.entry(name.to_string()).or_insert(Value::Null);
		assign(slot, &path, value.into_owned());
	}

	params
}

/// Split `a[b][]` into `("a", ["b", ""])`. Keys with unbalanced brackets or
/// more than [`MAX_NESTING`] segments are taken literally.
fn split_key(key: &str) -> (&str, Vec<&str>) {
	let Some(open) = key.find('[') else {
		return (key, Vec::new());
	};

	let name = &key[..open];
	let mut path = Vec::new();
	let mut rest = &key[open..];
	while let Some(stripped) = rest.strip_prefix('[') {
		let Some(close) = stripped.find(']') else {
			return (key, Vec::new());
		};
		if path.len() == MAX_NESTING {
			return (key, Vec::new());
		}
		path.push(&stripped[..close]);
		rest = &stripped[close + 1..];
	}

	if !rest.is_empty() {
		return (key, Vec::new());
	}
	(name, path)
}

fn assign(slot: &mut Value, path: &[&str], value: String) {
	let Some((segment, rest)) = path.split_first() else {
		*slot = Value::String(value);
		return;
	};

	if segment.is_empty() {
		if !slot.is_array() {
			*slot = Value::Array(Vec::new());
		}
		if let Value::Array(items) = slot {
			items.push(Value::Null);
			if let Some(last) = items.last_mut() {
				assign(last, rest, value);
			}
		}
		return;
	}

	if !slot.is_object() {
		*slot = Value::Object(Map::new());
	}
	if let Value::Object(map) = slot {
		let child = map.entry(segment.to_string()).or_insert(Value::Null);
		assign(child, rest, value);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	#[test]
	fn test_plain_parameters() {
		let params = parse_query("s=cat+videos&engine=default&posts_per_page=999");
		assert_eq!(params["s"], json!("cat videos"));
		assert_eq!(params["engine"], json!("default"));
		assert_eq!(params["posts_per_page"], json!("999"));
	}

	#[test]
	fn test_last_value_wins() {
		let params = parse_query("s=one&s=two");
		assert_eq!(params["s"], json!("two"));
	}

	#[test]
	fn test_nested_map() {
		let params = parse_query(
			"tax_query%5Btaxonomy%5D=genre&tax_query[field]=slug&tax_query[terms]=sci-fi",
		);
		assert_eq!(
			params["tax_query"],
			json!({"taxonomy": "genre", "field": "slug", "terms": "sci-fi"})
		);
	}

	#[test]
	fn test_list_append() {
		let params = parse_query("post__in[]=1&post__in[]=2&tax_query[terms][]=a&tax_query[terms][]=b");
		assert_eq!(params["post__in"], json!(["1", "2"]));
		assert_eq!(params["tax_query"], json!({"terms": ["a", "b"]}));
	}

	#[test]
	fn test_plain_then_nested_replaces() {
		let params = parse_query("meta_query=oops&meta_query[key]=color");
		assert_eq!(params["meta_query"], json!({"key": "color"}));
	}

	#[test]
	fn test_unbalanced_brackets_are_literal() {
		let params = parse_query("a[b=1&c]d=2&e[f]g=3");
		assert_eq!(params["a[b"], json!("1"));
		assert_eq!(params["c]d"], json!("2"));
		assert_eq!(params["e[f]g"], json!("3"));
	}

	#[test]
	fn test_nesting_is_capped() {
		let at_cap = format!("a{}=x", "[]".repeat(MAX_NESTING));
		let params = parse_query(&at_cap);
		let mut depth = 0;
		let mut node = &params["a"];
		while let Value::Array(items) = node {
			depth += 1;
			node = &items[0];
		}
		assert_eq!(depth, MAX_NESTING);
		assert_eq!(node, &json!("x"));

		let over_cap = format!("a{}=x", "[]".repeat(MAX_NESTING + 1));
		let params = parse_query(&over_cap);
		assert!(!params.contains_key("a"));
		assert_eq!(params[&over_cap[..over_cap.len() - 2]], json!("x"));
	}

	#[test]
	fn test_deep_keys_do_not_recurse() {
		let key = format!("tax_query{}", "%5B%5D".repeat(50_000));
		let params = parse_query(&format!("s=cat&{key}=x"));
		assert_eq!(params["s"], json!("cat"));
		assert_eq!(params.len(), 2);
		assert!(params.keys().all(|k| k == "s" || k.len() > 50_000));
	}

	#[test]
	fn test_empty_and_nameless() {
		assert!(parse_query("").is_empty());
		assert!(parse_query("[x]=1&=2").is_empty());
		assert_eq!(parse_query("flag")["flag"], json!(""));
	}

	proptest! {
		#[test]
		fn plain_pairs_round_trip(key in "[a-z_]{1,12}", value in "[a-zA-Z0-9 ,]{0,16}") {
			let encoded: String = url::form_urlencoded::Serializer::new(String::new())
				.append_pair(&key, &value)
				.finish();
			let params = parse_query(&encoded);
			prop_assert_eq!(params.get(&key), Some(&Value::String(value)));
		}
	}
}
