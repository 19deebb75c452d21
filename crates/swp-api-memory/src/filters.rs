// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Structured sub-query matching.
//!
//! Each sub-query arrives as a single clause map that already passed the
//! required-key check. Values may be scalars, lists or comma-separated strings.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::Datelike;
use serde_json::{Map, Value};
use swp_api_core::value::{absint, scalar_to_string};

use crate::index::{Post, Term};

/// Positive ids from an id list argument.
pub fn id_set(list: &[Value]) -> HashSet<u64> {
	list.iter().map(absint).filter(|id| *id > 0).collect()
}

fn text(clause: &Map<String, Value>, key: &str) -> Option<String> {
	clause.get(key).and_then(scalar_to_string)
}

fn value_list(value: &Value) -> Vec<String> {
	match value {
		Value::Array(items) => items.iter().filter_map(scalar_to_string).collect(),
		other => scalar_to_string(other)
			.map(|s| {
				s.split(',')
					.map(str::trim)
					.filter(|t| !t.is_empty())
					.map(String::from)
					.collect()
			})
			.unwrap_or_default(),
	}
}

fn term_matches(term: &Term, field: &str, wanted: &str) -> bool {
	match field {
		"slug" => term.slug == wanted,
		"name" => term.name == wanted,
		"term_id" | "id" => absint(&Value::String(wanted.to_string())) == term.term_id,
		_ => false,
	}
}

/// Taxonomy clause: `taxonomy`, `field`, `terms` and an optional `operator`
/// (`IN`, `NOT IN` or `AND`).
pub fn matches_tax_query(post: &Post, clause: &Map<String, Value>) -> bool {
	let taxonomy = text(clause, "taxonomy").unwrap_or_default();
	let field = text(clause, "field")
		.unwrap_or_default()
		.to_ascii_lowercase();
	let terms = clause.get("terms").map(value_list).unwrap_or_default();
	if terms.is_empty() {
		return true;
	}

	let post_terms = post.terms.get(&taxonomy).map(Vec::as_slice).unwrap_or(&[]);
	let has = |wanted: &String| post_terms.iter().any(|t| term_matches(t, &field, wanted));

	let operator = text(clause, "operator")
		.unwrap_or_else(|| "IN".to_string())
		.trim()
		.to_ascii_uppercase();
	match operator.as_str() {
		"NOT IN" => !terms.iter().any(has),
		"AND" => terms.iter().all(has),
		_ => terms.iter().any(has),
	}
}

fn compare_loose(actual: &str, expected: &str) -> Ordering {
	match (actual.trim().parse::<f64>(), expected.trim().parse::<f64>()) {
		(Ok(a), Ok(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
		_ => actual.cmp(expected),
	}
}

/// Metadata clause: `key`, `value`, `compare`.
pub fn matches_meta_query(post: &Post, clause: &Map<String, Value>) -> bool {
	let key = text(clause, "key").unwrap_or_default();
	let compare = text(clause, "compare")
		.unwrap_or_default()
		.trim()
		.to_ascii_uppercase();
	let compare = if compare.is_empty() { "=".to_string() } else { compare };
	let stored = post.meta.get(&key);

	match compare.as_str() {
		"EXISTS" => return stored.is_some(),
		"NOT EXISTS" => return stored.is_none(),
		_ => {}
	}

	let Some(actual) = stored.and_then(scalar_to_string) else {
		return false;
	};
	let expected_value = clause.get("value").cloned().unwrap_or(Value::Null);
	let expected = scalar_to_string(&expected_value).unwrap_or_default();

	match compare.as_str() {
		"=" => compare_loose(&actual, &expected) == Ordering::Equal,
		"!=" => compare_loose(&actual, &expected) != Ordering::Equal,
		">" => compare_loose(&actual, &expected) == Ordering::Greater,
		">=" => compare_loose(&actual, &expected) != Ordering::Less,
		"<" => compare_loose(&actual, &expected) == Ordering::Less,
		"<=" => compare_loose(&actual, &expected) != Ordering::Greater,
		"LIKE" => actual.to_lowercase().contains(&expected.to_lowercase()),
		"NOT LIKE" => !actual.to_lowercase().contains(&expected.to_lowercase()),
		"IN" => value_list(&expected_value).contains(&actual),
		"NOT IN" => !value_list(&expected_value).contains(&actual),
		_ => false,
	}
}

/// Date clause: `year`, `month`, `day`. Zero or blank parts match anything.
pub fn matches_date_query(post: &Post, clause: &Map<String, Value>) -> bool {
	let date = post.date.date();
	let parts = [
		("year", date.year().max(0) as u64),
		("month", u64::from(date.month())),
		("day", u64::from(date.day())),
	];
	parts.iter().all(|(key, actual)| {
		let wanted = clause.get(*key).map(absint).unwrap_or(0);
		wanted == 0 || wanted == *actual
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn post() -> Post {
		serde_json::from_value(json!({
			"id": 7,
			"title": "Dune",
			"date": "2024-03-15T08:30:00",
			"terms": {
				"genre": [
					{"term_id": 4, "slug": "sci-fi", "name": "Science Fiction"},
					{"term_id": 5, "slug": "classic", "name": "Classic"}
				]
			},
			"meta": {"rating": "4.5", "color": "Sand", "pages": 412}
		}))
		.unwrap()
	}

	fn clause(value: Value) -> Map<String, Value> {
		value.as_object().cloned().unwrap()
	}

	#[test]
	fn test_id_set() {
		let ids = id_set(&[json!("1"), json!(2), json!("abc"), json!("-3")]);
		assert_eq!(ids, HashSet::from([1, 2, 3]));
	}

	#[test]
	fn test_tax_query_fields() {
		let post = post();
		assert!(matches_tax_query(
			&post,
			&clause(json!({"taxonomy": "genre", "field": "slug", "terms": "sci-fi"}))
		));
		assert!(matches_tax_query(
			&post,
			&clause(json!({"taxonomy": "genre", "field": "name", "terms": ["Classic"]}))
		));
		assert!(matches_tax_query(
			&post,
			&clause(json!({"taxonomy": "genre", "field": "term_id", "terms": "9,4"}))
		));
		assert!(!matches_tax_query(
			&post,
			&clause(json!({"taxonomy": "genre", "field": "slug", "terms": "romance"}))
		));
		assert!(!matches_tax_query(
			&post,
			&clause(json!({"taxonomy": "topic", "field": "slug", "terms": "sci-fi"}))
		));
	}

	#[test]
	fn test_tax_query_operators() {
		let post = post();
		assert!(matches_tax_query(
			&post,
			&clause(json!({"taxonomy": "genre", "field": "slug", "terms": ["sci-fi", "classic"], "operator": "AND"}))
		));
		assert!(!matches_tax_query(
			&post,
			&clause(json!({"taxonomy": "genre", "field": "slug", "terms": ["sci-fi", "romance"], "operator": "AND"}))
		));
		assert!(matches_tax_query(
			&post,
			&clause(json!({"taxonomy": "genre", "field": "slug", "terms": "romance", "operator": "not in"}))
		));
	}

	#[test]
	fn test_tax_query_without_terms_matches() {
		assert!(matches_tax_query(
			&post(),
			&clause(json!({"taxonomy": "genre", "field": "slug", "terms": ""}))
		));
	}

	#[test]
	fn test_meta_query_comparisons() {
		let post = post();
		let meta = |key: &str, value: Value, compare: &str| {
			matches_meta_query(&post, &clause(json!({"key": key, "value": value, "compare": compare})))
		};

		assert!(meta("color", json!("Sand"), "="));
		assert!(meta("color", json!("Stone"), "!="));
		assert!(meta("rating", json!("4"), ">"));
		assert!(meta("rating", json!("4.5"), ">="));
		assert!(meta("pages", json!("1000"), "<"));
		assert!(!meta("pages", json!("400"), "<="));
		assert!(meta("color", json!("san"), "LIKE"));
		assert!(meta("color", json!("stone"), "NOT LIKE"));
		assert!(meta("color", json!("Red,Sand"), "IN"));
		assert!(meta("color", json!(["Red", "Blue"]), "NOT IN"));
		assert!(meta("color", json!(""), "EXISTS"));
		assert!(meta("missing", json!(""), "NOT EXISTS"));
		assert!(!meta("missing", json!("x"), "!="));
		assert!(!meta("color", json!("Sand"), "REGEXP"));
	}

	#[test]
	fn test_meta_query_default_compare_is_equality() {
		assert!(matches_meta_query(
			&post(),
			&clause(json!({"key": "pages", "value": "412", "compare": ""}))
		));
	}

	#[test]
	fn test_date_query() {
		let post = post();
		assert!(matches_date_query(&post, &clause(json!({"year": "2024", "month": 3, "day": "15"}))));
		assert!(matches_date_query(&post, &clause(json!({"year": 2024, "month": "", "day": ""}))));
		assert!(!matches_date_query(&post, &clause(json!({"year": 2023, "month": 3, "day": 15}))));
		assert!(!matches_date_query(&post, &clause(json!({"year": 2024, "month": 4, "day": 0}))));
	}
}
