// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Loose scalar coercions shared by the sanitizers.
//!
//! Query parameters arrive as strings, but policy-added entries and tests may
//! hand the dispatcher numbers, booleans or nested structures. These helpers
//! coerce any [`Value`] the way the host platform does, without ever failing.

use serde_json::Value;

/// Coerce a value to a non-negative integer.
///
/// Strings contribute their leading integer (`"12abc"` → 12, `"-5"` → 5,
/// `"abc"` → 0). Floats are truncated, booleans become 0 or 1, and lists or
/// maps count as 1 when non-empty.
pub fn absint(value: &Value) -> u64 {
	match value {
		Value::Null => 0,
		Value::Bool(b) => u64::from(*b),
		Value::Number(n) => {
			if let Some(u) = n.as_u64() {
				u
			} else if let Some(i) = n.as_i64() {
				i.unsigned_abs()
			} else {
				// `as` saturates and maps NaN to 0
				n.as_f64().map(|f| f.trunc().abs() as u64).unwrap_or(0)
			}
		}
		Value::String(s) => leading_int(s).unsigned_abs(),
		Value::Array(items) => u64::from(!items.is_empty()),
		Value::Object(map) => u64::from(!map.is_empty()),
	}
}

/// Render a scalar as text. Lists and maps have no text form.
pub fn scalar_to_string(value: &Value) -> Option<String> {
	match value {
		Value::Null => Some(String::new()),
		Value::Bool(true) => Some("1".to_string()),
		Value::Bool(false) => Some(String::new()),
		Value::Number(n) => Some(n.to_string()),
		Value::String(s) => Some(s.clone()),
		Value::Array(_) | Value::Object(_) => None,
	}
}

fn leading_int(s: &str) -> i64 {
	let s = s.trim_start_matches([' ', '\t', '\n', '\r', '\x0b', '\x0c']);
	let (negative, digits) = match s.as_bytes().first() {
		Some(b'-') => (true, &s[1..]),
		Some(b'+') => (false, &s[1..]),
		_ => (false, s),
	};

	let mut n: i64 = 0;
	for b in digits.bytes().take_while(u8::is_ascii_digit) {
		n = n.saturating_mul(10).saturating_add(i64::from(b - b'0'));
	}

	if negative {
		-n
	} else {
		n
	}
}
