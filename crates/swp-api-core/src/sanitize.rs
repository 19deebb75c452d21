// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Parameter sanitizers.
//!
//! Every sanitizer is a pure, total function: it accepts any [`Value`] and
//! always produces a clean value, never an error. Schema entries reference
//! them through the [`Sanitizer`] handle so policy code can register its own.

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::{Map, Value};

use crate::value::{absint, scalar_to_string};

static SCRIPT_STYLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?is)<script[^>]*?>.*?</script>|<style[^>]*?>.*?</style>").unwrap()
});
static BREAKS_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n\t ]+").unwrap());
static OCTET_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)%[a-f0-9]{2}").unwrap());
static SPACES_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +").unwrap());

const PHP_TRIM: [char; 6] = [' ', '\t', '\n', '\r', '\0', '\x0b'];

/// Request-scoped inputs a sanitizer may consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeContext {
	/// Upper bound for page-size parameters.
	pub max_posts_per_page: u64,
}

impl Default for SanitizeContext {
	fn default() -> Self {
		Self {
			max_posts_per_page: crate::policy::DEFAULT_MAX_POSTS_PER_PAGE,
		}
	}
}

type SanitizeFn = dyn Fn(&Value, &SanitizeContext) -> Value + Send + Sync;

/// Named reference to a sanitizing function.
#[derive(Clone)]
pub struct Sanitizer {
	name: &'static str,
	func: Arc<SanitizeFn>,
}

impl Sanitizer {
	/// Wraps a custom sanitizing function.
	pub fn new(
		name: &'static str,
		func: impl Fn(&Value, &SanitizeContext) -> Value + Send + Sync + 'static,
	) -> Self {
		Self {
			name,
			func: Arc::new(func),
		}
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn apply(&self, value: &Value, ctx: &SanitizeContext) -> Value {
		(self.func)(value, ctx)
	}

	/// Free-text normalization, see [`text_normalize`].
	pub fn text() -> Self {
		Self::new("text-normalize", |v, _| Value::String(text_normalize(v)))
	}

	/// Boolean coercion, see [`to_bool`].
	pub fn boolean() -> Self {
		Self::new("to-bool", |v, _| Value::Bool(to_bool(v)))
	}

	/// Page-size coercion bounded by [`SanitizeContext::max_posts_per_page`].
	pub fn clamp_to_max() -> Self {
		Self::new("clamp-to-max", |v, ctx| {
			Value::from(clamp_to_max(v, ctx.max_posts_per_page))
		})
	}

	/// Non-negative integer coercion without an upper bound.
	pub fn nonneg_int() -> Self {
		Self::new("to-nonneg-int", |v, _| Value::from(to_nonneg_int(v)))
	}

	/// ID list coercion, see [`comma_or_single_to_list`].
	pub fn comma_list() -> Self {
		Self::new("comma-or-single-to-list", |v, _| comma_or_single_to_list(v))
	}

	/// Tag stripping over structured sub-queries, see [`strip_tags_over_map`].
	pub fn strip_tags_map() -> Self {
		Self::new("strip-tags-over-map", |v, _| strip_tags_over_map(v))
	}
}

impl fmt::Debug for Sanitizer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Sanitizer").field(&self.name).finish()
	}
}

/// Interpret a value as a boolean flag.
///
/// Integers, strings and booleans are accepted. `"1"`, `"true"`, `"yes"` and
/// `"on"` (any case, surrounding whitespace ignored) are true, as are the
/// integer 1 and `true`. Every other input, including floats, lists, maps and
/// null, is false.
pub fn to_bool(value: &Value) -> bool {
	match value {
		Value::Bool(b) => *b,
		Value::Number(n) if n.is_i64() || n.is_u64() => is_truthy_token(&n.to_string()),
		Value::String(s) => is_truthy_token(s),
		_ => false,
	}
}

fn is_truthy_token(token: &str) -> bool {
	matches!(
		token.trim().to_ascii_lowercase().as_str(),
		"1" | "true" | "yes" | "on"
	)
}

/// Coerce to a non-negative integer no larger than `max`.
pub fn clamp_to_max(value: &Value, max: u64) -> u64 {
	absint(value).min(max)
}

/// Coerce to a non-negative integer.
pub fn to_nonneg_int(value: &Value) -> u64 {
	absint(value)
}

/// Turn a comma-separated string or a single positive ID into a list.
///
/// `"1,2,3"` becomes `["1","2","3"]` (tokens are not trimmed), `"5"` becomes
/// `["5"]`, and anything that is neither is returned unchanged, so `"abc"`
/// stays the scalar `"abc"`. Lists pass through as they are.
pub fn comma_or_single_to_list(value: &Value) -> Value {
	match value {
		Value::String(s) if s.contains(',') => Value::Array(
			s.split(',')
				.map(|token| Value::String(token.to_string()))
				.collect(),
		),
		Value::String(_) | Value::Number(_) if absint(value) > 0 => {
			Value::Array(vec![value.clone()])
		}
		_ => value.clone(),
	}
}

/// Strip HTML tags from every value of a map.
///
/// Keys are untouched, nested lists and maps are stripped recursively and
/// non-string scalars are kept. Non-map input is returned as-is; the
/// sub-query validators reject it afterwards.
pub fn strip_tags_over_map(value: &Value) -> Value {
	match value {
		Value::Object(map) => Value::Object(strip_map(map)),
		other => other.clone(),
	}
}

fn strip_map(map: &Map<String, Value>) -> Map<String, Value> {
	map.iter()
		.map(|(key, value)| (key.clone(), strip_value(value)))
		.collect()
}

fn strip_value(value: &Value) -> Value {
	match value {
		Value::String(s) => Value::String(strip_tags(s)),
		Value::Array(items) => Value::Array(items.iter().map(strip_value).collect()),
		Value::Object(map) => Value::Object(strip_map(map)),
		other => other.clone(),
	}
}

/// Remove HTML tags and comments from `input`.
///
/// A `<` followed by whitespace is literal text. An unterminated tag swallows
/// the rest of the input.
pub fn strip_tags(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	let mut rest = input;

	while let Some(start) = rest.find('<') {
		out.push_str(&rest[..start]);
		let tail = &rest[start..];

		if tail.starts_with("<!--") {
			rest = match tail.find("-->") {
				Some(end) => &tail[end + 3..],
				None => "",
			};
			continue;
		}

		match tail[1..].chars().next() {
			None => {
				out.push('<');
				rest = "";
			}
			Some(c) if c.is_whitespace() => {
				out.push('<');
				rest = &tail[1..];
			}
			Some(_) => {
				rest = match tag_end(tail) {
					Some(end) => &tail[end + 1..],
					None => "",
				};
			}
		}
	}

	out.push_str(rest);
	out
}

/// Byte offset of the `>` closing the tag that opens `tag`, honoring quotes.
fn tag_end(tag: &str) -> Option<usize> {
	let mut quote: Option<char> = None;
	for (i, c) in tag.char_indices().skip(1) {
		match (quote, c) {
			(Some(q), c) if c == q => quote = None,
			(Some(_), _) => {}
			(None, '"') | (None, '\'') => quote = Some(c),
			(None, '>') => return Some(i),
			(None, _) => {}
		}
	}
	None
}

/// Normalize free text the way the host platform sanitizes text fields.
///
/// Stray `<` characters are encoded, `script`/`style` blocks and every tag are
/// removed, line breaks and tabs collapse to single spaces, percent-encoded
/// octets are dropped and the result is trimmed. Non-string scalars are
/// stringified first; lists and maps become the empty string.
pub fn text_normalize(value: &Value) -> String {
	let Some(mut text) = scalar_to_string(value) else {
		return String::new();
	};

	if text.contains('<') {
		text = encode_stray_less_than(&text);
		text = SCRIPT_STYLE_REGEX.replace_all(&text, "").into_owned();
		text = strip_tags(&text);
	}

	text = BREAKS_REGEX.replace_all(&text, " ").into_owned();
	text = text.trim_matches(PHP_TRIM).to_string();

	let mut found = false;
	while OCTET_REGEX.is_match(&text) {
		text = OCTET_REGEX.replace_all(&text, "").into_owned();
		found = true;
	}

	if found {
		text = SPACES_REGEX
			.replace_all(text.trim_matches(PHP_TRIM), " ")
			.into_owned();
	}

	text
}

/// Encode every `<` that is not closed by a `>` before the next `<` or the end.
fn encode_stray_less_than(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	for (i, c) in input.char_indices() {
		if c != '<' {
			out.push(c);
			continue;
		}
		let closes = input[i + 1..]
			.find(['<', '>'])
			.is_some_and(|j| input[i + 1 + j..].starts_with('>'));
		if closes {
			out.push('<');
		} else {
			out.push_str("&lt;");
		}
	}
	out
}
