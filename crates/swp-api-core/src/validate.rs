// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Parameter validators.
//!
//! Validators run on the already sanitized value. Whether a failure rejects
//! the request or degrades the value is decided by the schema entry's
//! [`FailureMode`](crate::schema::FailureMode), not by the validator.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::engine::EngineRegistry;
use crate::error::ValidationError;
use crate::value::scalar_to_string;

/// Required keys of a taxonomy sub-query.
pub const TAX_QUERY_KEYS: &[&str] = &["taxonomy", "field", "terms"];
/// Required keys of a metadata sub-query.
pub const META_QUERY_KEYS: &[&str] = &["key", "value", "compare"];
/// Required keys of a date sub-query.
pub const DATE_QUERY_KEYS: &[&str] = &["year", "month", "day"];

/// Collaborators a validator may consult.
#[derive(Clone, Copy)]
pub struct ValidateContext<'a> {
	pub registry: &'a dyn EngineRegistry,
}

type ValidateFn =
	dyn for<'a> Fn(&Value, &ValidateContext<'a>) -> Result<(), ValidationError> + Send + Sync;

/// Named reference to a validating function.
#[derive(Clone)]
pub struct Validator {
	name: &'static str,
	func: Arc<ValidateFn>,
}

impl Validator {
	/// Wraps a custom validating function.
	pub fn new(
		name: &'static str,
		func: impl for<'a> Fn(&Value, &ValidateContext<'a>) -> Result<(), ValidationError>
			+ Send
			+ Sync
			+ 'static,
	) -> Self {
		Self {
			name,
			func: Arc::new(func),
		}
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn apply(&self, value: &Value, ctx: &ValidateContext<'_>) -> Result<(), ValidationError> {
		(self.func)(value, ctx)
	}

	/// Rejects engine names unknown to the registry.
	pub fn engine_exists() -> Self {
		Self::new("engine-exists", |v, ctx| engine_exists(v, ctx.registry))
	}

	/// Rejects values that are not maps holding every key in `keys`.
	pub fn require_keys(keys: &'static [&'static str]) -> Self {
		Self::new("require-keys", move |v, _| {
			if require_keys(v, keys) {
				Ok(())
			} else {
				Err(ValidationError::MalformedSubQuery {
					missing: missing_keys(v, keys),
				})
			}
		})
	}
}

impl fmt::Debug for Validator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Validator").field(&self.name).finish()
	}
}

/// Check that `name` is a live engine in `registry`.
pub fn engine_exists(name: &Value, registry: &dyn EngineRegistry) -> Result<(), ValidationError> {
	let name = scalar_to_string(name).unwrap_or_default();
	if registry.is_valid_engine(&name) {
		Ok(())
	} else {
		Err(ValidationError::InvalidEngine(name))
	}
}

/// True when `value` is a map containing every key in `keys`.
pub fn require_keys(value: &Value, keys: &[&str]) -> bool {
	match value {
		Value::Object(map) => keys.iter().all(|key| map.contains_key(*key)),
		_ => false,
	}
}

fn missing_keys(value: &Value, keys: &[&str]) -> Vec<String> {
	let map = value.as_object();
	keys.iter()
		.filter(|key| !map.is_some_and(|m| m.contains_key(**key)))
		.map(|key| key.to_string())
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	struct OnlyDefault;

	impl EngineRegistry for OnlyDefault {
		fn is_valid_engine(&self, name: &str) -> bool {
			name == "default"
		}
	}

	#[test]
	fn test_require_keys_complete() {
		let query = json!({"taxonomy": "genre", "field": "slug", "terms": "sci-fi"});
		assert!(require_keys(&query, TAX_QUERY_KEYS));
	}

	#[test]
	fn test_require_keys_partial() {
		assert!(!require_keys(&json!({"taxonomy": "genre"}), TAX_QUERY_KEYS));
		assert!(!require_keys(&json!({"key": "color", "value": "red"}), META_QUERY_KEYS));
	}

	#[test]
	fn test_require_keys_non_map() {
		assert!(!require_keys(&json!(false), DATE_QUERY_KEYS));
		assert!(!require_keys(&json!("2024"), DATE_QUERY_KEYS));
		assert!(!require_keys(&json!([2024, 1, 1]), DATE_QUERY_KEYS));
	}

	#[test]
	fn test_require_keys_ignores_extra_keys() {
		let query = json!({"year": 2024, "month": 1, "day": 2, "hour": 3});
		assert!(require_keys(&query, DATE_QUERY_KEYS));
	}

	#[test]
	fn test_require_keys_validator_reports_missing() {
		let registry = OnlyDefault;
		let ctx = ValidateContext {
			registry: &registry,
		};
		let err = Validator::require_keys(TAX_QUERY_KEYS)
			.apply(&json!({"taxonomy": "genre"}), &ctx)
			.unwrap_err();
		assert_eq!(
			err,
			ValidationError::MalformedSubQuery {
				missing: vec!["field".to_string(), "terms".to_string()],
			}
		);

		let err = Validator::require_keys(META_QUERY_KEYS)
			.apply(&json!("not a map"), &ctx)
			.unwrap_err();
		assert_eq!(
			err,
			ValidationError::MalformedSubQuery {
				missing: vec!["key".to_string(), "value".to_string(), "compare".to_string()],
			}
		);
	}

	#[test]
	fn test_engine_exists() {
		let registry = OnlyDefault;
		assert!(engine_exists(&json!("default"), &registry).is_ok());
		assert_eq!(
			engine_exists(&json!("nonexistent"), &registry),
			Err(ValidationError::InvalidEngine("nonexistent".to_string()))
		);
		assert!(engine_exists(&json!(["default"]), &registry).is_err());
	}

	#[test]
	fn test_engine_exists_validator() {
		let registry = OnlyDefault;
		let ctx = ValidateContext {
			registry: &registry,
		};
		let validator = Validator::engine_exists();
		assert_eq!(validator.name(), "engine-exists");
		assert!(validator.apply(&json!("default"), &ctx).is_ok());
		assert!(validator.apply(&json!("other"), &ctx).is_err());
	}
}
