// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::net::IpAddr;
use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	EnginesConfigLayer, HttpConfigLayer, LoggingConfigLayer, PolicyConfigLayer, SiteConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/swp-api/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: SWP_API_<SECTION>_<FIELD>, with the section dropped where the
/// field name is already unambiguous (`SWP_API_PORT`).
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(load_http_from_env()?),
			site: Some(load_site_from_env()?),
			policy: Some(load_policy_from_env()?),
			engines: Some(load_engines_from_env()),
			logging: Some(load_logging_from_env()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_u16(name: &str) -> Result<Option<u16>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u16 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_u64(name: &str) -> Result<Option<u64>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u64 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_list(name: &str) -> Option<Vec<String>> {
	env_var(name).map(|v| split_list(&v))
}

fn env_ips(name: &str) -> Result<Option<Vec<IpAddr>>, ConfigError> {
	let Some(entries) = env_list(name) else {
		return Ok(None);
	};
	entries
		.iter()
		.map(|entry| {
			entry.parse().map_err(|_| ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid IP address '{entry}'"),
			})
		})
		.collect::<Result<Vec<_>, _>>()
		.map(Some)
}

/// Split a comma-separated list, dropping blanks.
fn split_list(value: &str) -> Vec<String> {
	value
		.split(',')
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(String::from)
		.collect()
}

fn load_http_from_env() -> Result<HttpConfigLayer, ConfigError> {
	Ok(HttpConfigLayer {
		host: env_var("SWP_API_HOST"),
		port: env_u16("SWP_API_PORT")?,
	})
}

fn load_site_from_env() -> Result<SiteConfigLayer, ConfigError> {
	Ok(SiteConfigLayer {
		default_posts_per_page: env_u64("SWP_API_SITE_POSTS_PER_PAGE")?,
		url: env_var("SWP_API_SITE_URL"),
	})
}

fn load_policy_from_env() -> Result<PolicyConfigLayer, ConfigError> {
	Ok(PolicyConfigLayer {
		max_posts_per_page: env_u64("SWP_API_MAX_POSTS_PER_PAGE")?,
		allow_query: env_bool("SWP_API_ALLOW_QUERY"),
		allowed_ips: env_ips("SWP_API_ALLOWED_IPS")?,
		trusted_proxies: env_ips("SWP_API_TRUSTED_PROXIES")?,
		disabled_params: env_list("SWP_API_DISABLED_PARAMS"),
	})
}

fn load_engines_from_env() -> EnginesConfigLayer {
	EnginesConfigLayer {
		names: env_list("SWP_API_ENGINES"),
		index_path: env_var("SWP_API_INDEX_PATH").map(PathBuf::from),
	}
}

fn load_logging_from_env() -> Result<LoggingConfigLayer, ConfigError> {
	Ok(LoggingConfigLayer {
		level: env_var("SWP_API_LOG_LEVEL"),
		format: env_var("SWP_API_LOG_FORMAT").map(|v| v.parse()).transpose()?,
	})
}
