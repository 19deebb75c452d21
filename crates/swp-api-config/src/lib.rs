// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for the swp_api search server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`SWP_API_*`)
//!
//! # Usage
//!
//! ```ignore
//! use swp_api_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub site: SiteConfig,
	pub policy: PolicyConfig,
	pub engines: EnginesConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`SWP_API_*`)
/// 2. Config file (`/etc/swp-api/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	let mut merged = ServerConfigLayer::default();
	merged.merge(EnvSource.load()?);
	finalize(merged)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let config = ServerConfig {
		http: layer.http.unwrap_or_default().finalize(),
		site: layer.site.unwrap_or_default().finalize(),
		policy: layer.policy.unwrap_or_default().finalize(),
		engines: layer.engines.unwrap_or_default().finalize(),
		logging: layer.logging.unwrap_or_default().finalize(),
	};

	validate_config(&config)?;

	info!(
		host = %config.http.host,
		port = config.http.port,
		max_posts_per_page = config.policy.max_posts_per_page,
		allow_query = config.policy.allow_query,
		allowed_ips = config.policy.allowed_ips.len(),
		trusted_proxies = config.policy.trusted_proxies.len(),
		engines = ?config.engines.names,
		index_configured = config.engines.index_path.is_some(),
		"Server configuration loaded"
	);

	Ok(config)
}

/// Validate cross-field configuration rules.
fn validate_config(config: &ServerConfig) -> Result<(), ConfigError> {
	if config.engines.names.iter().any(|name| name.trim().is_empty()) {
		return Err(ConfigError::Validation(
			"engine names must not be blank".to_string(),
		));
	}

	if config.site.default_posts_per_page == 0 {
		return Err(ConfigError::Validation(
			"site.default_posts_per_page must be at least 1".to_string(),
		));
	}

	Ok(())
}
