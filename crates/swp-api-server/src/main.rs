// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! swp_api search server binary.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::Method;
use clap::{Parser, Subcommand};
use swp_api_config::LogFormat;
use swp_api_memory::{MemoryEngine, MemoryIndex};
use swp_api_server::{create_app_state, create_router, version, SEARCH_PATH};
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// swp-api-server - HTTP search endpoint in front of a search engine.
#[derive(Parser, Debug)]
#[command(name = "swp-api-server", about = "swp_api search endpoint server", version)]
struct Args {
	/// Path to a TOML config file (defaults to /etc/swp-api/server.toml)
	#[arg(long, env = "SWP_API_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => swp_api_config::load_config_with_file(path)?,
		None => swp_api_config::load_config()?,
	};

	let (text_layer, json_layer) = match config.logging.format {
		LogFormat::Text => (Some(tracing_subscriber::fmt::layer()), None),
		LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
	};

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(text_layer)
		.with(json_layer)
		.init();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		engines = ?config.engines.names,
		"starting swp-api-server"
	);

	let index = match &config.engines.index_path {
		Some(path) => MemoryIndex::load(path)?,
		None => {
			tracing::warn!("No index path configured, serving an empty index");
			MemoryIndex::default()
		}
	};

	let state = create_app_state(&config, MemoryEngine::new(index));

	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods([Method::GET])
				.allow_headers(Any),
		);

	let addr = config.socket_addr();
	tracing::info!(path = SEARCH_PATH, "listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
