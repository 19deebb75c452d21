// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Build information for swp-api-server.

/// Format version info for display.
pub fn format_version_info() -> String {
	format!(
		"swp-api-server version: {}\n\
		 Platform:               {}-{}",
		env!("CARGO_PKG_VERSION"),
		std::env::consts::OS,
		std::env::consts::ARCH,
	)
}
