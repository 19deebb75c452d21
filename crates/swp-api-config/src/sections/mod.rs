// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod engines;
mod http;
mod logging;
mod policy;
mod site;

pub use engines::{EnginesConfig, EnginesConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use policy::{PolicyConfig, PolicyConfigLayer};
pub use site::{SiteConfig, SiteConfigLayer};
