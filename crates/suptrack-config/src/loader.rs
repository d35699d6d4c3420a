// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./suptrack.toml` > `~/.config/suptrack/suptrack.toml`
//! > `/etc/suptrack/suptrack.toml` with environment variable overrides via
//! `SUPTRACK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SuptrackConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/suptrack/suptrack.toml` (system-wide)
/// 3. `~/.config/suptrack/suptrack.toml` (user XDG config)
/// 4. `./suptrack.toml` (local directory)
/// 5. `SUPTRACK_*` environment variables
pub fn load_config() -> Result<SuptrackConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SuptrackConfig::default()))
        .merge(Toml::file("/etc/suptrack/suptrack.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("suptrack/suptrack.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("suptrack.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from an inline TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<SuptrackConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SuptrackConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SuptrackConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SuptrackConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `SUPTRACK_CRM_BASE_URL` must
/// map to `crm.base_url`, not `crm.base.url`.
fn env_provider() -> Env {
    Env::prefixed("SUPTRACK_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: SUPTRACK_WHATSAPP_ACCESS_TOKEN -> "whatsapp_access_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("whatsapp_", "whatsapp.", 1)
            .replacen("followup_", "followup.", 1)
            .replacen("crm_", "crm.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("server_", "server.", 1)
            .replacen("mail_", "mail.", 1)
            .replacen("bot_", "bot.", 1);
        mapped.into()
    })
}
