// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loading for the suptrack bot.
//!
//! TOML files merged in XDG order with `SUPTRACK_` environment variable
//! overrides. All model structs reject unknown keys at startup.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{MailConfig, SuptrackConfig};
