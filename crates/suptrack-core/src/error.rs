// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the suptrack workspace.

use thiserror::Error;

/// The primary error type used across all suptrack crates.
#[derive(Debug, Error)]
pub enum SuptrackError {
    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging gateway errors (WhatsApp Cloud API transport or rejection).
    #[error("gateway error: {message}")]
    Gateway {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// CRM ticket API errors (login failure, expired token, transport).
    #[error("crm error: {message}")]
    Crm {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Mail dispatch errors. Always best-effort; callers log and continue.
    #[error("mail error: {0}")]
    Mail(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
