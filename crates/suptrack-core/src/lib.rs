// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the suptrack support & supplier follow-up bot.
//!
//! This crate provides the workspace error type, the channel-agnostic
//! inbound/outbound message types, phone normalization, and the
//! fixed-offset local-time helpers used by both state machines.

pub mod error;
pub mod localtime;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SuptrackError;
pub use localtime::LocalZone;
pub use types::{Button, InboundEvent, InboundPayload, MessageId, OutboundMessage, Phone};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suptrack_error_has_all_variants() {
        let _config = SuptrackError::Config("test".into());
        let _storage = SuptrackError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _gateway = SuptrackError::Gateway {
            message: "test".into(),
            source: None,
        };
        let _crm = SuptrackError::Crm {
            message: "test".into(),
            source: None,
        };
        let _mail = SuptrackError::Mail("test".into());
        let _internal = SuptrackError::Internal("test".into());
    }
}
