// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server for both WhatsApp lines and the ticket form.
//!
//! Exposes the Meta verification handshakes, the two inbound-message
//! webhooks, the external form submission endpoint, and a health check.

pub mod handlers;
pub mod server;

pub use server::{start_server, GatewayState};
