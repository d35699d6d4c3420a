// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Cloud API integration: outbound sends, inbound webhook payload
//! types, and template parameter normalization.

pub mod client;
pub mod template;
pub mod webhook;

pub use client::WhatsappClient;
pub use webhook::{extract_events, WebhookDelivery};
