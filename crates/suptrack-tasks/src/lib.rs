// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Executable task units for both bot flows.
//!
//! The state machines in `suptrack-engine` are pure; everything here
//! executes their outcomes: persisting transitions, sending WhatsApp
//! messages, querying the CRM, arming silence checks, and dispatching
//! confirmation mail. The gateway and scheduler call into this crate
//! and nothing else.

pub mod context;
pub mod followup;
pub mod ingest;
pub mod runner;
pub mod support;

pub use context::Services;
pub use followup::{close_due_silences, handle_followup_event, send_initial, sweep_pending_flow};
pub use ingest::{ingest_today, IngestReport};
pub use runner::run_pending_reschedules;
pub use support::{handle_form_submission, handle_support_event};
