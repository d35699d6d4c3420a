// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure state machines for the two bot flows.
//!
//! [`conversation`] drives the customer-support dialogue, [`followup`]
//! drives the supplier follow-up cycle. Both are transition functions
//! with no I/O: they consume the current persisted row plus an inbound
//! message and return what to send, what to persist, and what to
//! schedule. The task layer executes those outcomes.

pub mod conversation;
pub mod followup;
pub mod messages;

pub use conversation::{
    transition, EngineContext, Outcome, StoreDirectory, TicketLookup,
};
pub use followup::{
    initial_send_plan, on_button, on_text, silence_close_template, FollowUpContext,
    FollowUpOutcome, InitialSend, MailRequest,
};
