// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CRM ticket API client.
//!
//! Bearer-token login with a soft-expiry cache (eagerly invalidated on
//! 401), ticket search by case/tririga/local filters, and normalization
//! of the API's erratically-cased field names.

pub mod client;
pub mod ticket;
pub mod token;

pub use client::CrmClient;
pub use ticket::{Ticket, TicketFilter};
pub use token::TokenCache;
