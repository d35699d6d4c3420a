// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query operations, one module per aggregate.

pub mod closures;
pub mod conversations;
pub mod dedup;
pub mod followups;
pub mod interactions;
pub mod reschedules;
pub mod stores;
