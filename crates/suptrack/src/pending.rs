// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `suptrack run-pending` command implementation.
//!
//! One-shot execution of due reschedules, for operators and cron-style
//! setups that do not run the full server.

use chrono::Utc;
use suptrack_config::SuptrackConfig;
use suptrack_core::SuptrackError;
use suptrack_tasks::Services;

/// Runs the `suptrack run-pending` command.
pub async fn run(config: SuptrackConfig) -> Result<(), SuptrackError> {
    let services = Services::from_config(config).await?;
    let executed = suptrack_tasks::run_pending_reschedules(&services, Utc::now()).await?;
    println!("{executed} reschedule(s) executed");
    Ok(())
}
