// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `suptrack serve` command implementation.
//!
//! Builds the service bundle, spawns the background sweeps, and runs
//! the webhook server until SIGINT/SIGTERM. The sweeps and the server
//! share one cancellation token, so either signal drains everything.

use std::sync::Arc;

use suptrack_config::SuptrackConfig;
use suptrack_core::SuptrackError;
use suptrack_gateway::GatewayState;
use suptrack_scheduler::shutdown;
use suptrack_tasks::Services;
use tracing::info;

/// Runs the `suptrack serve` command.
pub async fn run(config: SuptrackConfig) -> Result<(), SuptrackError> {
    info!("starting suptrack serve");

    let host = config.server.host.clone();
    let port = config.server.port;
    let services = Arc::new(Services::from_config(config).await?);

    let cancel = shutdown::install_signal_handler();
    let sweeps = suptrack_scheduler::spawn_all(services.clone(), cancel.clone());

    let state = GatewayState { services };
    let result = suptrack_gateway::start_server(&host, port, state, cancel.clone()).await;

    // Whether the server exited by signal or by error, drain the sweeps.
    cancel.cancel();
    for handle in sweeps {
        let _ = handle.await;
    }

    info!("suptrack serve shutdown complete");
    result
}
