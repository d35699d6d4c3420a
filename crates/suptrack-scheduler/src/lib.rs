// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic background sweeps.
//!
//! Each sweep is a cancellable interval loop over one task-layer
//! function. All scheduling state is in the database, so a missed tick
//! (crash, redeploy) only delays work; nothing is lost and nothing runs
//! twice. Tick errors are logged and the loop keeps going.

pub mod shutdown;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use suptrack_core::SuptrackError;
use suptrack_tasks::Services;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Seconds between silence-closure sweeps. Deadlines are minute-scale,
/// so half-minute polling keeps closures prompt without hammering the DB.
const SILENCE_TICK_SECS: u64 = 30;
/// Seconds between PENDIENTE_FLUJO send sweeps.
const PENDING_TICK_SECS: u64 = 60;
/// Seconds between reschedule-runner sweeps.
const RESCHEDULE_TICK_SECS: u64 = 60;
/// Seconds between CRM ingestion sweeps.
const INGEST_TICK_SECS: u64 = 300;

/// Spawn every background sweep. The returned handles finish when
/// `cancel` fires.
pub fn spawn_all(
    services: Arc<Services>,
    cancel: CancellationToken,
) -> Vec<JoinHandle<()>> {
    vec![
        spawn_silence_sweep(services.clone(), cancel.clone()),
        spawn_pending_sweep(services.clone(), cancel.clone()),
        spawn_reschedule_sweep(services.clone(), cancel.clone()),
        spawn_ingest_sweep(services, cancel),
    ]
}

fn spawn_silence_sweep(services: Arc<Services>, cancel: CancellationToken) -> JoinHandle<()> {
    spawn_loop("silence", SILENCE_TICK_SECS, cancel, move || {
        let services = services.clone();
        async move {
            let closed = suptrack_tasks::close_due_silences(&services, Utc::now()).await?;
            if closed > 0 {
                info!(closed, "silence sweep closed follow-ups");
            }
            Ok(())
        }
    })
}

fn spawn_pending_sweep(services: Arc<Services>, cancel: CancellationToken) -> JoinHandle<()> {
    spawn_loop("pending-flow", PENDING_TICK_SECS, cancel, move || {
        let services = services.clone();
        async move {
            let sent = suptrack_tasks::sweep_pending_flow(&services, Utc::now()).await?;
            if sent > 0 {
                info!(sent, "pending sweep dispatched initial templates");
            }
            Ok(())
        }
    })
}

fn spawn_reschedule_sweep(services: Arc<Services>, cancel: CancellationToken) -> JoinHandle<()> {
    spawn_loop("reschedule", RESCHEDULE_TICK_SECS, cancel, move || {
        let services = services.clone();
        async move {
            let executed =
                suptrack_tasks::run_pending_reschedules(&services, Utc::now()).await?;
            if executed > 0 {
                info!(executed, "reschedule sweep executed queued follow-ups");
            }
            Ok(())
        }
    })
}

fn spawn_ingest_sweep(services: Arc<Services>, cancel: CancellationToken) -> JoinHandle<()> {
    spawn_loop("ingest", INGEST_TICK_SECS, cancel, move || {
        let services = services.clone();
        async move {
            suptrack_tasks::ingest_today(&services).await?;
            Ok(())
        }
    })
}

/// Run `tick` every `period_secs` until cancellation. The first
/// immediate interval tick is skipped so startup does not stampede.
fn spawn_loop<F, Fut>(
    name: &'static str,
    period_secs: u64,
    cancel: CancellationToken,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = Result<(), SuptrackError>> + Send,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(period_secs));
        interval.tick().await;
        debug!(sweep = name, period_secs, "sweep started");
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = tick().await {
                        warn!(sweep = name, error = %e, "sweep tick failed");
                    }
                }
                _ = cancel.cancelled() => {
                    info!(sweep = name, "sweep shutting down");
                    break;
                }
            }
        }
    })
}
