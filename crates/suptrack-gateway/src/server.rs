// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state. The server is the only
//! inbound surface: Meta calls the webhooks, the external ticket form
//! posts submissions, and the health endpoint serves probes.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use suptrack_core::SuptrackError;
use suptrack_tasks::Services;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub services: Arc<Services>,
}

/// Start the webhook server, shutting down gracefully on `cancel`.
///
/// Routes:
/// - GET  /health
/// - GET  /webhook               (support-line verification handshake)
/// - POST /webhook               (support-line messages)
/// - GET  /webhook/seguimiento   (follow-up-line verification handshake)
/// - POST /webhook/seguimiento   (follow-up-line messages)
/// - POST /formulario-ticket     (external form submissions)
pub async fn start_server(
    host: &str,
    port: u16,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), SuptrackError> {
    let app = Router::new()
        .route("/health", get(handlers::get_health))
        .route(
            "/webhook",
            get(handlers::verify_support).post(handlers::post_support),
        )
        .route(
            "/webhook/seguimiento",
            get(handlers::verify_followup).post(handlers::post_followup),
        )
        .route("/formulario-ticket", post(handlers::post_form))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SuptrackError::Gateway {
            message: format!("failed to bind webhook server to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("webhook server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| SuptrackError::Gateway {
            message: format!("webhook server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
