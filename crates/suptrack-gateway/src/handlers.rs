// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the webhook server.
//!
//! Message webhooks always answer `200 EVENT_RECEIVED`: Meta retries
//! non-2xx responses, and a processing failure on one message must not
//! replay the whole delivery. Failures are logged and dropped.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use suptrack_core::Phone;
use suptrack_whatsapp::{extract_events, WebhookDelivery};
use tracing::{debug, error, warn};

use crate::server::GatewayState;

/// Query parameters of the Meta webhook verification handshake.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode", default)]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token", default)]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge", default)]
    pub challenge: Option<String>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// External ticket-form submission.
///
/// The phone identifies the conversation; every other field is stored
/// verbatim as the form payload.
#[derive(Debug, Deserialize)]
pub struct FormSubmission {
    pub telefono: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// GET /webhook — support-line verification handshake.
pub async fn verify_support(
    State(state): State<GatewayState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    verify(
        state.services.config.whatsapp.verify_token.as_deref(),
        "support",
        params,
    )
}

/// GET /webhook/seguimiento — follow-up-line verification handshake.
pub async fn verify_followup(
    State(state): State<GatewayState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    verify(
        state.services.config.followup.verify_token.as_deref(),
        "followup",
        params,
    )
}

/// Echo the challenge iff the mode and token match; 403 otherwise.
fn verify(expected: Option<&str>, line: &'static str, params: VerifyParams) -> Response {
    let Some(expected) = expected else {
        warn!(line, "verification attempted but no verify token configured");
        return StatusCode::FORBIDDEN.into_response();
    };
    let subscribe = params.mode.as_deref() == Some("subscribe");
    let token_ok = params.verify_token.as_deref() == Some(expected);
    if subscribe && token_ok {
        debug!(line, "webhook verification succeeded");
        (StatusCode::OK, params.challenge.unwrap_or_default()).into_response()
    } else {
        warn!(line, "webhook verification rejected");
        StatusCode::FORBIDDEN.into_response()
    }
}

/// POST /webhook — inbound customer-support messages.
pub async fn post_support(
    State(state): State<GatewayState>,
    Json(delivery): Json<WebhookDelivery>,
) -> impl IntoResponse {
    for event in extract_events(&delivery) {
        if let Err(e) = suptrack_tasks::handle_support_event(&state.services, &event).await {
            error!(id = %event.id.0, error = %e, "support event processing failed");
        }
    }
    (StatusCode::OK, "EVENT_RECEIVED")
}

/// POST /webhook/seguimiento — inbound supplier follow-up replies.
pub async fn post_followup(
    State(state): State<GatewayState>,
    Json(delivery): Json<WebhookDelivery>,
) -> impl IntoResponse {
    for event in extract_events(&delivery) {
        if let Err(e) = suptrack_tasks::handle_followup_event(&state.services, &event).await {
            error!(id = %event.id.0, error = %e, "follow-up event processing failed");
        }
    }
    (StatusCode::OK, "EVENT_RECEIVED")
}

/// POST /formulario-ticket — external form submissions.
pub async fn post_form(
    State(state): State<GatewayState>,
    Json(submission): Json<FormSubmission>,
) -> Response {
    let bot = &state.services.config.bot;
    let Some(phone) = Phone::normalize(&submission.telefono, &bot.country_code, bot.min_phone_digits)
    else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: "teléfono inválido".to_string(),
            }),
        )
            .into_response();
    };

    let form = serde_json::Value::Object(submission.fields);
    match suptrack_tasks::handle_form_submission(&state.services, &phone, &form).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "ok": true }))).into_response(),
        Err(e) => {
            error!(phone = %phone, error = %e, "form submission failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "no se pudo registrar el formulario".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health — liveness probe.
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
