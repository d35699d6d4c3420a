// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the WhatsApp Cloud API.
//!
//! One client per line (customer support / supplier follow-up); each line
//! sends from its own phone number id with its own bearer token.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::json;
use suptrack_core::{OutboundMessage, Phone, SuptrackError};
use tracing::{debug, warn};

use crate::template::normalize_params;

/// Base URL for the WhatsApp Cloud API.
const API_BASE_URL: &str = "https://graph.facebook.com/v18.0";

/// HTTP client for one WhatsApp Cloud API line.
#[derive(Debug, Clone)]
pub struct WhatsappClient {
    client: reqwest::Client,
    base_url: String,
    phone_number_id: String,
}

impl WhatsappClient {
    /// Creates a client for the line identified by `phone_number_id`.
    pub fn new(access_token: &str, phone_number_id: String) -> Result<Self, SuptrackError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {access_token}"))
            .map_err(|e| SuptrackError::Config(format!("invalid access token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert("authorization", auth);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SuptrackError::Gateway {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            phone_number_id,
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Sends one message to `to`, blocking until the provider accepts it.
    ///
    /// Transport failures and non-2xx responses both surface as gateway
    /// errors; the caller decides whether the operation aborts or degrades.
    pub async fn send(&self, to: &Phone, message: &OutboundMessage) -> Result<(), SuptrackError> {
        let payload = build_payload(to, message);
        let url = format!("{}/{}/messages", self.base_url, self.phone_number_id);

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SuptrackError::Gateway {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(to = %to, status = %status, "message accepted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        warn!(to = %to, status = %status, body = %body, "message rejected");
        Err(SuptrackError::Gateway {
            message: format!("provider returned {status}: {body}"),
            source: None,
        })
    }
}

fn build_payload(to: &Phone, message: &OutboundMessage) -> serde_json::Value {
    match message {
        OutboundMessage::Text { body } => json!({
            "messaging_product": "whatsapp",
            "to": to.as_str(),
            "type": "text",
            "text": { "body": body },
        }),
        OutboundMessage::Template {
            name,
            language,
            parameters,
        } => {
            let parameters: Vec<_> = normalize_params(name, parameters)
                .into_iter()
                .map(|text| json!({ "type": "text", "text": text }))
                .collect();
            json!({
                "messaging_product": "whatsapp",
                "to": to.as_str(),
                "type": "template",
                "template": {
                    "name": name,
                    "language": { "code": language },
                    "components": [{ "type": "body", "parameters": parameters }],
                },
            })
        }
        OutboundMessage::Buttons { body, buttons } => {
            let buttons: Vec<_> = buttons
                .iter()
                .map(|b| {
                    json!({
                        "type": "reply",
                        "reply": { "id": b.id, "title": b.title },
                    })
                })
                .collect();
            json!({
                "messaging_product": "whatsapp",
                "to": to.as_str(),
                "type": "interactive",
                "interactive": {
                    "type": "button",
                    "body": { "text": body },
                    "action": { "buttons": buttons },
                },
            })
        }
    }
}
