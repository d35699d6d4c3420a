// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the CRM ticket API.
//!
//! Login yields a plain-text token valid for roughly an hour; the client
//! caches it and retries a request once after a 401 with a fresh login.

use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use suptrack_core::SuptrackError;
use tracing::{debug, warn};

use crate::ticket::{normalize, Ticket, TicketFilter};
use crate::token::TokenCache;

/// Client for the CRM ticket API.
pub struct CrmClient {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    cache: TokenCache,
}

impl CrmClient {
    pub fn new(
        base_url: String,
        username: String,
        password: String,
        token_ttl_min: u64,
    ) -> Result<Self, SuptrackError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SuptrackError::Crm {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
            cache: TokenCache::new(token_ttl_min),
        })
    }

    /// Tickets matching one search filter.
    pub async fn list_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, SuptrackError> {
        let (param, value) = filter.query_param();
        self.get_tickets("Ticket/listar", &[(param, value)]).await
    }

    /// Every ticket opened today, for the ingestion sweep.
    pub async fn list_today(&self) -> Result<Vec<Ticket>, SuptrackError> {
        self.get_tickets("Ticket/listarDia", &[]).await
    }

    /// Authenticated GET with one relogin retry on 401.
    async fn get_tickets(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<Ticket>, SuptrackError> {
        let token = self.token().await?;
        let url = format!("{}/{endpoint}", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(query)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| SuptrackError::Crm {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let response = if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            warn!(endpoint, "token rejected, logging in again");
            self.cache.invalidate().await;
            let token = self.token().await?;
            self.client
                .get(&url)
                .query(query)
                .bearer_auth(&token)
                .send()
                .await
                .map_err(|e| SuptrackError::Crm {
                    message: format!("HTTP request failed after relogin: {e}"),
                    source: Some(Box::new(e)),
                })?
        } else {
            response
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SuptrackError::Crm {
                message: format!("{endpoint} returned {status}: {body}"),
                source: None,
            });
        }

        let body: Value = response.json().await.map_err(|e| SuptrackError::Crm {
            message: format!("{endpoint} returned invalid JSON: {e}"),
            source: Some(Box::new(e)),
        })?;

        let tickets: Vec<Ticket> = body
            .pointer("/result/ticket")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(normalize).collect())
            .unwrap_or_default();
        debug!(endpoint, count = tickets.len(), "tickets fetched");
        Ok(tickets)
    }

    /// The cached token, or a fresh one from `Login/Token`.
    ///
    /// The login endpoint answers with the token as plain text, usually
    /// wrapped in quotes and trailing whitespace.
    async fn token(&self) -> Result<String, SuptrackError> {
        let now = Utc::now();
        if let Some(token) = self.cache.get(now).await {
            return Ok(token);
        }

        let url = format!("{}/Login/Token", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("usuario", self.username.as_str()),
                ("contrasena", self.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SuptrackError::Crm {
                message: format!("login request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SuptrackError::Crm {
                message: format!("login returned {status}"),
                source: None,
            });
        }

        let body = response.text().await.map_err(|e| SuptrackError::Crm {
            message: format!("login body unreadable: {e}"),
            source: Some(Box::new(e)),
        })?;
        let token = body
            .trim_matches(|c: char| c == '"' || c.is_whitespace())
            .to_string();
        if token.is_empty() {
            return Err(SuptrackError::Crm {
                message: "login returned an empty token".to_string(),
                source: None,
            });
        }

        self.cache.put(token.clone(), now).await;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{bearer_token, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> CrmClient {
        CrmClient::new(server.uri(), "bot".to_string(), "secret".to_string(), 50).unwrap()
    }

    fn mount_login(server: &MockServer, token: &str) -> Mock {
        Mock::given(method("GET"))
            .and(path("/Login/Token"))
            .and(query_param("usuario", "bot"))
            .and(query_param("contrasena", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("\"{token}\"\n")))
    }

    #[tokio::test]
    async fn login_token_is_cached_across_requests() {
        let server = MockServer::start().await;
        mount_login(&server, "tok-abc")
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Ticket/listar"))
            .and(bearer_token("tok-abc"))
            .and(query_param("idTicket", "1001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": { "ticket": [{ "iD_ATENCION": "1001" }] }
            })))
            .expect(2)
            .mount(&server)
            .await;

        let crm = client(&server);
        let filter = TicketFilter::CaseId("1001".to_string());
        let first = crm.list_tickets(&filter).await.unwrap();
        let second = crm.list_tickets(&filter).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second[0].case_id.as_deref(), Some("1001"));
    }

    #[tokio::test]
    async fn unauthorized_triggers_one_relogin() {
        let server = MockServer::start().await;
        mount_login(&server, "tok-fresh").mount(&server).await;
        // Stale bearer is rejected once; the retry carries the fresh token.
        Mock::given(method("GET"))
            .and(path("/Ticket/listarDia"))
            .and(bearer_token("tok-stale"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Ticket/listarDia"))
            .and(bearer_token("tok-fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": { "ticket": [] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let crm = client(&server);
        crm.cache.put("tok-stale".to_string(), Utc::now()).await;
        let tickets = crm.list_today().await.unwrap();
        assert!(tickets.is_empty());
    }

    #[tokio::test]
    async fn missing_ticket_array_means_no_results() {
        let server = MockServer::start().await;
        mount_login(&server, "tok-abc").mount(&server).await;
        Mock::given(method("GET"))
            .and(path("/Ticket/listar"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "result": { "mensaje": "sin datos" } })),
            )
            .mount(&server)
            .await;

        let crm = client(&server);
        let tickets = crm
            .list_tickets(&TicketFilter::Local("45".to_string()))
            .await
            .unwrap();
        assert!(tickets.is_empty());
    }

    #[tokio::test]
    async fn failed_login_surfaces_as_crm_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Login/Token"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let crm = client(&server);
        let err = crm.list_today().await.unwrap_err();
        assert!(matches!(err, SuptrackError::Crm { .. }));
    }
}
