// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer-support webhook processing.
//!
//! One inbound message = one engine transition, persisted before any
//! reply goes out. CRM lookups run after the transition is stored; a
//! CRM outage degrades to the not-found reply instead of failing the
//! webhook.

use std::collections::HashMap;

use chrono::Utc;
use suptrack_core::{InboundEvent, InboundPayload, OutboundMessage, Phone, SuptrackError};
use suptrack_crm::TicketFilter;
use suptrack_engine::conversation::{transition, EngineContext, StoreDirectory, TicketLookup};
use suptrack_engine::messages;
use suptrack_storage::queries::{conversations, interactions, stores};
use suptrack_storage::{ConversationState, Database};
use tracing::{debug, warn};

use crate::context::{send_best_effort, Services};

/// In-memory snapshot of the store directory for one transition.
///
/// The engine trait is synchronous, so the async store queries are
/// resolved up front. The table is small (a few hundred rows).
pub struct SnapshotDirectory {
    codes: HashMap<i64, String>,
}

impl SnapshotDirectory {
    pub async fn load(db: &Database) -> Result<SnapshotDirectory, SuptrackError> {
        let records = stores::list_all(db).await?;
        Ok(SnapshotDirectory {
            codes: records.into_iter().map(|s| (s.local, s.code)).collect(),
        })
    }
}

impl StoreDirectory for SnapshotDirectory {
    fn local_exists(&self, local: i64) -> bool {
        self.codes.contains_key(&local)
    }

    fn code_matches(&self, local: i64, code: &str) -> bool {
        self.codes
            .get(&local)
            .is_some_and(|expected| expected.trim().eq_ignore_ascii_case(code.trim()))
    }
}

/// Process one inbound event on the customer-support line.
pub async fn handle_support_event(
    services: &Services,
    event: &InboundEvent,
) -> Result<(), SuptrackError> {
    let text = match &event.payload {
        InboundPayload::Text(body) => body.clone(),
        InboundPayload::ButtonReply { title, .. } => title.clone(),
        InboundPayload::Unsupported => {
            debug!(from = %event.from, "non-text payload on support line");
            let reply = OutboundMessage::text(messages::text_only());
            send_best_effort(&services.support, "support", &event.from, &reply).await;
            return Ok(());
        }
    };

    let now = Utc::now();
    let phone = &event.from;
    let conversation = conversations::get_or_create(&services.db, phone.as_str()).await?;
    let directory = SnapshotDirectory::load(&services.db).await?;

    let bot = &services.config.bot;
    let ctx = EngineContext {
        now,
        zone: services.zone,
        form_url: &bot.form_url,
        helpdesk_number: &bot.helpdesk_number,
        emergency_number: &bot.emergency_number,
        form_reminder_min: bot.form_reminder_min,
        form_ask_min: bot.form_ask_min,
    };

    let Some(outcome) = transition(&conversation, &text, &directory, &ctx) else {
        return Ok(());
    };

    log_interaction(services, phone, "in", &text, conversation.state).await;

    conversations::apply_transition(
        &services.db,
        phone.as_str(),
        outcome.state,
        outcome.attempts,
        &outcome.data,
        outcome.clear_form,
        now,
    )
    .await?;

    for reply in &outcome.replies {
        deliver(services, phone, reply, outcome.state).await;
    }

    if let Some(lookup) = &outcome.lookup {
        let body = run_lookup(services, lookup).await;
        deliver(services, phone, &OutboundMessage::text(body), outcome.state).await;
        if outcome.ask_more_after_lookup {
            deliver(
                services,
                phone,
                &OutboundMessage::text(messages::ask_more()),
                outcome.state,
            )
            .await;
        }
    }

    Ok(())
}

/// Attach an external form submission to the sender's conversation.
///
/// The conversation moves to FIN and the customer gets the registration
/// confirmation. A form can arrive before any chat message (the link is
/// shareable), so the conversation is created on demand.
pub async fn handle_form_submission(
    services: &Services,
    phone: &Phone,
    form: &serde_json::Value,
) -> Result<(), SuptrackError> {
    let now = Utc::now();
    conversations::get_or_create(&services.db, phone.as_str()).await?;
    conversations::attach_form(&services.db, phone.as_str(), form, now).await?;
    deliver(
        services,
        phone,
        &OutboundMessage::text(messages::form_registered()),
        ConversationState::Fin,
    )
    .await;
    Ok(())
}

/// Send one reply and log it to the interactions table.
async fn deliver(services: &Services, to: &Phone, message: &OutboundMessage, state: ConversationState) {
    send_best_effort(&services.support, "support", to, message).await;
    let body = match message {
        OutboundMessage::Text { body } => body.as_str(),
        OutboundMessage::Buttons { body, .. } => body.as_str(),
        OutboundMessage::Template { name, .. } => name.as_str(),
    };
    log_interaction(services, to, "out", body, state).await;
}

/// Append to the interaction log; a failed write is logged and the
/// dialogue continues.
async fn log_interaction(
    services: &Services,
    phone: &Phone,
    direction: &str,
    body: &str,
    state: ConversationState,
) {
    if let Err(e) =
        interactions::record(&services.db, phone.as_str(), direction, body, Some(&state.to_string()))
            .await
    {
        warn!(phone = %phone, error = %e, "interaction log write failed");
    }
}

/// Run one CRM search and render the reply body.
///
/// Tickets without a case id are CRM placeholder rows and do not count
/// as results.
async fn run_lookup(services: &Services, lookup: &TicketLookup) -> String {
    let helpdesk = &services.config.bot.helpdesk_number;
    let (filter, not_found) = match lookup {
        TicketLookup::CaseId(value) => (
            TicketFilter::CaseId(value.clone()),
            messages::ticket_not_found(value, helpdesk),
        ),
        TicketLookup::Tririga(value) => (
            TicketFilter::Tririga(value.clone()),
            messages::tririga_not_found(value, helpdesk),
        ),
        TicketLookup::Local(value) => (
            TicketFilter::Local(value.clone()),
            messages::local_not_found(value, helpdesk),
        ),
    };

    let Some(crm) = &services.crm else {
        warn!("CRM not configured, answering lookup as not found");
        return not_found;
    };

    match crm.list_tickets(&filter).await {
        Ok(tickets) => {
            let summaries: Vec<String> = tickets
                .iter()
                .filter(|t| t.case_id.is_some())
                .map(|t| t.summary())
                .collect();
            if summaries.is_empty() {
                not_found
            } else {
                messages::ticket_result(&summaries.join("\n\n"), helpdesk)
            }
        }
        Err(e) => {
            warn!(error = %e, "CRM lookup failed, answering as not found");
            not_found
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use suptrack_config::SuptrackConfig;
    use suptrack_core::MessageId;
    use suptrack_storage::queries::stores;
    use suptrack_storage::StoreRecord;
    use tempfile::tempdir;

    async fn setup() -> (Services, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let mut config = SuptrackConfig::default();
        config.storage.database_path = dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .into_owned();
        let services = Services::from_config(config).await.unwrap();
        (services, dir)
    }

    fn event(from: &str, text: &str) -> InboundEvent {
        InboundEvent {
            id: MessageId(format!("wamid.{text}")),
            from: Phone::from_stored(from),
            payload: InboundPayload::Text(text.to_string()),
        }
    }

    #[tokio::test]
    async fn greeting_advances_and_is_logged() {
        let (services, _dir) = setup().await;

        handle_support_event(&services, &event("+56911111111", "hola"))
            .await
            .unwrap();

        let conversation = conversations::get(&services.db, "+56911111111")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conversation.state, ConversationState::EsperandoOpcionMenu);

        let log = interactions::recent_for_phone(&services.db, "+56911111111", 10)
            .await
            .unwrap();
        // One inbound plus at least one reply.
        assert!(log.iter().any(|i| i.direction == "in" && i.body == "hola"));
        assert!(log.iter().any(|i| i.direction == "out"));
    }

    #[tokio::test]
    async fn broken_interaction_log_does_not_block_the_dialogue() {
        let (services, _dir) = setup().await;
        services
            .db
            .connection()
            .call(|conn| {
                conn.execute_batch("DROP TABLE interactions")?;
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();

        handle_support_event(&services, &event("+56911111111", "hola"))
            .await
            .unwrap();

        let conversation = conversations::get(&services.db, "+56911111111")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conversation.state, ConversationState::EsperandoOpcionMenu);
    }

    #[tokio::test]
    async fn non_text_payload_creates_no_conversation() {
        let (services, _dir) = setup().await;

        let event = InboundEvent {
            id: MessageId("wamid.media".to_string()),
            from: Phone::from_stored("+56911111111"),
            payload: InboundPayload::Unsupported,
        };
        handle_support_event(&services, &event).await.unwrap();

        assert!(conversations::get(&services.db, "+56911111111")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn snapshot_directory_matches_codes_case_insensitively() {
        let (services, _dir) = setup().await;
        stores::upsert(
            &services.db,
            &StoreRecord {
                code: "AbC123".to_string(),
                local: 45,
                business: None,
                region: None,
                name: Some("Local 45".to_string()),
            },
        )
        .await
        .unwrap();

        let directory = SnapshotDirectory::load(&services.db).await.unwrap();
        assert!(directory.local_exists(45));
        assert!(!directory.local_exists(46));
        assert!(directory.code_matches(45, " abc123 "));
        assert!(!directory.code_matches(45, "xyz"));
    }

    #[tokio::test]
    async fn lookup_without_crm_reports_not_found() {
        let (services, _dir) = setup().await;
        let body = run_lookup(&services, &TicketLookup::CaseId("12345".to_string())).await;
        assert!(body.contains("12345"));
    }
}
