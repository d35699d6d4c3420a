// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Supplier follow-up execution: webhook replies, initial template
//! sends, and the idempotent silence closer.
//!
//! Every outcome applies its compare-and-swap transition first. A lost
//! swap means a concurrent writer (usually the silence closer) got
//! there first, and all side effects are skipped.

use chrono::{DateTime, Duration, Utc};
use suptrack_core::{InboundEvent, InboundPayload, Phone, SuptrackError};
use suptrack_engine::followup as engine;
use suptrack_engine::FollowUpOutcome;
use suptrack_storage::queries::{closures, dedup, followups, reschedules};
use suptrack_storage::queries::followups::FollowUpUpdate;
use suptrack_storage::{FollowUp, FollowUpStatus};
use tracing::{debug, info, warn};

use crate::context::{send_best_effort, Services};

/// Process one inbound event on the supplier follow-up line.
///
/// Deduplicates by provider message id, binds the reply to the sender's
/// single active follow-up, and ignores replies after the reply window
/// closed (the silence closer owns those rows).
pub async fn handle_followup_event(
    services: &Services,
    event: &InboundEvent,
) -> Result<(), SuptrackError> {
    let now = Utc::now();
    let bot = &services.config.bot;

    if !dedup::claim_message(&services.db, &event.id.0, now, bot.dedup_ttl_min).await? {
        debug!(id = %event.id.0, "duplicate webhook delivery dropped");
        return Ok(());
    }

    let Some(follow_up) =
        followups::find_active_by_phone(&services.db, event.from.as_str()).await?
    else {
        debug!(from = %event.from, "no active follow-up for sender, ignoring");
        return Ok(());
    };

    if let Some(deadline) = follow_up.reply_deadline_at {
        if now > deadline {
            debug!(
                follow_up = follow_up.id,
                "reply arrived after the deadline, leaving it to the closer"
            );
            return Ok(());
        }
    }

    let ctx = services.followup_ctx(now);
    let outcome = match &event.payload {
        InboundPayload::Text(body) => engine::on_text(&follow_up, body, &ctx),
        InboundPayload::ButtonReply { id, .. } => engine::on_button(&follow_up, id, &ctx),
        InboundPayload::Unsupported => None,
    };

    match outcome {
        Some(outcome) => execute_outcome(services, &follow_up, outcome).await,
        None => Ok(()),
    }
}

/// Apply one engine outcome: CAS transition first, side effects only on
/// a won swap.
pub(crate) async fn execute_outcome(
    services: &Services,
    follow_up: &FollowUp,
    outcome: FollowUpOutcome,
) -> Result<(), SuptrackError> {
    if let Some(update) = outcome.update {
        let won =
            followups::transition(&services.db, follow_up.id, &outcome.expected, update).await?;
        if !won {
            debug!(
                follow_up = follow_up.id,
                "transition lost to a concurrent writer, skipping side effects"
            );
            return Ok(());
        }
    }

    let to = Phone::from_stored(follow_up.supplier_phone.clone());
    for reply in &outcome.replies {
        send_best_effort(&services.followup, "followup", &to, reply).await;
    }

    if let Some(new) = &outcome.spawn_follow_up {
        let id = followups::create(&services.db, new).await?;
        info!(
            follow_up = id,
            case = %new.case_id,
            path = new.path,
            "chained follow-up queued"
        );
    }
    if let Some(new) = &outcome.spawn_reschedule {
        let id = reschedules::create(&services.db, new).await?;
        info!(reschedule = id, case = %new.case_id, "reschedule queued");
    }
    if let Some(due_at) = outcome.arm_silence_at {
        closures::arm(&services.db, follow_up.id, due_at).await?;
    }
    if let Some(mail) = &outcome.mail {
        services.mailer.send_best_effort(&mail.subject, &mail.body).await;
    }

    Ok(())
}

/// Send the first template for a PENDIENTE_FLUJO follow-up.
///
/// A send failure propagates and leaves the row pending, so the sweep
/// retries it. Returns whether this call performed the send.
pub async fn send_initial(
    services: &Services,
    follow_up: &FollowUp,
) -> Result<bool, SuptrackError> {
    let now = Utc::now();
    let ctx = services.followup_ctx(now);
    let Some(plan) = engine::initial_send_plan(follow_up, &ctx) else {
        return Ok(false);
    };

    let Some(client) = &services.followup else {
        return Err(SuptrackError::Config(
            "followup WhatsApp line not configured".to_string(),
        ));
    };

    let to = Phone::from_stored(follow_up.supplier_phone.clone());
    client.send(&to, &plan.message).await?;

    let deadline = now + Duration::minutes(services.config.bot.reply_window_min);
    let won = followups::transition(
        &services.db,
        follow_up.id,
        &[FollowUpStatus::PendienteFlujo],
        FollowUpUpdate {
            status: Some(FollowUpStatus::MensajeEnviado),
            sub_state: Some(plan.sub_state),
            reply_deadline_at: Some(deadline),
            sent_at: Some(now),
            ..Default::default()
        },
    )
    .await?;

    if won {
        closures::arm(&services.db, follow_up.id, deadline).await?;
        info!(
            follow_up = follow_up.id,
            case = %follow_up.case_id,
            path = follow_up.path,
            "initial follow-up template sent"
        );
    }
    Ok(won)
}

/// Send initial templates for every due PENDIENTE_FLUJO row.
///
/// Picks up both freshly ingested rows and corroboration pings whose
/// scheduled time has arrived. Returns how many sends succeeded.
pub async fn sweep_pending_flow(
    services: &Services,
    now: DateTime<Utc>,
) -> Result<usize, SuptrackError> {
    let due =
        followups::list_due_pending_flow(&services.db, now, services.config.bot.batch_size).await?;
    let mut sent = 0;
    for follow_up in due {
        match send_initial(services, &follow_up).await {
            Ok(true) => sent += 1,
            Ok(false) => {}
            Err(e) => {
                warn!(
                    follow_up = follow_up.id,
                    error = %e,
                    "initial send failed, row stays pending for retry"
                );
            }
        }
    }
    Ok(sent)
}

/// Run every matured silence check: claim the closure, then send the
/// closing template only if this caller won.
///
/// Winning the claim before sending gives at-most-one closing template
/// even when checks are delivered more than once.
pub async fn close_due_silences(
    services: &Services,
    now: DateTime<Utc>,
) -> Result<usize, SuptrackError> {
    let checks = closures::claim_due(&services.db, now, services.config.bot.batch_size).await?;
    let mut closed = 0;
    for check in checks {
        let Some(follow_up) = followups::get(&services.db, check.follow_up_id).await? else {
            warn!(check = check.id, "silence check points at a missing follow-up");
            continue;
        };
        if !followups::close_by_silence(&services.db, follow_up.id, now).await? {
            // Answered, rescheduled, or the deadline moved. Nothing to do.
            continue;
        }
        closed += 1;
        let to = Phone::from_stored(follow_up.supplier_phone.clone());
        let template = engine::silence_close_template(&follow_up);
        send_best_effort(&services.followup, "followup", &to, &template).await;
        info!(
            follow_up = follow_up.id,
            case = %follow_up.case_id,
            "follow-up closed by silence"
        );
    }
    Ok(closed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use suptrack_config::SuptrackConfig;
    use suptrack_core::MessageId;
    use suptrack_storage::{FollowUpSubState, NewFollowUp};
    use tempfile::tempdir;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

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

    async fn setup_with_line(server: &MockServer) -> (Services, tempfile::TempDir) {
        let (mut services, dir) = setup().await;
        services.followup = Some(
            suptrack_whatsapp::WhatsappClient::new("test-token", "222".to_string())
                .unwrap()
                .with_base_url(server.uri()),
        );
        (services, dir)
    }

    fn pending(phone: &str) -> NewFollowUp {
        NewFollowUp {
            case_id: "CASO-2001".to_string(),
            tririga_no: None,
            site_id: Some("45".to_string()),
            criticality: Some("NORMAL".to_string()),
            supplier_name: "Climatizacion Sur".to_string(),
            supplier_tax_id: "76.111.222-3".to_string(),
            supplier_phone: phone.to_string(),
            path: 1,
            scheduled_execute_at: None,
            ticket_payload: None,
        }
    }

    fn text_event(id: &str, from: &str, body: &str) -> InboundEvent {
        InboundEvent {
            id: MessageId(id.to_string()),
            from: Phone::from_stored(from),
            payload: InboundPayload::Text(body.to_string()),
        }
    }

    #[tokio::test]
    async fn initial_send_moves_row_and_arms_closure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/222/messages"))
            .and(body_partial_json(serde_json::json!({
                "type": "template",
                "template": { "name": "seguimiento_llegada_tecnico" },
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let (services, _dir) = setup_with_line(&server).await;

        let id = followups::create(&services.db, &pending("+56911111111"))
            .await
            .unwrap();
        let follow_up = followups::get(&services.db, id).await.unwrap().unwrap();

        assert!(send_initial(&services, &follow_up).await.unwrap());

        let sent = followups::get(&services.db, id).await.unwrap().unwrap();
        assert_eq!(sent.status, FollowUpStatus::MensajeEnviado);
        assert_eq!(sent.sub_state, Some(FollowUpSubState::PreguntaLlegada));
        assert!(sent.reply_deadline_at.is_some());
        assert!(sent.sent_at.is_some());

        // Second invocation is a no-op: the row is no longer pending.
        assert!(!send_initial(&services, &sent).await.unwrap());
    }

    #[tokio::test]
    async fn rejected_send_leaves_row_pending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;
        let (services, _dir) = setup_with_line(&server).await;

        let id = followups::create(&services.db, &pending("+56911111111"))
            .await
            .unwrap();
        let follow_up = followups::get(&services.db, id).await.unwrap().unwrap();

        assert!(send_initial(&services, &follow_up).await.is_err());
        let row = followups::get(&services.db, id).await.unwrap().unwrap();
        assert_eq!(row.status, FollowUpStatus::PendienteFlujo);
    }

    #[tokio::test]
    async fn duplicate_webhook_delivery_is_dropped() {
        let server = MockServer::start().await;
        // Exactly one confirmation reply despite two deliveries.
        Mock::given(method("POST"))
            .and(path("/222/messages"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let (services, _dir) = setup_with_line(&server).await;

        let id = followups::create(&services.db, &pending("+56911111111"))
            .await
            .unwrap();
        followups::transition(
            &services.db,
            id,
            &[FollowUpStatus::PendienteFlujo],
            FollowUpUpdate {
                status: Some(FollowUpStatus::EsperandoRespuesta),
                sub_state: Some(FollowUpSubState::PreguntaHoraComprometida),
                reply_deadline_at: Some(Utc::now() + Duration::minutes(10)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let event = text_event("wamid.dup", "+56911111111", "no");
        handle_followup_event(&services, &event).await.unwrap();
        handle_followup_event(&services, &event).await.unwrap();

        let row = followups::get(&services.db, id).await.unwrap().unwrap();
        assert_eq!(row.status, FollowUpStatus::CerradoNoConfirmado);
    }

    #[tokio::test]
    async fn reply_after_deadline_is_ignored() {
        let (services, _dir) = setup().await;

        let id = followups::create(&services.db, &pending("+56911111111"))
            .await
            .unwrap();
        followups::transition(
            &services.db,
            id,
            &[FollowUpStatus::PendienteFlujo],
            FollowUpUpdate {
                status: Some(FollowUpStatus::EsperandoRespuesta),
                sub_state: Some(FollowUpSubState::PreguntaLlegada),
                reply_deadline_at: Some(Utc::now() - Duration::minutes(1)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        handle_followup_event(&services, &text_event("wamid.late", "+56911111111", "si"))
            .await
            .unwrap();

        let row = followups::get(&services.db, id).await.unwrap().unwrap();
        assert_eq!(row.status, FollowUpStatus::EsperandoRespuesta);
    }

    #[tokio::test]
    async fn silence_closer_claims_once_and_sends_template() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/222/messages"))
            .and(body_partial_json(serde_json::json!({
                "type": "template",
                "template": { "name": "seguimiento_cierre" },
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let (services, _dir) = setup_with_line(&server).await;
        let now = Utc::now();

        let id = followups::create(&services.db, &pending("+56911111111"))
            .await
            .unwrap();
        followups::transition(
            &services.db,
            id,
            &[FollowUpStatus::PendienteFlujo],
            FollowUpUpdate {
                status: Some(FollowUpStatus::EsperandoRespuesta),
                sub_state: Some(FollowUpSubState::PreguntaLlegada),
                reply_deadline_at: Some(now - Duration::minutes(1)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        closures::arm(&services.db, id, now - Duration::minutes(1))
            .await
            .unwrap();
        // Redundant check for the same follow-up: the CAS makes it a no-op.
        closures::arm(&services.db, id, now - Duration::minutes(1))
            .await
            .unwrap();

        assert_eq!(close_due_silences(&services, now).await.unwrap(), 1);
        assert_eq!(close_due_silences(&services, now).await.unwrap(), 0);

        let row = followups::get(&services.db, id).await.unwrap().unwrap();
        assert_eq!(row.status, FollowUpStatus::CerradoSinRespuesta);
        assert!(row.closed_at.is_some());
    }

    #[tokio::test]
    async fn closer_skips_answered_follow_ups() {
        let (services, _dir) = setup().await;
        let now = Utc::now();

        let id = followups::create(&services.db, &pending("+56911111111"))
            .await
            .unwrap();
        followups::transition(
            &services.db,
            id,
            &[FollowUpStatus::PendienteFlujo],
            FollowUpUpdate {
                status: Some(FollowUpStatus::CerradoConfirmado),
                closed_at: Some(now),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        closures::arm(&services.db, id, now - Duration::minutes(1))
            .await
            .unwrap();

        assert_eq!(close_due_silences(&services, now).await.unwrap(), 0);
        let row = followups::get(&services.db, id).await.unwrap().unwrap();
        assert_eq!(row.status, FollowUpStatus::CerradoConfirmado);
    }

    #[tokio::test]
    async fn pending_sweep_without_line_keeps_rows() {
        let (services, _dir) = setup().await;
        let id = followups::create(&services.db, &pending("+56911111111"))
            .await
            .unwrap();

        // No followup line configured: sends fail, rows stay pending.
        assert_eq!(sweep_pending_flow(&services, Utc::now()).await.unwrap(), 0);
        let row = followups::get(&services.db, id).await.unwrap().unwrap();
        assert_eq!(row.status, FollowUpStatus::PendienteFlujo);
    }
}
