// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending-reschedule runner.
//!
//! Reschedules queue a future follow-up instead of sending inline.
//! The runner claims due rows (PENDIENTE -> PROCESANDO), opens a fresh
//! follow-up carrying the original path and ticket payload, and sends
//! its initial template. Failures flip the row to FALLIDO with a short
//! retry bump.

use chrono::{DateTime, Duration, Utc};
use suptrack_core::SuptrackError;
use suptrack_storage::queries::{followups, reschedules};
use suptrack_storage::{NewFollowUp, Reschedule};
use tracing::{debug, info, warn};

use crate::context::Services;
use crate::followup::send_initial;

/// Minutes added to `execute_from_at` when an execution fails.
const RETRY_BUMP_MIN: i64 = 1;

/// Execute every due reschedule, bounded by the configured batch size.
///
/// Returns how many reschedules were executed successfully.
pub async fn run_pending_reschedules(
    services: &Services,
    now: DateTime<Utc>,
) -> Result<usize, SuptrackError> {
    let due = reschedules::list_due(&services.db, now, services.config.bot.batch_size).await?;
    let mut executed = 0;
    for reschedule in due {
        if !reschedules::claim(&services.db, reschedule.id).await? {
            debug!(reschedule = reschedule.id, "already claimed by another worker");
            continue;
        }
        match execute_one(services, &reschedule).await {
            Ok(()) => {
                reschedules::mark_executed(&services.db, reschedule.id, now).await?;
                executed += 1;
            }
            Err(e) => {
                warn!(
                    reschedule = reschedule.id,
                    case = %reschedule.case_id,
                    error = %e,
                    "reschedule execution failed"
                );
                reschedules::mark_failed(
                    &services.db,
                    reschedule.id,
                    &e.to_string(),
                    now + Duration::minutes(RETRY_BUMP_MIN),
                )
                .await?;
            }
        }
    }
    Ok(executed)
}

/// Open the follow-up a claimed reschedule describes and send its
/// initial template.
async fn execute_one(services: &Services, reschedule: &Reschedule) -> Result<(), SuptrackError> {
    if reschedule.supplier_phone.trim().is_empty() {
        return Err(SuptrackError::Internal(
            "reschedule has no supplier phone".to_string(),
        ));
    }

    let new = NewFollowUp {
        case_id: reschedule.case_id.clone(),
        tririga_no: reschedule.tririga_no.clone(),
        site_id: reschedule.site_id.clone(),
        criticality: reschedule.criticality.clone(),
        supplier_name: reschedule.supplier_name.clone(),
        supplier_tax_id: reschedule.supplier_tax_id.clone(),
        supplier_phone: reschedule.supplier_phone.clone(),
        path: reschedule.path,
        scheduled_execute_at: Some(reschedule.execute_from_at),
        ticket_payload: reschedule.ticket_payload.clone(),
    };
    let id = followups::create(&services.db, &new).await?;
    let follow_up = followups::get(&services.db, id)
        .await?
        .ok_or_else(|| SuptrackError::Internal(format!("follow-up {id} vanished after insert")))?;

    send_initial(services, &follow_up).await?;
    info!(
        reschedule = reschedule.id,
        follow_up = id,
        case = %reschedule.case_id,
        path = reschedule.path,
        "reschedule executed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use suptrack_config::SuptrackConfig;
    use suptrack_storage::{FollowUpStatus, NewReschedule, RescheduleStatus};
    use tempfile::tempdir;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup_with_line(server: &MockServer) -> (Services, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let mut config = SuptrackConfig::default();
        config.storage.database_path = dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .into_owned();
        let mut services = Services::from_config(config).await.unwrap();
        services.followup = Some(
            suptrack_whatsapp::WhatsappClient::new("test-token", "222".to_string())
                .unwrap()
                .with_base_url(server.uri()),
        );
        (services, dir)
    }

    fn queued(phone: &str, path: i64, execute_from_at: DateTime<Utc>) -> NewReschedule {
        NewReschedule {
            origin_followup_id: None,
            case_id: "CASO-3001".to_string(),
            tririga_no: None,
            site_id: Some("45".to_string()),
            criticality: Some("NORMAL".to_string()),
            supplier_name: "Climatizacion Sur".to_string(),
            supplier_tax_id: "76.111.222-3".to_string(),
            supplier_phone: phone.to_string(),
            path,
            execute_from_at,
            reason: "REAGENDAMIENTO_TEXTO".to_string(),
            ticket_payload: None,
        }
    }

    #[tokio::test]
    async fn due_reschedule_spawns_follow_up_with_same_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/222/messages"))
            .and(body_partial_json(serde_json::json!({
                "type": "template",
                "template": { "name": "mensaje_seguimiento2" },
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        let (services, _dir) = setup_with_line(&server).await;
        let now = Utc::now();

        let id = reschedules::create(
            &services.db,
            &queued("+56911111111", 2, now - Duration::minutes(5)),
        )
        .await
        .unwrap();

        assert_eq!(run_pending_reschedules(&services, now).await.unwrap(), 1);

        let row = reschedules::get(&services.db, id).await.unwrap().unwrap();
        assert_eq!(row.status, RescheduleStatus::Ejecutado);
        assert!(row.executed_at.is_some());

        let follow_up = followups::find_active_by_phone(&services.db, "+56911111111")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(follow_up.path, 2);
        assert_eq!(follow_up.status, FollowUpStatus::MensajeEnviado);
        assert_eq!(follow_up.scheduled_execute_at, Some(row.execute_from_at));
    }

    #[tokio::test]
    async fn future_reschedules_are_left_alone() {
        let server = MockServer::start().await;
        let (services, _dir) = setup_with_line(&server).await;
        let now = Utc::now();

        let id = reschedules::create(
            &services.db,
            &queued("+56911111111", 1, now + Duration::minutes(30)),
        )
        .await
        .unwrap();

        assert_eq!(run_pending_reschedules(&services, now).await.unwrap(), 0);
        let row = reschedules::get(&services.db, id).await.unwrap().unwrap();
        assert_eq!(row.status, RescheduleStatus::Pendiente);
    }

    #[tokio::test]
    async fn blank_phone_marks_failed_with_bumped_retry() {
        let server = MockServer::start().await;
        let (services, _dir) = setup_with_line(&server).await;
        let now = Utc::now();

        let id = reschedules::create(&services.db, &queued("", 1, now - Duration::minutes(5)))
            .await
            .unwrap();

        assert_eq!(run_pending_reschedules(&services, now).await.unwrap(), 0);
        let row = reschedules::get(&services.db, id).await.unwrap().unwrap();
        assert_eq!(row.status, RescheduleStatus::Fallido);
        assert_eq!(row.attempts, 1);
        assert!(row.last_error.is_some());
        assert!(row.execute_from_at > now);
    }
}
