// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket ingestion: pull today's CRM tickets, classify them by
//! criticality and age, and open one follow-up per qualifying case.
//!
//! Two guards keep the sweep re-runnable: a case with any existing
//! follow-up is skipped forever, and a short-lived phone lock stops two
//! cases from opening conversations with the same supplier in one
//! window.

use chrono::{DateTime, NaiveDateTime, Utc};
use suptrack_core::{LocalZone, Phone, SuptrackError};
use suptrack_crm::Ticket;
use suptrack_storage::queries::{dedup, followups};
use suptrack_storage::NewFollowUp;
use tracing::{debug, info, warn};

use crate::context::Services;
use crate::followup::send_initial;

/// Minutes a CRITICO ticket must be open before the committed-time flow fires.
const CRITICAL_AGE_MIN: i64 = 70;
/// Minutes any other ticket must be open before a follow-up fires.
const STANDARD_AGE_MIN: i64 = 120;

/// Counters for one ingestion sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub examined: usize,
    pub created: usize,
    pub sent: usize,
}

/// Pick the follow-up path for a ticket, or `None` if it is too young.
///
/// CRITICO tickets get the committed-time flow after 70 minutes;
/// EXCEPCIONAL tickets get the reschedule-first flow after two hours;
/// everything else gets the standard arrival question after two hours.
pub fn classify(criticality: &str, elapsed_min: i64) -> Option<i64> {
    match criticality {
        "CRITICO" if elapsed_min >= CRITICAL_AGE_MIN => Some(2),
        "EXCEPCIONAL" if elapsed_min >= STANDARD_AGE_MIN => Some(3),
        "CRITICO" | "EXCEPCIONAL" => None,
        _ if elapsed_min >= STANDARD_AGE_MIN => Some(1),
        _ => None,
    }
}

/// Parse the CRM's creation timestamp, which arrives in a handful of
/// shapes depending on the upstream endpoint.
pub fn parse_created_at(raw: &str, zone: &LocalZone) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%d-%m-%Y %H:%M:%S",
        "%d-%m-%Y %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return zone.from_local(naive);
        }
    }
    None
}

/// Run one ingestion sweep over today's tickets.
pub async fn ingest_today(services: &Services) -> Result<IngestReport, SuptrackError> {
    let Some(crm) = &services.crm else {
        warn!("CRM not configured, skipping ingestion sweep");
        return Ok(IngestReport::default());
    };

    let tickets = crm.list_today().await?;
    let now = Utc::now();
    let mut report = IngestReport {
        examined: tickets.len(),
        ..Default::default()
    };

    for ticket in &tickets {
        if let Some(id) = ingest_one(services, ticket, now).await? {
            report.created += 1;
            let follow_up = followups::get(&services.db, id).await?;
            if let Some(follow_up) = follow_up {
                match send_initial(services, &follow_up).await {
                    Ok(true) => report.sent += 1,
                    Ok(false) => {}
                    Err(e) => {
                        warn!(
                            follow_up = id,
                            error = %e,
                            "initial send failed, pending sweep will retry"
                        );
                    }
                }
            }
        }
    }

    info!(
        examined = report.examined,
        created = report.created,
        sent = report.sent,
        "ingestion sweep finished"
    );
    Ok(report)
}

/// Evaluate one ticket; returns the new follow-up id if one was opened.
async fn ingest_one(
    services: &Services,
    ticket: &Ticket,
    now: DateTime<Utc>,
) -> Result<Option<i64>, SuptrackError> {
    let Some(case_id) = ticket.case_id.as_deref().filter(|c| !c.is_empty()) else {
        debug!("ticket without case id skipped");
        return Ok(None);
    };
    let Some(raw_created) = ticket.created_at_raw.as_deref() else {
        debug!(case = case_id, "ticket without creation date skipped");
        return Ok(None);
    };

    if followups::exists_for_case(&services.db, case_id).await? {
        debug!(case = case_id, "follow-up already exists, skipping");
        return Ok(None);
    }

    let Some(created_at) = parse_created_at(raw_created, &services.zone) else {
        warn!(case = case_id, raw = raw_created, "unparseable creation date");
        return Ok(None);
    };
    let elapsed_min = (now - created_at).num_minutes();
    let Some(path) = classify(&ticket.criticality, elapsed_min) else {
        debug!(case = case_id, elapsed_min, "ticket too young, skipping");
        return Ok(None);
    };

    let bot = &services.config.bot;
    let raw_phone = ticket
        .phone_1
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .or(ticket.phone_2.as_deref())
        .unwrap_or_default();
    let Some(phone) = Phone::normalize(raw_phone, &bot.country_code, bot.min_phone_digits) else {
        warn!(case = case_id, raw = raw_phone, "supplier phone unusable, skipping");
        return Ok(None);
    };

    if !dedup::claim_phone_lock(&services.db, phone.as_str(), now, bot.phone_lock_min).await? {
        debug!(case = case_id, phone = %phone, "supplier phone locked, deferring");
        return Ok(None);
    }

    let new = NewFollowUp {
        case_id: case_id.to_string(),
        tririga_no: ticket.tririga_no.clone(),
        site_id: ticket.site_id.clone(),
        criticality: Some(ticket.criticality.clone()),
        supplier_name: ticket.supplier_name.clone(),
        supplier_tax_id: ticket.supplier_tax_id.clone(),
        supplier_phone: phone.as_str().to_string(),
        path,
        scheduled_execute_at: None,
        ticket_payload: Some(ticket.raw.clone()),
    };
    let id = followups::create(&services.db, &new).await?;
    info!(follow_up = id, case = case_id, path, "follow-up opened");
    Ok(Some(id))
}
