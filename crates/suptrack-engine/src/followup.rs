// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Supplier follow-up state machine.
//!
//! Dispatches inbound replies by `sub_state`, plans the initial template
//! send, and builds the silence-close template. Outcomes carry a CAS
//! guard (`expected`): the executor applies the update only if the row
//! still holds one of those statuses, so two near-simultaneous webhook
//! deliveries cannot both close the same follow-up.

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::sync::LazyLock;
use suptrack_core::{LocalZone, OutboundMessage};
use suptrack_storage::{
    FollowUp, FollowUpStatus, FollowUpSubState, FollowUpUpdate, NewFollowUp, NewReschedule,
};

use crate::messages;

/// WhatsApp template language for the supplier line.
pub const TEMPLATE_LANGUAGE: &str = "es_CL";

static ARRIVAL_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-1]?\d|2[0-3]):([0-5]\d)$").unwrap());

static RESCHEDULE_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}-\d{2}-\d{4} \d{2}:\d{2}$").unwrap());

const AFFIRMATIVES: &[&str] = &["si", "sí", "ok", "confirmo"];
const NEGATIVES: &[&str] = &["no", "rechazo", "no confirmo"];

/// Timing inputs for follow-up transitions.
#[derive(Debug, Clone)]
pub struct FollowUpContext {
    pub now: DateTime<Utc>,
    pub zone: LocalZone,
    /// Minutes a supplier has to answer before the silence-closer fires.
    pub reply_window_min: i64,
    /// Minutes until the corroboration follow-up after a committed-time yes.
    pub corroboration_delay_min: i64,
    /// Hours added to creation time when no committed time was scheduled.
    pub committed_offset_hours: i64,
}

impl FollowUpContext {
    fn deadline(&self) -> DateTime<Utc> {
        self.now + Duration::minutes(self.reply_window_min)
    }
}

/// Best-effort confirmation mail; a failed send never rolls anything back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailRequest {
    pub subject: String,
    pub body: String,
}

/// Side effects of one follow-up transition.
#[derive(Debug, Clone, Default)]
pub struct FollowUpOutcome {
    pub replies: Vec<OutboundMessage>,
    /// CAS guard: apply `update` only while the row holds one of these.
    pub expected: Vec<FollowUpStatus>,
    pub update: Option<FollowUpUpdate>,
    /// Chained follow-up to create (corroboration after a confirmation).
    pub spawn_follow_up: Option<NewFollowUp>,
    /// Reschedule queue row to create.
    pub spawn_reschedule: Option<NewReschedule>,
    /// Arm a durable silence check at this instant.
    pub arm_silence_at: Option<DateTime<Utc>>,
    pub mail: Option<MailRequest>,
}

impl FollowUpOutcome {
    fn reply(body: String) -> FollowUpOutcome {
        FollowUpOutcome {
            replies: vec![OutboundMessage::text(body)],
            ..Default::default()
        }
    }
}

/// Statuses an inbound reply may transition away from.
fn active() -> Vec<FollowUpStatus> {
    vec![
        FollowUpStatus::MensajeEnviado,
        FollowUpStatus::EsperandoRespuesta,
    ]
}

fn chained_follow_up(
    follow_up: &FollowUp,
    path: i64,
    scheduled_execute_at: Option<DateTime<Utc>>,
) -> NewFollowUp {
    NewFollowUp {
        case_id: follow_up.case_id.clone(),
        tririga_no: follow_up.tririga_no.clone(),
        site_id: follow_up.site_id.clone(),
        criticality: follow_up.criticality.clone(),
        supplier_name: follow_up.supplier_name.clone(),
        supplier_tax_id: follow_up.supplier_tax_id.clone(),
        supplier_phone: follow_up.supplier_phone.clone(),
        path,
        scheduled_execute_at,
        ticket_payload: follow_up.ticket_payload.clone(),
    }
}

fn reschedule_from(
    follow_up: &FollowUp,
    execute_from_at: DateTime<Utc>,
    reason: &str,
) -> NewReschedule {
    NewReschedule {
        origin_followup_id: Some(follow_up.id),
        case_id: follow_up.case_id.clone(),
        tririga_no: follow_up.tririga_no.clone(),
        site_id: follow_up.site_id.clone(),
        criticality: follow_up.criticality.clone(),
        supplier_name: follow_up.supplier_name.clone(),
        supplier_tax_id: follow_up.supplier_tax_id.clone(),
        supplier_phone: follow_up.supplier_phone.clone(),
        path: follow_up.path,
        execute_from_at,
        reason: reason.to_string(),
        ticket_payload: follow_up.ticket_payload.clone(),
    }
}

/// React to an inbound text for the follow-up's current sub-state.
///
/// `None` means the event is dropped: no reply, no mutation. Unknown
/// sub-states and unrecognized answers to the arrival question both land
/// here by design.
pub fn on_text(follow_up: &FollowUp, text: &str, ctx: &FollowUpContext) -> Option<FollowUpOutcome> {
    let text = text.trim();
    let lowered = text.to_lowercase();

    match follow_up.sub_state? {
        FollowUpSubState::PreguntaLlegada => match lowered.as_str() {
            "si" => {
                let deadline = ctx.deadline();
                Some(FollowUpOutcome {
                    replies: vec![OutboundMessage::text(messages::ask_arrival_time())],
                    expected: active(),
                    update: Some(FollowUpUpdate {
                        status: Some(FollowUpStatus::EsperandoRespuesta),
                        sub_state: Some(FollowUpSubState::EsperandoFechaHoraLlegadaReal),
                        reply_deadline_at: Some(deadline),
                        ..Default::default()
                    }),
                    arm_silence_at: Some(deadline),
                    ..Default::default()
                })
            }
            "no" => {
                let deadline = ctx.deadline();
                let replies = if follow_up.path == 3 {
                    vec![OutboundMessage::text(
                        messages::reschedule_prompt_exceptional(),
                    )]
                } else {
                    vec![
                        OutboundMessage::text(messages::out_of_window_notice()),
                        messages::arrival_quick_pick(),
                    ]
                };
                Some(FollowUpOutcome {
                    replies,
                    expected: active(),
                    update: Some(FollowUpUpdate {
                        status: Some(FollowUpStatus::EsperandoRespuesta),
                        sub_state: Some(FollowUpSubState::EsperandoFechaReagendada),
                        reply_deadline_at: Some(deadline),
                        ..Default::default()
                    }),
                    arm_silence_at: Some(deadline),
                    ..Default::default()
                })
            }
            _ => None,
        },

        FollowUpSubState::EsperandoFechaHoraLlegadaReal => {
            let Some(caps) = ARRIVAL_TIME_RE.captures(text) else {
                return Some(FollowUpOutcome::reply(messages::time_format_error()));
            };
            let hour: u32 = caps[1].parse().ok()?;
            let minute: u32 = caps[2].parse().ok()?;
            let Some(arrived_at) = ctx.zone.today_at(ctx.now, hour, minute) else {
                return Some(FollowUpOutcome::reply(messages::time_invalid()));
            };
            Some(FollowUpOutcome {
                replies: vec![OutboundMessage::text(messages::arrival_confirmed(
                    follow_up,
                ))],
                expected: active(),
                update: Some(FollowUpUpdate {
                    status: Some(FollowUpStatus::CerradoConfirmado),
                    confirmed_arrival_at: Some(arrived_at),
                    ..Default::default()
                }),
                ..Default::default()
            })
        }

        FollowUpSubState::EsperandoFechaReagendada => {
            if !RESCHEDULE_DATE_RE.is_match(text) {
                return Some(FollowUpOutcome::reply(messages::date_format_error()));
            }
            let Some(execute_from_at) = ctx.zone.parse_dmy_hm(text) else {
                return Some(FollowUpOutcome::reply(messages::date_invalid()));
            };
            let body = messages::reschedule_confirmed(follow_up);
            Some(FollowUpOutcome {
                replies: vec![OutboundMessage::text(body.clone())],
                expected: active(),
                update: Some(FollowUpUpdate {
                    status: Some(FollowUpStatus::Reagendado),
                    ..Default::default()
                }),
                spawn_reschedule: Some(reschedule_from(
                    follow_up,
                    execute_from_at,
                    "REAGENDAMIENTO_TEXTO",
                )),
                mail: Some(MailRequest {
                    subject: messages::mail_subject(&follow_up.case_id),
                    body,
                }),
                ..Default::default()
            })
        }

        FollowUpSubState::PreguntaHoraComprometida => {
            if AFFIRMATIVES.contains(&lowered.as_str()) {
                let scheduled = ctx.now + Duration::minutes(ctx.corroboration_delay_min);
                Some(FollowUpOutcome {
                    replies: vec![OutboundMessage::text(messages::committed_confirmed(
                        follow_up,
                    ))],
                    expected: active(),
                    update: Some(FollowUpUpdate {
                        status: Some(FollowUpStatus::CerradoConfirmado),
                        closed_at: Some(ctx.now),
                        ..Default::default()
                    }),
                    spawn_follow_up: Some(chained_follow_up(follow_up, 2, Some(scheduled))),
                    ..Default::default()
                })
            } else if NEGATIVES.contains(&lowered.as_str()) {
                Some(FollowUpOutcome {
                    replies: vec![OutboundMessage::text(messages::not_confirmed_closing(
                        follow_up,
                    ))],
                    expected: active(),
                    update: Some(FollowUpUpdate {
                        status: Some(FollowUpStatus::CerradoNoConfirmado),
                        closed_at: Some(ctx.now),
                        ..Default::default()
                    }),
                    ..Default::default()
                })
            } else {
                Some(FollowUpOutcome::reply(messages::answer_si_no()))
            }
        }

        // Legacy sub-states: any input closes without validation.
        FollowUpSubState::EsperandoHoraLlegada => Some(FollowUpOutcome {
            replies: vec![OutboundMessage::text(messages::arrival_ack())],
            expected: active(),
            update: Some(FollowUpUpdate {
                status: Some(FollowUpStatus::CerradoConfirmado),
                ..Default::default()
            }),
            ..Default::default()
        }),
        FollowUpSubState::EsperandoReprogramacion => Some(FollowUpOutcome {
            replies: vec![OutboundMessage::text(messages::reprogram_ack())],
            expected: active(),
            update: Some(FollowUpUpdate {
                status: Some(FollowUpStatus::CerradoReprogramado),
                ..Default::default()
            }),
            ..Default::default()
        }),
    }
}

/// React to a quick-pick button while the follow-up awaits a reply.
///
/// The new visit time counts from the originally scheduled execution,
/// not from when the supplier pressed the button.
pub fn on_button(
    follow_up: &FollowUp,
    button_id: &str,
    ctx: &FollowUpContext,
) -> Option<FollowUpOutcome> {
    let minutes: i64 = button_id.strip_prefix("llegada_")?.parse().ok()?;
    if !matches!(minutes, 10 | 20 | 30) {
        return None;
    }

    let base = follow_up
        .scheduled_execute_at
        .unwrap_or(follow_up.created_at);
    let execute_from_at = base + Duration::minutes(minutes);
    let body = messages::reschedule_confirmed_at(follow_up, &ctx.zone.format_hm(execute_from_at));

    Some(FollowUpOutcome {
        replies: vec![OutboundMessage::text(body.clone())],
        expected: active(),
        update: Some(FollowUpUpdate {
            status: Some(FollowUpStatus::Reagendado),
            ..Default::default()
        }),
        spawn_reschedule: Some(reschedule_from(
            follow_up,
            execute_from_at,
            "REAGENDAMIENTO_BOTON",
        )),
        arm_silence_at: Some(execute_from_at),
        mail: Some(MailRequest {
            subject: messages::mail_subject(&follow_up.case_id),
            body,
        }),
        ..Default::default()
    })
}

/// The initial template send for a pending follow-up.
#[derive(Debug, Clone)]
pub struct InitialSend {
    pub message: OutboundMessage,
    pub sub_state: FollowUpSubState,
}

/// Plan the first outbound template for a PENDIENTE_FLUJO follow-up.
///
/// Returns `None` for rows no longer pending (anti-repeat) and for
/// unrecognized paths.
pub fn initial_send_plan(follow_up: &FollowUp, ctx: &FollowUpContext) -> Option<InitialSend> {
    if follow_up.status != FollowUpStatus::PendienteFlujo {
        return None;
    }

    let site = follow_up.site_id.clone().unwrap_or_default();
    match follow_up.path {
        1 | 3 => Some(InitialSend {
            message: OutboundMessage::Template {
                name: "seguimiento_llegada_tecnico".to_string(),
                language: TEMPLATE_LANGUAGE.to_string(),
                parameters: vec![
                    follow_up.supplier_name.clone(),
                    follow_up.supplier_tax_id.clone(),
                    follow_up.case_id.clone(),
                    site,
                ],
            },
            sub_state: FollowUpSubState::PreguntaLlegada,
        }),
        2 => {
            let committed = follow_up.scheduled_execute_at.unwrap_or(
                follow_up.created_at + Duration::hours(ctx.committed_offset_hours),
            );
            Some(InitialSend {
                message: OutboundMessage::Template {
                    name: "mensaje_seguimiento2".to_string(),
                    language: TEMPLATE_LANGUAGE.to_string(),
                    parameters: vec![
                        follow_up.supplier_name.clone(),
                        follow_up.supplier_tax_id.clone(),
                        follow_up.case_id.clone(),
                        site,
                        ctx.zone.format_hm(committed),
                    ],
                },
                sub_state: FollowUpSubState::PreguntaHoraComprometida,
            })
        }
        _ => None,
    }
}

/// Closing template for the silence-closer.
///
/// A template is mandatory here: the reply window has expired, so the
/// provider rejects free-form text outside a user-initiated session.
pub fn silence_close_template(follow_up: &FollowUp) -> OutboundMessage {
    OutboundMessage::Template {
        name: "seguimiento_cierre".to_string(),
        language: TEMPLATE_LANGUAGE.to_string(),
        parameters: vec![
            follow_up.case_id.clone(),
            follow_up.site_id.clone().unwrap_or_default(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        "2026-03-10T15:00:00Z".parse().unwrap()
    }

    fn ctx() -> FollowUpContext {
        FollowUpContext {
            now: now(),
            zone: LocalZone::from_offset_hours(-3),
            reply_window_min: 10,
            corroboration_delay_min: 30,
            committed_offset_hours: 2,
        }
    }

    fn follow_up(path: i64, sub_state: Option<FollowUpSubState>) -> FollowUp {
        FollowUp {
            id: 7,
            case_id: "CASO-1001".to_string(),
            tririga_no: Some("TR-77".to_string()),
            site_id: Some("45".to_string()),
            criticality: Some("NORMAL".to_string()),
            supplier_name: "Climatización Sur".to_string(),
            supplier_tax_id: "76.111.222-3".to_string(),
            supplier_phone: "+56949098167".to_string(),
            path,
            status: FollowUpStatus::MensajeEnviado,
            sub_state,
            sent_at: Some(now()),
            reply_deadline_at: Some(now() + Duration::minutes(10)),
            closed_at: None,
            scheduled_execute_at: None,
            confirmed_arrival_at: None,
            ticket_payload: Some(serde_json::json!({ "iD_ATENCION": "CASO-1001" })),
            created_at: now() - Duration::minutes(5),
            updated_at: now(),
        }
    }

    #[test]
    fn arrival_yes_asks_for_the_exact_time() {
        let fu = follow_up(1, Some(FollowUpSubState::PreguntaLlegada));
        let out = on_text(&fu, "Si", &ctx()).unwrap();

        let update = out.update.unwrap();
        assert_eq!(update.status, Some(FollowUpStatus::EsperandoRespuesta));
        assert_eq!(
            update.sub_state,
            Some(FollowUpSubState::EsperandoFechaHoraLlegadaReal)
        );
        assert_eq!(update.reply_deadline_at, Some(now() + Duration::minutes(10)));
        assert_eq!(out.arm_silence_at, Some(now() + Duration::minutes(10)));
    }

    #[test]
    fn arrival_no_offers_quick_pick_except_on_path_three() {
        let fu = follow_up(1, Some(FollowUpSubState::PreguntaLlegada));
        let out = on_text(&fu, "no", &ctx()).unwrap();
        assert_eq!(out.replies.len(), 2);
        assert!(matches!(out.replies[1], OutboundMessage::Buttons { .. }));

        let fu = follow_up(3, Some(FollowUpSubState::PreguntaLlegada));
        let out = on_text(&fu, "no", &ctx()).unwrap();
        assert_eq!(out.replies.len(), 1);
        let update = out.update.unwrap();
        assert_eq!(
            update.sub_state,
            Some(FollowUpSubState::EsperandoFechaReagendada)
        );
    }

    #[test]
    fn unrecognized_arrival_answer_is_dropped() {
        let fu = follow_up(1, Some(FollowUpSubState::PreguntaLlegada));
        assert!(on_text(&fu, "quizás", &ctx()).is_none());
    }

    #[test]
    fn arrival_time_is_validated_then_closes_confirmed() {
        let fu = follow_up(1, Some(FollowUpSubState::EsperandoFechaHoraLlegadaReal));

        let out = on_text(&fu, "25:99", &ctx()).unwrap();
        assert!(out.update.is_none());

        let out = on_text(&fu, "10:30", &ctx()).unwrap();
        let update = out.update.unwrap();
        assert_eq!(update.status, Some(FollowUpStatus::CerradoConfirmado));
        assert_eq!(update.sub_state, None);
        assert_eq!(update.reply_deadline_at, None);
        // 10:30 local is 13:30 UTC at offset -3.
        assert_eq!(
            update.confirmed_arrival_at,
            Some("2026-03-10T13:30:00Z".parse().unwrap())
        );
    }

    #[test]
    fn text_reschedule_spawns_a_queue_row_and_mail() {
        let fu = follow_up(1, Some(FollowUpSubState::EsperandoFechaReagendada));

        let out = on_text(&fu, "mañana a las 10", &ctx()).unwrap();
        assert!(out.spawn_reschedule.is_none());

        let out = on_text(&fu, "15-03-2026 18:45", &ctx()).unwrap();
        let resched = out.spawn_reschedule.unwrap();
        assert_eq!(resched.origin_followup_id, Some(7));
        assert_eq!(resched.reason, "REAGENDAMIENTO_TEXTO");
        assert_eq!(resched.path, 1);
        assert_eq!(
            resched.execute_from_at,
            "2026-03-15T21:45:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert_eq!(out.update.unwrap().status, Some(FollowUpStatus::Reagendado));
        assert!(out.mail.unwrap().subject.contains("CASO-1001"));
    }

    #[test]
    fn quick_pick_button_counts_from_scheduled_time() {
        let mut fu = follow_up(1, Some(FollowUpSubState::EsperandoFechaReagendada));
        fu.scheduled_execute_at = Some(now() - Duration::minutes(60));

        let out = on_button(&fu, "llegada_20", &ctx()).unwrap();
        let resched = out.spawn_reschedule.unwrap();
        assert_eq!(
            resched.execute_from_at,
            now() - Duration::minutes(60) + Duration::minutes(20)
        );
        assert_eq!(resched.reason, "REAGENDAMIENTO_BOTON");
        assert_eq!(out.arm_silence_at, Some(resched.execute_from_at));
        assert_eq!(out.update.unwrap().status, Some(FollowUpStatus::Reagendado));
        assert!(out.mail.is_some());
    }

    #[test]
    fn quick_pick_falls_back_to_creation_time() {
        let fu = follow_up(1, Some(FollowUpSubState::EsperandoFechaReagendada));
        let out = on_button(&fu, "llegada_10", &ctx()).unwrap();
        assert_eq!(
            out.spawn_reschedule.unwrap().execute_from_at,
            fu.created_at + Duration::minutes(10)
        );
    }

    #[test]
    fn unknown_button_is_dropped() {
        let fu = follow_up(1, Some(FollowUpSubState::EsperandoFechaReagendada));
        assert!(on_button(&fu, "llegada_45", &ctx()).is_none());
        assert!(on_button(&fu, "otra_cosa", &ctx()).is_none());
    }

    #[test]
    fn committed_time_yes_chains_a_corroboration_follow_up() {
        let fu = follow_up(2, Some(FollowUpSubState::PreguntaHoraComprometida));
        let out = on_text(&fu, "Confirmo", &ctx()).unwrap();

        let spawned = out.spawn_follow_up.unwrap();
        assert_eq!(spawned.path, 2);
        assert_eq!(spawned.case_id, "CASO-1001");
        assert_eq!(spawned.supplier_phone, "+56949098167");
        assert_eq!(
            spawned.scheduled_execute_at,
            Some(now() + Duration::minutes(30))
        );
        assert!(spawned.ticket_payload.is_some());
        assert_eq!(
            out.update.unwrap().status,
            Some(FollowUpStatus::CerradoConfirmado)
        );
    }

    #[test]
    fn committed_time_no_closes_unconfirmed() {
        let fu = follow_up(2, Some(FollowUpSubState::PreguntaHoraComprometida));
        let out = on_text(&fu, "rechazo", &ctx()).unwrap();
        assert!(out.spawn_follow_up.is_none());
        assert_eq!(
            out.update.unwrap().status,
            Some(FollowUpStatus::CerradoNoConfirmado)
        );
    }

    #[test]
    fn committed_time_other_reprompts_without_mutating() {
        let fu = follow_up(2, Some(FollowUpSubState::PreguntaHoraComprometida));
        let out = on_text(&fu, "depende", &ctx()).unwrap();
        assert!(out.update.is_none());
        assert_eq!(out.replies.len(), 1);
    }

    #[test]
    fn legacy_sub_states_close_on_any_input() {
        let fu = follow_up(1, Some(FollowUpSubState::EsperandoHoraLlegada));
        let out = on_text(&fu, "cualquier cosa", &ctx()).unwrap();
        assert_eq!(
            out.update.unwrap().status,
            Some(FollowUpStatus::CerradoConfirmado)
        );

        let fu = follow_up(1, Some(FollowUpSubState::EsperandoReprogramacion));
        let out = on_text(&fu, "ok", &ctx()).unwrap();
        assert_eq!(
            out.update.unwrap().status,
            Some(FollowUpStatus::CerradoReprogramado)
        );
    }

    #[test]
    fn no_sub_state_drops_the_event() {
        let fu = follow_up(1, None);
        assert!(on_text(&fu, "hola", &ctx()).is_none());
    }

    #[test]
    fn initial_send_varies_by_path() {
        let mut fu = follow_up(1, None);
        fu.status = FollowUpStatus::PendienteFlujo;
        let plan = initial_send_plan(&fu, &ctx()).unwrap();
        assert_eq!(plan.sub_state, FollowUpSubState::PreguntaLlegada);
        match &plan.message {
            OutboundMessage::Template {
                name, parameters, ..
            } => {
                assert_eq!(name, "seguimiento_llegada_tecnico");
                assert_eq!(parameters.len(), 4);
            }
            _ => panic!("expected template"),
        }

        fu.path = 2;
        fu.scheduled_execute_at = Some("2026-03-10T20:00:00Z".parse().unwrap());
        let plan = initial_send_plan(&fu, &ctx()).unwrap();
        assert_eq!(plan.sub_state, FollowUpSubState::PreguntaHoraComprometida);
        match &plan.message {
            OutboundMessage::Template {
                name, parameters, ..
            } => {
                assert_eq!(name, "mensaje_seguimiento2");
                // 20:00 UTC is 17:00 local at offset -3.
                assert_eq!(parameters[4], "17:00");
            }
            _ => panic!("expected template"),
        }
    }

    #[test]
    fn committed_hour_defaults_to_creation_plus_offset() {
        let mut fu = follow_up(2, None);
        fu.status = FollowUpStatus::PendienteFlujo;
        fu.scheduled_execute_at = None;
        let plan = initial_send_plan(&fu, &ctx()).unwrap();
        match &plan.message {
            OutboundMessage::Template { parameters, .. } => {
                // created 14:55 UTC + 2h = 16:55 UTC = 13:55 local.
                assert_eq!(parameters[4], "13:55");
            }
            _ => panic!("expected template"),
        }
    }

    #[test]
    fn initial_send_refuses_non_pending_rows_and_unknown_paths() {
        let fu = follow_up(1, None);
        assert!(initial_send_plan(&fu, &ctx()).is_none());

        let mut fu = follow_up(9, None);
        fu.status = FollowUpStatus::PendienteFlujo;
        assert!(initial_send_plan(&fu, &ctx()).is_none());
    }

    #[test]
    fn silence_close_uses_the_mandatory_template() {
        let fu = follow_up(1, Some(FollowUpSubState::PreguntaLlegada));
        match silence_close_template(&fu) {
            OutboundMessage::Template {
                name, parameters, ..
            } => {
                assert_eq!(name, "seguimiento_cierre");
                assert_eq!(parameters, vec!["CASO-1001".to_string(), "45".to_string()]);
            }
            _ => panic!("expected template"),
        }
    }
}
