// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer-support conversation state machine.
//!
//! [`transition`] is a pure function over the persisted conversation row
//! and one inbound text. It returns the replies to send, the fields to
//! persist, and an optional CRM lookup for the caller to run; it never
//! touches the network or the database itself. Store-directory checks
//! (local number, authorization code) come in through [`StoreDirectory`]
//! since they gate which state comes next.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use suptrack_core::{LocalZone, OutboundMessage};
use suptrack_storage::{Conversation, ConversationState};

use crate::messages;

/// Keyword matching is substring-based on the lowercased text, so
/// "ahola" greets and "finalizar" exits. That looseness is load-bearing:
/// users type greetings inside longer sentences all the time.
const GREETINGS: &[&str] = &["hola", "hi", "buenas", "hello", "holi", "aloha", "aloja"];

const EXIT_KEYWORDS: &[&str] = &[
    "salir",
    "adios",
    "adiós",
    "chao",
    "chau",
    "no mas",
    "no más",
    "suficiente",
    "terminar",
    "cancelar",
    "fin",
];

/// Wrong authorization codes allowed before the interaction is ended.
const MAX_CODE_ATTEMPTS: i64 = 2;

/// Read-only access to the store directory used for authorization.
pub trait StoreDirectory {
    fn local_exists(&self, local: i64) -> bool;
    fn code_matches(&self, local: i64, code: &str) -> bool;
}

/// Timing, timezone and copy inputs for one transition.
#[derive(Debug, Clone)]
pub struct EngineContext<'a> {
    pub now: DateTime<Utc>,
    pub zone: LocalZone,
    pub form_url: &'a str,
    pub helpdesk_number: &'a str,
    pub emergency_number: &'a str,
    /// Minutes before the form reminder fires.
    pub form_reminder_min: i64,
    /// Minutes of silence before asking whether the form was completed.
    pub form_ask_min: i64,
}

/// A CRM ticket search the caller must run after persisting the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketLookup {
    CaseId(String),
    Tririga(String),
    Local(String),
}

/// Result of one transition: replies to send and fields to persist.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub replies: Vec<OutboundMessage>,
    pub state: ConversationState,
    pub attempts: i64,
    pub data: Map<String, Value>,
    pub clear_form: bool,
    /// CRM search to run after the replies above are sent.
    pub lookup: Option<TicketLookup>,
    /// Send the "need another query?" prompt after the lookup results.
    pub ask_more_after_lookup: bool,
}

impl Outcome {
    fn from(conv: &Conversation) -> Outcome {
        Outcome {
            replies: Vec::new(),
            state: conv.state,
            attempts: conv.attempts,
            data: conv.data.clone(),
            clear_form: false,
            lookup: None,
            ask_more_after_lookup: false,
        }
    }

    fn reset(state: ConversationState) -> Outcome {
        Outcome {
            replies: Vec::new(),
            state,
            attempts: 0,
            data: Map::new(),
            clear_form: true,
            lookup: None,
            ask_more_after_lookup: false,
        }
    }

    fn say(&mut self, body: String) {
        self.replies.push(OutboundMessage::text(body));
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

fn flag_set(data: &Map<String, Value>, key: &str) -> bool {
    data.contains_key(key)
}

/// Compute the reaction to one inbound text.
///
/// Returns `None` when the event must be ignored entirely (blank text).
pub fn transition(
    conv: &Conversation,
    text: &str,
    directory: &dyn StoreDirectory,
    ctx: &EngineContext,
) -> Option<Outcome> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let lowered = text.to_lowercase();

    // Exit phrases win over everything, including mid-flow states.
    if contains_any(&lowered, EXIT_KEYWORDS) {
        let mut out = Outcome::reset(ConversationState::Cerrada);
        out.say(messages::closing());
        return Some(out);
    }

    // A new calendar day restarts the dialogue from scratch.
    if ctx.zone.local_date(conv.last_interaction_at) != ctx.zone.local_date(ctx.now) {
        let mut out = Outcome::reset(ConversationState::Inicio);
        out.say(messages::welcome());
        out.say(messages::menu(ctx.emergency_number));
        return Some(out);
    }

    let mut out = Outcome::from(conv);

    match conv.state {
        ConversationState::Cerrada => {
            if contains_any(&lowered, GREETINGS) {
                out = Outcome::reset(ConversationState::EsperandoOpcionMenu);
                out.say(messages::welcome_back());
                out.say(messages::menu(ctx.emergency_number));
            }
            // Anything else stays silent until a greeting arrives.
        }

        ConversationState::Inicio => {
            if contains_any(&lowered, GREETINGS) {
                out.say(messages::welcome());
                out.say(messages::menu(ctx.emergency_number));
                out.state = ConversationState::EsperandoOpcionMenu;
            } else {
                out.say(messages::type_hola_hint());
                out.say(messages::menu(ctx.emergency_number));
            }
        }

        ConversationState::MenuPrincipal => {
            out.say(messages::welcome_back());
            out.say(messages::menu(ctx.emergency_number));
            out.state = ConversationState::EsperandoOpcionMenu;
        }

        ConversationState::EsperandoOpcionMenu => match text {
            "1" => {
                out.say(messages::identifier_menu());
                out.state = ConversationState::ConsultaSeleccionIdentificador;
            }
            "2" => {
                out.say(messages::case_type_menu());
                out.state = ConversationState::IngresoTipoCaso;
            }
            _ => {
                // Invalid input falls through to the query submenu, not
                // back to the main menu.
                out.say(messages::invalid_option());
                out.say(messages::identifier_menu());
                out.state = ConversationState::ConsultaSeleccionIdentificador;
            }
        },

        ConversationState::ConsultaSeleccionIdentificador => match text {
            "1" => {
                out.say(messages::ask_ticket_number());
                out.state = ConversationState::ConsultaIngresarTicket;
            }
            "2" => {
                out.say(messages::ask_tririga_id());
                out.state = ConversationState::ConsultaIngresarId;
            }
            "3" => {
                out.say(messages::ask_local_number());
                out.state = ConversationState::ConsultaIngresarLocal;
            }
            _ => {
                out.say(messages::invalid_option());
                out.say(messages::identifier_menu());
            }
        },

        ConversationState::ConsultaIngresarTicket => {
            if !is_all_digits(text) {
                out.say(messages::ticket_format_error());
            } else {
                out.say(messages::querying_crm());
                out.lookup = Some(TicketLookup::CaseId(text.to_string()));
                out.ask_more_after_lookup = true;
                out.state = ConversationState::NecesitaOtraConsulta;
            }
        }

        ConversationState::ConsultaIngresarId => {
            if !is_all_digits(text) {
                out.say(messages::tririga_format_error());
            } else {
                out.say(messages::querying_crm());
                out.lookup = Some(TicketLookup::Tririga(text.to_string()));
                out.ask_more_after_lookup = true;
                out.state = ConversationState::NecesitaOtraConsulta;
            }
        }

        ConversationState::ConsultaIngresarLocal => {
            if !is_all_digits(text) {
                out.say(messages::local_format_error());
            } else {
                // The local path ends the dialogue without offering
                // another query.
                out.say(messages::querying_crm());
                out.lookup = Some(TicketLookup::Local(text.to_string()));
                out.state = ConversationState::Fin;
            }
        }

        ConversationState::NecesitaOtraConsulta => {
            if contains_any(&lowered, &["consultar", "ver", "buscar"]) {
                out.say(messages::identifier_menu());
                out.state = ConversationState::ConsultaSeleccionIdentificador;
            } else if contains_any(&lowered, &["crear", "ingresar", "nuevo"]) {
                out.say(messages::new_case_header());
                out.state = ConversationState::IngresoTipoCaso;
            } else if lowered == "si" {
                out.say(messages::menu(ctx.emergency_number));
                out.state = ConversationState::EsperandoOpcionMenu;
            } else if lowered == "no" {
                out.say(messages::thanks_goodbye());
                out.state = ConversationState::Fin;
            } else {
                out.say(messages::didnt_understand_query());
            }
        }

        ConversationState::IngresoTipoCaso => {
            if text == "1" {
                out.say(messages::ask_store_local());
                out.state = ConversationState::IngresoNumeroLocal;
            } else {
                out.say(messages::invalid_option());
                out.say(messages::case_type_menu());
            }
        }

        ConversationState::IngresoNumeroLocal => {
            if !is_all_digits(text) {
                out.say(messages::store_local_digits_error());
            } else {
                // Leading zeros collapse; "0"/"00" is not a local.
                match text.parse::<i64>() {
                    Ok(local) if local > 0 => {
                        if directory.local_exists(local) {
                            out.data.insert("local".to_string(), Value::from(local));
                            out.say(messages::ask_auth_code());
                            out.state = ConversationState::IngresoValidarCodigo;
                        } else {
                            out.say(messages::store_not_found());
                        }
                    }
                    _ => out.say(messages::store_local_invalid()),
                }
            }
        }

        ConversationState::IngresoValidarCodigo => {
            let code = text.to_uppercase();
            match conv.data.get("local").and_then(Value::as_i64) {
                None => {
                    // Recoverable guard: the local vanished from the
                    // accumulated data, so restart from the menu.
                    out.say(messages::internal_error_retry());
                    out.state = ConversationState::MenuPrincipal;
                }
                Some(local) if !directory.code_matches(local, &code) => {
                    out.attempts = conv.attempts + 1;
                    if out.attempts < MAX_CODE_ATTEMPTS {
                        out.say(messages::code_retry());
                    } else {
                        out.say(messages::code_lockout());
                        out.say(messages::ask_more());
                        out.state = ConversationState::NecesitaOtraConsulta;
                        out.attempts = 0;
                    }
                }
                Some(_) => {
                    out.data
                        .insert("codigo_tienda".to_string(), Value::from(code));
                    out.data.insert(
                        "formulario_enviado_en".to_string(),
                        Value::from(ctx.now.to_rfc3339()),
                    );
                    out.attempts = 0;
                    out.say(messages::code_accepted());
                    out.say(messages::form_link(ctx.form_url));
                    out.say(messages::form_info_with_thanks());
                    out.state = ConversationState::EsperandoFormulario;
                }
            }
        }

        ConversationState::EsperandoFormulario => {
            let sent_at = conv
                .data
                .get("formulario_enviado_en")
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc));

            let Some(sent_at) = sent_at else {
                out.state = ConversationState::MenuPrincipal;
                return Some(out);
            };
            let minutes = (ctx.now - sent_at).num_minutes();

            // One-shot reminder; later branches may still override the
            // state this sets.
            if minutes >= ctx.form_reminder_min
                && !flag_set(&conv.data, "mensaje_info_formulario_enviado")
            {
                out.say(messages::form_info());
                out.say(messages::ask_more());
                out.state = ConversationState::NecesitaOtraConsulta;
                out.data
                    .insert("mensaje_info_formulario_enviado".to_string(), Value::from(true));
            }

            if contains_any(&lowered, GREETINGS) {
                out.say(messages::hello_again());
                out.say(messages::menu(ctx.emergency_number));
                out.state = ConversationState::EsperandoOpcionMenu;
                return Some(out);
            }

            // "cancelar" is also an exit keyword, so this arm only fires
            // if the exit list ever stops covering it.
            if lowered == "cancelar" {
                out.say(messages::form_cancelled());
                out.say(messages::ask_more());
                out.state = ConversationState::NecesitaOtraConsulta;
                return Some(out);
            }

            if minutes < ctx.form_ask_min {
                return Some(out);
            }

            if !flag_set(&conv.data, "pregunta_post_formulario") {
                out.say(messages::ask_form_done());
                out.data
                    .insert("pregunta_post_formulario".to_string(), Value::from(true));
                out.state = ConversationState::ConfirmarFormulario;
            }
        }

        ConversationState::ConfirmarFormulario => {
            if lowered == "si" || lowered == "sí" {
                out.say(messages::form_registered());
                out.say(messages::ask_more());
                out.state = ConversationState::NecesitaOtraConsulta;
            } else if lowered == "no" {
                out.say(messages::form_retry_intro());
                out.say(messages::form_retry_menu());
                out.state = ConversationState::ReintentoFormulario;
            } else {
                out.say(messages::didnt_understand());
            }
        }

        ConversationState::ReintentoFormulario => match text {
            "1" => {
                out.say(messages::form_link(ctx.form_url));
                out.data.insert(
                    "formulario_enviado_en".to_string(),
                    Value::from(ctx.now.to_rfc3339()),
                );
                out.data.remove("mensaje_info_formulario_enviado");
                out.data.remove("pregunta_post_formulario");
                out.state = ConversationState::EsperandoFormulario;
            }
            "2" => {
                out.say(messages::menu(ctx.emergency_number));
                out.state = ConversationState::MenuPrincipal;
            }
            _ => out.say(messages::form_retry_menu()),
        },

        ConversationState::Fin => {
            if contains_any(&lowered, GREETINGS) {
                out.say(messages::welcome());
                out.say(messages::menu(ctx.emergency_number));
                out.state = ConversationState::EsperandoOpcionMenu;
            }
            // Otherwise stay silent.
        }
    }

    Some(out)
}

fn is_all_digits(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit())
}
