// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed rows and persisted state enums.
//!
//! State enums derive strum `Display`/`EnumString` and are stored as their
//! SCREAMING_SNAKE_CASE names, matching the values the flows have always
//! used on the wire and in operator tooling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Support-conversation state, one per phone number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, Default,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationState {
    #[default]
    Inicio,
    EsperandoOpcionMenu,
    ConsultaSeleccionIdentificador,
    ConsultaIngresarTicket,
    ConsultaIngresarId,
    ConsultaIngresarLocal,
    NecesitaOtraConsulta,
    IngresoTipoCaso,
    IngresoNumeroLocal,
    IngresoValidarCodigo,
    EsperandoFormulario,
    ConfirmarFormulario,
    ReintentoFormulario,
    MenuPrincipal,
    Cerrada,
    Fin,
}

/// Coarse follow-up lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FollowUpStatus {
    PendienteFlujo,
    MensajeEnviado,
    EsperandoRespuesta,
    CerradoConfirmado,
    CerradoReprogramado,
    CerradoNoConfirmado,
    CerradoSinRespuesta,
    Reagendado,
}

impl FollowUpStatus {
    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FollowUpStatus::CerradoConfirmado
                | FollowUpStatus::CerradoReprogramado
                | FollowUpStatus::CerradoNoConfirmado
                | FollowUpStatus::CerradoSinRespuesta
                | FollowUpStatus::Reagendado
        )
    }
}

/// Fine-grained position inside an active follow-up reply flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FollowUpSubState {
    PreguntaLlegada,
    PreguntaHoraComprometida,
    EsperandoFechaHoraLlegadaReal,
    EsperandoFechaReagendada,
    EsperandoHoraLlegada,
    EsperandoReprogramacion,
}

/// Lifecycle of a queued reschedule request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RescheduleStatus {
    Pendiente,
    Procesando,
    Ejecutado,
    Fallido,
}

/// One support conversation, keyed by phone.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: i64,
    pub phone: String,
    pub state: ConversationState,
    pub attempts: i64,
    /// Accumulated free-form fields (chosen local, code, one-shot flags).
    pub data: serde_json::Map<String, serde_json::Value>,
    /// Submitted ticket form, if any.
    pub form: Option<serde_json::Value>,
    pub last_interaction_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One outbound supplier-tracking cycle.
#[derive(Debug, Clone)]
pub struct FollowUp {
    pub id: i64,
    pub case_id: String,
    pub tririga_no: Option<String>,
    pub site_id: Option<String>,
    pub criticality: Option<String>,
    pub supplier_name: String,
    pub supplier_tax_id: String,
    pub supplier_phone: String,
    /// Flow variant 1..3, immutable after creation.
    pub path: i64,
    pub status: FollowUpStatus,
    pub sub_state: Option<FollowUpSubState>,
    pub sent_at: Option<DateTime<Utc>>,
    pub reply_deadline_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub scheduled_execute_at: Option<DateTime<Utc>>,
    pub confirmed_arrival_at: Option<DateTime<Utc>>,
    /// Raw normalized ticket, carried forward on chaining.
    pub ticket_payload: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a follow-up row.
#[derive(Debug, Clone)]
pub struct NewFollowUp {
    pub case_id: String,
    pub tririga_no: Option<String>,
    pub site_id: Option<String>,
    pub criticality: Option<String>,
    pub supplier_name: String,
    pub supplier_tax_id: String,
    pub supplier_phone: String,
    pub path: i64,
    pub scheduled_execute_at: Option<DateTime<Utc>>,
    pub ticket_payload: Option<serde_json::Value>,
}

/// One queued reschedule request.
#[derive(Debug, Clone)]
pub struct Reschedule {
    pub id: i64,
    pub origin_followup_id: Option<i64>,
    pub case_id: String,
    pub tririga_no: Option<String>,
    pub site_id: Option<String>,
    pub criticality: Option<String>,
    pub supplier_name: String,
    pub supplier_tax_id: String,
    pub supplier_phone: String,
    pub path: i64,
    pub execute_from_at: DateTime<Utc>,
    pub status: RescheduleStatus,
    pub reason: Option<String>,
    pub attempts: i64,
    pub last_error: Option<String>,
    pub executed_at: Option<DateTime<Utc>>,
    pub ticket_payload: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a reschedule row.
#[derive(Debug, Clone)]
pub struct NewReschedule {
    pub origin_followup_id: Option<i64>,
    pub case_id: String,
    pub tririga_no: Option<String>,
    pub site_id: Option<String>,
    pub criticality: Option<String>,
    pub supplier_name: String,
    pub supplier_tax_id: String,
    pub supplier_phone: String,
    pub path: i64,
    pub execute_from_at: DateTime<Utc>,
    pub reason: String,
    pub ticket_payload: Option<serde_json::Value>,
}

/// One armed silence-deadline check.
#[derive(Debug, Clone)]
pub struct SilenceCheck {
    pub id: i64,
    pub follow_up_id: i64,
    pub due_at: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// One store record in the authorization directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreRecord {
    pub code: String,
    pub local: i64,
    pub business: Option<String>,
    pub region: Option<String>,
    pub name: Option<String>,
}

/// One logged support-flow message.
#[derive(Debug, Clone)]
pub struct Interaction {
    pub id: i64,
    pub phone: String,
    /// "in" for user messages, "out" for bot replies.
    pub direction: String,
    pub body: String,
    pub state: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Parse a persisted enum column, mapping bad values to a conversion error.
pub(crate) fn decode_enum<T: std::str::FromStr<Err = strum::ParseError>>(
    idx: usize,
    raw: &str,
) -> Result<T, rusqlite::Error> {
    raw.parse().map_err(|e: strum::ParseError| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse an optional persisted enum column.
pub(crate) fn decode_enum_opt<T: std::str::FromStr<Err = strum::ParseError>>(
    idx: usize,
    raw: Option<String>,
) -> Result<Option<T>, rusqlite::Error> {
    raw.map(|s| decode_enum(idx, &s)).transpose()
}

/// Parse a JSON text column.
pub(crate) fn decode_json(
    idx: usize,
    raw: &str,
) -> Result<serde_json::Value, rusqlite::Error> {
    serde_json::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_roundtrip_through_screaming_snake_names() {
        assert_eq!(
            ConversationState::EsperandoOpcionMenu.to_string(),
            "ESPERANDO_OPCION_MENU"
        );
        assert_eq!(
            "CONSULTA_SELECCION_IDENTIFICADOR"
                .parse::<ConversationState>()
                .unwrap(),
            ConversationState::ConsultaSeleccionIdentificador
        );
        assert_eq!(
            FollowUpStatus::CerradoSinRespuesta.to_string(),
            "CERRADO_SIN_RESPUESTA"
        );
        assert_eq!(
            "PREGUNTA_HORA_COMPROMETIDA".parse::<FollowUpSubState>().unwrap(),
            FollowUpSubState::PreguntaHoraComprometida
        );
        assert_eq!(RescheduleStatus::Pendiente.to_string(), "PENDIENTE");
    }

    #[test]
    fn terminal_statuses() {
        assert!(FollowUpStatus::CerradoSinRespuesta.is_terminal());
        assert!(FollowUpStatus::Reagendado.is_terminal());
        assert!(!FollowUpStatus::PendienteFlujo.is_terminal());
        assert!(!FollowUpStatus::MensajeEnviado.is_terminal());
        assert!(!FollowUpStatus::EsperandoRespuesta.is_terminal());
    }
}
