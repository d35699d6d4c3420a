// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket field normalization.
//!
//! The CRM returns keys in erratic casing (`iD_ATENCION`, `nombrE_PROVEEDOR`,
//! `celulaR_1_PROVEEDOR`), so every lookup is case-insensitive and the
//! supplier fields fall back to fixed defaults when blank.

use serde_json::Value;

/// Default supplier name when the CRM field is blank.
pub const DEFAULT_SUPPLIER_NAME: &str = "Proveedor Desconocido";
/// Default supplier tax id when the CRM field is blank.
pub const DEFAULT_SUPPLIER_TAX_ID: &str = "11.111.111-1";

/// Search filter for `Ticket/listar`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketFilter {
    /// Case number (`idTicket` query parameter).
    CaseId(String),
    /// External tririga id (`nroTririga`).
    Tririga(String),
    /// Site/local id (`idLocal`).
    Local(String),
}

impl TicketFilter {
    pub(crate) fn query_param(&self) -> (&'static str, &str) {
        match self {
            TicketFilter::CaseId(v) => ("idTicket", v),
            TicketFilter::Tririga(v) => ("nroTririga", v),
            TicketFilter::Local(v) => ("idLocal", v),
        }
    }
}

/// A ticket with normalized field names and supplier defaults applied.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub case_id: Option<String>,
    pub tririga_no: Option<String>,
    pub site_id: Option<String>,
    /// Uppercased, trimmed; defaults to NORMAL when blank.
    pub criticality: String,
    pub supplier_name: String,
    pub supplier_tax_id: String,
    pub phone_1: Option<String>,
    pub phone_2: Option<String>,
    /// Creation timestamp exactly as the CRM sent it.
    pub created_at_raw: Option<String>,
    pub status: Option<String>,
    /// The raw ticket object, carried onto follow-ups for traceability.
    pub raw: Value,
}

/// Case-insensitive string field lookup.
fn pick(raw: &Value, key: &str) -> Option<String> {
    let obj = raw.as_object()?;
    obj.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .and_then(|(_, v)| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Normalize one raw CRM ticket object.
pub fn normalize(raw: &Value) -> Ticket {
    let criticality = non_blank(pick(raw, "criticidad"))
        .map(|c| c.trim().to_uppercase())
        .unwrap_or_else(|| "NORMAL".to_string());

    Ticket {
        case_id: non_blank(pick(raw, "id_atencion")),
        tririga_no: non_blank(pick(raw, "nro_tririga")),
        site_id: non_blank(pick(raw, "id_local")),
        criticality,
        supplier_name: non_blank(pick(raw, "nombre_proveedor"))
            .unwrap_or_else(|| DEFAULT_SUPPLIER_NAME.to_string()),
        supplier_tax_id: non_blank(pick(raw, "rut_proveedor"))
            .unwrap_or_else(|| DEFAULT_SUPPLIER_TAX_ID.to_string()),
        phone_1: non_blank(pick(raw, "celular_1_proveedor")),
        phone_2: non_blank(pick(raw, "celular_2_proveedor")),
        created_at_raw: non_blank(pick(raw, "fecha")),
        status: non_blank(pick(raw, "estado_atencion")).or_else(|| non_blank(pick(raw, "estado"))),
        raw: raw.clone(),
    }
}

impl Ticket {
    /// One-line status summary sent to support users.
    pub fn summary(&self) -> String {
        match &self.case_id {
            Some(case_id) => {
                let status = self.status.as_deref().unwrap_or("Desconocido");
                format!("📄 El caso *{case_id}* se encuentra en estado: *{status}*")
            }
            None => "⚠️ No se pudo obtener la información del ticket.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn erratic_casing_is_tolerated() {
        let raw = json!({
            "iD_ATENCION": "CASO-1001",
            "nrO_TRIRIGA": "TR-77",
            "iD_LOCAL": 45,
            "criticidad": "  critico ",
            "nombrE_PROVEEDOR": "Climatizacion Sur",
            "ruT_PROVEEDOR": "76.111.222-3",
            "celulaR_1_PROVEEDOR": "949098167",
            "fecha": "2026-01-06T07:10:00",
            "estadO_ATENCION": "EN PROCESO"
        });

        let ticket = normalize(&raw);
        assert_eq!(ticket.case_id.as_deref(), Some("CASO-1001"));
        assert_eq!(ticket.tririga_no.as_deref(), Some("TR-77"));
        assert_eq!(ticket.site_id.as_deref(), Some("45"));
        assert_eq!(ticket.criticality, "CRITICO");
        assert_eq!(ticket.supplier_name, "Climatizacion Sur");
        assert_eq!(ticket.phone_1.as_deref(), Some("949098167"));
        assert_eq!(ticket.status.as_deref(), Some("EN PROCESO"));
    }

    #[test]
    fn blank_supplier_fields_get_defaults() {
        let raw = json!({
            "iD_ATENCION": "CASO-1002",
            "nombrE_PROVEEDOR": "   ",
            "criticidad": ""
        });

        let ticket = normalize(&raw);
        assert_eq!(ticket.supplier_name, DEFAULT_SUPPLIER_NAME);
        assert_eq!(ticket.supplier_tax_id, DEFAULT_SUPPLIER_TAX_ID);
        assert_eq!(ticket.criticality, "NORMAL");
    }

    #[test]
    fn summary_names_case_and_status() {
        let ticket = normalize(&json!({
            "iD_ATENCION": "CASO-1001",
            "estado": "CERRADO"
        }));
        assert_eq!(
            ticket.summary(),
            "📄 El caso *CASO-1001* se encuentra en estado: *CERRADO*"
        );

        let broken = normalize(&json!({ "otra_cosa": 1 }));
        assert!(broken.summary().contains("No se pudo obtener"));
    }

    #[test]
    fn filter_query_params() {
        assert_eq!(
            TicketFilter::CaseId("123".into()).query_param(),
            ("idTicket", "123")
        );
        assert_eq!(
            TicketFilter::Tririga("TR-9".into()).query_param(),
            ("nroTririga", "TR-9")
        );
        assert_eq!(
            TicketFilter::Local("45".into()).query_param(),
            ("idLocal", "45")
        );
    }
}
