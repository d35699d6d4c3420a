// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing Spanish copy for both flows.
//!
//! Kept in one module so wording changes never touch the state machines.
//! Functions take the contact numbers and links from configuration; the
//! follow-up texts take the row itself since they name case and site.

use suptrack_core::{Button, OutboundMessage};
use suptrack_storage::FollowUp;

/// Signature appended to supplier-facing follow-up messages.
const SIGNATURE: &str = "Atte.\nMantención de Tiendas";

// ---------------------------------------------------------------
// Support conversation
// ---------------------------------------------------------------

pub fn welcome() -> String {
    "👋 ¡Hola! Bienvenido a tu asistente virtual.".to_string()
}

pub fn welcome_back() -> String {
    "👋 ¡Hola! Bienvenido nuevamente a tu asistente virtual.".to_string()
}

pub fn hello_again() -> String {
    "👋 ¡Hola nuevamente! Continuemos con su atención.".to_string()
}

pub fn menu(emergency_number: &str) -> String {
    format!(
        "Seleccione una opción. Recuerde que para EMERGENCIAS debe llamar al {emergency_number}.\n\n\
         1️⃣ Consultar caso existente\n\
         2️⃣ Ingresar nuevo caso\n\
         Debe ingresar el número de la opción"
    )
}

pub fn type_hola_hint() -> String {
    "👋 Para comenzar por favor escriba *hola*.".to_string()
}

pub fn closing() -> String {
    "👋 Gracias por contactarnos.\nLa conversación ha sido finalizada.\n\
     Si necesitas ayuda nuevamente, no dudes en contactarnos."
        .to_string()
}

pub fn identifier_menu() -> String {
    "Por favor seleccione identificador:\n\
     1️⃣ Número de Ticket\n\
     2️⃣ Número de Tririga\n\
     3️⃣ Número de Local\n\
     Debe ingresar el número de la opción"
        .to_string()
}

pub fn invalid_option() -> String {
    "❌ Debe seleccionar una de las opciones disponibles en menú.".to_string()
}

pub fn ask_ticket_number() -> String {
    "Ingrese el número de ticket:".to_string()
}

pub fn ask_tririga_id() -> String {
    "Ingrese el N° ID:".to_string()
}

pub fn ask_local_number() -> String {
    "Ingrese el N° local:".to_string()
}

pub fn ticket_format_error() -> String {
    "❌ Formato inválido.\nEl número de ticket debe contener solo números.\n\
     Ejemplo: 11563839\nPor favor ingrese un número de ticket válido:"
        .to_string()
}

pub fn tririga_format_error() -> String {
    "❌ Formato inválido.\nEl ID debe contener solo números.\n\
     Ejemplo: 3721\nPor favor ingrese un ID válido:"
        .to_string()
}

pub fn local_format_error() -> String {
    "❌ Formato inválido.\nEl número de local debe contener solo números.\nEjemplo: 120".to_string()
}

pub fn querying_crm() -> String {
    "⏳ Consultando sistema CRM...".to_string()
}

pub fn ticket_not_found(value: &str, helpdesk_number: &str) -> String {
    format!(
        "ℹ️ No se encontraron casos asociados al ticket {value}.\n\n\
         📞 Si tiene dudas por favor comuníquese con la mesa de ayuda {helpdesk_number}."
    )
}

pub fn tririga_not_found(value: &str, helpdesk_number: &str) -> String {
    format!(
        "ℹ️ No se encontraron casos asociados al ID {value}.\n\n\
         📞 Si tiene dudas por favor comuníquese con la mesa de ayuda {helpdesk_number}."
    )
}

pub fn local_not_found(value: &str, helpdesk_number: &str) -> String {
    format!(
        "ℹ️ El local {value} no registra casos asociados.\n\n\
         📞 Si tiene dudas comuníquese con la mesa de ayuda {helpdesk_number}."
    )
}

pub fn ticket_result(summary: &str, helpdesk_number: &str) -> String {
    format!("{summary}\n📞 Si tiene dudas comuníquese con la mesa de ayuda {helpdesk_number}.")
}

pub fn ask_more() -> String {
    "¿Necesita otra consulta?".to_string()
}

pub fn thanks_goodbye() -> String {
    "🙏 Gracias por usar nuestro servicio.".to_string()
}

pub fn didnt_understand_query() -> String {
    "❌ ¿Qué? Perdón no entendí, por favor ingresa una entrada válida\n\
     Por ejemplo:\n• si\n• no\n• consultar otro ticket\n• crear otro ticket"
        .to_string()
}

pub fn case_type_menu() -> String {
    "Seleccione tipo de caso:\n1️⃣ Casos normales\nDebe ingresar el número de la opción".to_string()
}

pub fn new_case_header() -> String {
    format!("📄 Ingresar nuevo caso\n\n{}", case_type_menu())
}

pub fn ask_store_local() -> String {
    "Ingrese número de local:".to_string()
}

pub fn store_local_digits_error() -> String {
    "❌ El número de local debe contener solo números.\nIngrese nuevamente el número de local:"
        .to_string()
}

pub fn store_local_invalid() -> String {
    "❌ El número de local ingresado no es válido.\nIngrese nuevamente el número de local:"
        .to_string()
}

pub fn store_not_found() -> String {
    "❌ No se encontró una tienda asociada al local ingresado.\n\
     Ingrese nuevamente el número de local:"
        .to_string()
}

pub fn ask_auth_code() -> String {
    "Ingrese su código de autorización:".to_string()
}

pub fn internal_error_retry() -> String {
    "❌ Error interno. Intente nuevamente.".to_string()
}

pub fn code_retry() -> String {
    "❌ Código inválido. 1 de 2 Intente nuevamente:".to_string()
}

pub fn code_lockout() -> String {
    "❌ Código inválido. 2 de 2. Interacción finalizada por seguridad.".to_string()
}

pub fn code_accepted() -> String {
    "✔ Código autorizado.".to_string()
}

pub fn form_link(form_url: &str) -> String {
    format!("Para crear un caso haga clic en el siguiente link:\n\n{form_url}")
}

pub fn form_info() -> String {
    "📩 Si completó el formulario, dentro de los próximos 10 minutos recibirá \
     un mail con la información asociada a su solicitud."
        .to_string()
}

pub fn form_info_with_thanks() -> String {
    format!("{} \n\n🙏 Gracias por usar nuestro servicio.", form_info())
}

pub fn form_cancelled() -> String {
    "✅ Se ha cancelado el ingreso del ticket.".to_string()
}

pub fn ask_form_done() -> String {
    "⏳ Han pasado algunos minutos.\n¿Pudo completar el formulario?\n\nResponda *SI* o *NO*."
        .to_string()
}

pub fn form_registered() -> String {
    "✔ Gracias. Su solicitud fue registrada correctamente.\nUn ejecutivo revisará su caso."
        .to_string()
}

pub fn form_retry_intro() -> String {
    "❌ Entendido.\nPuede intentar nuevamente cuando lo desee.".to_string()
}

pub fn form_retry_menu() -> String {
    "1️⃣ Volver a enviar formulario\n2️⃣ Volver al menú principal".to_string()
}

pub fn didnt_understand() -> String {
    "❌ Disculpe, no entiendo esta respuesta. Por favor reintente".to_string()
}

pub fn text_only() -> String {
    "Por el momento solo puedo procesar mensajes de texto. Por favor escriba su consulta."
        .to_string()
}

// ---------------------------------------------------------------
// Supplier follow-up
// ---------------------------------------------------------------

pub fn ask_arrival_time() -> String {
    "Por favor ingrese la hora exacta de llegada:\n".to_string()
}

pub fn reschedule_prompt_exceptional() -> String {
    "Para reprogramar el servicio,\npor favor ingrese:\nNueva fecha y hora\ncomprometida."
        .to_string()
}

pub fn out_of_window_notice() -> String {
    "Te recordamos que te encuentras fuera del plazo establecido de 2 horas.\n\n\
     Favor indicar nueva fecha y hora de llegada.\n\n\
     Formato requerido:\ndd-mm-yyyy hh:mm"
        .to_string()
}

/// Quick-pick alternative to typing a reschedule time.
pub fn arrival_quick_pick() -> OutboundMessage {
    OutboundMessage::Buttons {
        body: "O seleccione en cuántos minutos llegará el técnico:".to_string(),
        buttons: vec![
            Button {
                id: "llegada_10".to_string(),
                title: "10 minutos".to_string(),
            },
            Button {
                id: "llegada_20".to_string(),
                title: "20 minutos".to_string(),
            },
            Button {
                id: "llegada_30".to_string(),
                title: "30 minutos".to_string(),
            },
        ],
    }
}

pub fn time_format_error() -> String {
    "❌ Formato inválido.\nUse el formato:\nhh:mm\nEjemplo:\n10:30".to_string()
}

pub fn time_invalid() -> String {
    "❌ Hora inválida. Intente nuevamente.".to_string()
}

pub fn date_format_error() -> String {
    "❌ Formato inválido.\nUse el formato:\ndd-mm-yyyy hh:mm".to_string()
}

pub fn date_invalid() -> String {
    "❌ Fecha u hora inválida. Intente nuevamente.".to_string()
}

pub fn arrival_confirmed(follow_up: &FollowUp) -> String {
    format!(
        "Estimado proveedor {} {}\n\n\
         Agradecemos su confirmación, se procede a finalizar el seguimiento del \
         ID N° {} Local {}.\n\n{SIGNATURE}",
        follow_up.supplier_name,
        follow_up.supplier_tax_id,
        follow_up.case_id,
        follow_up.site_id.as_deref().unwrap_or("-"),
    )
}

pub fn reschedule_confirmed(follow_up: &FollowUp) -> String {
    format!(
        "Estimado proveedor {} {}\n\n\
         Agradecemos su confirmación.\n\
         Se realizará un nuevo seguimiento en la fecha y hora indicadas.\n\n{SIGNATURE}",
        follow_up.supplier_name, follow_up.supplier_tax_id,
    )
}

pub fn reschedule_confirmed_at(follow_up: &FollowUp, local_time: &str) -> String {
    format!(
        "Estimado proveedor {} {}\n\n\
         Agradecemos su confirmación.\n\
         Se realizará un nuevo seguimiento a las {local_time}.\n\n{SIGNATURE}",
        follow_up.supplier_name, follow_up.supplier_tax_id,
    )
}

pub fn committed_confirmed(follow_up: &FollowUp) -> String {
    format!(
        "Estimado proveedor {} {}\n\n\
         Agradecemos su confirmación.\n\
         Se realizará un nuevo seguimiento\n\
         para corroborar su llegada al local.\n\n{SIGNATURE}",
        follow_up.supplier_name, follow_up.supplier_tax_id,
    )
}

pub fn not_confirmed_closing(follow_up: &FollowUp) -> String {
    format!(
        "Le informamos que por falta de\n\
         confirmación se procede a finalizar el\n\
         seguimiento del ID {} Local {}.\n\n{SIGNATURE}",
        follow_up.case_id,
        follow_up.site_id.as_deref().unwrap_or("-"),
    )
}

pub fn answer_si_no() -> String {
    "❓ Respuesta no válida.\nPor favor responda:\nSI o NO".to_string()
}

pub fn arrival_ack() -> String {
    "✔ Gracias. Confirmación registrada.".to_string()
}

pub fn reprogram_ack() -> String {
    "✔ Reprogramación registrada. Gracias.".to_string()
}

pub fn mail_subject(case_id: &str) -> String {
    format!("Confirmación proveedor - Seguimiento {case_id}")
}
