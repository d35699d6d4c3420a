// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound webhook payload types.
//!
//! Mirrors the Cloud API delivery shape: `entry[].changes[].value.messages[]`.
//! Unknown fields are ignored so provider additions never break parsing.

use serde::Deserialize;
use suptrack_core::{InboundEvent, InboundPayload, MessageId, Phone};

/// Top-level webhook delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookDelivery {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Change {
    pub value: ChangeValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
}

/// One inbound message inside a delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    pub id: String,
    pub from: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<TextBody>,
    pub interactive: Option<Interactive>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Interactive {
    pub button_reply: Option<ButtonReply>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ButtonReply {
    pub id: String,
    pub title: String,
}

/// Flatten a delivery into channel-agnostic inbound events.
///
/// Text bodies and interactive button replies map to their payloads;
/// everything else (media, stickers, reactions) becomes `Unsupported` so
/// the flows can answer with the text-only notice.
pub fn extract_events(delivery: &WebhookDelivery) -> Vec<InboundEvent> {
    let mut events = Vec::new();
    for entry in &delivery.entry {
        for change in &entry.changes {
            for message in &change.value.messages {
                let payload = match message.kind.as_str() {
                    "text" => match &message.text {
                        Some(text) => InboundPayload::Text(text.body.clone()),
                        None => InboundPayload::Unsupported,
                    },
                    "interactive" => match message
                        .interactive
                        .as_ref()
                        .and_then(|i| i.button_reply.as_ref())
                    {
                        Some(reply) => InboundPayload::ButtonReply {
                            id: reply.id.clone(),
                            title: reply.title.clone(),
                        },
                        None => InboundPayload::Unsupported,
                    },
                    _ => InboundPayload::Unsupported,
                };
                events.push(InboundEvent {
                    id: MessageId(message.id.clone()),
                    from: Phone::from_wire(&message.from),
                    payload,
                });
            }
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_delivery_parses_to_event() {
        let raw = r#"{
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "100",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "metadata": { "phone_number_id": "111222333" },
                        "messages": [{
                            "from": "56949098167",
                            "id": "wamid.ABC",
                            "timestamp": "1756400000",
                            "type": "text",
                            "text": { "body": "hola" }
                        }]
                    }
                }]
            }]
        }"#;

        let delivery: WebhookDelivery = serde_json::from_str(raw).unwrap();
        let events = extract_events(&delivery);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id.0, "wamid.ABC");
        assert_eq!(events[0].from.as_str(), "+56949098167");
        assert_eq!(events[0].payload, InboundPayload::Text("hola".to_string()));
    }

    #[test]
    fn button_reply_parses_to_event() {
        let raw = r#"{
            "object": "whatsapp_business_account",
            "entry": [{
                "changes": [{
                    "value": {
                        "messages": [{
                            "from": "56949098167",
                            "id": "wamid.BTN",
                            "type": "interactive",
                            "interactive": {
                                "type": "button_reply",
                                "button_reply": { "id": "llegada_20", "title": "20 minutos" }
                            }
                        }]
                    }
                }]
            }]
        }"#;

        let delivery: WebhookDelivery = serde_json::from_str(raw).unwrap();
        let events = extract_events(&delivery);
        assert_eq!(
            events[0].payload,
            InboundPayload::ButtonReply {
                id: "llegada_20".to_string(),
                title: "20 minutos".to_string(),
            }
        );
    }

    #[test]
    fn media_message_is_unsupported() {
        let raw = r#"{
            "entry": [{
                "changes": [{
                    "value": {
                        "messages": [{
                            "from": "56949098167",
                            "id": "wamid.IMG",
                            "type": "image"
                        }]
                    }
                }]
            }]
        }"#;

        let delivery: WebhookDelivery = serde_json::from_str(raw).unwrap();
        let events = extract_events(&delivery);
        assert_eq!(events[0].payload, InboundPayload::Unsupported);
    }

    #[test]
    fn status_only_delivery_yields_no_events() {
        let raw = r#"{
            "entry": [{
                "changes": [{
                    "value": {
                        "statuses": [{ "id": "wamid.X", "status": "delivered" }]
                    }
                }]
            }]
        }"#;

        let delivery: WebhookDelivery = serde_json::from_str(raw).unwrap();
        assert!(extract_events(&delivery).is_empty());
    }
}
