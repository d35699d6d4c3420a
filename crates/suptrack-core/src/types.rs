// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel-agnostic message types and identifiers.

use serde::{Deserialize, Serialize};

/// Unique provider-assigned identifier for an inbound message.
///
/// Used as the idempotency key for webhook deliveries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// An E.164-style phone number in `+<digits>` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phone(String);

impl Phone {
    /// Normalizes a raw supplier phone string.
    ///
    /// Strips everything but digits, prefixes the country code for
    /// 9-digit local numbers, and rejects anything that ends up shorter
    /// than `min_digits` (country code included).
    pub fn normalize(raw: &str, country_code: &str, min_digits: usize) -> Option<Phone> {
        let mut digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() == 9 {
            digits = format!("{country_code}{digits}");
        }
        if digits.len() < min_digits {
            return None;
        }
        Some(Phone(format!("+{digits}")))
    }

    /// Builds a phone from a webhook `from` field: digits only, `+` prefixed.
    ///
    /// Inbound senders are trusted to be deliverable, so no length check.
    pub fn from_wire(raw: &str) -> Phone {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        Phone(format!("+{digits}"))
    }

    /// Wraps an already-normalized `+<digits>` string (e.g. read from storage).
    pub fn from_stored(value: impl Into<String>) -> Phone {
        Phone(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Phone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An interactive quick-reply button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub id: String,
    pub title: String,
}

/// An outbound message to be sent through the messaging gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Free-form text (only valid inside a user-initiated session window).
    Text { body: String },
    /// Pre-approved template with positional body parameters.
    Template {
        name: String,
        language: String,
        parameters: Vec<String>,
    },
    /// Interactive message with quick-reply buttons.
    Buttons { body: String, buttons: Vec<Button> },
}

impl OutboundMessage {
    pub fn text(body: impl Into<String>) -> Self {
        OutboundMessage::Text { body: body.into() }
    }
}

/// Payload of an inbound webhook message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundPayload {
    Text(String),
    /// Reply to an interactive quick-pick button.
    ButtonReply {
        id: String,
        title: String,
    },
    /// Media, stickers, reactions -- anything the bot cannot process.
    Unsupported,
}

/// An inbound message extracted from a webhook delivery.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub id: MessageId,
    pub from: Phone,
    pub payload: InboundPayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nine_digit_local_number_gets_country_code() {
        let phone = Phone::normalize("949098167", "56", 11).unwrap();
        assert_eq!(phone.as_str(), "+56949098167");
    }

    #[test]
    fn punctuation_is_stripped_before_normalizing() {
        let phone = Phone::normalize("+56 9 4909 8167", "56", 11).unwrap();
        assert_eq!(phone.as_str(), "+56949098167");
    }

    #[test]
    fn short_number_is_rejected() {
        assert!(Phone::normalize("12345", "56", 11).is_none());
    }

    #[test]
    fn wire_phone_keeps_digits_only() {
        let phone = Phone::from_wire("56 949-098-167");
        assert_eq!(phone.as_str(), "+56949098167");
    }
}
