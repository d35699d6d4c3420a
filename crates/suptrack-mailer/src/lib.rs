// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort confirmation mail.
//!
//! Mail never gates a flow: a failed or disabled send is logged and the
//! caller continues. The only hard errors are configuration problems
//! caught at construction time (bad addresses, unreachable relay config).

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use suptrack_config::MailConfig;
use suptrack_core::SuptrackError;
use tracing::{debug, info, warn};

/// SMTP mailer for supplier-confirmation notifications.
#[derive(Debug)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
    to: Option<Mailbox>,
    cc: Vec<Mailbox>,
}

impl Mailer {
    /// Build a mailer from configuration.
    ///
    /// When mail is disabled the mailer still constructs (so callers
    /// need no special casing) and every send becomes a logged no-op.
    pub fn from_config(config: &MailConfig) -> Result<Mailer, SuptrackError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| SuptrackError::Config(format!("invalid mail.from address: {e}")))?;
        let to = config
            .to
            .as_deref()
            .map(|addr| {
                addr.parse()
                    .map_err(|e| SuptrackError::Config(format!("invalid mail.to address: {e}")))
            })
            .transpose()?;
        let cc = config
            .cc
            .iter()
            .map(|addr| {
                addr.parse()
                    .map_err(|e| SuptrackError::Config(format!("invalid mail.cc address: {e}")))
            })
            .collect::<Result<Vec<Mailbox>, _>>()?;

        let transport = if config.enabled {
            let builder = match (&config.smtp_username, &config.smtp_password) {
                (Some(user), Some(pass)) => {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                        .map_err(|e| {
                            SuptrackError::Config(format!("invalid SMTP relay config: {e}"))
                        })?
                        .credentials(Credentials::new(user.clone(), pass.clone()))
                }
                _ => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host),
            };
            Some(builder.port(config.smtp_port).build())
        } else {
            None
        };

        Ok(Mailer {
            transport,
            from,
            to,
            cc,
        })
    }

    /// Send one plain-text mail, swallowing every failure.
    pub async fn send_best_effort(&self, subject: &str, body: &str) {
        let Some(transport) = &self.transport else {
            debug!(subject, "mail disabled, dropping message");
            return;
        };
        let Some(to) = &self.to else {
            warn!(subject, "mail.to not configured, dropping message");
            return;
        };

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);
        for cc in &self.cc {
            builder = builder.cc(cc.clone());
        }

        let message = match builder.body(body.to_string()) {
            Ok(message) => message,
            Err(e) => {
                warn!(subject, error = %e, "failed to build mail");
                return;
            }
        };

        match transport.send(message).await {
            Ok(_) => info!(subject, to = %to, "confirmation mail sent"),
            Err(e) => warn!(subject, error = %e, "mail send failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_mailer_drops_silently() {
        let config = MailConfig {
            enabled: false,
            to: Some("ops@example.com".to_string()),
            ..Default::default()
        };
        let mailer = Mailer::from_config(&config).unwrap();
        mailer.send_best_effort("Confirmación", "cuerpo").await;
    }

    #[tokio::test]
    async fn missing_recipient_drops_silently() {
        let config = MailConfig {
            enabled: true,
            smtp_host: "localhost".to_string(),
            ..Default::default()
        };
        let mailer = Mailer::from_config(&config).unwrap();
        mailer.send_best_effort("Confirmación", "cuerpo").await;
    }

    #[test]
    fn invalid_from_address_is_a_config_error() {
        let config = MailConfig {
            from: "not an address".to_string(),
            ..Default::default()
        };
        let err = Mailer::from_config(&config).unwrap_err();
        assert!(matches!(err, SuptrackError::Config(_)));
    }

    #[test]
    fn cc_addresses_are_validated() {
        let config = MailConfig {
            cc: vec!["ok@example.com".to_string(), "broken@@".to_string()],
            ..Default::default()
        };
        assert!(Mailer::from_config(&config).is_err());
    }
}
