// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared service bundle assembled once at startup.
//!
//! A missing WhatsApp line or CRM credential degrades the affected
//! feature instead of refusing to start: the gateway still verifies
//! webhooks and the support flow still runs without the CRM.

use chrono::{DateTime, Utc};
use suptrack_config::model::WhatsappConfig;
use suptrack_config::SuptrackConfig;
use suptrack_core::{LocalZone, OutboundMessage, Phone, SuptrackError};
use suptrack_crm::CrmClient;
use suptrack_engine::FollowUpContext;
use suptrack_mailer::Mailer;
use suptrack_storage::Database;
use suptrack_whatsapp::WhatsappClient;
use tracing::{info, warn};

/// Everything the task layer needs, built once and shared behind an `Arc`.
pub struct Services {
    pub db: Database,
    /// Customer-support line. `None` when credentials are absent.
    pub support: Option<WhatsappClient>,
    /// Supplier follow-up line. `None` when credentials are absent.
    pub followup: Option<WhatsappClient>,
    pub crm: Option<CrmClient>,
    pub mailer: Mailer,
    pub config: SuptrackConfig,
    pub zone: LocalZone,
}

impl Services {
    /// Open the database and build every client from configuration.
    pub async fn from_config(config: SuptrackConfig) -> Result<Services, SuptrackError> {
        let db = Database::open(&config.storage.database_path, config.storage.wal_mode).await?;
        Services::with_database(config, db)
    }

    /// Build services around an already-open database (used by tests).
    pub fn with_database(config: SuptrackConfig, db: Database) -> Result<Services, SuptrackError> {
        let support = line_client(&config.whatsapp, "support")?;
        let followup = line_client(&config.followup, "followup")?;

        let crm = match (&config.crm.username, &config.crm.password) {
            (Some(user), Some(pass)) => Some(CrmClient::new(
                config.crm.base_url.clone(),
                user.clone(),
                pass.clone(),
                config.crm.token_ttl_min,
            )?),
            _ => {
                warn!("CRM credentials not configured, ticket lookups disabled");
                None
            }
        };

        let mailer = Mailer::from_config(&config.mail)?;
        let zone = LocalZone::from_offset_hours(config.bot.utc_offset_hours);

        Ok(Services {
            db,
            support,
            followup,
            crm,
            mailer,
            config,
            zone,
        })
    }

    /// Timing context for one follow-up engine invocation.
    pub fn followup_ctx(&self, now: DateTime<Utc>) -> FollowUpContext {
        FollowUpContext {
            now,
            zone: self.zone,
            reply_window_min: self.config.bot.reply_window_min,
            corroboration_delay_min: self.config.bot.corroboration_delay_min,
            committed_offset_hours: self.config.bot.committed_offset_hours,
        }
    }
}

fn line_client(
    config: &WhatsappConfig,
    line: &'static str,
) -> Result<Option<WhatsappClient>, SuptrackError> {
    match (&config.access_token, &config.phone_number_id) {
        (Some(token), Some(id)) => {
            let client = WhatsappClient::new(token, id.clone())?;
            info!(line, phone_number_id = id.as_str(), "WhatsApp line ready");
            Ok(Some(client))
        }
        _ => {
            warn!(line, "WhatsApp line not configured, sends disabled");
            Ok(None)
        }
    }
}

/// Best-effort send on an optional line: a missing client or provider
/// rejection is logged, never propagated.
pub(crate) async fn send_best_effort(
    client: &Option<WhatsappClient>,
    line: &'static str,
    to: &Phone,
    message: &OutboundMessage,
) {
    let Some(client) = client else {
        warn!(line, to = %to, "line not configured, dropping outbound message");
        return;
    };
    if let Err(e) = client.send(to, message).await {
        warn!(line, to = %to, error = %e, "outbound send failed");
    }
}
