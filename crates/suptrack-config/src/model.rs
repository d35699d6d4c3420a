// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the suptrack bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level suptrack configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values; the WhatsApp and
/// CRM credentials must come from config or environment before the bot can run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SuptrackConfig {
    /// Customer-support WhatsApp line credentials.
    #[serde(default)]
    pub whatsapp: WhatsappConfig,

    /// Supplier follow-up WhatsApp line credentials.
    #[serde(default)]
    pub followup: WhatsappConfig,

    /// CRM ticket API settings.
    #[serde(default)]
    pub crm: CrmConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Outbound confirmation mail settings.
    #[serde(default)]
    pub mail: MailConfig,

    /// Bot behavior: timers, windows, phone normalization, contact info.
    #[serde(default)]
    pub bot: BotConfig,
}

/// Credentials for one WhatsApp Cloud API line.
///
/// The bot runs two independent lines (customer support and supplier
/// follow-up), each with its own phone number id and webhook verify token.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsappConfig {
    /// Cloud API bearer token. `None` disables sending on this line.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Phone number id this line sends from.
    #[serde(default)]
    pub phone_number_id: Option<String>,

    /// Shared secret echoed during webhook verification handshakes.
    #[serde(default)]
    pub verify_token: Option<String>,
}

/// CRM ticket API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CrmConfig {
    /// Base URL of the CRM REST API.
    #[serde(default = "default_crm_base_url")]
    pub base_url: String,

    /// Login username.
    #[serde(default)]
    pub username: Option<String>,

    /// Login password.
    #[serde(default)]
    pub password: Option<String>,

    /// Minutes a cached login token is reused before re-authenticating.
    #[serde(default = "default_token_ttl_min")]
    pub token_ttl_min: u64,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            base_url: default_crm_base_url(),
            username: None,
            password: None,
            token_ttl_min: default_token_ttl_min(),
        }
    }
}

fn default_crm_base_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_token_ttl_min() -> u64 {
    50
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("suptrack").join("suptrack.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("suptrack.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the webhook server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port for the webhook server.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Outbound confirmation mail configuration.
///
/// Mail is best-effort everywhere: a send failure is logged and never
/// interrupts the flow that triggered it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MailConfig {
    /// Enable confirmation mail. When false, mail requests are dropped.
    #[serde(default)]
    pub enabled: bool,

    /// SMTP relay hostname.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username. `None` for unauthenticated relays.
    #[serde(default)]
    pub smtp_username: Option<String>,

    /// SMTP password.
    #[serde(default)]
    pub smtp_password: Option<String>,

    /// Sender address for confirmation mail.
    #[serde(default = "default_mail_from")]
    pub from: String,

    /// Primary recipient address.
    #[serde(default)]
    pub to: Option<String>,

    /// Carbon-copy recipient addresses.
    #[serde(default)]
    pub cc: Vec<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            from: default_mail_from(),
            to: None,
            cc: Vec::new(),
        }
    }
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_mail_from() -> String {
    "suptrack@localhost".to_string()
}

/// Bot behavior configuration: timers, windows, and user-facing contact info.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Local timezone as whole hours east of UTC.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,

    /// Country calling code prefixed to 9-digit local supplier numbers.
    #[serde(default = "default_country_code")]
    pub country_code: String,

    /// Minimum digit count for a normalized supplier phone number.
    #[serde(default = "default_min_phone_digits")]
    pub min_phone_digits: usize,

    /// Minutes an inbound reply stays bound to the follow-up that asked for it.
    #[serde(default = "default_reply_window_min")]
    pub reply_window_min: i64,

    /// Minutes a processed webhook message id is remembered for dedup.
    #[serde(default = "default_dedup_ttl_min")]
    pub dedup_ttl_min: i64,

    /// Minutes a supplier phone stays locked after an initial send.
    #[serde(default = "default_phone_lock_min")]
    pub phone_lock_min: i64,

    /// Maximum tickets pulled per ingestion batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Minutes before a promised form link is re-sent as a reminder.
    #[serde(default = "default_form_reminder_min")]
    pub form_reminder_min: i64,

    /// Minutes of silence before asking whether the form was submitted.
    #[serde(default = "default_form_ask_min")]
    pub form_ask_min: i64,

    /// Minutes after an arrival confirmation before the corroboration ping.
    #[serde(default = "default_corroboration_delay_min")]
    pub corroboration_delay_min: i64,

    /// Hours before a committed visit time that the reminder fires.
    #[serde(default = "default_committed_offset_hours")]
    pub committed_offset_hours: i64,

    /// URL of the external ticket web form sent to customers.
    #[serde(default = "default_form_url")]
    pub form_url: String,

    /// Helpdesk phone number shown in customer-facing copy.
    #[serde(default = "default_helpdesk_number")]
    pub helpdesk_number: String,

    /// Emergency phone number shown in customer-facing copy.
    #[serde(default = "default_emergency_number")]
    pub emergency_number: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            utc_offset_hours: default_utc_offset_hours(),
            country_code: default_country_code(),
            min_phone_digits: default_min_phone_digits(),
            reply_window_min: default_reply_window_min(),
            dedup_ttl_min: default_dedup_ttl_min(),
            phone_lock_min: default_phone_lock_min(),
            batch_size: default_batch_size(),
            form_reminder_min: default_form_reminder_min(),
            form_ask_min: default_form_ask_min(),
            corroboration_delay_min: default_corroboration_delay_min(),
            committed_offset_hours: default_committed_offset_hours(),
            form_url: default_form_url(),
            helpdesk_number: default_helpdesk_number(),
            emergency_number: default_emergency_number(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_utc_offset_hours() -> i32 {
    -3
}

fn default_country_code() -> String {
    "56".to_string()
}

fn default_min_phone_digits() -> usize {
    11
}

fn default_reply_window_min() -> i64 {
    10
}

fn default_dedup_ttl_min() -> i64 {
    5
}

fn default_phone_lock_min() -> i64 {
    15
}

fn default_batch_size() -> usize {
    20
}

fn default_form_reminder_min() -> i64 {
    2
}

fn default_form_ask_min() -> i64 {
    5
}

fn default_corroboration_delay_min() -> i64 {
    30
}

fn default_committed_offset_hours() -> i64 {
    2
}

fn default_form_url() -> String {
    "https://example.invalid/formulario-ticket".to_string()
}

fn default_helpdesk_number() -> String {
    "800 000 000".to_string()
}

fn default_emergency_number() -> String {
    "+56 9 0000 0000".to_string()
}
