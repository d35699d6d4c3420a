// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `suptrack search-tickets` command implementation.
//!
//! Operator tooling: query the CRM the same way the bot does and print
//! the resulting summaries. Without a filter, lists today's tickets.

use clap::Args;
use suptrack_config::SuptrackConfig;
use suptrack_core::SuptrackError;
use suptrack_crm::{CrmClient, TicketFilter};

/// Filters for the CRM ticket search. At most one may be given.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search by case number.
    #[arg(long, conflicts_with_all = ["tririga", "local"])]
    pub case: Option<String>,

    /// Search by tririga id.
    #[arg(long, conflicts_with = "local")]
    pub tririga: Option<String>,

    /// Search by site/local id.
    #[arg(long)]
    pub local: Option<String>,
}

impl SearchArgs {
    fn filter(&self) -> Option<TicketFilter> {
        if let Some(case) = &self.case {
            Some(TicketFilter::CaseId(case.clone()))
        } else if let Some(tririga) = &self.tririga {
            Some(TicketFilter::Tririga(tririga.clone()))
        } else {
            self.local.clone().map(TicketFilter::Local)
        }
    }
}

/// Runs the `suptrack search-tickets` command.
pub async fn run(config: SuptrackConfig, args: SearchArgs) -> Result<(), SuptrackError> {
    let (Some(username), Some(password)) = (&config.crm.username, &config.crm.password) else {
        return Err(SuptrackError::Config(
            "CRM credentials are required for search-tickets".to_string(),
        ));
    };
    let crm = CrmClient::new(
        config.crm.base_url.clone(),
        username.clone(),
        password.clone(),
        config.crm.token_ttl_min,
    )?;

    let tickets = match args.filter() {
        Some(filter) => crm.list_tickets(&filter).await?,
        None => crm.list_today().await?,
    };

    if tickets.is_empty() {
        println!("no tickets found");
        return Ok(());
    }
    for ticket in &tickets {
        println!("{}", ticket.summary());
    }
    println!("{} ticket(s)", tickets.len());
    Ok(())
}
