//! List recent CRM leads.
//!
//! Reads connection parameters from the JSON file given as the first
//! argument (or the default config path) and prints the newest leads.
//!
//! ```bash
//! RUST_LOG=odoo_connector=debug cargo run --example search_leads -- config.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use odoo_connector::{default_config_path, Connector, Domain, SearchReadOptions};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "odoo_connector=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    let connector = Connector::from_config(&config_path)
        .await
        .with_context(|| format!("Failed to connect using {}", config_path.display()))?;

    // type = 'lead' AND (stage = 'New' OR stage = 'Qualified')
    let domain = Domain::new()
        .filter("type", "=", "lead")
        .or()
        .filter("stage_id.name", "=", "New")
        .filter("stage_id.name", "=", "Qualified");

    let leads = connector
        .search_read_records(
            "crm.lead",
            SearchReadOptions::new()
                .with_fields(["id", "name", "email_from"])
                .with_domain(domain)
                .with_limit(10)
                .with_order("create_date desc"),
        )
        .await?;

    for lead in &leads {
        println!("{}", serde_json::to_string(lead)?);
    }
    tracing::info!(count = leads.len(), "Listed leads");

    connector.close();
    Ok(())
}
