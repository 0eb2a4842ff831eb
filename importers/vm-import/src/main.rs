//! VM Inventory Importer
//!
//! Reconciles virtual-machine inventory rows from an Excel workbook against
//! a NetBox instance (create-or-update), materializing the dependent objects
//! a row references by name:
//! - device roles and clusters are created on first reference
//! - IP addresses are created, attached to a VM interface, and set as the
//!   VM's primary IPv4 address
//! - VRF and tenant references are attached when they resolve
//!
//! Rows missing required fields are skipped with a reason; the run always
//! finishes and prints a summary table.

mod config;
mod diff;
mod driver;
mod error;
mod reconciler;
mod report;
mod resolver;
mod sheet;
#[cfg(test)]
mod test_utils;

use anyhow::Context;
use clap::Parser;
use config::ImportConfig;
use netbox_client::NetBoxClient;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = ImportConfig::parse();

    info!("Starting VM inventory import");
    info!("  NetBox URL: {}", config.url);
    info!("  Workbook: {} (sheet '{}')", config.file.display(), config.sheet);

    let client = NetBoxClient::new(config.url.clone(), config.token.clone())
        .context("failed to build NetBox client")?;
    client
        .validate_token()
        .await
        .context("failed to reach NetBox with the configured URL and token")?;

    let rows = sheet::load_rows(&config.file, &config.sheet)
        .with_context(|| format!("failed to read {}", config.file.display()))?;
    info!("Read {} rows from sheet '{}'", rows.len(), config.sheet);

    let report = driver::run(&config, &client, &rows).await;
    report.print(&config.sheet);

    Ok(())
}
