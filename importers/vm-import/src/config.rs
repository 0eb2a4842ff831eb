//! Importer configuration
//!
//! All process configuration is collected here, validated by clap before any
//! row is processed. There are no fallback identifiers: a site id is
//! required, and the cluster type is resolved by name at run time.

use clap::Parser;
use std::path::PathBuf;

/// Reconcile VM inventory rows from an Excel workbook into NetBox.
#[derive(Debug, Parser)]
#[command(name = "vm-import", version, about)]
pub struct ImportConfig {
    /// NetBox base URL, e.g. https://netbox.example.com
    #[arg(long, env = "NETBOX_URL")]
    pub url: String,

    /// NetBox API token
    #[arg(long, env = "NETBOX_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Path to the Excel workbook with VM attributes
    #[arg(long, value_name = "FILE")]
    pub file: PathBuf,

    /// Name of the sheet to import
    #[arg(long, default_value = "Prod")]
    pub sheet: String,

    /// Site id used when a cluster has to be created and the row carries no site_id
    #[arg(long, env = "NETBOX_SITE_ID")]
    pub site_id: u64,

    /// Cluster type name looked up when a cluster has to be created
    #[arg(long, default_value = "VMware")]
    pub cluster_type: String,

    /// Interface name used when a VM needs its first interface for a primary IP
    #[arg(long, default_value = "eth0")]
    pub interface_name: String,
}
