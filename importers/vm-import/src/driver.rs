//! Batch driver
//!
//! Iterates rows in file order, reconciling each one and aggregating the
//! outcome. A single row's failure never aborts the run.

use crate::config::ImportConfig;
use crate::reconciler::{Outcome, VmReconciler};
use crate::report::ImportReport;
use crate::sheet::VmRow;
use netbox_client::NetBoxClientTrait;
use tracing::{error, warn};

/// Reconcile all rows and return the aggregated report
pub async fn run<C: NetBoxClientTrait>(
    config: &ImportConfig,
    client: &C,
    rows: &[VmRow],
) -> ImportReport {
    let mut reconciler = VmReconciler::new(
        client,
        &config.cluster_type,
        config.site_id,
        &config.interface_name,
    );
    let mut report = ImportReport::default();

    for row in rows {
        let outcome = reconciler.reconcile(row).await;
        match &outcome {
            Outcome::Skipped(reason) => warn!("Row {}: skipped ({})", row.row, reason),
            Outcome::Failed(reason) => error!("Row {}: failed ({})", row.row, reason),
            _ => {}
        }
        report.record(row, &outcome);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_row;
    use netbox_client::MockNetBoxClient;
    use std::path::PathBuf;

    fn test_config() -> ImportConfig {
        ImportConfig {
            url: "http://test-netbox".to_string(),
            token: "token".to_string(),
            file: PathBuf::from("inventory.xlsx"),
            sheet: "Prod".to_string(),
            site_id: 2,
            cluster_type: "VMware".to_string(),
            interface_name: "eth0".to_string(),
        }
    }

    #[tokio::test]
    async fn run_aggregates_outcomes_and_continues_past_skips() {
        let client = MockNetBoxClient::new("http://test-netbox");
        let rows = vec![
            test_row(2, Some("srv01"), Some("Web")),
            test_row(3, None, Some("Web")),
            test_row(4, Some("srv02"), None),
            test_row(5, Some("srv03"), Some("Web")),
        ];

        let report = run(&test_config(), &client, &rows).await;

        assert_eq!(report.total, 4);
        assert_eq!(report.processed, 2);
        assert_eq!(report.created, 2);
        assert_eq!(report.skipped, 2);

        assert_eq!(report.skipped_rows.len(), 2);
        assert_eq!(report.skipped_rows[0].row, 3);
        assert_eq!(report.skipped_rows[1].row, 4);
        assert!(report.skipped_rows[0].reason.contains("name or role"));

        // The two valid rows share the role; it is created exactly once
        assert_eq!(client.counts().role_creates, 1);
    }
}
