//! Run statistics and the final summary table

use crate::reconciler::Outcome;
use crate::sheet::VmRow;

/// Descriptor of a row that was skipped, for the summary table
#[derive(Debug, Clone)]
pub struct SkippedRow {
    pub row: usize,
    pub name: String,
    pub role: String,
    pub reason: String,
}

/// Aggregated counters for one import run
#[derive(Debug, Default)]
pub struct ImportReport {
    pub total: usize,
    pub processed: usize,
    pub skipped: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub skipped_rows: Vec<SkippedRow>,
}

impl ImportReport {
    /// Fold one row's outcome into the counters
    pub fn record(&mut self, row: &VmRow, outcome: &Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Created => {
                self.processed += 1;
                self.created += 1;
            }
            Outcome::Updated => {
                self.processed += 1;
                self.updated += 1;
            }
            Outcome::Unchanged => {
                self.processed += 1;
                self.unchanged += 1;
            }
            Outcome::Failed(_) => {
                self.processed += 1;
                self.failed += 1;
            }
            Outcome::Skipped(reason) => {
                self.skipped += 1;
                self.skipped_rows.push(SkippedRow {
                    row: row.row,
                    name: row.name.clone().unwrap_or_else(|| "-".to_string()),
                    role: row.role.clone().unwrap_or_else(|| "-".to_string()),
                    reason: reason.clone(),
                });
            }
        }
    }

    /// Print the summary table for the processed sheet
    pub fn print(&self, sheet: &str) {
        println!("\n{}", "=".repeat(60));
        println!("IMPORT SUMMARY FOR SHEET '{}':", sheet);
        println!("{}", "=".repeat(60));
        println!("Total rows in file: {}", self.total);
        println!(
            "Processed:          {} (created {}, updated {}, unchanged {}, failed {})",
            self.processed, self.created, self.updated, self.unchanged, self.failed
        );
        println!("Skipped:            {}", self.skipped);

        if !self.skipped_rows.is_empty() {
            println!("\nSKIPPED ROWS:");
            println!("{:<6} {:<25} {:<10} {}", "Row", "Name", "Role", "Reason");
            println!("{}", "-".repeat(70));
            for record in &self.skipped_rows {
                println!(
                    "{:<6} {:<25} {:<10} {}",
                    record.row,
                    truncate(&record.name, 24),
                    truncate(&record.role, 9),
                    record.reason
                );
            }
        }
        println!("{}", "=".repeat(60));
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_row;

    #[test]
    fn record_sorts_outcomes_into_counters() {
        let mut report = ImportReport::default();
        report.record(&test_row(2, Some("srv01"), Some("Web")), &Outcome::Created);
        report.record(&test_row(3, Some("srv02"), Some("Web")), &Outcome::Updated);
        report.record(&test_row(4, Some("srv03"), Some("Web")), &Outcome::Unchanged);
        report.record(
            &test_row(5, Some("srv04"), Some("Web")),
            &Outcome::Failed("boom".to_string()),
        );
        report.record(
            &test_row(6, None, Some("Web")),
            &Outcome::Skipped("missing required fields name or role".to_string()),
        );

        assert_eq!(report.total, 5);
        assert_eq!(report.processed, 4);
        assert_eq!(report.created, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 1);

        let skipped = &report.skipped_rows[0];
        assert_eq!(skipped.row, 6);
        assert_eq!(skipped.name, "-");
        assert_eq!(skipped.role, "Web");
        assert!(skipped.reason.contains("name or role"));
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("abcdef", 4), "abcd");
        assert_eq!(truncate("ab", 4), "ab");
    }
}
