//! Spreadsheet input
//!
//! Reads the VM inventory sheet into typed rows. Header names are mapped to
//! column indices once; blank cells normalize to `None`.

use crate::error::ImportError;
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::path::Path;

/// Columns that must be present in the sheet
pub const REQUIRED_COLUMNS: [&str; 4] = ["name", "role", "description", "serial"];

/// One VM inventory row, as read from the sheet
#[derive(Debug, Clone, Default)]
pub struct VmRow {
    /// 1-based spreadsheet row number (header is row 1)
    pub row: usize,
    pub name: Option<String>,
    pub role: Option<String>,
    pub description: Option<String>,
    pub serial: Option<String>,
    pub platform_id: Option<u64>,
    pub site_id: Option<u64>,
    pub cluster: Option<String>,
    pub vcpus: Option<u64>,
    pub memory: Option<u64>,
    pub disk: Option<u64>,
    pub ip_primary: Option<String>,
    pub ip_primary_description: Option<String>,
    pub status: Option<String>,
    pub tenant_name: Option<String>,
    pub vrf_name: Option<String>,
}

#[derive(Debug, Default)]
struct ColumnIndices {
    name: Option<usize>,
    role: Option<usize>,
    description: Option<usize>,
    serial: Option<usize>,
    platform_id: Option<usize>,
    site_id: Option<usize>,
    cluster: Option<usize>,
    vcpus: Option<usize>,
    memory: Option<usize>,
    disk: Option<usize>,
    ip_primary: Option<usize>,
    ip_primary_description: Option<usize>,
    status: Option<usize>,
    tenant_name: Option<usize>,
    vrf_name: Option<usize>,
}

/// Load all rows from the named sheet of the workbook
pub fn load_rows(path: &Path, sheet_name: &str) -> Result<Vec<VmRow>, ImportError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let sheet_names = workbook.sheet_names();
    if !sheet_names.iter().any(|s| s == sheet_name) {
        return Err(ImportError::Input(format!(
            "sheet '{}' not found in {}; available sheets: {}",
            sheet_name,
            path.display(),
            sheet_names.join(", ")
        )));
    }

    let range = workbook.worksheet_range(sheet_name)?;
    let mut row_iter = range.rows();

    let Some(header) = row_iter.next() else {
        return Err(ImportError::Input(format!("sheet '{}' is empty", sheet_name)));
    };
    let columns = map_columns(header)?;

    let mut rows = Vec::new();
    for (index, cells) in row_iter.enumerate() {
        rows.push(parse_row(index + 2, cells, &columns));
    }
    Ok(rows)
}

/// Map header names to column indices, verifying the required columns exist
fn map_columns(header: &[Data]) -> Result<ColumnIndices, ImportError> {
    let mut columns = ColumnIndices::default();
    let mut found = Vec::new();

    for (index, cell) in header.iter().enumerate() {
        let Data::String(name) = cell else { continue };
        let name = name.trim();
        found.push(name.to_string());
        let slot = match name {
            "name" => &mut columns.name,
            "role" => &mut columns.role,
            "description" => &mut columns.description,
            "serial" => &mut columns.serial,
            "platform_id" => &mut columns.platform_id,
            "site_id" => &mut columns.site_id,
            "cluster" => &mut columns.cluster,
            "vcpus" => &mut columns.vcpus,
            "memory" => &mut columns.memory,
            "disk" => &mut columns.disk,
            "ip_primary" => &mut columns.ip_primary,
            "ip_primary_description" => &mut columns.ip_primary_description,
            "status" => &mut columns.status,
            "tenant_name" => &mut columns.tenant_name,
            "vrf_name" => &mut columns.vrf_name,
            _ => continue,
        };
        slot.get_or_insert(index);
    }

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| match *name {
            "name" => columns.name.is_none(),
            "role" => columns.role.is_none(),
            "description" => columns.description.is_none(),
            "serial" => columns.serial.is_none(),
            _ => false,
        })
        .collect();

    if !missing.is_empty() {
        return Err(ImportError::Input(format!(
            "missing required columns: {}; found columns: {}",
            missing.join(", "),
            found.join(", ")
        )));
    }

    Ok(columns)
}

fn parse_row(row_number: usize, cells: &[Data], columns: &ColumnIndices) -> VmRow {
    VmRow {
        row: row_number,
        name: cell_string(cells, columns.name),
        role: cell_string(cells, columns.role),
        description: cell_string(cells, columns.description),
        serial: cell_string(cells, columns.serial),
        platform_id: cell_u64(cells, columns.platform_id),
        site_id: cell_u64(cells, columns.site_id),
        cluster: cell_string(cells, columns.cluster),
        vcpus: cell_u64(cells, columns.vcpus),
        memory: cell_u64(cells, columns.memory),
        disk: cell_u64(cells, columns.disk),
        ip_primary: cell_string(cells, columns.ip_primary),
        ip_primary_description: cell_string(cells, columns.ip_primary_description),
        status: cell_string(cells, columns.status),
        tenant_name: cell_string(cells, columns.tenant_name),
        vrf_name: cell_string(cells, columns.vrf_name),
    }
}

fn cell_string(cells: &[Data], column: Option<usize>) -> Option<String> {
    let cell = cells.get(column?)?;
    match cell {
        Data::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                Some(format!("{}", *f as i64))
            } else {
                Some(f.to_string())
            }
        }
        Data::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn cell_u64(cells: &[Data], column: Option<usize>) -> Option<u64> {
    let cell = cells.get(column?)?;
    match cell {
        Data::Int(i) if *i >= 0 => Some(*i as u64),
        Data::Float(f) if *f >= 0.0 => Some(f.round() as u64),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use std::path::PathBuf;

    fn write_workbook(file_name: &str, sheet: &str, header: &[&str], rows: &[Vec<&str>]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("vm-import-{}-{}", std::process::id(), file_name));
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet).unwrap();
        for (col, name) in header.iter().enumerate() {
            worksheet.write_string(0, col as u16, *name).unwrap();
        }
        for (row, cells) in rows.iter().enumerate() {
            for (col, value) in cells.iter().enumerate() {
                if let Ok(number) = value.parse::<f64>() {
                    worksheet.write_number((row + 1) as u32, col as u16, number).unwrap();
                } else if !value.is_empty() {
                    worksheet.write_string((row + 1) as u32, col as u16, *value).unwrap();
                }
            }
        }
        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn reads_rows_with_blank_cells_as_none() {
        let path = write_workbook(
            "basic.xlsx",
            "Prod",
            &["name", "role", "description", "serial", "vcpus", "memory", "ip_primary"],
            &[
                vec!["srv01", "Web", "frontend", "SN-1", "4", "8192", "10.0.0.5/24"],
                vec!["", "Web", "", "", "", "", ""],
            ],
        );

        let rows = load_rows(&path, "Prod").unwrap();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.row, 2);
        assert_eq!(first.name.as_deref(), Some("srv01"));
        assert_eq!(first.role.as_deref(), Some("Web"));
        assert_eq!(first.vcpus, Some(4));
        assert_eq!(first.memory, Some(8192));
        assert_eq!(first.ip_primary.as_deref(), Some("10.0.0.5/24"));

        let second = &rows[1];
        assert_eq!(second.row, 3);
        assert!(second.name.is_none());
        assert!(second.description.is_none());
        assert!(second.vcpus.is_none());
    }

    #[test]
    fn update_mode_columns_are_read() {
        let path = write_workbook(
            "full.xlsx",
            "Prod",
            &[
                "name", "role", "description", "serial", "platform_id", "site_id", "cluster",
                "vcpus", "memory", "disk", "ip_primary", "ip_primary_description", "status",
                "tenant_name", "vrf_name",
            ],
            &[vec![
                "srv02", "DB", "database", "SN-2", "1", "2", "kln-esx", "8", "16384", "200",
                "10.0.1.7", "db primary", "active", "Acme", "CORP",
            ]],
        );

        let rows = load_rows(&path, "Prod").unwrap();
        let row = &rows[0];
        assert_eq!(row.platform_id, Some(1));
        assert_eq!(row.site_id, Some(2));
        assert_eq!(row.cluster.as_deref(), Some("kln-esx"));
        assert_eq!(row.disk, Some(200));
        assert_eq!(row.ip_primary.as_deref(), Some("10.0.1.7"));
        assert_eq!(row.ip_primary_description.as_deref(), Some("db primary"));
        assert_eq!(row.status.as_deref(), Some("active"));
        assert_eq!(row.tenant_name.as_deref(), Some("Acme"));
        assert_eq!(row.vrf_name.as_deref(), Some("CORP"));
    }

    #[test]
    fn missing_required_columns_abort_with_listing() {
        let path = write_workbook(
            "missing.xlsx",
            "Prod",
            &["name", "role", "vcpus"],
            &[vec!["srv01", "Web", "4"]],
        );

        let err = load_rows(&path, "Prod").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("description"), "message: {}", message);
        assert!(message.contains("serial"), "message: {}", message);
        assert!(message.contains("found columns"), "message: {}", message);
    }

    #[test]
    fn missing_sheet_lists_available_sheets() {
        let path = write_workbook(
            "sheets.xlsx",
            "Tech",
            &["name", "role", "description", "serial"],
            &[],
        );

        let err = load_rows(&path, "Prod").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Tech"), "message: {}", message);
    }
}
