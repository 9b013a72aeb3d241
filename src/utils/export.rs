use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::errors::{ClientError, Result};
use crate::model::{Employee, PayrollRecord};
use crate::pipeline::GroupedRow;

/// Flat payroll row as written to the Payrolls and Summary sheets.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollExportRow {
    pub id: String,
    pub employee_id: String,
    pub employee_name: Option<String>,
    pub pay_date: Option<String>,
    pub gross_salary: Option<f64>,
    pub tax_amount: Option<f64>,
    pub net_salary: Option<f64>,
}

impl From<&PayrollRecord> for PayrollExportRow {
    fn from(r: &PayrollRecord) -> Self {
        Self {
            id: r.id.to_string(),
            employee_id: r.employee.id.to_string(),
            employee_name: r.employee.name.clone(),
            pay_date: r.pay_date.clone(),
            gross_salary: r.gross_salary,
            tax_amount: r.tax_amount,
            net_salary: r.net_salary,
        }
    }
}

pub fn payroll_rows(groups: &[GroupedRow]) -> Vec<PayrollExportRow> {
    groups
        .iter()
        .flat_map(|g| g.rows.iter().map(PayrollExportRow::from))
        .collect()
}

pub fn summary_rows(records: &[PayrollRecord]) -> Vec<PayrollExportRow> {
    records.iter().map(PayrollExportRow::from).collect()
}

/// Where and under which names an export is written.
#[derive(Debug, Clone)]
pub struct ExportTarget<'a> {
    pub dir: &'a Path,
    pub prefix: &'a str,
    pub sheet: &'a str,
    pub date: NaiveDate,
}

impl ExportTarget<'_> {
    pub fn file_name(&self) -> String {
        format!("{}_{}.xlsx", self.prefix, self.date.format("%Y-%m-%d"))
    }
}

/// Serializes `rows` into one worksheet. Headers are the row keys in order
/// of first appearance; `Ok(None)` means there was nothing to write.
pub fn to_xlsx<T: Serialize>(rows: &[T], sheet: &str) -> Result<Option<Vec<u8>>> {
    if rows.is_empty() {
        return Ok(None);
    }

    let objects = rows
        .iter()
        .map(|row| match serde_json::to_value(row)? {
            Value::Object(map) => Ok(map),
            other => Err(ClientError::Export(format!(
                "export rows must be objects, got {}",
                other
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    let mut headers: Vec<&str> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name(sheet)?;
    let bold = Format::new().set_bold();

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }

    for (r, object) in objects.iter().enumerate() {
        let row = (r + 1) as u32;
        for (col, header) in headers.iter().enumerate() {
            let col = col as u16;
            match object.get(*header) {
                None | Some(Value::Null) => {}
                Some(Value::Number(n)) => match n.as_f64() {
                    Some(f) => {
                        worksheet.write_number(row, col, f)?;
                    }
                    None => {
                        worksheet.write_string(row, col, &n.to_string())?;
                    }
                },
                Some(Value::Bool(b)) => {
                    worksheet.write_boolean(row, col, *b)?;
                }
                Some(Value::String(s)) => {
                    worksheet.write_string(row, col, s.as_str())?;
                }
                Some(other) => {
                    worksheet.write_string(row, col, &other.to_string())?;
                }
            }
        }
    }

    workbook.push_worksheet(worksheet);
    Ok(Some(workbook.save_to_buffer()?))
}

/// Writes `<prefix>_<date>.xlsx` into the target directory.
pub fn export_rows<T: Serialize>(rows: &[T], target: &ExportTarget<'_>) -> Result<Option<PathBuf>> {
    let Some(buffer) = to_xlsx(rows, target.sheet)? else {
        return Ok(None);
    };

    fs::create_dir_all(target.dir)
        .map_err(|e| ClientError::Export(format!("cannot create {}: {}", target.dir.display(), e)))?;
    let path = target.dir.join(target.file_name());
    fs::write(&path, buffer)
        .map_err(|e| ClientError::Export(format!("cannot write {}: {}", path.display(), e)))?;

    info!(path = %path.display(), rows = rows.len(), sheet = target.sheet, "export written");
    Ok(Some(path))
}

pub fn export_payrolls(groups: &[GroupedRow], dir: &Path, date: NaiveDate) -> Result<Option<PathBuf>> {
    let target = ExportTarget {
        dir,
        prefix: "Payrolls",
        sheet: "Payrolls",
        date,
    };
    export_rows(&payroll_rows(groups), &target)
}

pub fn export_summary(records: &[PayrollRecord], dir: &Path, date: NaiveDate) -> Result<Option<PathBuf>> {
    let target = ExportTarget {
        dir,
        prefix: "Summary",
        sheet: "Summary",
        date,
    };
    export_rows(&summary_rows(records), &target)
}

pub fn export_employees(employees: &[Employee], dir: &Path, date: NaiveDate) -> Result<Option<PathBuf>> {
    let target = ExportTarget {
        dir,
        prefix: "Employees",
        sheet: "Employees",
        date,
    };
    export_rows(employees, &target)
}
