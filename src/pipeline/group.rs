use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{EmployeeRef, EntityId, PayrollRecord};

/// All payroll rows of one employee plus their sums.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedRow {
    pub employee: EmployeeRef,
    pub rows: Vec<PayrollRecord>,
    pub total_gross: f64,
    pub total_tax: f64,
    pub total_net: f64,
}

impl GroupedRow {
    fn new(employee: EmployeeRef) -> Self {
        Self {
            employee,
            rows: Vec::new(),
            total_gross: 0.0,
            total_tax: 0.0,
            total_net: 0.0,
        }
    }

    fn push(&mut self, record: PayrollRecord) {
        self.total_gross += record.gross();
        self.total_tax += record.tax();
        self.total_net += record.net();
        self.rows.push(record);
    }

    pub fn id(&self) -> &EntityId {
        &self.employee.id
    }

    pub fn count(&self) -> usize {
        self.rows.len()
    }

    /// Latest parseable pay date; rows whose date does not parse are skipped.
    pub fn latest_pay_date(&self) -> Option<NaiveDate> {
        self.rows.iter().filter_map(PayrollRecord::parsed_pay_date).max()
    }
}

/// Groups by `employee.id`, keeping groups in first-occurrence order.
pub fn group_by_employee(records: &[PayrollRecord]) -> Vec<GroupedRow> {
    let mut index: HashMap<&EntityId, usize> = HashMap::new();
    let mut groups: Vec<GroupedRow> = Vec::new();

    for record in records {
        let slot = *index.entry(&record.employee.id).or_insert_with(|| {
            groups.push(GroupedRow::new(record.employee.clone()));
            groups.len() - 1
        });
        groups[slot].push(record.clone());
    }

    groups
}

/// Record count and sums over a flat result set (summary cards, chart).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub records: usize,
    pub gross: f64,
    pub tax: f64,
    pub net: f64,
}

impl Totals {
    pub fn of(records: &[PayrollRecord]) -> Self {
        records.iter().fold(Totals::default(), |acc, r| Totals {
            records: acc.records + 1,
            gross: acc.gross + r.gross(),
            tax: acc.tax + r.tax(),
            net: acc.net + r.net(),
        })
    }
}
