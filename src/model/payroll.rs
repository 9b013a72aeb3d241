use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::de;
use crate::model::employee::{EmployeeRef, EntityId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRecord {
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub id: EntityId,

    #[serde(default, deserialize_with = "de::null_as_default")]
    pub employee: EmployeeRef,

    #[serde(default)]
    pub pay_date: Option<String>,

    #[serde(default, deserialize_with = "de::opt_f64")]
    pub gross_salary: Option<f64>,

    #[serde(default, deserialize_with = "de::opt_f64")]
    pub tax_amount: Option<f64>,

    #[serde(default, deserialize_with = "de::opt_f64")]
    pub net_salary: Option<f64>,
}

impl PayrollRecord {
    pub fn gross(&self) -> f64 {
        self.gross_salary.unwrap_or(0.0)
    }

    pub fn tax(&self) -> f64 {
        self.tax_amount.unwrap_or(0.0)
    }

    pub fn net(&self) -> f64 {
        self.net_salary.unwrap_or(0.0)
    }

    /// `None` when the pay date is absent or not a recognisable date.
    pub fn parsed_pay_date(&self) -> Option<NaiveDate> {
        let raw = self.pay_date.as_deref()?.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
    }
}

/// Payroll create body. Amounts are computed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayroll {
    pub employee_id: EntityId,
    pub pay_date: NaiveDate,
}
