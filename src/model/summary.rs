use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::model::de;
use crate::model::payroll::PayrollRecord;

/// Server-side aggregate over a set of payrolls. Read-only on the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySnapshot {
    #[serde(default, deserialize_with = "payrolls_or_empty")]
    pub payrolls: Vec<PayrollRecord>,

    #[serde(default, deserialize_with = "zero_if_missing")]
    pub total_gross_salary: f64,

    #[serde(default, deserialize_with = "zero_if_missing")]
    pub total_tax_amount: f64,

    #[serde(default, deserialize_with = "zero_if_missing")]
    pub total_net_salary: f64,
}

impl SummarySnapshot {
    /// Fixed shape regardless of what the backend sent. Each field is read on
    /// its own: a missing or unreadable total is 0, a row that cannot be
    /// decoded is dropped, and a body that is not an object is empty.
    pub fn normalize(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };

        let payrolls = match fields.remove("payrolls") {
            Some(Value::Array(rows)) => rows
                .into_iter()
                .filter_map(|row| match serde_json::from_value::<PayrollRecord>(row) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!(error = %e, "dropping unreadable summary row");
                        None
                    }
                })
                .collect(),
            _ => Vec::new(),
        };

        Self {
            payrolls,
            total_gross_salary: total(&fields, "totalGrossSalary"),
            total_tax_amount: total(&fields, "totalTaxAmount"),
            total_net_salary: total(&fields, "totalNetSalary"),
        }
    }
}

fn total(fields: &Map<String, Value>, key: &str) -> f64 {
    fields.get(key).and_then(de::number).unwrap_or(0.0)
}

fn zero_if_missing<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(de::opt_f64(deserializer)?.unwrap_or(0.0))
}

fn payrolls_or_empty<'de, D>(deserializer: D) -> Result<Vec<PayrollRecord>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<PayrollRecord>>::deserialize(deserializer)?.unwrap_or_default())
}
