use serde_json::Value;
use tracing::{debug, error, info};

use crate::api::cache::{QueryCache, QueryKey, Resource};
use crate::api::selector::PayrollSelector;
use crate::errors::Result;
use crate::http::ApiClient;
use crate::model::{CreatePayroll, PayrollRecord};

#[derive(Clone)]
pub struct PayrollQueries {
    client: ApiClient,
    cache: QueryCache,
}

impl PayrollQueries {
    pub fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    pub async fn all(&self) -> Result<Vec<PayrollRecord>> {
        self.list(&PayrollSelector::All).await
    }

    /// Reads the payrolls matching `selector`. A body that is not an array
    /// reads as an empty result.
    pub async fn list(&self, selector: &PayrollSelector) -> Result<Vec<PayrollRecord>> {
        let key = QueryKey::new(Resource::Payrolls, selector.cache_parts());
        self.cache
            .fetch(key, || {
                let client = self.client.clone();
                let selector = selector.clone();
                async move {
                    let query = selector.query();
                    let query: Vec<(&str, &str)> =
                        query.iter().map(|(k, v)| (*k, v.as_str())).collect();

                    debug!(selector = selector.label(), path = %selector.path(), "fetching payrolls");
                    let body = client.get_value(&selector.path(), &query).await?;
                    decode_rows(body)
                }
            })
            .await
    }

    /// Payroll amounts are computed by the backend from employee + pay date.
    pub async fn create(&self, payload: &CreatePayroll) -> Result<PayrollRecord> {
        let created: PayrollRecord = self
            .client
            .post("/api/payrolls", payload)
            .await
            .inspect_err(|e| {
                error!(error = %e, employee_id = %payload.employee_id, "Failed to create payroll")
            })?;

        // Every filtered payroll view and every summary may include the new row.
        self.cache.invalidate_resource(Resource::Payrolls);
        self.cache.invalidate_resource(Resource::Summary);
        info!(payroll_id = %created.id, employee_id = %payload.employee_id, "payroll created");
        Ok(created)
    }
}

fn decode_rows(body: Value) -> Result<Vec<PayrollRecord>> {
    match body {
        Value::Array(_) => Ok(serde_json::from_value(body)?),
        _ => Ok(Vec::new()),
    }
}
