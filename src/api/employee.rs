use tracing::{debug, error, info};

use crate::api::cache::{QueryCache, QueryKey, Resource};
use crate::errors::{ClientError, Result};
use crate::http::ApiClient;
use crate::model::{Employee, EmployeePayload, EntityId};

const EMPLOYEES_PATH: &str = "/api/employees";

/// Result of deleting several employees one after another.
#[derive(Debug)]
pub struct BulkDeleteReport {
    pub deleted: Vec<EntityId>,
    /// The id that failed and why; deletion stops there.
    pub failed: Option<(EntityId, ClientError)>,
}

#[derive(Clone)]
pub struct EmployeeQueries {
    client: ApiClient,
    cache: QueryCache,
}

impl EmployeeQueries {
    pub fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    pub async fn list(&self) -> Result<Vec<Employee>> {
        self.cache
            .fetch(QueryKey::list(Resource::Employees), || {
                let client = self.client.clone();
                async move {
                    debug!("fetching employee list");
                    client.get::<Vec<Employee>>(EMPLOYEES_PATH, &[]).await
                }
            })
            .await
    }

    pub async fn get(&self, id: &EntityId) -> Result<Employee> {
        self.cache
            .fetch(QueryKey::entity(Resource::Employees, id), || {
                let client = self.client.clone();
                let path = format!("{}/{}", EMPLOYEES_PATH, id);
                async move { client.get::<Employee>(&path, &[]).await }
            })
            .await
    }

    pub async fn create(&self, payload: &EmployeePayload) -> Result<Employee> {
        let created: Employee = self
            .client
            .post(EMPLOYEES_PATH, payload)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to Create Employee"))?;

        self.cache.invalidate(&QueryKey::list(Resource::Employees));
        info!(employee_id = %created.id, "employee created");
        Ok(created)
    }

    pub async fn update(&self, id: &EntityId, payload: &EmployeePayload) -> Result<Employee> {
        let updated: Employee = self
            .client
            .put(&format!("{}/{}", EMPLOYEES_PATH, id), payload)
            .await
            .inspect_err(|e| error!(error = %e, employee_id = %id, "Failed to update employee"))?;

        self.invalidate_for(id);
        info!(employee_id = %id, "employee updated");
        Ok(updated)
    }

    pub async fn remove(&self, id: &EntityId) -> Result<()> {
        self.client
            .delete(&format!("{}/{}", EMPLOYEES_PATH, id))
            .await
            .inspect_err(|e| error!(error = %e, employee_id = %id, "Failed to delete employee"))?;

        self.invalidate_for(id);
        info!(employee_id = %id, "employee deleted");
        Ok(())
    }

    /// Deletes sequentially and stops at the first failure.
    pub async fn remove_many(&self, ids: &[EntityId]) -> BulkDeleteReport {
        let mut deleted = Vec::with_capacity(ids.len());
        for id in ids {
            if let Err(e) = self.remove(id).await {
                return BulkDeleteReport {
                    deleted,
                    failed: Some((id.clone(), e)),
                };
            }
            deleted.push(id.clone());
        }
        BulkDeleteReport {
            deleted,
            failed: None,
        }
    }

    fn invalidate_for(&self, id: &EntityId) {
        self.cache.invalidate(&QueryKey::list(Resource::Employees));
        self.cache.invalidate(&QueryKey::entity(Resource::Employees, id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::transport::{ApiResponse, MockTransport};
    use crate::http::{AuthState, HttpMethod};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn queries(mock: MockTransport) -> EmployeeQueries {
        let client = ApiClient::new("http://backend", Arc::new(mock), AuthState::new());
        EmployeeQueries::new(client, QueryCache::default())
    }

    fn payload() -> EmployeePayload {
        EmployeePayload {
            name: "Meera".to_string(),
            age: 30,
            gender: "Female".to_string(),
            designation: "Tech Lead".to_string(),
            rating: 4,
            salary: None,
        }
    }

    #[tokio::test]
    async fn list_is_served_from_cache_while_fresh() {
        let mut mock = MockTransport::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Ok(ApiResponse::ok(json!([{"id": 1, "name": "Meera"}]))));
        let q = queries(mock);

        assert_eq!(q.list().await.unwrap().len(), 1);
        assert_eq!(q.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_invalidates_list_and_entity() {
        let list_calls = Arc::new(AtomicUsize::new(0));
        let counter = list_calls.clone();

        let mut mock = MockTransport::new();
        mock.expect_execute()
            .withf(|req| req.method == HttpMethod::Get && req.path == EMPLOYEES_PATH)
            .returning(move |_| {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let name = if n == 0 { "Meera" } else { "Meera K" };
                Ok(ApiResponse::ok(json!([{"id": 1, "name": name}])))
            });
        mock.expect_execute()
            .withf(|req| req.method == HttpMethod::Get && req.path == "/api/employees/1")
            .times(2)
            .returning(|_| Ok(ApiResponse::ok(json!({"id": 1, "name": "Meera"}))));
        mock.expect_execute()
            .withf(|req| req.method == HttpMethod::Put && req.path == "/api/employees/1")
            .returning(|req| {
                assert_eq!(req.body.as_ref().unwrap()["designation"], json!("Tech Lead"));
                Ok(ApiResponse::ok(json!({"id": 1, "name": "Meera K"})))
            });
        let q = queries(mock);
        let id = EntityId::from(1u64);

        q.list().await.unwrap();
        q.get(&id).await.unwrap();
        q.update(&id, &payload()).await.unwrap();

        assert_eq!(q.list().await.unwrap()[0].name, "Meera K");
        q.get(&id).await.unwrap();
        assert_eq!(list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_employee_is_not_found() {
        let mut mock = MockTransport::new();
        mock.expect_execute()
            .returning(|_| Ok(ApiResponse::new(404, json!({"message": "Employee not found"}))));
        let q = queries(mock);

        let err = q.get(&EntityId::from(99u64)).await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
        assert_eq!(err.user_message("Error loading employee"), "Employee not found");
    }

    #[tokio::test]
    async fn rejected_create_is_validation_error_and_keeps_cache() {
        let mut mock = MockTransport::new();
        mock.expect_execute()
            .withf(|req| req.method == HttpMethod::Get)
            .times(1)
            .returning(|_| Ok(ApiResponse::ok(json!([]))));
        mock.expect_execute()
            .withf(|req| req.method == HttpMethod::Post)
            .returning(|_| Ok(ApiResponse::new(400, json!({"message": "Age must be positive"}))));
        let q = queries(mock);

        q.list().await.unwrap();
        let err = q.create(&payload()).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        // still fresh: no second GET expected
        q.list().await.unwrap();
    }

    #[tokio::test]
    async fn bulk_delete_stops_at_first_failure() {
        let mut mock = MockTransport::new();
        mock.expect_execute()
            .withf(|req| req.path == "/api/employees/1")
            .returning(|_| Ok(ApiResponse::ok(serde_json::Value::Null)));
        mock.expect_execute()
            .withf(|req| req.path == "/api/employees/2")
            .returning(|_| Ok(ApiResponse::new(500, json!({"message": "boom"}))));
        let q = queries(mock);

        let ids = [1u64, 2, 3].map(EntityId::from);
        let report = q.remove_many(&ids).await;

        assert_eq!(report.deleted, vec![EntityId::from(1u64)]);
        let (failed_id, err) = report.failed.unwrap();
        assert_eq!(failed_id, EntityId::from(2u64));
        assert!(matches!(err, ClientError::Transport { .. }));
    }
}
