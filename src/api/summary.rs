use tracing::debug;

use crate::api::cache::{QueryCache, QueryKey, Resource};
use crate::api::selector::SummarySelector;
use crate::errors::Result;
use crate::http::ApiClient;
use crate::model::SummarySnapshot;

/// Summary reads. Snapshots are cached per selector in the shared query
/// cache, so the last one fetched is still there after navigating away.
#[derive(Clone)]
pub struct SummaryQueries {
    client: ApiClient,
    cache: QueryCache,
}

impl SummaryQueries {
    pub fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    fn key(selector: &SummarySelector) -> QueryKey {
        QueryKey::new(Resource::Summary, selector.cache_parts())
    }

    pub async fn fetch(&self, selector: &SummarySelector) -> Result<SummarySnapshot> {
        self.cache
            .fetch(Self::key(selector), || {
                let client = self.client.clone();
                let selector = selector.clone();
                async move {
                    let query = selector.query();
                    let query: Vec<(&str, &str)> =
                        query.iter().map(|(k, v)| (*k, v.as_str())).collect();

                    debug!(selector = selector.label(), "fetching summary");
                    let body = client.get_value(&selector.path(), &query).await?;
                    Ok(SummarySnapshot::normalize(body))
                }
            })
            .await
    }

    /// Cached snapshot for `selector` without touching the network.
    pub async fn cached(&self, selector: &SummarySelector) -> Option<SummarySnapshot> {
        self.cache.peek(&Self::key(selector)).await
    }

    pub fn invalidate(&self) {
        self.cache.invalidate_resource(Resource::Summary);
    }
}
