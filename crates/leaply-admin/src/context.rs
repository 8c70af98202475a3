use std::sync::Arc;

use uuid::Uuid;

use crate::cache::{EntityCache, QueryKey};
use crate::client::ApiClient;
use crate::error::Result;
use crate::model::{EntityKind, Program, University, User};
use crate::session::Session;

/// Query parameter the programs list is filtered by.
pub const UNIVERSITY_FILTER_PARAM: &str = "universityId";

/// Everything a view or form needs: the API client and the shared cache.
#[derive(Clone)]
pub struct AdminContext {
    pub client: ApiClient,
    pub cache: EntityCache,
}

impl AdminContext {
    pub fn new(client: ApiClient, cache: EntityCache) -> Self {
        Self { client, cache }
    }

    pub fn session(&self) -> &Session {
        self.client.session()
    }

    pub fn programs_key(university_id: Option<Uuid>) -> QueryKey {
        let key = QueryKey::all(EntityKind::Program);
        match university_id {
            Some(id) => key.with_param(UNIVERSITY_FILTER_PARAM, id),
            None => key,
        }
    }

    pub async fn universities(&self) -> Result<Arc<Vec<University>>> {
        let client = self.client.clone();
        self.cache
            .fetch(QueryKey::all(EntityKind::University), move || async move {
                client.list_universities().await
            })
            .await
    }

    pub async fn programs(&self, university_id: Option<Uuid>) -> Result<Arc<Vec<Program>>> {
        let client = self.client.clone();
        self.cache
            .fetch(Self::programs_key(university_id), move || async move {
                client.list_programs(university_id).await
            })
            .await
    }

    pub async fn users(&self) -> Result<Arc<Vec<User>>> {
        let client = self.client.clone();
        self.cache
            .fetch(QueryKey::all(EntityKind::User), move || async move {
                client.list_users().await
            })
            .await
    }

    /// Delete a record and invalidate its kind. The cache is untouched on failure.
    pub async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<()> {
        self.client.delete_entity(kind, id).await?;
        tracing::info!(%kind, %id, "deleted");
        self.cache.invalidate(kind).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio_test::block_on;

    use crate::cache::CacheConfig;
    use crate::client::ClientConfig;

    fn offline_context() -> AdminContext {
        // Nothing listens on the discard port; any request would fail.
        let config = ClientConfig::new("http://127.0.0.1:9/api").unwrap();
        let client = ApiClient::new(config, Session::anonymous()).unwrap();
        let cache = EntityCache::new(CacheConfig::new().with_stale_time(Duration::from_secs(60)));
        AdminContext::new(client, cache)
    }

    #[test]
    fn test_programs_key_carries_filter() {
        let id = Uuid::new_v4();
        let key = AdminContext::programs_key(Some(id));
        assert_eq!(key.param(UNIVERSITY_FILTER_PARAM), Some(id.to_string().as_str()));
        assert_eq!(AdminContext::programs_key(None), QueryKey::all(EntityKind::Program));
    }

    #[test]
    fn test_fresh_lists_are_served_from_cache() {
        let ctx = offline_context();
        block_on(async {
            ctx.cache
                .set(QueryKey::all(EntityKind::User), Vec::<User>::new())
                .await;
            let users = ctx.users().await.unwrap();
            assert!(users.is_empty());

            let err = ctx.universities().await.unwrap_err();
            assert!(matches!(err, crate::AdminError::Network(_)));
        });
    }
}
