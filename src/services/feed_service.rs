use tracing::error;

use crate::database::{Feed, FeedKind, FeedRepository};
use crate::error::ApiError;
use crate::state::AppState;

pub struct FeedService {
    repository: FeedRepository,
}

impl FeedService {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: FeedRepository::new(
                state.db.pool().clone(),
                state.cache.clone(),
                state.config.server.domain.clone(),
            ),
        }
    }

    pub async fn latest(&self, kind: FeedKind, raw_query: Option<&str>) -> Result<Feed, ApiError> {
        self.repository.latest(kind, raw_query).await.map_err(|e| {
            error!("loading {} failed: {}", kind.cache_prefix(), e);
            ApiError::from(e)
        })
    }
}
