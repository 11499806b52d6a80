use tracing::error;

use crate::database::{DatabaseError, Entity, Repository};
use crate::error::ApiError;
use crate::filter::{ListParams, Paginated};
use crate::state::AppState;

/// Request-scoped facade over `Repository` that logs persistence failures
/// and hands back `ApiError`s ready for the response.
pub struct EntityService<E: Entity> {
    repository: Repository<E>,
    max_limit: Option<i64>,
}

impl<E: Entity> EntityService<E> {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: Repository::new(state.db.pool().clone(), state.cache.clone()),
            max_limit: state.config.filter.max_limit,
        }
    }

    pub async fn list(&self, params: &ListParams, raw_query: Option<&str>) -> Result<Paginated<E::Record>, ApiError> {
        self.repository
            .list(params, raw_query, self.max_limit)
            .await
            .map_err(|e| log_failure::<E>("list", e))
    }

    pub async fn get(&self, id: i64) -> Result<E::Record, ApiError> {
        self.repository.find(id).await.map_err(|e| log_failure::<E>("get", e))
    }

    pub async fn create(&self, input: &E::Create) -> Result<E::Record, ApiError> {
        self.repository.create(input).await.map_err(|e| log_failure::<E>("create", e))
    }

    pub async fn update(&self, id: i64, patch: &E::Update) -> Result<E::Record, ApiError> {
        self.repository
            .update(id, patch)
            .await
            .map_err(|e| log_failure::<E>("update", e))
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.repository.delete(id).await.map_err(|e| log_failure::<E>("delete", e))
    }
}

fn log_failure<E: Entity>(operation: &str, err: DatabaseError) -> ApiError {
    match &err {
        DatabaseError::NotFound(_) | DatabaseError::Filter(_) => {}
        _ => error!("{} {} failed: {}", operation, E::schema().singular, err),
    }
    ApiError::from(err)
}
