// handlers/protected/crud.rs - generic CRUD handlers shared by every entity route

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, RawQuery, State,
    },
    response::Json,
};

use crate::api::Validate;
use crate::database::Entity;
use crate::error::ApiError;
use crate::filter::{ListParams, Paginated};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::EntityService;
use crate::state::AppState;

/// GET /api/v1/<entity> - paginated list, served from cache when present
pub async fn list<E: Entity>(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Paginated<E::Record>>, ApiError> {
    let Query(params) = query?;
    let page = EntityService::<E>::new(&state)
        .list(&params, raw_query.as_deref())
        .await?;
    Ok(Json(page))
}

/// GET /api/v1/<entity>/:id
pub async fn show<E: Entity>(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<E::Record> {
    let Path(id) = path?;
    let record = EntityService::<E>::new(&state).get(id).await?;
    Ok(ApiResponse::success(message::<E>("fetched"), record))
}

/// POST /api/v1/<entity>
pub async fn create<E: Entity>(
    State(state): State<AppState>,
    payload: Result<Json<E::Create>, JsonRejection>,
) -> ApiResult<E::Record> {
    let Json(input) = payload?;
    input.validate()?;

    let record = EntityService::<E>::new(&state).create(&input).await?;
    Ok(ApiResponse::created(message::<E>("created"), record))
}

/// PUT /api/v1/<entity>/:id
pub async fn update<E: Entity>(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<E::Update>, JsonRejection>,
) -> ApiResult<E::Record> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    patch.validate()?;

    let record = EntityService::<E>::new(&state).update(id, &patch).await?;
    Ok(ApiResponse::success(message::<E>("updated"), record))
}

/// DELETE /api/v1/<entity>/:id
pub async fn delete<E: Entity>(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = path?;
    EntityService::<E>::new(&state).delete(id).await?;
    Ok(ApiResponse::message(message::<E>("deleted")))
}

fn message<E: Entity>(action: &str) -> String {
    let singular = E::schema().singular;
    let mut chars = singular.chars();
    let name = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    format!("{} {} successfully", name, action)
}
