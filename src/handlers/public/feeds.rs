// handlers/public/feeds.rs - breaking news feeds for the public site

use axum::{
    extract::{RawQuery, State},
    response::Json,
};

use crate::database::{Feed, FeedKind};
use crate::error::ApiError;
use crate::services::FeedService;
use crate::state::AppState;

/// GET /api/public/v1/breaking-scrolling-news
pub async fn breaking_scrolling(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Feed>, ApiError> {
    let feed = FeedService::new(&state)
        .latest(FeedKind::Scrolling, raw_query.as_deref())
        .await?;
    Ok(Json(feed))
}

/// GET /api/public/v1/breaking-thumbnail-news
pub async fn breaking_thumbnail(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Feed>, ApiError> {
    let feed = FeedService::new(&state)
        .latest(FeedKind::Thumbnail, raw_query.as_deref())
        .await?;
    Ok(Json(feed))
}
