use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};

use crate::cache::{cache_key, CacheGateway};
use crate::database::manager::DatabaseError;

pub const FEED_LIMIT: i64 = 3;
pub const FEED_LOCALE: &str = "en";
pub const ACTIVE_STATUS_ID: i64 = 1;
pub const PUBLISHED_STATUS_ID: i64 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Scrolling,
    Thumbnail,
}

impl FeedKind {
    pub fn cache_prefix(self) -> &'static str {
        match self {
            FeedKind::Scrolling => "get_breaking_scrolling_news",
            FeedKind::Thumbnail => "get_breaking_thumbnail_news",
        }
    }

    fn flag_column(self) -> &'static str {
        match self {
            FeedKind::Scrolling => "breaking_scroll_news",
            FeedKind::Thumbnail => "breaking_thumb_news",
        }
    }

    pub fn sql(self) -> String {
        format!(
            "SELECT DISTINCT \
                news.id, \
                news_translations.title, \
                news_translations.slug, \
                news.type AS kind, \
                news_translations.sub_title, \
                news_translations.tags, \
                news_translations.content, \
                news_translations.meta_title, \
                news_translations.meta_description, \
                news_translations.meta_keywords, \
                news.updated_at, \
                users.name AS author, \
                news.path_small, \
                news.path_medium, \
                news.path_large, \
                news.status_id, \
                news_categories.title AS category \
            FROM news \
            JOIN news_translations ON news.id = news_translations.news_id \
            JOIN assign_categories ON news.id = assign_categories.news_id \
            JOIN news_categories ON assign_categories.news_category_id = news_categories.id \
            JOIN users ON news.created_by = users.id \
            WHERE news_translations.locale = $1 \
              AND news.status_id = $2 \
              AND news.publish_status_id = $3 \
              AND news.{} = TRUE \
              AND news.deleted_at IS NULL \
            ORDER BY news.id DESC \
            LIMIT $4",
            self.flag_column()
        )
    }
}

#[derive(Debug, Clone, FromRow)]
struct FeedRow {
    id: i64,
    title: String,
    slug: String,
    kind: Option<String>,
    sub_title: Option<String>,
    tags: Option<Json<Vec<String>>>,
    content: Option<String>,
    meta_title: Option<String>,
    meta_description: Option<String>,
    meta_keywords: Option<Json<Vec<String>>>,
    updated_at: DateTime<Utc>,
    author: String,
    path_small: Option<String>,
    path_medium: Option<String>,
    path_large: Option<String>,
    status_id: i64,
    category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: i64,
    pub title: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sub_title: String,
    pub tags: Vec<String>,
    pub content: String,
    pub meta_title: String,
    pub meta_description: String,
    pub meta_keywords: Vec<String>,
    pub updated_at: DateTime<Utc>,
    pub author: String,
    pub url: String,
    pub path_small: String,
    pub path_medium: String,
    pub path_large: String,
    pub loading: String,
    pub status: String,
    pub category: String,
}

impl FeedItem {
    fn from_row(row: FeedRow, domain: &str) -> Self {
        let url = format!("{}/news/{}", domain, row.slug);
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            kind: row.kind.unwrap_or_default(),
            sub_title: row.sub_title.unwrap_or_default(),
            tags: row.tags.map(|t| t.0).unwrap_or_default(),
            content: row.content.unwrap_or_default(),
            meta_title: row.meta_title.unwrap_or_default(),
            meta_description: row.meta_description.unwrap_or_default(),
            meta_keywords: row.meta_keywords.map(|k| k.0).unwrap_or_default(),
            updated_at: row.updated_at,
            author: row.author,
            url,
            path_small: row.path_small.unwrap_or_default(),
            path_medium: row.path_medium.unwrap_or_default(),
            path_large: row.path_large.unwrap_or_default(),
            loading: loading_url(domain),
            status: row.status_id.to_string(),
            category: row.category.unwrap_or_default(),
        }
    }
}

pub fn loading_url(domain: &str) -> String {
    format!("{}/uploads/default/loading.png", domain)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub data: Vec<FeedItem>,
}

/// Breaking-news feeds for the public site, cached like the list endpoints
pub struct FeedRepository {
    pool: PgPool,
    cache: CacheGateway,
    domain: String,
}

impl FeedRepository {
    pub fn new(pool: PgPool, cache: CacheGateway, domain: impl Into<String>) -> Self {
        Self {
            pool,
            cache,
            domain: domain.into(),
        }
    }

    pub async fn latest(&self, kind: FeedKind, raw_query: Option<&str>) -> Result<Feed, DatabaseError> {
        let key = cache_key(kind.cache_prefix(), raw_query);
        if let Some(cached) = self.cache.get_json::<Feed>(&key).await {
            return Ok(cached);
        }

        let sql = kind.sql();
        let rows: Vec<FeedRow> = sqlx::query_as(&sql)
            .bind(FEED_LOCALE)
            .bind(ACTIVE_STATUS_ID)
            .bind(PUBLISHED_STATUS_ID)
            .bind(FEED_LIMIT)
            .fetch_all(&self.pool)
            .await?;

        let feed = Feed {
            data: rows.into_iter().map(|row| FeedItem::from_row(row, &self.domain)).collect(),
        };
        self.cache.set_json(&key, &feed).await;
        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feeds_bind_every_value() {
        let sql = FeedKind::Scrolling.sql();
        assert!(sql.contains("news_translations.locale = $1"));
        assert!(sql.contains("news.breaking_scroll_news = TRUE"));
        assert!(sql.ends_with("LIMIT $4"));
        assert!(FeedKind::Thumbnail.sql().contains("news.breaking_thumb_news = TRUE"));
    }

    #[test]
    fn item_links_use_the_public_domain() {
        let row = FeedRow {
            id: 9,
            title: "Election night".into(),
            slug: "election-night".into(),
            kind: Some("post".into()),
            sub_title: None,
            tags: Some(Json(vec!["politics".into()])),
            content: None,
            meta_title: None,
            meta_description: None,
            meta_keywords: None,
            updated_at: Utc::now(),
            author: "Desk".into(),
            path_small: None,
            path_medium: None,
            path_large: None,
            status_id: 1,
            category: Some("Politics".into()),
        };
        let item = FeedItem::from_row(row, "https://news.example.com");
        assert_eq!(item.url, "https://news.example.com/news/election-night");
        assert_eq!(item.loading, "https://news.example.com/uploads/default/loading.png");
        assert_eq!(item.tags, vec!["politics".to_string()]);
        assert!(item.meta_keywords.is_empty());

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "post");
    }

    #[test]
    fn feed_cache_prefixes_match_news_invalidation() {
        let patterns = crate::database::models::news::NEWS_SCHEMA.invalidation_patterns();
        for kind in [FeedKind::Scrolling, FeedKind::Thumbnail] {
            assert!(patterns.contains(&format!("{}_*", kind.cache_prefix())));
        }
    }
}
