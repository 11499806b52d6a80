use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::api::{Validate, Validator};
use crate::database::manager::DatabaseError;
use crate::database::schema::{Entity, Schema};
use crate::error::ApiError;
use crate::filter::{FixedFilter, SortDirection, SqlParam, StatusKind};

pub static CATEGORY_SCHEMA: Schema = Schema {
    table: "news_categories",
    list_name: "categories",
    singular: "category",
    columns: &[
        "id",
        "title",
        "slug",
        "order",
        "label",
        "is_featured",
        "parent_id",
        "view_count",
        "status_id",
        "created_by",
        "updated_by",
        "created_at",
        "updated_at",
    ],
    search_column: "title",
    case_sensitive_search: true,
    status_column: "status_id",
    status_kind: StatusKind::Integer,
    default_order: ("order", SortDirection::Asc),
    fixed_filters: &[FixedFilter::IsTrue("is_featured"), FixedFilter::IsNull("parent_id")],
    soft_delete: true,
    extra_cache_patterns: &[],
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub title: Option<String>,
    pub slug: String,
    pub order: i64,
    pub label: i64,
    pub is_featured: bool,
    pub parent_id: Option<i64>,
    pub view_count: i64,
    pub status_id: i64,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Direct children, filled in for list pages only
    #[sqlx(skip)]
    #[serde(default)]
    pub child_category: Vec<Category>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub label: i64,
    #[serde(default)]
    pub is_featured: bool,
    pub parent_id: Option<i64>,
    pub status_id: i64,
    pub created_by: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCategory {
    pub title: Option<String>,
    pub status_id: i64,
    pub updated_by: Option<i64>,
}

impl Validate for CreateCategory {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .length("title", self.title.as_deref(), 0, 191)
            .min("status_id", Some(self.status_id), 1)
            .min("order", Some(self.order), 0)
            .min("label", Some(self.label), 0)
            .finish()
    }
}

impl Validate for UpdateCategory {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .length("title", self.title.as_deref(), 0, 191)
            .min("status_id", Some(self.status_id), 1)
            .finish()
    }
}

pub struct Categories;

impl Entity for Categories {
    type Record = Category;
    type Create = CreateCategory;
    type Update = UpdateCategory;

    fn schema() -> &'static Schema {
        &CATEGORY_SCHEMA
    }

    fn create_values(input: &CreateCategory) -> Result<Vec<(&'static str, SqlParam)>, DatabaseError> {
        let slug = input
            .slug
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| slug::slugify(input.title.as_deref().unwrap_or_default()));

        Ok(vec![
            ("title", SqlParam::from(input.title.clone())),
            ("slug", SqlParam::from(slug)),
            ("order", SqlParam::from(input.order)),
            ("label", SqlParam::from(input.label)),
            ("is_featured", SqlParam::from(input.is_featured)),
            ("parent_id", SqlParam::from(input.parent_id)),
            ("status_id", SqlParam::from(input.status_id)),
            ("created_by", SqlParam::from(input.created_by)),
        ])
    }

    fn update_values(current: &Category, patch: &UpdateCategory) -> Result<Vec<(&'static str, SqlParam)>, DatabaseError> {
        Ok(vec![
            ("title", SqlParam::from(patch.title.clone().or_else(|| current.title.clone()))),
            ("status_id", SqlParam::from(patch.status_id)),
            ("updated_by", SqlParam::from(patch.updated_by.or(current.updated_by))),
        ])
    }

    fn decorate<'a>(pool: &'a PgPool, records: &'a mut Vec<Category>) -> BoxFuture<'a, Result<(), DatabaseError>> {
        Box::pin(async move {
            if records.is_empty() {
                return Ok(());
            }

            let parent_ids: Vec<i64> = records.iter().map(|c| c.id).collect();
            let query = format!(
                "SELECT {} FROM \"news_categories\" WHERE \"parent_id\" = ANY($1) AND \"deleted_at\" IS NULL ORDER BY \"order\" ASC, \"id\" ASC",
                CATEGORY_SCHEMA.select_list()
            );
            let children: Vec<Category> = sqlx::query_as(&query).bind(parent_ids).fetch_all(pool).await?;

            attach_children(records, children);
            Ok::<_, DatabaseError>(())
        })
    }
}

fn attach_children(parents: &mut [Category], children: Vec<Category>) {
    for parent in parents.iter_mut() {
        parent.child_category = children
            .iter()
            .filter(|child| child.parent_id == Some(parent.id))
            .cloned()
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i64, parent_id: Option<i64>) -> Category {
        Category {
            id,
            title: Some(format!("Category {}", id)),
            slug: format!("category-{}", id),
            order: 0,
            label: 0,
            is_featured: true,
            parent_id,
            view_count: 0,
            status_id: 1,
            created_by: None,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            child_category: vec![],
        }
    }

    #[test]
    fn slug_defaults_to_title() {
        let input = CreateCategory {
            title: Some("World Sports News".into()),
            slug: None,
            order: 0,
            label: 0,
            is_featured: true,
            parent_id: None,
            status_id: 1,
            created_by: None,
        };
        let values = Categories::create_values(&input).unwrap();
        assert_eq!(values[1], ("slug", SqlParam::from("world-sports-news")));
    }

    #[test]
    fn validation_bounds() {
        let update = UpdateCategory { title: Some("x".repeat(192)), status_id: 0, updated_by: None };
        match update.validate() {
            Err(ApiError::ValidationError { field_errors: Some(errors), .. }) => {
                assert!(errors.contains_key("title"));
                assert!(errors.contains_key("status_id"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn children_attach_to_their_parent() {
        let mut parents = vec![category(1, None), category(2, None)];
        attach_children(&mut parents, vec![category(10, Some(1)), category(11, Some(1)), category(20, Some(2))]);
        assert_eq!(parents[0].child_category.iter().map(|c| c.id).collect::<Vec<_>>(), vec![10, 11]);
        assert_eq!(parents[1].child_category.len(), 1);
    }

    #[test]
    fn update_keeps_title_when_omitted() {
        let current = category(5, None);
        let values = Categories::update_values(&current, &UpdateCategory { title: None, status_id: 2, updated_by: None }).unwrap();
        assert_eq!(values[0], ("title", SqlParam::from(Some("Category 5".to_string()))));
    }
}
