use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::api::{Validate, Validator};
use crate::database::manager::DatabaseError;
use crate::database::schema::{Entity, Schema};
use crate::error::ApiError;
use crate::filter::{SortDirection, SqlParam, StatusKind};

pub static DEPARTMENT_SCHEMA: Schema = Schema {
    table: "departments",
    list_name: "departments",
    singular: "department",
    columns: &["id", "title", "slug", "status_id", "created_by", "updated_by", "created_at", "updated_at"],
    search_column: "title",
    case_sensitive_search: true,
    status_column: "status_id",
    status_kind: StatusKind::Integer,
    default_order: ("id", SortDirection::Desc),
    fixed_filters: &[],
    soft_delete: true,
    extra_cache_patterns: &[],
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Department {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub status_id: i64,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDepartment {
    pub title: String,
    pub slug: Option<String>,
    #[serde(default = "default_status")]
    pub status_id: i64,
    pub created_by: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDepartment {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub status_id: Option<i64>,
    pub updated_by: Option<i64>,
}

fn default_status() -> i64 {
    1
}

impl CreateDepartment {
    fn slug(&self) -> String {
        self.slug
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| slug::slugify(&self.title))
    }
}

impl Validate for CreateDepartment {
    fn validate(&self) -> Result<(), ApiError> {
        let slug = self.slug();
        Validator::new()
            .required("title", Some(self.title.trim()))
            .length("title", Some(self.title.trim()), 3, 100)
            .length("slug", Some(&slug), 3, 100)
            .min("status_id", Some(self.status_id), 1)
            .finish()
    }
}

impl Validate for UpdateDepartment {
    fn validate(&self) -> Result<(), ApiError> {
        Validator::new()
            .length("title", self.title.as_deref().map(str::trim), 3, 100)
            .length("slug", self.slug.as_deref(), 3, 100)
            .min("status_id", self.status_id, 1)
            .finish()
    }
}

pub struct Departments;

impl Entity for Departments {
    type Record = Department;
    type Create = CreateDepartment;
    type Update = UpdateDepartment;

    fn schema() -> &'static Schema {
        &DEPARTMENT_SCHEMA
    }

    fn create_values(input: &CreateDepartment) -> Result<Vec<(&'static str, SqlParam)>, DatabaseError> {
        Ok(vec![
            ("title", SqlParam::from(input.title.trim())),
            ("slug", SqlParam::from(input.slug())),
            ("status_id", SqlParam::from(input.status_id)),
            ("created_by", SqlParam::from(input.created_by)),
        ])
    }

    fn update_values(
        current: &Department,
        patch: &UpdateDepartment,
    ) -> Result<Vec<(&'static str, SqlParam)>, DatabaseError> {
        let title = patch.title.as_deref().map(str::trim).unwrap_or(&current.title);
        Ok(vec![
            ("title", SqlParam::from(title)),
            ("slug", SqlParam::from(patch.slug.clone().unwrap_or_else(|| current.slug.clone()))),
            ("status_id", SqlParam::from(patch.status_id.unwrap_or(current.status_id))),
            ("updated_by", SqlParam::from(patch.updated_by.or(current.updated_by))),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_title_is_rejected() {
        let input = CreateDepartment { title: "HR".into(), slug: None, status_id: 1, created_by: None };
        assert!(input.validate().is_err());
    }

    #[test]
    fn padded_title_is_measured_trimmed() {
        let input = CreateDepartment { title: "  HR  ".into(), slug: Some("human-res".into()), status_id: 1, created_by: None };
        assert!(input.validate().is_err());

        let patch = UpdateDepartment { title: Some(" IT ".into()), slug: None, status_id: None, updated_by: None };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn slug_is_generated_from_title() {
        let input = CreateDepartment { title: "Human Resources".into(), slug: None, status_id: 1, created_by: None };
        assert!(input.validate().is_ok());
        assert_eq!(Departments::create_values(&input).unwrap()[1], ("slug", SqlParam::from("human-resources")));
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let current = Department {
            id: 1,
            title: "Finance".into(),
            slug: "finance".into(),
            status_id: 1,
            created_by: None,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let patch = UpdateDepartment { title: None, slug: None, status_id: Some(2), updated_by: None };
        let values = Departments::update_values(&current, &patch).unwrap();
        assert_eq!(values[0], ("title", SqlParam::from("Finance")));
        assert_eq!(values[2], ("status_id", SqlParam::from(2i64)));
    }
}
