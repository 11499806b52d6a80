use futures::future::BoxFuture;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{postgres::PgRow, FromRow, PgPool};

use crate::api::validate::Validate;
use crate::database::manager::DatabaseError;
use crate::filter::{quote_identifier, FixedFilter, SortDirection, SqlParam, StatusKind};

/// Static description of one entity table: everything the generic list,
/// point-lookup, and write paths need to know about it.
#[derive(Debug)]
pub struct Schema {
    pub table: &'static str,
    /// Plural name used in routes and the `get_all_<list_name>_` cache keys
    pub list_name: &'static str,
    pub singular: &'static str,
    pub columns: &'static [&'static str],
    pub search_column: &'static str,
    pub case_sensitive_search: bool,
    pub status_column: &'static str,
    pub status_kind: StatusKind,
    pub default_order: (&'static str, SortDirection),
    pub fixed_filters: &'static [FixedFilter],
    pub soft_delete: bool,
    /// Patterns cleared on every write in addition to the list pattern
    pub extra_cache_patterns: &'static [&'static str],
}

impl Schema {
    pub fn cache_prefix(&self) -> String {
        format!("get_all_{}", self.list_name)
    }

    pub fn cache_pattern(&self) -> String {
        format!("{}_*", self.cache_prefix())
    }

    pub fn invalidation_patterns(&self) -> Vec<String> {
        std::iter::once(self.cache_pattern())
            .chain(self.extra_cache_patterns.iter().map(|p| p.to_string()))
            .collect()
    }

    pub fn select_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn not_found_message(&self) -> String {
        format!("{} not found", self.singular)
    }
}

/// One CRUD-able entity type. Implementations only describe their table and
/// how request bodies map onto columns; the repository does the rest.
pub trait Entity: Send + Sync + 'static {
    type Record: for<'r> FromRow<'r, PgRow>
        + Serialize
        + DeserializeOwned
        + Clone
        + Send
        + Sync
        + Unpin
        + 'static;
    type Create: DeserializeOwned + Validate + Send + Sync + 'static;
    type Update: DeserializeOwned + Validate + Send + Sync + 'static;

    fn schema() -> &'static Schema;

    /// Column/value pairs for INSERT. Timestamps are set by the repository.
    fn create_values(input: &Self::Create) -> Result<Vec<(&'static str, SqlParam)>, DatabaseError>;

    /// Column/value pairs for UPDATE, given the row as it is now
    fn update_values(
        current: &Self::Record,
        patch: &Self::Update,
    ) -> Result<Vec<(&'static str, SqlParam)>, DatabaseError>;

    /// Hook run on a freshly loaded list page before it is cached
    fn decorate<'a>(
        _pool: &'a PgPool,
        _records: &'a mut Vec<Self::Record>,
    ) -> BoxFuture<'a, Result<(), DatabaseError>> {
        Box::pin(async { Ok(()) })
    }
}
