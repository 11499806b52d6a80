use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::pagination::Page;
use super::types::{quote_identifier, FilterOrderInfo, ListParams, SqlParam, SqlResult};
use crate::database::schema::Schema;

/// Builds the page query and its matching COUNT for one entity schema.
/// Fixed filters and the soft-delete guard are applied up front; request
/// parameters are layered on with `assign`.
pub struct Filter<'s> {
    schema: &'s Schema,
    where_data: FilterWhere,
    order: FilterOrderInfo,
    page: Page,
}

impl<'s> Filter<'s> {
    pub fn new(schema: &'s Schema) -> Result<Self, FilterError> {
        Self::validate_identifier(schema.table)?;
        for column in schema.columns {
            Self::validate_identifier(column)?;
        }
        Self::validate_identifier(schema.search_column)?;
        Self::validate_identifier(schema.status_column)?;

        let mut where_data = FilterWhere::new();
        for fixed in schema.fixed_filters {
            where_data.fixed(fixed);
        }
        if schema.soft_delete {
            where_data.not_deleted();
        }

        Ok(Self {
            schema,
            where_data,
            order: FilterOrderInfo {
                column: schema.default_order.0,
                sort: schema.default_order.1,
            },
            page: Page::default(),
        })
    }

    pub fn assign(&mut self, params: &ListParams, max_limit: Option<i64>) -> Result<&mut Self, FilterError> {
        if let Some(term) = params.search_term() {
            self.search(term);
        }
        if let Some(status) = params.status_value() {
            self.status(status)?;
        }
        if let Some(sort) = params.sort_value() {
            self.sort(sort)?;
        }
        self.page = Page::from_params(params).capped(max_limit);
        Ok(self)
    }

    pub fn search(&mut self, term: &str) -> &mut Self {
        self.where_data
            .contains(self.schema.search_column, term, self.schema.case_sensitive_search);
        self
    }

    pub fn status(&mut self, raw: &str) -> Result<&mut Self, FilterError> {
        self.where_data
            .status(self.schema.status_column, self.schema.status_kind, raw)?;
        Ok(self)
    }

    pub fn sort(&mut self, raw: &str) -> Result<&mut Self, FilterError> {
        self.order = FilterOrder::parse(raw)?;
        Ok(self)
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn to_sql(&self) -> SqlResult {
        let mut params = self.where_data.params().to_vec();
        params.push(SqlParam::from(self.page.limit));
        let limit_index = params.len();
        params.push(SqlParam::from(self.page.offset()));
        let offset_index = params.len();

        let query = [
            format!("SELECT {}", self.schema.select_list()),
            format!("FROM {}", quote_identifier(self.schema.table)),
            self.where_data.to_clause(),
            FilterOrder::generate(&self.order),
            format!("LIMIT ${} OFFSET ${}", limit_index, offset_index),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params }
    }

    /// Same filtering as `to_sql`, without ordering or paging
    pub fn to_count_sql(&self) -> SqlResult {
        let query = [
            "SELECT COUNT(*) AS count".to_string(),
            format!("FROM {}", quote_identifier(self.schema.table)),
            self.where_data.to_clause(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params: self.where_data.params().to_vec() }
    }

    fn validate_identifier(name: &str) -> Result<(), FilterError> {
        let mut chars = name.chars();
        let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidColumn(name.to_string()));
        }
        Ok(())
    }
}
