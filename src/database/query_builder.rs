use sqlx::{
    postgres::{PgArguments, PgRow},
    query::{Query, QueryAs},
    FromRow, PgPool, Postgres,
};

use crate::database::manager::DatabaseError;
use crate::database::schema::Schema;
use crate::filter::{quote_identifier, Filter, ListParams, Page, SqlParam, SqlResult};

/// Filtered, ordered, paged reads over one schema
pub struct QueryBuilder<T> {
    filter: Filter<'static>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(schema: &'static Schema) -> Result<Self, DatabaseError> {
        Ok(Self {
            filter: Filter::new(schema)?,
            _phantom: std::marker::PhantomData,
        })
    }

    pub fn filter(mut self, params: &ListParams, max_limit: Option<i64>) -> Result<Self, DatabaseError> {
        self.filter.assign(params, max_limit)?;
        Ok(self)
    }

    pub fn page(&self) -> Page {
        self.filter.page()
    }

    pub async fn select_all(&self, pool: &PgPool) -> Result<Vec<T>, DatabaseError> {
        let sql = self.filter.to_sql();
        let rows = bind_query_as(sqlx::query_as::<_, T>(&sql.query), &sql.params)
            .fetch_all(pool)
            .await?;
        Ok(rows)
    }

    pub async fn count(&self, pool: &PgPool) -> Result<i64, DatabaseError> {
        let sql = self.filter.to_count_sql();
        let (count,) = bind_query_as(sqlx::query_as::<_, (i64,)>(&sql.query), &sql.params)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}

/// Point lookup by id; soft-deleted rows are invisible
pub fn find_sql(schema: &Schema, id: i64) -> SqlResult {
    let mut query = format!(
        "SELECT {} FROM {} WHERE \"id\" = $1",
        schema.select_list(),
        quote_identifier(schema.table)
    );
    if schema.soft_delete {
        query.push_str(" AND \"deleted_at\" IS NULL");
    }
    SqlResult { query, params: vec![SqlParam::from(id)] }
}

pub fn insert_sql(schema: &Schema, values: Vec<(&'static str, SqlParam)>) -> SqlResult {
    let mut columns = Vec::with_capacity(values.len() + 2);
    let mut placeholders = Vec::with_capacity(values.len() + 2);
    let mut params = Vec::with_capacity(values.len());

    for (column, value) in values {
        params.push(value);
        columns.push(quote_identifier(column));
        placeholders.push(format!("${}", params.len()));
    }
    for stamp in ["created_at", "updated_at"] {
        columns.push(quote_identifier(stamp));
        placeholders.push("CURRENT_TIMESTAMP".to_string());
    }

    let query = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quote_identifier(schema.table),
        columns.join(", "),
        placeholders.join(", "),
        schema.select_list()
    );
    SqlResult { query, params }
}

pub fn update_sql(schema: &Schema, id: i64, values: Vec<(&'static str, SqlParam)>) -> SqlResult {
    let mut assignments = Vec::with_capacity(values.len() + 1);
    let mut params = Vec::with_capacity(values.len() + 1);

    for (column, value) in values {
        params.push(value);
        assignments.push(format!("{} = ${}", quote_identifier(column), params.len()));
    }
    assignments.push("\"updated_at\" = CURRENT_TIMESTAMP".to_string());
    params.push(SqlParam::from(id));

    let mut query = format!(
        "UPDATE {} SET {} WHERE \"id\" = ${}",
        quote_identifier(schema.table),
        assignments.join(", "),
        params.len()
    );
    if schema.soft_delete {
        query.push_str(" AND \"deleted_at\" IS NULL");
    }
    query.push_str(&format!(" RETURNING {}", schema.select_list()));
    SqlResult { query, params }
}

pub fn delete_sql(schema: &Schema, id: i64) -> SqlResult {
    let table = quote_identifier(schema.table);
    let query = if schema.soft_delete {
        format!(
            "UPDATE {} SET \"deleted_at\" = CURRENT_TIMESTAMP WHERE \"id\" = $1 AND \"deleted_at\" IS NULL",
            table
        )
    } else {
        format!("DELETE FROM {} WHERE \"id\" = $1", table)
    };
    SqlResult { query, params: vec![SqlParam::from(id)] }
}

pub fn bind_query_as<'q, T>(
    mut q: QueryAs<'q, Postgres, T, PgArguments>,
    params: &[SqlParam],
) -> QueryAs<'q, Postgres, T, PgArguments> {
    for p in params {
        q = match p.clone() {
            SqlParam::Int(v) => q.bind(v),
            SqlParam::Text(v) => q.bind(v),
            SqlParam::Bool(v) => q.bind(v),
        };
    }
    q
}

pub fn bind_query<'q>(
    mut q: Query<'q, Postgres, PgArguments>,
    params: &[SqlParam],
) -> Query<'q, Postgres, PgArguments> {
    for p in params {
        q = match p.clone() {
            SqlParam::Int(v) => q.bind(v),
            SqlParam::Text(v) => q.bind(v),
            SqlParam::Bool(v) => q.bind(v),
        };
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{SortDirection, StatusKind};

    static ROLES: Schema = Schema {
        table: "roles",
        list_name: "roles",
        singular: "role",
        columns: &["id", "name", "status"],
        search_column: "name",
        case_sensitive_search: false,
        status_column: "status",
        status_kind: StatusKind::Boolean,
        default_order: ("id", SortDirection::Desc),
        fixed_filters: &[],
        soft_delete: false,
        extra_cache_patterns: &[],
    };

    static USERS: Schema = Schema {
        table: "users",
        list_name: "users",
        singular: "user",
        columns: &["id", "name"],
        search_column: "name",
        case_sensitive_search: false,
        status_column: "status",
        status_kind: StatusKind::Boolean,
        default_order: ("id", SortDirection::Desc),
        fixed_filters: &[],
        soft_delete: true,
        extra_cache_patterns: &[],
    };

    #[test]
    fn insert_binds_values_and_stamps_times() {
        let sql = insert_sql(&ROLES, vec![("name", SqlParam::from("Editor")), ("status", SqlParam::from(true))]);
        assert_eq!(
            sql.query,
            "INSERT INTO \"roles\" (\"name\", \"status\", \"created_at\", \"updated_at\") VALUES ($1, $2, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP) RETURNING \"id\", \"name\", \"status\""
        );
        assert_eq!(sql.params.len(), 2);
    }

    #[test]
    fn update_puts_id_last() {
        let sql = update_sql(&ROLES, 7, vec![("name", SqlParam::from("Admin"))]);
        assert_eq!(
            sql.query,
            "UPDATE \"roles\" SET \"name\" = $1, \"updated_at\" = CURRENT_TIMESTAMP WHERE \"id\" = $2 RETURNING \"id\", \"name\", \"status\""
        );
        assert_eq!(sql.params, vec![SqlParam::from("Admin"), SqlParam::from(7i64)]);
    }

    #[test]
    fn soft_deleted_rows_are_not_updated_or_found() {
        let sql = update_sql(&USERS, 1, vec![]);
        assert!(sql.query.contains("WHERE \"id\" = $1 AND \"deleted_at\" IS NULL RETURNING"));
        assert!(find_sql(&USERS, 1).query.ends_with("AND \"deleted_at\" IS NULL"));
        assert!(!find_sql(&ROLES, 1).query.contains("deleted_at"));
    }

    #[test]
    fn delete_mode_follows_schema() {
        assert_eq!(delete_sql(&ROLES, 3).query, "DELETE FROM \"roles\" WHERE \"id\" = $1");
        assert!(delete_sql(&USERS, 3).query.starts_with("UPDATE \"users\" SET \"deleted_at\""));
    }
}
