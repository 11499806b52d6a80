use serde::{Deserialize, Serialize};

/// Recognized list query parameters. Everything arrives as text so that a
/// non-numeric `page` behaves like an absent one instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
}

impl ListParams {
    pub fn search_term(&self) -> Option<&str> {
        non_empty(self.search.as_deref())
    }

    pub fn status_value(&self) -> Option<&str> {
        non_empty(self.status.as_deref())
    }

    pub fn sort_value(&self) -> Option<&str> {
        non_empty(self.sort.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// How an entity's status column is typed, which decides how `?status=` parses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Integer,
    Boolean,
}

/// Predicates that are always AND-ed into an entity's list query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedFilter {
    IsTrue(&'static str),
    IsNull(&'static str),
    Equals(&'static str, i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: &'static str,
    pub sort: SortDirection,
}

/// A value bound to a positional placeholder. The variants carry their SQL
/// type so a NULL still binds as the column's type.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(Option<i64>),
    Text(Option<String>),
    Bool(Option<bool>),
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Int(Some(v))
    }
}

impl From<Option<i64>> for SqlParam {
    fn from(v: Option<i64>) -> Self {
        SqlParam::Int(v)
    }
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self {
        SqlParam::Int(Some(v as i64))
    }
}

impl From<bool> for SqlParam {
    fn from(v: bool) -> Self {
        SqlParam::Bool(Some(v))
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(Some(v))
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(Some(v.to_string()))
    }
}

impl From<Option<String>> for SqlParam {
    fn from(v: Option<String>) -> Self {
        SqlParam::Text(v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

/// Double-quote an identifier; names come from static schemas, never requests.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
