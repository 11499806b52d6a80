pub mod feeds;
pub mod manager;
pub mod models;
pub mod query_builder;
pub mod repository;
pub mod schema;

pub use feeds::{Feed, FeedKind, FeedRepository};
pub use manager::{DatabaseError, DatabaseManager};
pub use repository::Repository;
pub use schema::{Entity, Schema};
