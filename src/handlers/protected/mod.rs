// handlers/protected/mod.rs - handlers behind the JWT middleware (/api/v1/*)

pub mod crud;

pub use crud::{create as entity_create, delete as entity_delete, list as entity_list, show as entity_show, update as entity_update};
