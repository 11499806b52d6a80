// handlers/public/mod.rs - endpoints reachable without a token

pub mod auth;
pub mod feeds;

pub use auth::{refresh_token, sign_in};
pub use feeds::{breaking_scrolling, breaking_thumbnail};
