pub mod auth_service;
pub mod entity_service;
pub mod feed_service;

pub use auth_service::{AuthService, RefreshRequest, SignInRequest};
pub use entity_service::EntityService;
pub use feed_service::FeedService;
