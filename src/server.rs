use std::net::SocketAddr;

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::database::models::{Categories, Departments, Designations, NewsArticles, Roles, Users};
use crate::database::Entity;
use crate::handlers::{protected, public, system};
use crate::middleware::{jwt_auth_middleware, rate_limit_middleware};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(system::root))
        .merge(public_routes())
        .merge(protected_routes(&state))
        .nest_service("/uploads", ServeDir::new(&state.config.server.storage_dir))
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware))
        // registered after the limiter so probes are never throttled
        .route("/health", get(system::health))
        .layer(cors_layer(&state.config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/public/v1/categories", get(protected::entity_list::<Categories>))
        .route("/api/public/v1/news", get(protected::entity_list::<NewsArticles>))
        .route("/api/public/v1/breaking-scrolling-news", get(public::breaking_scrolling))
        .route("/api/public/v1/breaking-thumbnail-news", get(public::breaking_thumbnail))
        .route("/api/public/v1/auth/sign-in", post(public::sign_in))
        .route("/api/public/v1/auth/refresh-token", post(public::refresh_token))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(entity_routes::<Categories>())
        .merge(entity_routes::<Departments>())
        .merge(entity_routes::<Designations>())
        .merge(entity_routes::<Roles>())
        .merge(entity_routes::<Users>())
        .merge(entity_routes::<NewsArticles>())
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

/// `/api/v1/<list_name>` and `/api/v1/<list_name>/:id`
fn entity_routes<E: Entity>() -> Router<AppState> {
    let collection = format!("/api/v1/{}", E::schema().list_name);
    let member = format!("{}/:id", collection);

    Router::new()
        .route(&collection, get(protected::entity_list::<E>).post(protected::entity_create::<E>))
        .route(
            &member,
            get(protected::entity_show::<E>)
                .put(protected::entity_update::<E>)
                .delete(protected::entity_delete::<E>),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Binds `0.0.0.0:port`, then each of the next `attempts` ports in order
pub async fn bind_with_fallback(port: u16, attempts: u16) -> std::io::Result<TcpListener> {
    let mut last_error = None;

    for offset in 0..=attempts {
        let Some(candidate) = port.checked_add(offset) else {
            break;
        };
        match TcpListener::bind(("0.0.0.0", candidate)).await {
            Ok(listener) => {
                if offset > 0 {
                    warn!("port {} unavailable, using {}", port, candidate);
                }
                return Ok(listener);
            }
            Err(e) => {
                warn!("failed to bind port {}: {}", candidate, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::AddrInUse, "no port available")))
}

pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("newsdesk API listening on http://{}", addr);
    }

    axum::serve(listener, app(state).into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn falls_back_to_the_next_free_port() {
        let taken = TcpListener::bind(("0.0.0.0", 0)).await.unwrap();
        let port = taken.local_addr().unwrap().port();

        match bind_with_fallback(port, 10).await {
            Ok(listener) => assert_ne!(listener.local_addr().unwrap().port(), port),
            // every neighbouring port may be taken on a busy host
            Err(e) => assert_eq!(e.kind(), std::io::ErrorKind::AddrInUse),
        }
    }
}
