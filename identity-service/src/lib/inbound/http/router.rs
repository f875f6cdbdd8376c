use std::sync::Arc;
use std::time::Duration;

use auth::TokenAuthenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::change_initial_password::change_initial_password;
use super::handlers::change_password::change_password;
use super::handlers::current_identity::current_identity;
use super::handlers::login::login;
use super::middleware::require_bearer;
use crate::credential::ports::AuthServicePort;

pub struct AppState<S: AuthServicePort> {
    pub auth_service: Arc<S>,
    pub token_authenticator: Arc<TokenAuthenticator>,
}

// Derived Clone would require S: Clone
impl<S: AuthServicePort> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            auth_service: Arc::clone(&self.auth_service),
            token_authenticator: Arc::clone(&self.token_authenticator),
        }
    }
}

pub fn create_router<S: AuthServicePort>(
    auth_service: Arc<S>,
    token_authenticator: Arc<TokenAuthenticator>,
) -> Router {
    let state = AppState {
        auth_service,
        token_authenticator,
    };

    let public_routes = Router::new()
        .route("/api/auth/login", post(login::<S>))
        .route(
            "/api/auth/change-initial-password",
            post(change_initial_password::<S>),
        );

    let protected_routes = Router::new()
        .route("/api/auth/change-password", post(change_password::<S>))
        .route("/api/auth/me", get(current_identity))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer::<S>,
        ));

    // Headers are left out of the span: they carry bearer tokens
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
