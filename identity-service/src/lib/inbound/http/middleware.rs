use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use super::handlers::ApiError;
use crate::credential::models::ReasonCode;
use crate::credential::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

/// Middleware that validates the bearer token and adds the identity to request extensions
pub async fn require_bearer<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // A header that is not valid UTF-8 is treated as absent
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let identity = state
        .token_authenticator
        .authenticate(header, Utc::now())
        .map_err(|e| {
            tracing::warn!(
                reason = %ReasonCode::from(&e),
                error = %e,
                "Bearer authentication failed"
            );
            ApiError::from(e)
        })?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
