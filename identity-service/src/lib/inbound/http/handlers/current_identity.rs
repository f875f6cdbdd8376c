use auth::AuthenticatedIdentity;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiResponse;

pub async fn current_identity(
    Extension(identity): Extension<AuthenticatedIdentity>,
) -> ApiResponse<AuthenticatedIdentity> {
    ApiResponse::new(StatusCode::OK, identity)
}
