use auth::AuthenticatedIdentity;
use axum::extract::State;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiResponse;
use super::OutcomeData;
use crate::credential::models::ChangePasswordCommand;
use crate::credential::models::Username;
use crate::credential::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

/// Change the password of the user named by the bearer token.
///
/// Missing fields count as empty passwords, so the service decides between
/// `BAD_OLD_PASSWORD` and `WEAK_PASSWORD`.
pub async fn change_password<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Extension(identity): Extension<AuthenticatedIdentity>,
    Json(body): Json<ChangePasswordRequestBody>,
) -> Result<ApiResponse<OutcomeData>, ApiError> {
    let command = ChangePasswordCommand {
        username: Username::new(identity.username)?,
        old_password: body.old_password.unwrap_or_default(),
        new_password: body.new_password.unwrap_or_default(),
    };

    state
        .auth_service
        .change_password(command)
        .await
        .map_err(ApiError::from)
        .map(ApiResponse::from)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequestBody {
    #[serde(default)]
    old_password: Option<String>,
    #[serde(default)]
    new_password: Option<String>,
}
