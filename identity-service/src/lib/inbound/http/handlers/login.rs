use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiResponse;
use super::OutcomeData;
use crate::credential::errors::UsernameError;
use crate::credential::models::LoginCommand;
use crate::credential::models::Username;
use crate::credential::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn login<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiResponse<OutcomeData>, ApiError> {
    state
        .auth_service
        .login(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(ApiResponse::from)
}

/// HTTP request body for logging in (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

impl LoginRequestBody {
    // The password is passed through verbatim; any string may be a valid password.
    fn try_into_command(self) -> Result<LoginCommand, UsernameError> {
        let username = Username::new(self.username.unwrap_or_default())?;
        let password = self.password.unwrap_or_default();
        Ok(LoginCommand { username, password })
    }
}
