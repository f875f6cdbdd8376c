use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiResponse;
use super::OutcomeData;
use crate::credential::errors::UsernameError;
use crate::credential::models::ChangeInitialPasswordCommand;
use crate::credential::models::Username;
use crate::credential::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn change_initial_password<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Json(body): Json<ChangeInitialPasswordRequestBody>,
) -> Result<ApiResponse<OutcomeData>, ApiError> {
    state
        .auth_service
        .change_initial_password(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(ApiResponse::from)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeInitialPasswordRequestBody {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    new_password: Option<String>,
}

impl ChangeInitialPasswordRequestBody {
    // A missing new password is an empty one; the password policy rejects it.
    fn try_into_command(self) -> Result<ChangeInitialPasswordCommand, UsernameError> {
        Ok(ChangeInitialPasswordCommand {
            username: Username::new(self.username.unwrap_or_default())?,
            new_password: self.new_password.unwrap_or_default(),
        })
    }
}
