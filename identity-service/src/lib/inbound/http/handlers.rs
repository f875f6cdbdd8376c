use auth::AuthenticatorError;
use auth::Role;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::credential::errors::AuthError;
use crate::credential::errors::UsernameError;
use crate::credential::models::AuthOutcome;
use crate::credential::models::IdentitySummary;
use crate::credential::models::ReasonCode;

pub mod change_initial_password;
pub mod change_password;
pub mod current_identity;
pub mod login;

/// Response with an explicit status code and the standard envelope.
#[derive(Debug, Clone)]
pub struct ApiResponse<T: Serialize>(StatusCode, Json<ApiResponseBody<T>>);

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiResponse(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

impl From<AuthOutcome> for ApiResponse<OutcomeData> {
    fn from(outcome: AuthOutcome) -> Self {
        ApiResponse::new(status_for(outcome.reason), outcome.into())
    }
}

/// HTTP status for an outcome reason.
pub fn status_for(reason: ReasonCode) -> StatusCode {
    match reason {
        ReasonCode::LoggedIn | ReasonCode::PasswordChanged | ReasonCode::AccountProvisioned => {
            StatusCode::OK
        }
        ReasonCode::UnknownUser
        | ReasonCode::BadPassword
        | ReasonCode::BadOldPassword
        | ReasonCode::MissingToken
        | ReasonCode::InvalidToken
        | ReasonCode::TokenExpired => StatusCode::UNAUTHORIZED,
        ReasonCode::WeakPassword => StatusCode::UNPROCESSABLE_ENTITY,
        ReasonCode::UsernameTaken => StatusCode::CONFLICT,
        ReasonCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Rejected(ReasonCode, String),
    BadRequest(String),
    Conflict(String),
    ServiceUnavailable(String),
    InternalServerError(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, reason, message) = match self {
            ApiError::Rejected(reason, msg) => (status_for(reason), reason.as_str(), msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONCURRENT_UPDATE", msg),
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ReasonCode::StoreUnavailable.as_str(),
                msg,
            ),
            ApiError::InternalServerError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
        };

        (
            status,
            Json(ApiResponseBody::new(
                status,
                OutcomeData::failure(reason, message),
            )),
        )
            .into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if let Some(reason) = err.rejection_reason() {
            return ApiError::Rejected(reason, err.to_string());
        }

        match err {
            AuthError::InvalidUsername(_) => ApiError::BadRequest(err.to_string()),
            AuthError::StaleCredential(_) => ApiError::Conflict(err.to_string()),
            AuthError::StoreUnavailable(_) => ApiError::ServiceUnavailable(err.to_string()),
            _ => ApiError::InternalServerError(err.to_string()),
        }
    }
}

impl From<AuthenticatorError> for ApiError {
    fn from(err: AuthenticatorError) -> Self {
        ApiError::Rejected(ReasonCode::from(&err), err.to_string())
    }
}

impl From<UsernameError> for ApiError {
    fn from(err: UsernameError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize> {
    status_code: u16,
    data: T,
}

impl<T: Serialize> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

/// Serialized form of an operation outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeData {
    pub succeeded: bool,
    pub reason: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityData>,
}

impl OutcomeData {
    fn failure(reason: &'static str, message: String) -> Self {
        Self {
            succeeded: false,
            reason,
            message,
            token: None,
            identity: None,
        }
    }
}

impl From<AuthOutcome> for OutcomeData {
    fn from(outcome: AuthOutcome) -> Self {
        Self {
            succeeded: outcome.succeeded,
            reason: outcome.reason.as_str(),
            message: outcome.message,
            token: outcome.token,
            identity: outcome.identity.as_ref().map(IdentityData::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityData {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub full_name: String,
    pub first_login_pending: bool,
}

impl From<&IdentitySummary> for IdentityData {
    fn from(identity: &IdentitySummary) -> Self {
        Self {
            user_id: identity.user_id.0,
            username: identity.username.clone(),
            role: identity.role,
            full_name: identity.full_name.clone(),
            first_login_pending: identity.first_login_pending,
        }
    }
}
