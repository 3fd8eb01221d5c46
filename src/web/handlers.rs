use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::application::{AuthenticatedUser, IdentityService, LedgerService, ServiceError};
use crate::domain::{AccountView, UserView};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ServiceError::Validation(_)
            | ServiceError::InvalidAmount(_)
            | ServiceError::InsufficientFunds { .. } => StatusCode::BAD_REQUEST,
            ServiceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ServiceError::UserNotFound | ServiceError::AccountNotFound => StatusCode::NOT_FOUND,
            ServiceError::EmailAlreadyInUse
            | ServiceError::AccountAlreadyExists
            | ServiceError::EmailAlreadyConfirmed => StatusCode::CONFLICT,
            ServiceError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    pub amount: Decimal,
}

fn validated<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError(ServiceError::Validation(e.to_string())))
}

pub async fn sign_up(
    State(service): State<Arc<IdentityService>>,
    Json(payload): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<AuthenticatedUser>), ApiError> {
    validated(&payload)?;
    let authenticated = service
        .sign_up(payload.name, payload.email, payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(authenticated)))
}

pub async fn sign_in(
    State(service): State<Arc<IdentityService>>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<AuthenticatedUser>, ApiError> {
    validated(&payload)?;
    let authenticated = service.sign_in(payload.email, payload.password).await?;
    Ok(Json(authenticated))
}

pub async fn get_user(
    State(service): State<Arc<IdentityService>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserView>, ApiError> {
    let user = service.get_user(user_id).await?;
    Ok(Json(user))
}

pub async fn confirm_email(
    State(service): State<Arc<IdentityService>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserView>, ApiError> {
    let user = service.confirm_email(user_id).await?;
    Ok(Json(user))
}

pub async fn get_account(
    State(service): State<Arc<LedgerService>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<AccountView>, ApiError> {
    let account = service.get_account(user_id).await?;
    Ok(Json(account))
}

pub async fn deposit(
    State(service): State<Arc<LedgerService>>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<TransactionRequest>,
) -> Result<Json<AccountView>, ApiError> {
    let account = service.deposit(user_id, payload.amount).await?;
    Ok(Json(account))
}

pub async fn withdraw(
    State(service): State<Arc<LedgerService>>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<TransactionRequest>,
) -> Result<Json<AccountView>, ApiError> {
    let account = service.withdraw(user_id, payload.amount).await?;
    Ok(Json(account))
}

pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
