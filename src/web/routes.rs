use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::application::{IdentityService, LedgerService};
use crate::web::handlers::*;

pub fn identity_router(service: Arc<IdentityService>) -> Router {
    Router::new()
        .route("/api/auth/signup", post(sign_up))
        .route("/api/auth/signin", post(sign_in))
        .route("/api/users/{user_id}", get(get_user))
        .route("/api/users/confirm-email/{user_id}", post(confirm_email))
        .route("/health", get(health_check))
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub fn ledger_router(service: Arc<LedgerService>) -> Router {
    Router::new()
        .route("/api/accounts/{user_id}", get(get_account))
        .route("/api/accounts/{user_id}/deposit", post(deposit))
        .route("/api/accounts/{user_id}/withdraw", post(withdraw))
        .route("/health", get(health_check))
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
