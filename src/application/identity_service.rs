use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::errors::ServiceError;
use crate::application::publishers::IdentityEventPublisher;
use crate::domain::{User, UserView};
use crate::infrastructure::auth::{self, AuthConfig};
use crate::infrastructure::cache::{user_email_key, user_key};
use crate::infrastructure::{ProjectionCache, StoreError, UserStore};

/// Sign-up/sign-in result: the public projection plus a bearer token.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AuthenticatedUser {
    pub user: UserView,
    pub token: String,
}

/// Identity-service facade. Owns the `User` entity; reads go through the
/// cache-aside path, writes invalidate before returning, and event
/// publication is best-effort.
pub struct IdentityService {
    users: Arc<dyn UserStore>,
    cache: ProjectionCache,
    publisher: IdentityEventPublisher,
    auth_config: AuthConfig,
}

impl IdentityService {
    pub fn new(
        users: Arc<dyn UserStore>,
        cache: ProjectionCache,
        publisher: IdentityEventPublisher,
        auth_config: AuthConfig,
    ) -> Self {
        Self {
            users,
            cache,
            publisher,
            auth_config,
        }
    }

    pub async fn sign_up(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> Result<AuthenticatedUser, ServiceError> {
        info!("Attempting to sign up new user with email: {}", email);

        if self.users.find_by_email(&email).await?.is_some() {
            warn!("Email already in use: {}", email);
            return Err(ServiceError::EmailAlreadyInUse);
        }

        let password_hash = auth::hash_password(&password)
            .map_err(|e| ServiceError::Infrastructure(e.to_string()))?;
        let user = User::new(name, email, password_hash);

        self.users.create(&user).await.map_err(|e| match e {
            StoreError::UniqueViolation(_) => ServiceError::EmailAlreadyInUse,
            other => ServiceError::from(other),
        })?;
        info!("New user created: {}", user.id);

        let token = auth::issue_token(&self.auth_config, &user)
            .map_err(|e| ServiceError::Infrastructure(e.to_string()))?;

        self.publisher.publish_user_created(&user).await;

        Ok(AuthenticatedUser {
            user: user.to_view(),
            token,
        })
    }

    pub async fn sign_in(
        &self,
        email: String,
        password: String,
    ) -> Result<AuthenticatedUser, ServiceError> {
        info!("Attempting to sign in user with email: {}", email);

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !auth::verify_password(&password, &user.password_hash) {
            warn!("Invalid credentials for email: {}", email);
            return Err(ServiceError::InvalidCredentials);
        }

        let token = auth::issue_token(&self.auth_config, &user)
            .map_err(|e| ServiceError::Infrastructure(e.to_string()))?;

        info!("User signed in successfully: {}", user.id);
        Ok(AuthenticatedUser {
            user: user.to_view(),
            token,
        })
    }

    /// Cache-aside read by id: cache hit short-circuits, a miss falls through
    /// to the store and repopulates the cache for the TTL window.
    pub async fn get_user(&self, id: Uuid) -> Result<UserView, ServiceError> {
        let key = user_key(id);
        if let Some(view) = self.cache.get::<UserView>(&key).await {
            return Ok(view);
        }

        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::UserNotFound)?;

        let view = user.to_view();
        self.cache.set(&key, &view).await;
        Ok(view)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<UserView, ServiceError> {
        let key = user_email_key(email);
        if let Some(view) = self.cache.get::<UserView>(&key).await {
            return Ok(view);
        }

        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(ServiceError::UserNotFound)?;

        let view = user.to_view();
        self.cache.set(&key, &view).await;
        Ok(view)
    }

    pub async fn confirm_email(&self, user_id: Uuid) -> Result<UserView, ServiceError> {
        info!("Starting email confirmation for user: {}", user_id);

        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound)?;

        if user.email_confirmed {
            warn!(
                "Attempt to confirm an already confirmed email for user {}",
                user_id
            );
            return Err(ServiceError::EmailAlreadyConfirmed);
        }

        user.confirm_email();
        self.users.update(&user).await?;

        // Drop both projections before returning so no reader can observe the
        // pre-confirmation state past this point.
        self.cache.invalidate(&user_key(user.id)).await;
        self.cache.invalidate(&user_email_key(&user.email)).await;

        info!("Email confirmed for user {}", user_id);
        self.publisher.publish_email_confirmed(&user).await;

        Ok(user.to_view())
    }
}
