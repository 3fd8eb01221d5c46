use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserView;

/// Identity-service entity. Other services only ever see the [`UserView`]
/// projection carried inside events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub email_confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            email_confirmed: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn confirm_email(&mut self) {
        self.email_confirmed = true;
        self.updated_at = Utc::now();
    }

    pub fn to_view(&self) -> UserView {
        UserView {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            confirmed: self.email_confirmed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_starts_unconfirmed() {
        let user = User::new(
            "Alice".to_string(),
            "alice@example.com".to_string(),
            "$argon2$hash".to_string(),
        );
        assert!(!user.email_confirmed);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn confirm_email_sets_flag_and_touches_timestamp() {
        let mut user = User::new(
            "Alice".to_string(),
            "alice@example.com".to_string(),
            "$argon2$hash".to_string(),
        );
        user.confirm_email();
        assert!(user.email_confirmed);
        assert!(user.updated_at >= user.created_at);
    }

    #[test]
    fn view_projects_public_fields_only() {
        let user = User::new(
            "Alice".to_string(),
            "alice@example.com".to_string(),
            "$argon2$hash".to_string(),
        );
        let view = user.to_view();
        assert_eq!(view.id, user.id);
        assert_eq!(view.email, user.email);
        assert!(!view.confirmed);
    }
}
