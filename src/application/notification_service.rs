use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::application::errors::ServiceError;
use crate::domain::UserView;

/// Outbound mail port. The default implementation just logs; a real SMTP
/// sender plugs in behind the same trait.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

pub struct ConsoleMailer;

#[async_trait]
impl EmailSender for ConsoleMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        info!("Sending e-mail to: {}", to);
        info!("Subject: {}", subject);
        info!("Body: {}", body);
        Ok(())
    }
}

/// Notification-service facade: builds the message for each event kind and
/// hands it to the mail port.
pub struct NotificationService {
    sender: Arc<dyn EmailSender>,
    confirmation_base_url: String,
}

impl NotificationService {
    pub fn new(sender: Arc<dyn EmailSender>, confirmation_base_url: String) -> Self {
        Self {
            sender,
            confirmation_base_url,
        }
    }

    pub async fn send_confirmation_email(&self, user: &UserView) -> Result<(), ServiceError> {
        let (subject, body) = confirmation_email(user, &self.confirmation_base_url);
        self.sender
            .send(&user.email, &subject, &body)
            .await
            .map_err(|e| ServiceError::Infrastructure(e.to_string()))?;
        info!("Confirmation email successfully sent to {}", user.email);
        Ok(())
    }

    pub async fn send_welcome_email(&self, user: &UserView) -> Result<(), ServiceError> {
        let (subject, body) = welcome_email(user);
        self.sender
            .send(&user.email, &subject, &body)
            .await
            .map_err(|e| ServiceError::Infrastructure(e.to_string()))?;
        info!("Welcome email successfully sent to {}", user.email);
        Ok(())
    }
}

fn confirmation_email(user: &UserView, base_url: &str) -> (String, String) {
    let subject = "Confirm your e-mail".to_string();
    let confirmation_url = format!("{}/{}", base_url, user.id);
    let body = format!(
        "Hello, {}!\n\n\
         Thanks for registering. To finish setting up your account, please \
         confirm your e-mail by following the link below:\n\n\
         {}\n\n\
         If you did not request this registration, just ignore this message.",
        user.name, confirmation_url
    );
    (subject, body)
}

fn welcome_email(user: &UserView) -> (String, String) {
    let subject = "Welcome aboard".to_string();
    let body = format!(
        "Hello, {}!\n\n\
         Your account has been created and is ready to use. You can now \
         receive deposits, make withdrawals, and check your balance at any \
         time.\n\n\
         If you have any questions, contact our support team.",
        user.name
    );
    (subject, body)
}
