use async_trait::async_trait;
use tracing::info;

use crate::scan_types::NotificationError;

/// Trait for email service implementations
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Send an email, returning the provider's message id
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> Result<String, NotificationError>;
}

/// AWS SES delivery through the shared notification client
#[async_trait]
impl EmailService for notification_services::NotificationService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> Result<String, NotificationError> {
        notification_services::NotificationService::send_email(self, to, subject, html_body, text_body)
            .await
            .map_err(|e| NotificationError::Email(e.to_string()))
    }
}

/// Email service that only logs, for development/testing
pub struct MockEmailService;

#[async_trait]
impl EmailService for MockEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        _html_body: &str,
        text_body: &str,
    ) -> Result<String, NotificationError> {
        info!("📧 [MOCK EMAIL] To: {}", to);
        info!("📧 [MOCK EMAIL] Subject: {}", subject);
        info!("📧 [MOCK EMAIL] Body:\n{}", text_body);

        let mock_id = format!("mock-email-{}", uuid::Uuid::new_v4());
        Ok(mock_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_email_returns_id() {
        let id = MockEmailService
            .send_email("camper@example.com", "subject", "<b>hi</b>", "hi")
            .await
            .unwrap();
        assert!(id.starts_with("mock-email-"));
    }
}
