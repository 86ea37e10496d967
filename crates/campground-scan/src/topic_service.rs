use async_trait::async_trait;
use tracing::info;

use crate::scan_types::NotificationError;

/// Trait for publish-style message delivery
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publish a message to a topic, resolving once the broker acknowledges it
    async fn publish(
        &self,
        topic: &str,
        subject: &str,
        message: &str,
    ) -> Result<String, NotificationError>;
}

/// AWS SNS topic publishing through the shared notification client
#[async_trait]
impl MessagePublisher for notification_services::NotificationService {
    async fn publish(
        &self,
        topic: &str,
        subject: &str,
        message: &str,
    ) -> Result<String, NotificationError> {
        self.publish_to_topic(topic, subject, message)
            .await
            .map_err(|e| NotificationError::Publish(e.to_string()))
    }
}

/// Publisher that only logs, for development/testing
pub struct MockPublisher;

#[async_trait]
impl MessagePublisher for MockPublisher {
    async fn publish(
        &self,
        topic: &str,
        subject: &str,
        message: &str,
    ) -> Result<String, NotificationError> {
        info!("📣 [MOCK PUBLISH] Topic: {}", topic);
        info!("📣 [MOCK PUBLISH] {}: {}", subject, message);

        let mock_id = format!("mock-message-{}", uuid::Uuid::new_v4());
        Ok(mock_id)
    }
}
