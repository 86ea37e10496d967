use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{error, info};

use crate::email_service::EmailService;
use crate::scan_types::{AvailabilityNotice, NotificationError};
use crate::topic_service::MessagePublisher;

/// Trait for anything that tells the requester about open sites
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Deliver the notice; returns once delivery is acknowledged
    async fn send_availability_notification(
        &self,
        notice: &AvailabilityNotice,
    ) -> Result<(), NotificationError>;
}

/// Sends the notice as an email to a fixed recipient
pub struct EmailNotifier {
    email_service: Arc<dyn EmailService>,
    recipient: String,
}

impl EmailNotifier {
    /// Create a notifier sending to `recipient`
    pub fn new(email_service: Arc<dyn EmailService>, recipient: &str) -> Self {
        Self {
            email_service,
            recipient: recipient.to_string(),
        }
    }

    /// Create email subject, HTML body and text body
    fn create_notification_content(notice: &AvailabilityNotice) -> (String, String, String) {
        let subject = format!(
            "Available sites found for {} between {} and {}",
            notice.campground_id, notice.arrival, notice.departure
        );

        let site_list = notice.sites.join(",");

        let html_body = format!(
            "<strong>Found these available sites: {}</strong>",
            site_list
        );

        let text_body = format!(
            r#"Found these available sites: {}

Campground: {}
Dates: {} to {}

Book on recreation.gov:
https://www.recreation.gov/camping/campgrounds/{}
"#,
            site_list, notice.campground_id, notice.arrival, notice.departure, notice.campground_id
        );

        (subject, html_body, text_body)
    }
}

#[async_trait]
impl NotificationSender for EmailNotifier {
    async fn send_availability_notification(
        &self,
        notice: &AvailabilityNotice,
    ) -> Result<(), NotificationError> {
        let (subject, html_body, text_body) = Self::create_notification_content(notice);

        let message_id = self
            .email_service
            .send_email(&self.recipient, &subject, &html_body, &text_body)
            .await?;

        info!(
            "Email sent to {} for campground {} ({})",
            self.recipient, notice.campground_id, message_id
        );
        Ok(())
    }
}

/// Publishes the notice to a message topic
pub struct TopicNotifier {
    publisher: Arc<dyn MessagePublisher>,
    topic: String,
}

impl TopicNotifier {
    /// Create a notifier publishing to `topic`
    pub fn new(publisher: Arc<dyn MessagePublisher>, topic: &str) -> Self {
        Self {
            publisher,
            topic: topic.to_string(),
        }
    }
}

#[async_trait]
impl NotificationSender for TopicNotifier {
    async fn send_availability_notification(
        &self,
        notice: &AvailabilityNotice,
    ) -> Result<(), NotificationError> {
        let subject = format!("Campsites available at {}", notice.campground_id);
        let message = format!("Found these {}", notice.sites.join(","));

        let message_id = self.publisher.publish(&self.topic, &subject, &message).await?;

        info!("Published availability to {} ({})", self.topic, message_id);
        Ok(())
    }
}

/// Sends through several notifiers at once and waits for every acknowledgement
pub struct FanOutNotifier {
    senders: Vec<Arc<dyn NotificationSender>>,
}

impl FanOutNotifier {
    /// Create a fan-out over `senders`
    pub fn new(senders: Vec<Arc<dyn NotificationSender>>) -> Self {
        Self { senders }
    }
}

#[async_trait]
impl NotificationSender for FanOutNotifier {
    async fn send_availability_notification(
        &self,
        notice: &AvailabilityNotice,
    ) -> Result<(), NotificationError> {
        let results = join_all(
            self.senders
                .iter()
                .map(|sender| sender.send_availability_notification(notice)),
        )
        .await;

        let total = results.len();
        let messages: Vec<String> = results
            .into_iter()
            .filter_map(Result::err)
            .map(|e| {
                error!("Notification delivery failed: {}", e);
                e.to_string()
            })
            .collect();

        if messages.is_empty() {
            Ok(())
        } else {
            Err(NotificationError::Delivery {
                failed: messages.len(),
                total,
                messages,
            })
        }
    }
}
