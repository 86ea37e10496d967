use crate::types::*;
use aws_config::BehaviorVersion;
use aws_sdk_ses::Client as SesClient;
use aws_sdk_sns::Client as SnsClient;
use validator::ValidateEmail;

/// Notification service for sending emails and publishing topic messages.
#[derive(Debug, Clone)]
pub struct NotificationService {
    ses_client: SesClient,
    sns_client: SnsClient,
    from_email: String,
}

impl NotificationService {
    /// Creates a new instance of the NotificationService with AWS clients initialized.
    pub async fn new(from_email: &str) -> Result<Self, NotificationError> {
        validate_email_address(from_email)?;

        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        let ses_client = SesClient::new(&config);
        let sns_client = SnsClient::new(&config);

        Ok(Self {
            ses_client,
            sns_client,
            from_email: from_email.to_string(),
        })
    }

    /// Sends an email with HTML and plain text bodies, returning the SES message id.
    pub async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> Result<String, NotificationError> {
        validate_email_address(to)?;

        let subject_content = aws_sdk_ses::types::Content::builder()
            .data(subject)
            .build()
            .map_err(|e| {
                log::error!("❌ Failed to build subject content: {}", e);
                NotificationError::SesError(format!("Failed to build subject: {}", e))
            })?;

        let html_content = aws_sdk_ses::types::Content::builder()
            .data(html_body)
            .build()
            .map_err(|e| {
                log::error!("❌ Failed to build HTML content: {}", e);
                NotificationError::SesError(format!("Failed to build HTML body: {}", e))
            })?;

        let text_content = aws_sdk_ses::types::Content::builder()
            .data(text_body)
            .build()
            .map_err(|e| {
                log::error!("❌ Failed to build text content: {}", e);
                NotificationError::SesError(format!("Failed to build text body: {}", e))
            })?;

        let body = aws_sdk_ses::types::Body::builder()
            .html(html_content)
            .text(text_content)
            .build();

        let message = aws_sdk_ses::types::Message::builder()
            .subject(subject_content)
            .body(body)
            .build();

        let destination = aws_sdk_ses::types::Destination::builder()
            .to_addresses(to)
            .build();

        log::info!("📧 Sending email to {} via AWS SES...", to);

        let result = self
            .ses_client
            .send_email()
            .source(&self.from_email)
            .destination(destination)
            .message(message)
            .send()
            .await;

        match result {
            Ok(output) => {
                let message_id = output.message_id();
                log::info!("✅ Email sent to {}, SES Message ID: {}", to, message_id);
                Ok(message_id.to_string())
            }
            Err(e) => {
                log::error!("❌ AWS SES error: {:#?}", e);
                let error_msg = if let Some(service_error) = e.as_service_error() {
                    format!("AWS SES service error: {:?}", service_error)
                } else {
                    format!("AWS SES error: {}", e)
                };
                Err(NotificationError::SesError(error_msg))
            }
        }
    }

    /// Publishes a message to an SNS topic, returning the SNS message id.
    pub async fn publish_to_topic(
        &self,
        topic_arn: &str,
        subject: &str,
        message: &str,
    ) -> Result<String, NotificationError> {
        let output = self
            .sns_client
            .publish()
            .topic_arn(topic_arn)
            .subject(subject)
            .message(message)
            .send()
            .await
            .map_err(|e| NotificationError::SnsError(e.to_string()))?;

        let message_id = output.message_id().unwrap_or_default().to_string();
        log::info!("📣 Published to {}, SNS Message ID: {}", topic_arn, message_id);

        Ok(message_id)
    }
}

/// Rejects addresses SES would bounce outright.
pub fn validate_email_address(email: &str) -> Result<(), NotificationError> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(NotificationError::InvalidEmail(email.to_string()))
    }
}
