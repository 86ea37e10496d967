/// Errors raised while delivering notifications.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// Simple email service (SES) errors.
    #[error("AWS SES error: {0}")]
    SesError(String),

    /// Simple notification service (SNS) errors.
    #[error("AWS SNS error: {0}")]
    SnsError(String),

    /// Invalid email format.
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),
}
