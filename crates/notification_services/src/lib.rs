//! # Notification Services
//!
//! This crate delivers campsite availability notifications through AWS.
//! Email goes out through SES and topic messages are published through SNS.

/// AWS-backed notification client.
pub mod service;
/// Error types for notification delivery.
pub mod types;

pub use service::{NotificationService, validate_email_address};
pub use types::NotificationError;
