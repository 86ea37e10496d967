use std::env;
use std::time::Duration;

/// Error reading configuration from the environment
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Required variable not set
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    /// Variable set to an unusable value
    #[error("Invalid value for {key}: {value}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Offending value
        value: String,
    },
}

/// How notifications leave the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationBackend {
    /// AWS SES email and SNS topic publishing
    Ses,
    /// Log notifications instead of sending them
    Log,
}

/// Configuration for the check worker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Base URL of the recreation.gov API (default: https://www.recreation.gov/api)
    pub rec_gov_base_url: String,

    /// Timeout for outbound HTTP calls (default: 30 seconds)
    pub request_timeout: Duration,

    /// Base URL of the Cloud Scheduler API
    pub scheduler_base_url: String,

    /// Project owning the recurring check jobs
    pub scheduler_project_id: String,

    /// Location of the recurring check jobs (default: us-west2)
    pub scheduler_location: String,

    /// Bearer token passed to the scheduler, if any
    pub scheduler_access_token: Option<String>,

    /// Sender address for notification email
    pub from_email: String,

    /// Recipient of notification email
    pub notify_email: String,

    /// SNS topic that also receives availability messages
    pub topic_arn: Option<String>,

    /// Notification delivery backend (default: SES)
    pub notification_backend: NotificationBackend,

    /// Address the worker listens on (default: 0.0.0.0:8080)
    pub bind_address: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            rec_gov_base_url: "https://www.recreation.gov/api".to_string(),
            request_timeout: Duration::from_secs(30),
            scheduler_base_url: "https://cloudscheduler.googleapis.com/v1".to_string(),
            scheduler_project_id: String::new(),
            scheduler_location: "us-west2".to_string(),
            scheduler_access_token: None,
            from_email: String::new(),
            notify_email: String::new(),
            topic_arn: None,
            notification_backend: NotificationBackend::Ses,
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

impl CheckerConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through `lookup`, treating empty values as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let request_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid {
                    key: "HTTP_TIMEOUT_SECS",
                    value,
                })?,
            None => defaults.request_timeout,
        };

        let notification_backend = match get("NOTIFICATION_BACKEND").as_deref() {
            None | Some("ses") => NotificationBackend::Ses,
            Some("log") => NotificationBackend::Log,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "NOTIFICATION_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        let from_email = match (get("FROM_EMAIL"), notification_backend) {
            (Some(email), _) => email,
            (None, NotificationBackend::Ses) => return Err(ConfigError::Missing("FROM_EMAIL")),
            (None, NotificationBackend::Log) => "noreply@localhost".to_string(),
        };

        Ok(Self {
            rec_gov_base_url: get("RECREATION_GOV_BASE_URL").unwrap_or(defaults.rec_gov_base_url),
            request_timeout,
            scheduler_base_url: get("SCHEDULER_BASE_URL").unwrap_or(defaults.scheduler_base_url),
            scheduler_project_id: get("SCHEDULER_PROJECT_ID")
                .ok_or(ConfigError::Missing("SCHEDULER_PROJECT_ID"))?,
            scheduler_location: get("SCHEDULER_LOCATION").unwrap_or(defaults.scheduler_location),
            scheduler_access_token: get("SCHEDULER_ACCESS_TOKEN"),
            from_email,
            notify_email: get("NOTIFY_EMAIL").ok_or(ConfigError::Missing("NOTIFY_EMAIL"))?,
            topic_arn: get("AVAILABILITY_TOPIC_ARN"),
            notification_backend,
            bind_address: get("BIND_ADDRESS").unwrap_or(defaults.bind_address),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<CheckerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CheckerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_required_values() {
        let config = load(&[
            ("SCHEDULER_PROJECT_ID", "camp-finder"),
            ("NOTIFY_EMAIL", "camper@example.com"),
            ("FROM_EMAIL", "checker@example.com"),
        ])
        .unwrap();

        assert_eq!(config.rec_gov_base_url, "https://www.recreation.gov/api");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.scheduler_location, "us-west2");
        assert_eq!(config.notification_backend, NotificationBackend::Ses);
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert!(config.topic_arn.is_none());
    }

    #[test]
    fn test_missing_required_values() {
        assert_eq!(
            load(&[("NOTIFY_EMAIL", "camper@example.com"), ("FROM_EMAIL", "a@b.co")]).unwrap_err(),
            ConfigError::Missing("SCHEDULER_PROJECT_ID")
        );
        assert_eq!(
            load(&[("SCHEDULER_PROJECT_ID", "p"), ("FROM_EMAIL", "a@b.co")]).unwrap_err(),
            ConfigError::Missing("NOTIFY_EMAIL")
        );
        assert_eq!(
            load(&[("SCHEDULER_PROJECT_ID", "p"), ("NOTIFY_EMAIL", "camper@example.com")])
                .unwrap_err(),
            ConfigError::Missing("FROM_EMAIL")
        );
    }

    #[test]
    fn test_log_backend_does_not_need_sender() {
        let config = load(&[
            ("SCHEDULER_PROJECT_ID", "p"),
            ("NOTIFY_EMAIL", "camper@example.com"),
            ("NOTIFICATION_BACKEND", "log"),
            ("HTTP_TIMEOUT_SECS", "5"),
            ("SCHEDULER_ACCESS_TOKEN", ""),
        ])
        .unwrap();

        assert_eq!(config.notification_backend, NotificationBackend::Log);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(config.scheduler_access_token.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let base = [("SCHEDULER_PROJECT_ID", "p"), ("NOTIFY_EMAIL", "c@example.com")];

        let mut vars = base.to_vec();
        vars.push(("NOTIFICATION_BACKEND", "pigeon"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { key: "NOTIFICATION_BACKEND", .. })
        ));

        let mut vars = base.to_vec();
        vars.extend([("NOTIFICATION_BACKEND", "log"), ("HTTP_TIMEOUT_SECS", "0")]);
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { key: "HTTP_TIMEOUT_SECS", .. })
        ));
    }
}
