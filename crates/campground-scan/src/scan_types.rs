use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::date_range::{Stay, parse_request_date, REQUEST_DATE_FORMAT};

/// Status label the provider uses for a bookable site/night
pub const AVAILABLE_STATUS: &str = "Available";

/// Check request decoded from an inbound event payload
///
/// Field names are accepted in lowercase and in the capitalised form used by the
/// scheduler message bodies (`Name`, `Campground`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CheckRequest {
    /// Requester name, also the recurring job name unless `job` is set
    #[serde(alias = "Name")]
    #[validate(
        length(min = 1, message = "Requester name is required"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    /// ID of the campground to check
    #[serde(alias = "Campground")]
    #[validate(
        length(min = 1, message = "Campground ID is required"),
        custom(function = "validate_not_blank")
    )]
    pub campground: String,

    /// Arrival date in `YYYY-M-D` form
    #[serde(alias = "Arrival")]
    pub arrival: String,

    /// Departure date in `YYYY-M-D` form
    #[serde(alias = "Departure")]
    pub departure: String,

    /// Explicit recurring job name
    #[serde(default, alias = "Job", skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
}

impl CheckRequest {
    /// Build a request for a stay, formatting dates the way `stay()` parses them
    pub fn for_stay(name: &str, campground: &str, stay: &Stay) -> Self {
        Self {
            name: name.to_string(),
            campground: campground.to_string(),
            arrival: stay.arrival.format(REQUEST_DATE_FORMAT).to_string(),
            departure: stay.departure.format(REQUEST_DATE_FORMAT).to_string(),
            job: None,
        }
    }

    /// Decode and validate a request payload
    pub fn from_payload(payload: &[u8]) -> Result<Self, CheckError> {
        let request: Self = serde_json::from_slice(payload).map_err(|e| {
            CheckError::MalformedRequest(format!("Failed to decode check request: {}", e))
        })?;

        request
            .validate()
            .map_err(|e| CheckError::MalformedRequest(e.to_string()))?;

        Ok(request)
    }

    /// Encode the request as an event payload
    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parse the arrival/departure strings into a stay
    pub fn stay(&self) -> Result<Stay, CheckError> {
        let arrival = parse_request_date("arrival", &self.arrival)?;
        let departure = parse_request_date("departure", &self.departure)?;
        Ok(Stay::new(arrival, departure))
    }

    /// Name of the recurring job to cancel once sites are found
    pub fn job_name(&self) -> &str {
        match self.job.as_deref() {
            Some(job) if !job.trim().is_empty() => job,
            _ => &self.name,
        }
    }
}

fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

/// Per-night status labels for a single campsite
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteAvailability {
    /// Provider's campsite identifier
    pub site_id: String,
    /// Campsite type, e.g. "STANDARD NONELECTRIC"
    pub campsite_type: Option<String>,
    /// Loop the campsite belongs to
    pub campsite_loop: Option<String>,
    /// Status label keyed by night
    pub statuses: HashMap<NaiveDate, String>,
}

impl SiteAvailability {
    /// Create a site with no status entries
    pub fn new(site_id: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            ..Self::default()
        }
    }

    /// Record the status label for a night
    pub fn with_status(mut self, date: NaiveDate, status: impl Into<String>) -> Self {
        self.statuses.insert(date, status.into());
        self
    }

    /// Status label for a night, if the provider returned one
    pub fn status_on(&self, date: NaiveDate) -> Option<&str> {
        self.statuses.get(&date).map(String::as_str)
    }

    /// Whether the site is bookable on the given night
    pub fn is_available_on(&self, date: NaiveDate) -> bool {
        self.status_on(date) == Some(AVAILABLE_STATUS)
    }
}

/// One calendar month of availability for a campground, keyed by site id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAvailability {
    /// ID of the campground
    pub campground_id: String,
    /// Sites keyed by site id
    pub sites: HashMap<String, SiteAvailability>,
}

impl MonthlyAvailability {
    /// Create an empty month for a campground
    pub fn new(campground_id: impl Into<String>) -> Self {
        Self {
            campground_id: campground_id.into(),
            sites: HashMap::new(),
        }
    }

    /// Add or replace a site
    pub fn insert_site(&mut self, site: SiteAvailability) {
        self.sites.insert(site.site_id.clone(), site);
    }

    /// Number of sites in the month
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Whether no sites were returned
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

/// What gets sent to the requester when sites are found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityNotice {
    /// ID of the campground
    pub campground_id: String,
    /// Sites free for the whole stay
    pub sites: Vec<String>,
    /// Arrival, formatted for display
    pub arrival: String,
    /// Departure, formatted for display
    pub departure: String,
}

/// A recurring check job as reported by the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJob {
    /// Full resource name of the job
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Cron expression
    #[serde(default)]
    pub schedule: Option<String>,
    /// Job state, e.g. "ENABLED"
    #[serde(default)]
    pub state: Option<String>,
}

/// Result of a single check that did not fail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckOutcome {
    /// No site is free for every night; the recurring job stays scheduled
    NoMatchFound,
    /// The requester was notified and the recurring job cancelled
    Notified {
        /// Sites free for the whole stay
        sites: Vec<String>,
    },
}

/// Error for a single check attempt
#[derive(thiserror::Error, Debug)]
pub enum CheckError {
    /// Payload could not be decoded, a field is missing, or a date is unparseable
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Availability data could not be retrieved
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Notification could not be delivered
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    /// Notification was sent but the recurring job is still scheduled
    #[error("Failed to cancel job {job}: {source}")]
    Cancellation {
        /// Name of the job that could not be cancelled
        job: String,
        /// Scheduler failure
        #[source]
        source: SchedulerError,
    },
}

/// Error retrieving availability from the provider
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// Transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limited by external API
    #[error("Rate limited by external API")]
    RateLimited,

    /// Authentication failed with external service
    #[error("Authentication failed with external service")]
    AuthenticationFailed,

    /// Campground not found
    #[error("Campground not found")]
    NotFound,

    /// Non-success response
    #[error("API error: {0}")]
    Api(String),

    /// Response body could not be decoded
    #[error("Data format error: {0}")]
    DataFormat(String),
}

/// Error delivering a notification
#[derive(thiserror::Error, Debug)]
pub enum NotificationError {
    /// Email error
    #[error("Email error: {0}")]
    Email(String),

    /// Topic publish error
    #[error("Publish error: {0}")]
    Publish(String),

    /// Some fan-out deliveries failed
    #[error("{failed} of {total} deliveries failed: {}", .messages.join("; "))]
    Delivery {
        /// Number of failed deliveries
        failed: usize,
        /// Number of attempted deliveries
        total: usize,
        /// Failure messages
        messages: Vec<String>,
    },
}

/// Error talking to the job scheduler
#[derive(thiserror::Error, Debug)]
pub enum SchedulerError {
    /// Transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Authentication failed with scheduler
    #[error("Authentication failed with scheduler")]
    AuthenticationFailed,

    /// Job not found
    #[error("Job not found: {0}")]
    NotFound(String),

    /// Non-success response
    #[error("API error: {0}")]
    Api(String),

    /// Response body could not be decoded
    #[error("Data format error: {0}")]
    DataFormat(String),
}

impl actix_web::ResponseError for CheckError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            CheckError::MalformedRequest(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "malformed_request",
                "message": msg
            })),
            CheckError::Fetch(FetchError::RateLimited) => {
                HttpResponse::TooManyRequests().json(serde_json::json!({
                    "error": "rate_limited",
                    "message": "Rate limited by external service. Please try again later."
                }))
            }
            CheckError::Fetch(e) => HttpResponse::BadGateway().json(serde_json::json!({
                "error": "fetch_error",
                "message": e.to_string()
            })),
            CheckError::Notification(e) => HttpResponse::BadGateway().json(serde_json::json!({
                "error": "notification_error",
                "message": e.to_string()
            })),
            CheckError::Cancellation { .. } => HttpResponse::BadGateway().json(serde_json::json!({
                "error": "cancellation_error",
                "message": self.to_string()
            })),
        }
    }
}

impl actix_web::ResponseError for SchedulerError {
    fn error_response(&self) -> actix_web::HttpResponse {
        actix_web::HttpResponse::BadGateway().json(serde_json::json!({
            "error": "scheduler_error",
            "message": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_decode_lowercase_payload() {
        let payload = br#"{"name":"alice","campground":"232447","arrival":"2024-3-5","departure":"2024-3-8"}"#;
        let request = CheckRequest::from_payload(payload).unwrap();

        assert_eq!(request.name, "alice");
        assert_eq!(request.campground, "232447");
        assert_eq!(request.job_name(), "alice");
        assert_eq!(
            request.stay().unwrap(),
            Stay::new(date(2024, 3, 5), date(2024, 3, 8))
        );
    }

    #[test]
    fn test_decode_capitalised_payload() {
        let payload = br#"{"Name":"bob","Campground":"232447","Arrival":"2024-10-1","Departure":"2024-10-3","Job":"bob-weekly"}"#;
        let request = CheckRequest::from_payload(payload).unwrap();

        assert_eq!(request.name, "bob");
        assert_eq!(request.job_name(), "bob-weekly");
    }

    #[test]
    fn test_empty_name_is_malformed() {
        let payload = br#"{"name":"","campground":"232447","arrival":"2024-3-5","departure":"2024-3-8"}"#;
        let err = CheckRequest::from_payload(payload).unwrap_err();
        assert!(matches!(err, CheckError::MalformedRequest(_)));
    }

    #[test]
    fn test_blank_fields_are_malformed() {
        let blank_name =
            br#"{"name":"   ","campground":"232447","arrival":"2024-3-5","departure":"2024-3-8"}"#;
        let blank_campground =
            br#"{"name":"alice","campground":"\t","arrival":"2024-3-5","departure":"2024-3-8"}"#;

        for payload in [&blank_name[..], &blank_campground[..]] {
            let err = CheckRequest::from_payload(payload).unwrap_err();
            assert!(matches!(err, CheckError::MalformedRequest(_)));
        }
    }

    #[test]
    fn test_blank_job_falls_back_to_name() {
        let payload = br#"{"name":"alice","campground":"232447","arrival":"2024-3-5","departure":"2024-3-8","job":"  "}"#;
        let request = CheckRequest::from_payload(payload).unwrap();
        assert_eq!(request.job_name(), "alice");
    }

    #[test]
    fn test_undecodable_payload_is_malformed() {
        let err = CheckRequest::from_payload(b"not json").unwrap_err();
        assert!(matches!(err, CheckError::MalformedRequest(_)));

        let err = CheckRequest::from_payload(br#"{"campground":"1"}"#).unwrap_err();
        assert!(matches!(err, CheckError::MalformedRequest(_)));
    }

    #[test]
    fn test_unparseable_date_is_surfaced() {
        let payload = br#"{"name":"alice","campground":"232447","arrival":"March 5","departure":"2024-3-8"}"#;
        let request = CheckRequest::from_payload(payload).unwrap();

        match request.stay() {
            Err(CheckError::MalformedRequest(msg)) => assert!(msg.contains("arrival")),
            other => panic!("expected malformed request, got {:?}", other),
        }
    }

    #[test]
    fn test_for_stay_uses_unpadded_dates() {
        let stay = Stay::new(date(2024, 3, 5), date(2024, 3, 8));
        let request = CheckRequest::for_stay("alice", "232447", &stay);

        assert_eq!(request.arrival, "2024-3-5");
        assert_eq!(request.departure, "2024-3-8");

        let decoded = CheckRequest::from_payload(&request.to_payload().unwrap()).unwrap();
        assert_eq!(decoded.stay().unwrap(), stay);
    }

    #[test]
    fn test_missing_status_is_not_available() {
        let site = SiteAvailability::new("12")
            .with_status(date(2024, 3, 5), "Available")
            .with_status(date(2024, 3, 6), "available");

        assert!(site.is_available_on(date(2024, 3, 5)));
        assert!(!site.is_available_on(date(2024, 3, 6)));
        assert!(!site.is_available_on(date(2024, 3, 7)));
    }

    #[test]
    fn test_delivery_error_message_lists_failures() {
        let err = NotificationError::Delivery {
            failed: 2,
            total: 3,
            messages: vec!["ses down".to_string(), "sns down".to_string()],
        };
        assert_eq!(err.to_string(), "2 of 3 deliveries failed: ses down; sns down");
    }
}
