use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::scan_types::{FetchError, MonthlyAvailability, SiteAvailability};

/// Source of one month of campground availability
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    /// Fetch the month starting at `month_start` for a campground
    async fn fetch_month(
        &self,
        campground_id: &str,
        month_start: NaiveDate,
    ) -> Result<MonthlyAvailability, FetchError>;
}

/// Client for recreation.gov's campground month availability endpoint
pub struct RecGovClient {
    client: Client,
    base_url: String,
}

/// Response structure from recreation.gov internal availability API
#[derive(Debug, Deserialize)]
pub struct RecGovMonthResponse {
    /// Campsites keyed by campsite id; absent means no sites
    #[serde(default)]
    pub campsites: HashMap<String, CampsiteAvailabilityData>,
}

/// Campsite availability data from internal API
#[derive(Debug, Deserialize)]
pub struct CampsiteAvailabilityData {
    /// Status label keyed by RFC 3339 timestamp, e.g. "2024-03-05T00:00:00Z"
    #[serde(default)]
    pub availabilities: HashMap<String, String>,
    /// Campsite type
    pub campsite_type: Option<String>,
    /// Loop name
    #[serde(rename = "loop")]
    pub campsite_loop: Option<String>,
}

impl RecGovClient {
    /// Create a new recreation.gov client against `base_url`, e.g. "https://www.recreation.gov/api"
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36")
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get one month of availability for a campground.
    ///
    /// `month_start` is sent as-is; callers pass the first day of the month.
    pub async fn get_month_availability(
        &self,
        campground_id: &str,
        month_start: NaiveDate,
    ) -> Result<MonthlyAvailability, FetchError> {
        let url = format!(
            "{}/camps/availability/campground/{}/month",
            self.base_url,
            urlencoding::encode(campground_id)
        );

        let start_date_param = format!("{}T00:00:00.000Z", month_start.format("%Y-%m-%d"));

        debug!("Making request to: {}?start_date={}", url, start_date_param);

        let response = self
            .client
            .get(&url)
            .query(&[("start_date", start_date_param.as_str())])
            .send()
            .await
            .map_err(|e| FetchError::Network(format!("HTTP request failed: {}", e)))?;

        debug!("API response status: {}", response.status());

        let response = check_status(response).await?;

        let month: RecGovMonthResponse = response
            .json()
            .await
            .map_err(|e| FetchError::DataFormat(format!("Failed to parse response: {}", e)))?;

        Ok(Self::to_monthly_availability(campground_id, month))
    }

    /// Convert the provider's response into per-site night statuses
    fn to_monthly_availability(
        campground_id: &str,
        month: RecGovMonthResponse,
    ) -> MonthlyAvailability {
        let mut availability = MonthlyAvailability::new(campground_id);

        for (campsite_id, data) in month.campsites {
            let mut site = SiteAvailability::new(campsite_id);
            site.campsite_type = data.campsite_type;
            site.campsite_loop = data.campsite_loop;

            for (date_str, status) in data.availabilities {
                match parse_availability_date(&date_str) {
                    Some(date) => {
                        site.statuses.insert(date, status);
                    }
                    None => warn!(
                        "Failed to parse date {} for campsite {}",
                        date_str, site.site_id
                    ),
                }
            }

            availability.insert_site(site);
        }

        debug!(
            "Parsed {} campsites for campground {}",
            availability.len(),
            campground_id
        );

        availability
    }
}

#[async_trait]
impl AvailabilitySource for RecGovClient {
    async fn fetch_month(
        &self,
        campground_id: &str,
        month_start: NaiveDate,
    ) -> Result<MonthlyAvailability, FetchError> {
        self.get_month_availability(campground_id, month_start).await
    }
}

/// Map non-success statuses to fetch errors
async fn check_status(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    warn!("API request failed with status {}: {}", status, body);

    match status.as_u16() {
        429 => Err(FetchError::RateLimited),
        401 | 403 => Err(FetchError::AuthenticationFailed),
        404 => Err(FetchError::NotFound),
        _ => Err(FetchError::Api(format!("HTTP {} - {}", status, body))),
    }
}

/// Parse the date part of a key like "2024-01-15T00:00:00Z"
fn parse_availability_date(date_str: &str) -> Option<NaiveDate> {
    let day = date_str.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
