use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::date_range::NOTICE_DATE_FORMAT;
use crate::job_scheduler::JobScheduler;
use crate::matcher::find_fully_available_sites;
use crate::notification_service::NotificationSender;
use crate::rec_gov_client::AvailabilitySource;
use crate::scan_types::*;

/// Runs one availability check per inbound request.
///
/// Holds no per-request state, so a single dispatcher can serve concurrent
/// requests.
pub struct CheckDispatcher {
    availability_source: Arc<dyn AvailabilitySource>,
    notifier: Arc<dyn NotificationSender>,
    scheduler: Arc<dyn JobScheduler>,
}

impl CheckDispatcher {
    /// Create a dispatcher over its collaborators
    pub fn new(
        availability_source: Arc<dyn AvailabilitySource>,
        notifier: Arc<dyn NotificationSender>,
        scheduler: Arc<dyn JobScheduler>,
    ) -> Self {
        Self {
            availability_source,
            notifier,
            scheduler,
        }
    }

    /// Decode a check request payload and run the check once.
    ///
    /// On a match the requester is notified and then the recurring job is
    /// cancelled. If notification fails the job is left scheduled.
    pub async fn handle_check_request(&self, payload: &[u8]) -> Result<CheckOutcome, CheckError> {
        let request = CheckRequest::from_payload(payload).inspect_err(|e| {
            warn!("Rejecting check request: {}", e);
        })?;
        let stay = request.stay().inspect_err(|e| {
            warn!("Rejecting check request from {}: {}", request.name, e);
        })?;

        // A departure on or before arrival gives no nights, and the matcher treats
        // an empty night list as matching nothing, so such a request ends as
        // NoMatchFound instead of reporting every site.
        let nights = stay.nights();
        if nights.is_empty() {
            warn!(
                "Stay {} to {} for {} has no nights",
                stay.arrival, stay.departure, request.name
            );
        }

        let month_start = stay.month_anchor();

        info!(
            "Checking campground {} for {} ({} nights from {})",
            request.campground,
            request.name,
            nights.len(),
            stay.arrival
        );

        let availability = self
            .availability_source
            .fetch_month(&request.campground, month_start)
            .await
            .inspect_err(|e| {
                error!(
                    "Failed to fetch availability for campground {}: {}",
                    request.campground, e
                );
            })?;

        debug!(
            "Fetched {} campsites for campground {}",
            availability.len(),
            request.campground
        );

        let sites = find_fully_available_sites(&availability, &nights);

        if sites.is_empty() {
            debug!("No available sites for {}", request.campground);
            return Ok(CheckOutcome::NoMatchFound);
        }

        info!(
            "Found {} available sites in {}",
            sites.len(),
            request.campground
        );

        let notice = AvailabilityNotice {
            campground_id: request.campground.clone(),
            sites: sites.clone(),
            arrival: stay.arrival.format(NOTICE_DATE_FORMAT).to_string(),
            departure: stay.departure.format(NOTICE_DATE_FORMAT).to_string(),
        };

        self.notifier
            .send_availability_notification(&notice)
            .await
            .inspect_err(|e| {
                error!(
                    "Failed to send notification for {}: {}",
                    request.campground, e
                );
            })?;

        let job = request.job_name();
        if let Err(source) = self.scheduler.delete_job(job).await {
            error!("Notification sent but job {} was not cancelled: {}", job, source);
            return Err(CheckError::Cancellation {
                job: job.to_string(),
                source,
            });
        }

        info!("Cancelled recurring check {}", job);
        Ok(CheckOutcome::Notified { sites })
    }

    /// List scheduled recurring checks, for diagnostics
    pub async fn list_scheduled_jobs(&self) -> Result<Vec<ScheduledJob>, SchedulerError> {
        self.scheduler.list_jobs().await
    }

    /// Log the scheduled recurring checks
    pub async fn log_scheduled_jobs(&self) -> Result<usize, SchedulerError> {
        let jobs = self.list_scheduled_jobs().await?;
        for job in &jobs {
            debug!(
                "Scheduled job {} ({})",
                job.name,
                job.schedule.as_deref().unwrap_or("no schedule")
            );
        }
        info!("{} recurring checks scheduled", jobs.len());
        Ok(jobs.len())
    }
}
