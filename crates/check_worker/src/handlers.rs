use actix_web::{HttpResponse, Result, web};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use campground_scan::{CheckDispatcher, CheckError, SchedulerError};
use serde::Deserialize;

/// Push delivery wrapper around a check request
#[derive(Debug, Deserialize)]
pub struct PushEnvelope {
    /// The delivered message
    pub message: PushMessage,
    /// Subscription the message came through
    #[serde(default)]
    pub subscription: Option<String>,
}

/// Message inside a push envelope
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    /// Base64-encoded check request payload
    #[serde(default)]
    pub data: String,
    /// Broker-assigned message id
    #[serde(default)]
    pub message_id: Option<String>,
}

impl PushEnvelope {
    /// Parse an envelope from a request body
    pub fn from_body(body: &[u8]) -> Result<Self, CheckError> {
        serde_json::from_slice(body).map_err(|e| {
            CheckError::MalformedRequest(format!("Failed to decode push envelope: {}", e))
        })
    }

    /// Decode the base64 message data into the raw check request payload
    pub fn payload(&self) -> Result<Vec<u8>, CheckError> {
        STANDARD.decode(self.message.data.trim()).map_err(|e| {
            CheckError::MalformedRequest(format!("Failed to decode message data: {}", e))
        })
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

/// Handler for a raw check request payload
pub async fn check(
    dispatcher: web::Data<CheckDispatcher>,
    body: web::Bytes,
) -> Result<HttpResponse, CheckError> {
    let outcome = dispatcher.handle_check_request(&body).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Handler for a check request delivered as a Pub/Sub push message
pub async fn pubsub_push(
    dispatcher: web::Data<CheckDispatcher>,
    body: web::Bytes,
) -> Result<HttpResponse, CheckError> {
    let envelope = PushEnvelope::from_body(&body)?;

    log::info!(
        "📨 Push message {} from {}",
        envelope.message.message_id.as_deref().unwrap_or("<no id>"),
        envelope.subscription.as_deref().unwrap_or("<no subscription>")
    );

    let payload = envelope.payload()?;
    let outcome = dispatcher.handle_check_request(&payload).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Handler listing scheduled recurring checks
pub async fn list_jobs(
    dispatcher: web::Data<CheckDispatcher>,
) -> Result<HttpResponse, SchedulerError> {
    let jobs = dispatcher.list_scheduled_jobs().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "jobs": jobs,
        "total": jobs.len()
    })))
}

/// Register the worker routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/check", web::post().to(check))
        .route("/pubsub/push", web::post().to(pubsub_push))
        .route("/jobs", web::get().to(list_jobs));
}
