//! Entry point for the campsite check worker.
//! Receives check requests over HTTP, runs one availability check per request and
//! exposes the scheduled recurring checks for diagnostics.

use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Logger, web};
use campground_scan::{
    CheckDispatcher, CheckerConfig, CloudSchedulerClient, EmailNotifier, EmailService,
    FanOutNotifier, MessagePublisher, MockEmailService, MockPublisher, NotificationBackend,
    NotificationSender, RecGovClient, TopicNotifier,
};
use notification_services::NotificationService;

mod handlers;

async fn build_dispatcher(
    config: &CheckerConfig,
) -> Result<CheckDispatcher, Box<dyn std::error::Error>> {
    let availability_source = Arc::new(RecGovClient::new(
        &config.rec_gov_base_url,
        config.request_timeout,
    )?);

    let scheduler = Arc::new(CloudSchedulerClient::new(
        &config.scheduler_base_url,
        &config.scheduler_project_id,
        &config.scheduler_location,
        config.scheduler_access_token.clone(),
        config.request_timeout,
    )?);

    let (email_service, publisher) = match config.notification_backend {
        NotificationBackend::Ses => {
            let service = Arc::new(NotificationService::new(&config.from_email).await?);
            log::info!("📧 Notification service initialized successfully");
            let email_service: Arc<dyn EmailService> = service.clone();
            let publisher: Arc<dyn MessagePublisher> = service;
            (email_service, publisher)
        }
        NotificationBackend::Log => {
            log::warn!("🔧 Using log-only notifications");
            let email_service: Arc<dyn EmailService> = Arc::new(MockEmailService);
            let publisher: Arc<dyn MessagePublisher> = Arc::new(MockPublisher);
            (email_service, publisher)
        }
    };

    let mut senders: Vec<Arc<dyn NotificationSender>> = vec![Arc::new(EmailNotifier::new(
        email_service,
        &config.notify_email,
    ))];
    if let Some(ref topic_arn) = config.topic_arn {
        log::info!("📣 Also publishing availability to {}", topic_arn);
        senders.push(Arc::new(TopicNotifier::new(publisher, topic_arn)));
    }

    Ok(CheckDispatcher::new(
        availability_source,
        Arc::new(FanOutNotifier::new(senders)),
        scheduler,
    ))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("🚀 Starting campsite check worker...");

    let config = match CheckerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let dispatcher = match build_dispatcher(&config).await {
        Ok(dispatcher) => web::Data::new(dispatcher),
        Err(e) => {
            log::error!("❌ Failed to initialize check dispatcher: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = dispatcher.log_scheduled_jobs().await {
        log::warn!("⚠️ Could not list scheduled checks: {}", e);
    }

    log::info!("🌐 Worker will be available at: http://{}", config.bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(dispatcher.clone())
            .wrap(Logger::default())
            .configure(handlers::configure)
    })
    .bind(config.bind_address.as_str())?
    .run()
    .await
}
