//! # Campground Scan
//!
//! This crate checks a recreation.gov campground for sites that are open for every
//! night of a requested stay, notifies the requester when it finds some, and then
//! cancels the recurring check job that triggered it.

/// Types for check requests, availability data and errors
mod scan_types;
pub use scan_types::*;

/// Stay and night derivation
mod date_range;
pub use date_range::*;

/// Matching sites against the nights of a stay
mod matcher;
pub use matcher::*;

/// Client for the recreation.gov month availability endpoint
mod rec_gov_client;
pub use rec_gov_client::*;

/// Notification senders and fan-out delivery
mod notification_service;
pub use notification_service::*;

/// Email delivery backends
mod email_service;
pub use email_service::*;

/// Topic publishing backends
mod topic_service;
pub use topic_service::*;

/// Recurring check job scheduler client
mod job_scheduler;
pub use job_scheduler::*;

/// Environment configuration
mod config;
pub use config::*;

/// Per-request check orchestration
mod dispatcher;
pub use dispatcher::*;
