//! # CSR Monitor
//!
//! Terminal counterpart of the static dashboard page: polls the backend's
//! `/api/dashboard` endpoint, formats each reading with its unit and keeps
//! the syngas composition chart current.
//!
//! ## Table of Contents
//! - **config**: Environment configuration
//! - **view**: API payload, field formatting, view model
//! - **poller**: Source/alert traits and the polling loop
//! - **error**: Error types

pub mod config;
pub mod error;
pub mod poller;
pub mod view;

pub use config::MonitorConfig;
pub use error::{MonitorError, Result};
pub use poller::{AlertSink, DashboardSource, HttpSource, PollOutcome, Poller, StderrAlert};
pub use view::{format_field, DashboardSnapshot, DashboardView, Field, PieChart};
