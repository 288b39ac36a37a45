//! Runtime services for the desktop/SBC build.
//!
//! - `net` feature: the event loop actor, the HTTP run reporter, and the
//!   SNTP time source
//! - `web` feature: Axum-based status and bench-injection API
//!
//! # Wiring
//!
//! The tracker lives inside one [`SlideService`] task. Everything else talks
//! to it through handles:
//!
//! ```ignore
//! let (service, sender, snapshots) = SlideService::new(tracker, Arc::clone(&wall), &config.service);
//! tokio::spawn(service.run());
//!
//! // Hardware callbacks push events
//! sender.try_send(SlideEvent::card(id))?;
//!
//! // Web API reads snapshots and injects events
//! let state = Arc::new(AppState::new(sender.clone(), snapshots, wall));
//! run_server(state, WebServerConfig::from_config(&config.web)).await?;
//! ```

pub mod actor;
pub mod api;
pub mod http_reporter;
pub mod sntp;

#[cfg(feature = "web")]
pub mod web;

// Re-exports
pub use actor::*;
pub use api::*;
pub use http_reporter::*;
pub use sntp::{SntpError, SntpTimeSource};

#[cfg(feature = "web")]
pub use web::*;
