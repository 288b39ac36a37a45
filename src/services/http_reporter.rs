//! HTTP delivery of completed runs.
//!
//! [`HttpReporter::report`] is called from the event loop and must not
//! block, so it serializes the run, spawns the POST on the current tokio
//! runtime, and returns. Delivery failures are only logged.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tokio::runtime::Handle;

use crate::config::ApiConfig;
use crate::report::SlideRunReport;
use crate::run::CompletedRun;
use crate::traits::RunReporter;

/// Errors from reporting a run.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Connection, timeout, or other transport failure.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a non-2xx status.
    #[error("server responded with status {0}")]
    Status(u16),
    /// The report could not be encoded as JSON.
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
    /// `report` was called outside a tokio runtime.
    #[error("no async runtime available to deliver the report")]
    NoRuntime,
}

/// POSTs each completed run as JSON to the configured API.
///
/// # Example
///
/// ```rust
/// use slide_timer::config::ApiConfig;
/// use slide_timer::services::HttpReporter;
///
/// let reporter = HttpReporter::new(&ApiConfig::default().with_host("localhost")).unwrap();
/// assert_eq!(reporter.url(), "http://localhost:8081/slideruns");
/// ```
#[derive(Clone, Debug)]
pub struct HttpReporter {
    client: reqwest::Client,
    url: String,
    enabled: bool,
}

impl HttpReporter {
    /// Builds a reporter with the configured target and timeout.
    pub fn new(config: &ApiConfig) -> Result<Self, ReportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(u64::from(config.timeout_ms)))
            .build()?;
        Ok(Self {
            client,
            url: config.url().as_str().into(),
            enabled: config.enabled,
        })
    }

    /// URL runs are POSTed to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// POSTs one report and waits for the response.
    pub async fn post(&self, report: &SlideRunReport) -> Result<(), ReportError> {
        deliver(&self.client, &self.url, report).await
    }
}

async fn deliver(
    client: &reqwest::Client,
    url: &str,
    report: &SlideRunReport,
) -> Result<(), ReportError> {
    let body = serde_json::to_string(report)?;
    let response = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, "text/plain")
        .body(body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ReportError::Status(status.as_u16()));
    }
    Ok(())
}

impl RunReporter for HttpReporter {
    type Error = ReportError;

    fn report(&mut self, run: &CompletedRun) -> Result<(), Self::Error> {
        if !self.enabled {
            log::debug!("reporting disabled, dropping run");
            return Ok(());
        }
        let runtime = Handle::try_current().map_err(|_| ReportError::NoRuntime)?;

        let report = SlideRunReport::from(run);
        let client = self.client.clone();
        let url = self.url.clone();
        runtime.spawn(async move {
            match deliver(&client, &url, &report).await {
                Ok(()) => log::info!("reported run for rider {}", report.keyfob_num),
                Err(e) => log::warn!("failed to report run to {}: {}", url, e),
            }
        });
        Ok(())
    }
}
