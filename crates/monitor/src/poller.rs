//! Dashboard polling loop
//!
//! ## Table of Contents
//! - **DashboardSource**: Where snapshots come from (HTTP in production)
//! - **AlertSink**: User-facing notification of a failed refresh
//! - **Poller**: Fetch, apply, or log-and-alert; no retry

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::view::{DashboardSnapshot, DashboardView};

/// Provider of dashboard snapshots.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    async fn fetch(&self) -> Result<DashboardSnapshot>;
}

/// Receiver of failure notifications.
pub trait AlertSink: Send + Sync {
    fn alert(&self, message: &str);
}

/// Fetches the dashboard endpoint with `reqwest`.
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(config: &MonitorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            url: config.api_url.clone(),
        })
    }
}

#[async_trait]
impl DashboardSource for HttpSource {
    async fn fetch(&self) -> Result<DashboardSnapshot> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::Status(status.as_u16()));
        }
        Ok(response.json::<DashboardSnapshot>().await?)
    }
}

/// Writes a banner to stderr, the terminal stand-in for a blocking alert box.
pub struct StderrAlert;

impl AlertSink for StderrAlert {
    fn alert(&self, message: &str) {
        eprintln!("\n!!! Dashboard refresh failed: {message}\n");
    }
}

/// Result of a single refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Updated,
    Failed,
}

pub struct Poller<S, A> {
    source: S,
    alerts: A,
    view: DashboardView,
    interval: Duration,
    successes: u64,
    failures: u64,
}

impl<S: DashboardSource, A: AlertSink> Poller<S, A> {
    pub fn new(source: S, alerts: A, interval: Duration) -> Self {
        Self {
            source,
            alerts,
            view: DashboardView::new(),
            interval,
            successes: 0,
            failures: 0,
        }
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    pub fn successes(&self) -> u64 {
        self.successes
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// One refresh. A failure leaves the view untouched and alerts exactly once.
    pub async fn poll_once(&mut self) -> PollOutcome {
        match self.source.fetch().await {
            Ok(snapshot) => {
                self.view.apply(&snapshot);
                self.successes += 1;
                debug!(successes = self.successes, "Dashboard refreshed");
                PollOutcome::Updated
            }
            Err(e) => {
                self.failures += 1;
                error!("Error fetching dashboard data: {}", e);
                self.alerts.alert(&e.to_string());
                PollOutcome::Failed
            }
        }
    }

    /// Refresh now, then on every interval until `shutdown` resolves.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Stopping dashboard poller");
                    break;
                }
                _ = ticker.tick() => {
                    if self.poll_once().await == PollOutcome::Updated {
                        info!("{}", self.view.summary_line());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{Field, Reactor, PLACEHOLDER};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Replays queued results; an empty queue keeps failing.
    struct ScriptedSource {
        replies: Mutex<Vec<Result<DashboardSnapshot>>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        fn new(mut replies: Vec<Result<DashboardSnapshot>>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl DashboardSource for ScriptedSource {
        async fn fetch(&self) -> Result<DashboardSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(MonitorError::Status(503)))
        }
    }

    #[derive(Clone, Default)]
    struct CountingAlert(Arc<AtomicUsize>);

    impl AlertSink for CountingAlert {
        fn alert(&self, _message: &str) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn reactor(temperature: f64) -> DashboardSnapshot {
        DashboardSnapshot {
            reactor: Some(Reactor { temperature }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_success_updates_view() {
        let alerts = CountingAlert::default();
        let mut poller = Poller::new(
            ScriptedSource::new(vec![Ok(reactor(870.0))]),
            alerts.clone(),
            Duration::from_secs(30),
        );

        assert_eq!(poller.poll_once().await, PollOutcome::Updated);
        assert_eq!(poller.view().text(Field::Temperature), "870 °C");
        assert_eq!(poller.view().text(Field::Pci), PLACEHOLDER);
        assert_eq!(alerts.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_keeps_values_and_alerts_once() {
        let alerts = CountingAlert::default();
        let mut poller = Poller::new(
            ScriptedSource::new(vec![Ok(reactor(870.0)), Err(MonitorError::Status(500))]),
            alerts.clone(),
            Duration::from_secs(30),
        );

        poller.poll_once().await;
        let before = poller.view().clone();

        assert_eq!(poller.poll_once().await, PollOutcome::Failed);
        assert_eq!(poller.view(), &before);
        assert_eq!(alerts.0.load(Ordering::SeqCst), 1);

        // one alert per failed attempt, no retry in between
        assert_eq!(poller.poll_once().await, PollOutcome::Failed);
        assert_eq!(alerts.0.load(Ordering::SeqCst), 2);
        assert_eq!(poller.failures(), 2);
        assert_eq!(poller.successes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_on_interval() {
        let source = ScriptedSource::new(vec![Ok(reactor(860.0)), Ok(reactor(870.0))]);
        let calls = source.calls.clone();
        let alerts = CountingAlert::default();
        let mut poller = Poller::new(source, alerts.clone(), Duration::from_secs(30));

        // immediate poll, then t=30s and t=60s
        poller
            .run(tokio::time::sleep(Duration::from_secs(65)))
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(poller.successes(), 2);
        assert_eq!(alerts.0.load(Ordering::SeqCst), 1);
        assert_eq!(poller.view().text(Field::Temperature), "870 °C");
    }
}
