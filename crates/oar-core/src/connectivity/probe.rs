//! HTTP reachability probe.

use std::time::Duration;

use tokio::sync::watch;

use super::Reachability;
use crate::error::Result;
use crate::remote::RemoteError;

const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Derives [`Reachability`] from a single HTTP request.
///
/// Any HTTP response, error statuses included, means the network path works.
/// A timeout means a link exists but traffic isn't getting through, and a
/// connection failure means there is no usable link.
#[derive(Debug, Clone)]
pub struct HttpReachabilityProbe {
    url: String,
    client: reqwest::Client,
}

impl HttpReachabilityProbe {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS))
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RemoteError::from)?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn probe(&self) -> Reachability {
        match self.client.head(&self.url).send().await {
            Ok(response) => {
                tracing::debug!(status = %response.status(), url = %self.url, "Reachability probe answered");
                Reachability::online()
            }
            Err(error) if error.is_timeout() => {
                tracing::debug!(url = %self.url, "Reachability probe timed out");
                Reachability {
                    is_connected: true,
                    is_internet_reachable: Some(false),
                }
            }
            Err(error) if error.is_connect() => {
                tracing::debug!(url = %self.url, "Reachability probe could not connect: {error}");
                Reachability::offline()
            }
            Err(error) => {
                tracing::debug!(url = %self.url, "Reachability probe failed: {error}");
                Reachability {
                    is_connected: true,
                    is_internet_reachable: Some(false),
                }
            }
        }
    }

    /// Probe every `interval` and publish changes until all receivers drop.
    pub async fn run(&self, interval: Duration, sender: watch::Sender<Reachability>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        while !sender.is_closed() {
            ticker.tick().await;
            let reachability = self.probe().await;
            sender.send_if_modified(|current| {
                let changed = *current != reachability;
                *current = reachability;
                changed
            });
        }
    }
}
