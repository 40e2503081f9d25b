//! Periodic self-ping keeping an idle-suspended host awake.

use std::time::Duration;

use reqwest::Client;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::config::KeepAliveConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Ping `<url>/healthcheck` forever. Failures are logged and otherwise ignored.
pub async fn run(config: KeepAliveConfig) {
    let client = match Client::builder().timeout(REQUEST_TIMEOUT).build() {
        Ok(client) => client,
        Err(err) => {
            warn!(error = %err, "failed to build keep-alive client; self-ping disabled");
            return;
        }
    };

    let target = healthcheck_url(&config.url);
    let mut ticker = interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;
    info!(
        target = %target,
        interval_secs = config.interval.as_secs(),
        "keep-alive pinger started"
    );

    loop {
        ticker.tick().await;
        match client.get(&target).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(status = %response.status(), "keep-alive ping succeeded");
            }
            Ok(response) => {
                warn!(status = %response.status(), "keep-alive ping returned an error status");
            }
            Err(err) => warn!(error = %err, "keep-alive ping failed"),
        }
    }
}

fn healthcheck_url(base: &str) -> String {
    format!("{}/healthcheck", base.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthcheck_url_tolerates_trailing_slash() {
        assert_eq!(
            healthcheck_url("https://cherryty.example/"),
            "https://cherryty.example/healthcheck"
        );
        assert_eq!(
            healthcheck_url("https://cherryty.example"),
            "https://cherryty.example/healthcheck"
        );
    }
}
