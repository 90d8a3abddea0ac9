//! Network link probing.
//!
//! The link is considered up when a TCP connection to the ingestion host
//! can be opened within [`PROBE_TIMEOUT`]. [`run_prober`] refreshes a
//! shared [`LinkFlag`] on a fixed interval; [`wait_for_link`] blocks
//! startup until the first successful probe.

use std::time::Duration;

use motorwatch_events::LinkFlag;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

/// Upper bound on a single connect attempt.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Delay between attempts while waiting for the link at startup.
pub const STARTUP_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Try to open (and immediately drop) a TCP connection to `addr`.
pub async fn probe(addr: &str) -> bool {
    matches!(
        tokio::time::timeout(PROBE_TIMEOUT, TcpStream::connect(addr)).await,
        Ok(Ok(_))
    )
}

/// Keep `flag` in sync with the reachability of `addr` until cancelled.
///
/// Only transitions are logged at `info`/`warn`.
pub async fn run_prober(
    addr: String,
    interval: Duration,
    flag: LinkFlag,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    tracing::info!(addr = %addr, interval_secs = interval.as_secs(), "Link prober started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Link prober stopping");
                break;
            }
            _ = ticker.tick() => {
                let up = probe(&addr).await;
                let was_up = flag.set(up);
                match (was_up, up) {
                    (false, true) => tracing::info!(addr = %addr, "Network link up"),
                    (true, false) => tracing::warn!(addr = %addr, "Network link down"),
                    _ => tracing::debug!(addr = %addr, up, "Link probe"),
                }
            }
        }
    }
}

/// Block until `addr` is reachable, then mark `flag` up.
///
/// Returns `false` if cancelled first.
pub async fn wait_for_link(addr: &str, flag: &LinkFlag, cancel: &CancellationToken) -> bool {
    tracing::info!(addr = %addr, "Waiting for network link");
    let mut attempts: u64 = 0;

    loop {
        attempts += 1;
        let up = tokio::select! {
            _ = cancel.cancelled() => return false,
            up = probe(addr) => up,
        };
        if up {
            flag.set(true);
            tracing::info!(addr = %addr, attempts, "Network link available");
            return true;
        }
        tracing::debug!(addr = %addr, attempts, "Link not available yet");

        tokio::select! {
            _ = cancel.cancelled() => return false,
            _ = tokio::time::sleep(STARTUP_RETRY_DELAY) => {}
        }
    }
}
