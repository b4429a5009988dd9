//! Network reachability probe
//!
//! Stand-in for the appliance's WiFi association step: before the boot
//! sequence proceeds, the uplink must be able to reach the weather
//! provider's endpoint.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

const PROBE_HOST: &str = "api.openweathermap.org:80";
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const PROBE_RETRIES: u32 = 6;
const PROBE_BACKOFF: Duration = Duration::from_secs(5);

/// True once a TCP connection to the provider endpoint succeeds
pub async fn wait_for_network() -> bool {
    wait_for_host(PROBE_HOST).await
}

pub async fn wait_for_host(host: &str) -> bool {
    for attempt in 1..=PROBE_RETRIES {
        match timeout(PROBE_TIMEOUT, TcpStream::connect(host)).await {
            Ok(Ok(_)) => {
                debug!("Network probe succeeded on attempt {}", attempt);
                return true;
            }
            Ok(Err(e)) => warn!("Network probe failed: {}", e),
            Err(_) => warn!("Network probe timed out"),
        }
        if attempt < PROBE_RETRIES {
            sleep(PROBE_BACKOFF).await;
        }
    }
    false
}
