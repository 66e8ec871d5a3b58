//! Startup connectivity probe.
//!
//! The hosting process checks that the backend is reachable before any
//! interface is served. On persistent failure the caller must terminate
//! with a nonzero status; there is no degraded mode.

use std::time::Duration;

use tokio::time::{sleep, timeout};

use crate::ollama::api::OllamaApi;
use crate::ollama::{Error, ErrorKind};
use crate::warn;

pub(crate) const PROBE_ATTEMPTS: u32 = 3;
pub(crate) const PROBE_DELAY: Duration = Duration::from_secs(3);

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Polls the backend's status endpoint with up to `attempts` sequential
/// checks, waiting `delay` between failures. Returns true on the first
/// successful check; every failed attempt is logged.
pub(crate) async fn wait_for_backend(api: &OllamaApi, attempts: u32, delay: Duration) -> bool {
    for attempt in 1..=attempts {
        let check = match timeout(PROBE_TIMEOUT, api.heartbeat()).await {
            Ok(result) => result.map_err(Error::from),
            Err(_elapsed) => Err(Error::from_kind(ErrorKind::TimedOut)),
        };

        match check {
            Ok(()) => return true,
            Err(err) => {
                warn!("backend check failed ({}/{}): {}", attempt, attempts, err);
            }
        }

        if attempt != attempts {
            sleep(delay).await;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn gives_up_once_attempts_are_exhausted() {
        // Nothing listens on the discard port.
        let api = OllamaApi::with_api_base("http://127.0.0.1:9").unwrap();

        assert!(!wait_for_backend(&api, 2, Duration::from_millis(1)).await);
    }

    #[tokio::test]
    async fn succeeds_on_the_first_healthy_response() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();

            let mut buf = [0u8; 2048];
            let _ = sock.read(&mut buf).await;

            let body = r#"{"models":[]}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );

            let _ = sock.write_all(response.as_bytes()).await;
        });

        let api = OllamaApi::with_api_base(format!("http://{}", addr)).unwrap();

        assert!(wait_for_backend(&api, 1, Duration::from_millis(1)).await);
    }

    #[tokio::test]
    async fn a_server_error_counts_as_a_failed_check() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();

            let mut buf = [0u8; 2048];
            let _ = sock.read(&mut buf).await;

            let body = r#"{"error":"backend is starting"}"#;
            let response = format!(
                "HTTP/1.1 503 Service Unavailable\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );

            let _ = sock.write_all(response.as_bytes()).await;
        });

        let api = OllamaApi::with_api_base(format!("http://{}", addr)).unwrap();

        assert!(!wait_for_backend(&api, 1, Duration::from_millis(1)).await);
    }
}
