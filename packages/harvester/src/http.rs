//! HTTP client wrapper for the eCFR API.

use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::ACCEPT;

use crate::config::HTTP_TIMEOUT_SECS;
use crate::error::{HarvesterError, Result};

/// User agent string identifying this harvester.
const USER_AGENT: &str = concat!("ecfr-harvester/", env!("CARGO_PKG_VERSION"));

/// Maximum number of attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Create a configured HTTP client.
///
/// # Returns
/// A `reqwest::blocking::Client` configured with timeout and user agent.
pub fn create_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Send a request with retry logic.
///
/// Uses exponential backoff for transient failures (network errors, 5xx
/// responses). Client errors (4xx) are returned immediately.
///
/// # Arguments
/// * `client` - HTTP client to use
/// * `url` - Target URL, used for logging
/// * `build` - Builds a fresh request for every attempt
///
/// # Returns
/// The first successful response
pub fn send_with_retry<F>(client: &Client, url: &str, build: F) -> Result<Response>
where
    F: Fn(&Client) -> RequestBuilder,
{
    let mut last_error: Option<String> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            // Exponential backoff: 500ms, 1000ms
            let delay = RETRY_BASE_DELAY_MS * (1 << (attempt - 1));
            tracing::debug!(attempt, delay_ms = delay, "Retrying after delay");
            thread::sleep(Duration::from_millis(delay));
        }

        match build(client).send() {
            Ok(response) => {
                let status = response.status();

                if status.is_server_error() {
                    tracing::warn!(
                        status = %status,
                        attempt = attempt + 1,
                        max_retries = MAX_RETRIES,
                        url,
                        "Server error, will retry"
                    );
                    last_error = Some(format!("Server error: {status}"));
                    continue;
                }

                // Client errors (4xx) won't succeed on retry
                return Ok(response.error_for_status()?);
            }
            Err(e) => {
                if e.is_connect() || e.is_timeout() {
                    tracing::warn!(
                        error = %e,
                        attempt = attempt + 1,
                        max_retries = MAX_RETRIES,
                        url,
                        "Connection error, will retry"
                    );
                    last_error = Some(e.to_string());
                    continue;
                }
                return Err(HarvesterError::Http(e));
            }
        }
    }

    Err(HarvesterError::RetriesExhausted {
        attempts: MAX_RETRIES,
        message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

/// Download content from a URL with retry logic.
///
/// # Arguments
/// * `client` - HTTP client to use
/// * `url` - URL to download from
/// * `accept` - Value of the `Accept` header
///
/// # Returns
/// Raw bytes of the response body
pub fn download_bytes(client: &Client, url: &str, accept: &str) -> Result<Vec<u8>> {
    let response = send_with_retry(client, url, |c| c.get(url).header(ACCEPT, accept))?;
    let bytes = response.bytes()?;
    Ok(bytes.to_vec())
}

/// Decode a response body as UTF-8, replacing invalid sequences.
///
/// # Arguments
/// * `bytes` - Raw response body
/// * `what` - Description used in the warning when replacement happens
pub fn bytes_to_string(bytes: &[u8], what: &str) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Invalid UTF-8 in {what}, replacing invalid sequences");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}
