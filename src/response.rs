//! Response wrapper carrying decoded data plus request metadata.

use http::StatusCode;
use std::time::Duration;

/// A successful, decoded API response.
///
/// Wraps the validated response data together with the HTTP status, the
/// total latency across all attempts, and the number of attempts the
/// request took. Dereferences to the data for convenience.
///
/// # Examples
///
/// ```no_run
/// use courtside::{Client, endpoint::Descriptor};
///
/// # async fn example() -> Result<(), courtside::Error> {
/// let client = Client::builder().build()?;
/// let endpoint: Descriptor<serde_json::Value> = Descriptor::new("scoreboardv3")
///     .param("GameDate", "2025-01-15")
///     .param("LeagueID", "00");
///
/// let response = client.get(&endpoint).await?;
/// if response.was_retried() {
///     println!("took {} attempts ({:?})", response.attempts, response.latency);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The decoded, schema-validated response data.
    pub data: T,

    /// The HTTP status of the final attempt.
    pub status: StatusCode,

    /// Total latency of the logical request, including retries and backoff.
    pub latency: Duration,

    /// Number of attempts made; `1` when the first attempt succeeded.
    pub attempts: u32,
}

impl<T> Response<T> {
    pub(crate) fn new(data: T, status: StatusCode, latency: Duration, attempts: u32) -> Self {
        Self {
            data,
            status,
            latency,
            attempts,
        }
    }

    /// Returns `true` if the request needed more than one attempt.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Consumes the wrapper, returning the decoded data.
    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
