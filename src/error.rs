//! Error types for NBA Stats API calls.
//!
//! The taxonomy distinguishes retryable failures (network trouble, HTTP 429,
//! HTTP 5xx) from fatal ones (other 4xx, decode failures, missing result
//! blocks). Retryable errors are absorbed by the retry loop until attempts
//! are exhausted; fatal errors propagate on first occurrence without
//! consuming a retry. Every terminal error keeps enough context — target
//! path, attempt number, underlying cause — to diagnose without re-running.

use http::StatusCode;
use std::time::Duration;

/// The main error type for NBA Stats API calls.
///
/// # Examples
///
/// ```no_run
/// use courtside::{Client, Error};
/// use courtside::endpoint::Descriptor;
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder().build()?;
/// let endpoint: Descriptor<serde_json::Value> = Descriptor::new("scoreboardv3");
///
/// match client.get(&endpoint).await {
///     Ok(response) => println!("{:?}", response.data),
///     Err(Error::RateLimited { path, attempts, .. }) => {
///         eprintln!("still rate limited on {path} after {attempts} attempts");
///     }
///     Err(Error::Decode { context, detail, .. }) => {
///         eprintln!("response shape changed ({context}): {detail}");
///     }
///     Err(e) => eprintln!("{e}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A connection-level failure: DNS, TLS, connect, I/O, or timeout.
    ///
    /// Retryable. The attempt number records which attempt produced the
    /// failure, so an exhausted request reports its total attempt count.
    #[error("network error requesting {path} (attempt {attempts}): {source}")]
    Network {
        /// The request path.
        path: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
        /// The attempt on which this error occurred (1-indexed).
        attempts: u32,
    },

    /// The server answered HTTP 429.
    ///
    /// Retryable. If the response carried a `Retry-After` or
    /// `X-RateLimit-Reset` header, the parsed wait is kept here and used as
    /// a floor on the backoff delay.
    #[error("rate limited on {path} (attempt {attempts})")]
    RateLimited {
        /// The request path.
        path: String,
        /// Server-suggested wait, if any header was present.
        retry_after: Option<Duration>,
        /// The attempt on which this error occurred (1-indexed).
        attempts: u32,
    },

    /// The server answered with a 5xx status.
    ///
    /// Retryable.
    #[error("server error {status} on {path} (attempt {attempts}): {body}")]
    Server {
        /// The HTTP status code.
        status: StatusCode,
        /// The request path.
        path: String,
        /// The raw response body.
        body: String,
        /// The attempt on which this error occurred (1-indexed).
        attempts: u32,
    },

    /// The server answered with a non-429 4xx status.
    ///
    /// Fatal: a malformed request or a permission problem will not improve
    /// on retry.
    #[error("client error {status} on {path}: {body}")]
    Client {
        /// The HTTP status code.
        status: StatusCode,
        /// The request path.
        path: String,
        /// The raw response body.
        body: String,
    },

    /// The response body could not be decoded into the expected shape.
    ///
    /// Fatal: covers invalid JSON, schema mismatches, and malformed tabular
    /// blocks (missing `headers`/`rowSet`, row length mismatch). Indicates
    /// an API contract change, not a transient condition.
    #[error("decode error in {context}: {detail}")]
    Decode {
        /// Where decoding failed: a request path or a block description.
        context: String,
        /// What went wrong.
        detail: String,
        /// The raw payload text, when available. Empty for pure
        /// normalization failures where no body applies.
        raw: String,
    },

    /// A named tabular block was requested but is not present.
    ///
    /// Fatal. Carries the names that *are* present so the mismatch can be
    /// diagnosed from the error alone.
    #[error("result block {wanted:?} not found; available blocks: {available:?}")]
    BlockNotFound {
        /// The requested block (name or index, rendered as text).
        wanted: String,
        /// Block names actually present in the payload.
        available: Vec<String>,
    },

    /// One or more requests in a batch terminated with an error.
    ///
    /// The batch is all-or-nothing: siblings run to completion, and every
    /// terminal failure is collected here with its input index.
    #[error("batch failed: {} of {total} requests errored", .failures.len())]
    Batch {
        /// Total number of requests in the batch.
        total: usize,
        /// Every failed request, in input order.
        failures: Vec<BatchFailure>,
    },

    /// The caller's cancellation token fired.
    ///
    /// Fatal. In-flight attempts are abandoned and pending backoff sleeps
    /// are interrupted.
    #[error("request cancelled")]
    Cancelled,

    /// Invalid client or request configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// An invalid URL was provided.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// A single failed request within a batch, tagged with its input index.
#[derive(Debug)]
pub struct BatchFailure {
    /// Position of the failed request in the batch input.
    pub index: usize,
    /// The terminal error for that request.
    pub error: Error,
}

impl Error {
    /// Returns `true` if this error is transient and worth retrying.
    ///
    /// Network failures, HTTP 429, and HTTP 5xx are retryable; everything
    /// else is fatal.
    ///
    /// # Examples
    ///
    /// ```
    /// use courtside::Error;
    /// use http::StatusCode;
    ///
    /// let err = Error::Server {
    ///     status: StatusCode::INTERNAL_SERVER_ERROR,
    ///     path: "leaguegamelog".to_string(),
    ///     body: String::new(),
    ///     attempts: 1,
    /// };
    /// assert!(err.is_retryable());
    ///
    /// let err = Error::Client {
    ///     status: StatusCode::BAD_REQUEST,
    ///     path: "leaguegamelog".to_string(),
    ///     body: String::new(),
    /// };
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Network { .. } | Error::RateLimited { .. } | Error::Server { .. }
        )
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Server { status, .. } | Error::Client { status, .. } => Some(*status),
            Error::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            _ => None,
        }
    }

    /// Returns the attempt number this error occurred on, for retryable
    /// variants. The error surfaced after exhaustion is the one from the
    /// final attempt, so this doubles as the total attempt count.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Error::Network { attempts, .. }
            | Error::RateLimited { attempts, .. }
            | Error::Server { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }

    /// Returns the server-suggested wait for a rate-limited error.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// A specialized `Result` type for NBA Stats API calls.
pub type Result<T> = std::result::Result<T, Error>;
