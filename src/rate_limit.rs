//! Parsing of rate-limit response headers into a retry hint.
//!
//! On an HTTP 429 the stats API may say how long to wait, either as a
//! `Retry-After` header (delay-seconds or HTTP-date) or as an
//! `X-RateLimit-Reset` / `RateLimit-Reset` Unix timestamp. The parsed hint
//! feeds the retry loop as a *floor* on the backoff delay — the server's
//! request is never undercut.

use http::HeaderMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Extracts the server-suggested wait from 429 response headers.
///
/// `Retry-After` wins when present; otherwise the wait is derived from the
/// reset timestamp. Returns `None` when no usable header is present.
///
/// # Examples
///
/// ```
/// use courtside::rate_limit::retry_hint;
/// use http::HeaderMap;
/// use std::time::Duration;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("retry-after", "30".parse().unwrap());
/// assert_eq!(retry_hint(&headers), Some(Duration::from_secs(30)));
/// ```
pub fn retry_hint(headers: &HeaderMap) -> Option<Duration> {
    parse_retry_after(headers).or_else(|| parse_reset(headers))
}

/// Parses `Retry-After`, accepting delay-seconds or an HTTP-date.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get("retry-after")?.to_str().ok()?;

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    // RFC 7231 HTTP-date form; a date in the past means no wait.
    let at = httpdate::parse_http_date(value).ok()?;
    at.duration_since(SystemTime::now()).ok()
}

/// Parses `X-RateLimit-Reset` or `RateLimit-Reset` (Unix timestamp) into a
/// wait from now. A reset in the past yields `None`.
fn parse_reset(headers: &HeaderMap) -> Option<Duration> {
    let value = headers
        .get("x-ratelimit-reset")
        .or_else(|| headers.get("ratelimit-reset"))?
        .to_str()
        .ok()?;
    let timestamp = value.parse::<u64>().ok()?;
    let reset_at = UNIX_EPOCH + Duration::from_secs(timestamp);
    reset_at.duration_since(SystemTime::now()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("60"));

        assert_eq!(retry_hint(&headers), Some(Duration::from_secs(60)));
    }

    #[test]
    fn retry_after_http_date() {
        let mut headers = HeaderMap::new();
        let at = SystemTime::now() + Duration::from_secs(90);
        headers.insert(
            "retry-after",
            HeaderValue::from_str(&httpdate::fmt_http_date(at)).unwrap(),
        );

        let hint = retry_hint(&headers).unwrap();
        // HTTP-dates have whole-second resolution.
        assert!(hint >= Duration::from_secs(88) && hint <= Duration::from_secs(91));
    }

    #[test]
    fn reset_timestamp_fallback() {
        let mut headers = HeaderMap::new();
        let reset = SystemTime::now() + Duration::from_secs(120);
        let timestamp = reset.duration_since(UNIX_EPOCH).unwrap().as_secs();
        headers.insert(
            "x-ratelimit-reset",
            HeaderValue::from_str(&timestamp.to_string()).unwrap(),
        );

        let hint = retry_hint(&headers).unwrap();
        assert!(hint >= Duration::from_secs(118) && hint <= Duration::from_secs(121));
    }

    #[test]
    fn retry_after_preferred_over_reset() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("5"));
        let reset = SystemTime::now() + Duration::from_secs(500);
        let timestamp = reset.duration_since(UNIX_EPOCH).unwrap().as_secs();
        headers.insert(
            "x-ratelimit-reset",
            HeaderValue::from_str(&timestamp.to_string()).unwrap(),
        );

        assert_eq!(retry_hint(&headers), Some(Duration::from_secs(5)));
    }

    #[test]
    fn reset_in_the_past_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1000"));

        assert_eq!(retry_hint(&headers), None);
    }

    #[test]
    fn no_headers_no_hint() {
        assert_eq!(retry_hint(&HeaderMap::new()), None);
    }
}
