//! # Courtside - an NBA Stats API client
//!
//! Courtside is a resilient async client for the NBA Stats API, built on
//! `reqwest`. It retries transient failures with full-jitter exponential
//! backoff, honors server rate-limit hints, fans batches out under a
//! bounded concurrency gate while preserving input order, and normalizes
//! the API's tabular `headers`/`rowSet` wire format into named records.
//!
//! ## Quick Start
//!
//! ```no_run
//! use courtside::endpoints::{LeagueGameLog, SeasonType};
//! use courtside::{Client, Error};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let client = Client::builder()
//!         .timeout(Duration::from_secs(20))
//!         .max_retries(3)
//!         .build()?;
//!
//!     // One request, retried transparently on transient failures.
//!     let log = LeagueGameLog::new("2024-25", SeasonType::RegularSeason);
//!     let response = client.get(&log).await?;
//!     println!("{} rows after {} attempt(s)", response.data.len(), response.attempts);
//!
//!     client.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Batch fetching
//!
//! Independent requests fan out concurrently under a bounded gate; results
//! come back in input order regardless of completion order, and a failed
//! batch reports *every* failing request, not just the first:
//!
//! ```no_run
//! use courtside::endpoint::{BlockKey, Descriptor};
//! use courtside::table::Record;
//! use courtside::{Client, Error};
//!
//! # async fn example(game_ids: Vec<String>) -> Result<(), Error> {
//! let client = Client::builder().concurrency_limit(4).build()?;
//!
//! let endpoints: Vec<Descriptor<Vec<Record>>> = game_ids
//!     .iter()
//!     .map(|id| {
//!         Descriptor::new("boxscoretraditionalv2")
//!             .param("GameID", id)
//!             .table(BlockKey::Index(0))
//!     })
//!     .collect();
//!
//! match client.get_many(&endpoints).await {
//!     Ok(responses) => {
//!         // responses[i] corresponds to endpoints[i]
//!         for (id, response) in game_ids.iter().zip(&responses) {
//!             println!("{id}: {} player rows", response.data.len());
//!         }
//!     }
//!     Err(Error::Batch { total, failures }) => {
//!         eprintln!("{} of {total} requests failed", failures.len());
//!         for failure in failures {
//!             eprintln!("  [{}] {}", failure.index, failure.error);
//!         }
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Tabular normalization
//!
//! Most endpoints answer in a column/row block format. The [`table`] module
//! turns blocks into header-keyed records, tolerating the three wire
//! variants; endpoint types declare their shape once and decode straight
//! into typed rows via serde:
//!
//! ```
//! use courtside::table::{rows, BlockSelector};
//! use serde_json::json;
//!
//! let payload = json!({
//!     "resultSets": [{
//!         "name": "Leaders",
//!         "headers": ["PLAYER", "PTS"],
//!         "rowSet": [["Gilgeous-Alexander", 32.7], ["Doncic", 28.1]]
//!     }]
//! });
//!
//! let records = rows(&payload, BlockSelector::Name("Leaders")).unwrap();
//! assert_eq!(records[0]["PTS"], json!(32.7));
//! ```
//!
//! ## Error handling
//!
//! Transient failures (network errors, HTTP 429, HTTP 5xx) are absorbed by
//! the retry policy until attempts run out; everything else is surfaced
//! immediately. Terminal errors keep the target path, attempt count, and
//! underlying cause — and a missing result block reports which blocks the
//! payload actually carried:
//!
//! ```no_run
//! use courtside::{Client, Error};
//! # use courtside::endpoint::Descriptor;
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::builder().build()?;
//! # let endpoint: Descriptor<serde_json::Value> = Descriptor::new("leaguestandingsv3");
//! match client.get(&endpoint).await {
//!     Ok(response) => println!("{:?}", response.data),
//!     Err(Error::BlockNotFound { wanted, available }) => {
//!         eprintln!("no block {wanted:?}; payload has {available:?}");
//!     }
//!     Err(e) if e.is_retryable() => eprintln!("gave up after retries: {e}"),
//!     Err(e) => eprintln!("fatal: {e}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Cancellation
//!
//! A [`CancellationToken`] supplied at build time propagates into every
//! in-flight attempt, backoff sleep, and gate wait; cancelled requests
//! surface [`Error::Cancelled`].

mod batch;
mod client;
pub mod endpoint;
pub mod endpoints;
mod error;
pub mod rate_limit;
mod response;
mod retry;
pub mod season;
pub mod table;

pub use client::{Client, ClientBuilder, DEFAULT_BASE_URL};
pub use endpoint::{Descriptor, Endpoint};
pub use error::{BatchFailure, Error, Result};
pub use response::Response;
pub use retry::RetryPolicy;

pub use tokio_util::sync::CancellationToken;
