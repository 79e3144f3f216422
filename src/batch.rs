//! Bounded-concurrency batch fetching with order-preserving results.
//!
//! A counting gate admits at most `limit` in-flight requests; each worker
//! holds its permit from just before its first attempt until its terminal
//! outcome. Results are keyed back to their input index, so the output
//! order is deterministic and independent of network timing. The batch is
//! all-or-nothing: siblings run to completion even after one fails, and
//! every terminal failure is aggregated into the batch error.

use crate::endpoint::Endpoint;
use crate::error::BatchFailure;
use crate::{Client, Error, Response, Result};
use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

/// Batches at or above this size emit periodic progress events.
const PROGRESS_THRESHOLD: usize = 10;

/// Completions between progress events.
const PROGRESS_INTERVAL: usize = 10;

pub(crate) async fn fetch_all<E>(
    client: &Client,
    endpoints: &[E],
    limit: usize,
) -> Result<Vec<Response<E::Response>>>
where
    E: Endpoint + Sync,
{
    let total = endpoints.len();
    if total == 0 {
        return Ok(Vec::new());
    }
    tracing::info!(total, limit, "batch fetch starting");

    let gate = Semaphore::new(limit);
    let cancel = client.cancel_token();

    let mut in_flight: FuturesUnordered<_> = endpoints
        .iter()
        .enumerate()
        .map(|(index, endpoint)| {
            let gate = &gate;
            async move {
                let permit = tokio::select! {
                    _ = cancel.cancelled() => return (index, Err(Error::Cancelled)),
                    acquired = gate.acquire() => acquired,
                };
                let Ok(_permit) = permit else {
                    return (index, Err(Error::Cancelled));
                };
                (index, client.get(endpoint).await)
            }
        })
        .collect();

    let mut finished: Vec<(usize, Result<Response<E::Response>>)> = Vec::with_capacity(total);
    let mut completed = 0usize;
    while let Some(outcome) = in_flight.next().await {
        finished.push(outcome);
        completed += 1;
        if total >= PROGRESS_THRESHOLD && completed % PROGRESS_INTERVAL == 0 && completed < total {
            tracing::info!(completed, total, "batch progress");
        }
    }

    // Key results back to input positions; completion order never leaks.
    finished.sort_by_key(|(index, _)| *index);

    let mut results = Vec::with_capacity(total);
    let mut failures = Vec::new();
    for (index, outcome) in finished {
        match outcome {
            Ok(response) => results.push(response),
            Err(error) => failures.push(BatchFailure { index, error }),
        }
    }

    if failures.is_empty() {
        tracing::info!(total, "batch fetch complete");
        Ok(results)
    } else {
        tracing::warn!(total, failed = failures.len(), "batch fetch failed");
        Err(Error::Batch { total, failures })
    }
}
