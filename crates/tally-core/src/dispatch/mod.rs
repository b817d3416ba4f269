//! Concurrent fan-out of one query to its dispatch set.
//!
//! Every endpoint gets its own tokio task. A leg always settles into exactly
//! one [`EndpointOutcome`]: a value, or a failure carrying the error text.
//! Errors and panics never escape a leg, and nothing is retried.

pub mod deadline;

use crate::{
    types::{EndpointOutcome, Query},
    upstream::{client::RpcClient, endpoint::Endpoint},
};
use futures_util::FutureExt;
use std::{any::Any, panic::AssertUnwindSafe, sync::Arc, time::Duration};
use tokio::task::JoinSet;
use tracing::{debug, warn};

pub use deadline::{with_deadline, DeadlineElapsed};

/// Issues one query to many endpoints at once.
#[derive(Clone)]
pub struct QueryDispatcher {
    client: Arc<dyn RpcClient>,
}

impl QueryDispatcher {
    #[must_use]
    pub fn new(client: Arc<dyn RpcClient>) -> Self {
        Self { client }
    }

    /// Sends `query` to every endpoint concurrently and waits for all legs to
    /// settle.
    ///
    /// Returns one outcome per endpoint, indexed by dispatch position. An
    /// empty endpoint list yields an empty outcome list.
    pub async fn dispatch(&self, query: &Query, endpoints: &[Endpoint]) -> Vec<EndpointOutcome> {
        let mut legs = JoinSet::new();

        for (position, endpoint) in endpoints.iter().cloned().enumerate() {
            let client = Arc::clone(&self.client);
            let query = query.clone();

            legs.spawn(async move {
                let result = AssertUnwindSafe(client.fetch(&endpoint, &query)).catch_unwind().await;

                match result {
                    Ok(Ok(value)) => {
                        debug!(endpoint = %endpoint, kind = %query.kind, position, "endpoint answered");
                        EndpointOutcome::success(position, endpoint.url_arc(), value)
                    }
                    Ok(Err(e)) => {
                        warn!(endpoint = %endpoint, kind = %query.kind, error = %e, "endpoint request failed");
                        EndpointOutcome::failure(position, endpoint.url_arc(), query.kind, e.to_string())
                    }
                    Err(panic) => {
                        let reason = format!("request panicked: {}", panic_message(panic.as_ref()));
                        warn!(endpoint = %endpoint, kind = %query.kind, error = %reason, "endpoint request panicked");
                        EndpointOutcome::failure(position, endpoint.url_arc(), query.kind, reason)
                    }
                }
            });
        }

        let mut slots: Vec<Option<EndpointOutcome>> = vec![None; endpoints.len()];
        while let Some(joined) = legs.join_next().await {
            match joined {
                Ok(outcome) => {
                    let position = outcome.position;
                    if let Some(slot) = slots.get_mut(position) {
                        *slot = Some(outcome);
                    }
                }
                Err(e) => warn!(error = %e, "dispatch leg did not complete"),
            }
        }

        slots
            .into_iter()
            .zip(endpoints)
            .enumerate()
            .map(|(position, (slot, endpoint))| {
                slot.unwrap_or_else(|| {
                    EndpointOutcome::failure(position, endpoint.url_arc(), query.kind, "request task did not complete")
                })
            })
            .collect()
    }

    /// [`dispatch`](Self::dispatch) bounded by `deadline`.
    ///
    /// # Errors
    ///
    /// Returns [`DeadlineElapsed`] if any leg is still running when the
    /// deadline fires. Those legs are aborted and whatever the finished legs
    /// returned is discarded.
    pub async fn dispatch_with_deadline(
        &self,
        query: &Query,
        endpoints: &[Endpoint],
        deadline: Duration,
    ) -> Result<Vec<EndpointOutcome>, DeadlineElapsed> {
        with_deadline(self.dispatch(query, endpoints), deadline).await
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
