//! Deadline guard for the aggregate wait of one read.
//!
//! The guarded future is dropped when the deadline wins. A dispatch future owns
//! its `JoinSet`, so dropping it aborts every leg still in flight and no late
//! result can reach a later read.

use std::{future::Future, time::Duration};
use thiserror::Error;

/// The deadline elapsed before the guarded future completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {}ms elapsed", .0.as_millis())]
pub struct DeadlineElapsed(pub Duration);

/// Races `future` against `deadline`.
///
/// # Errors
///
/// Returns [`DeadlineElapsed`] if the deadline fires first, even when the
/// future was about to complete.
pub async fn with_deadline<F>(future: F, deadline: Duration) -> Result<F::Output, DeadlineElapsed>
where
    F: Future,
{
    tokio::time::timeout(deadline, future).await.map_err(|_| DeadlineElapsed(deadline))
}
