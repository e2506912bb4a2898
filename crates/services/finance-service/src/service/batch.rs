//! Multi-user job execution with a concurrency limit.
//!
//! Users are independent partitions, so their jobs run concurrently. One
//! user's failure is recorded and the rest of the run continues.

use std::future::Future;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use common::AppResult;

/// A user whose job failed
#[derive(Debug, Clone, Serialize)]
pub struct UserFailure {
    pub user_id: Uuid,
    pub code: &'static str,
    pub reason: String,
}

/// Outcome of a run across many users
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary<T> {
    pub job: &'static str,
    pub succeeded: Vec<T>,
    pub failed: Vec<UserFailure>,
}

impl<T> BatchSummary<T> {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run `task` for every user, at most `limit` at a time.
///
/// Results are in completion order.
pub async fn for_each_user<T, F, Fut>(
    job: &'static str,
    user_ids: Vec<Uuid>,
    limit: usize,
    task: F,
) -> BatchSummary<T>
where
    F: Fn(Uuid) -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let total = user_ids.len();
    let outcomes: Vec<(Uuid, AppResult<T>)> = stream::iter(user_ids)
        .map(|user_id| {
            let fut = task(user_id);
            async move { (user_id, fut.await) }
        })
        .buffer_unordered(limit.max(1))
        .collect()
        .await;

    let mut summary = BatchSummary {
        job,
        succeeded: Vec::with_capacity(total),
        failed: Vec::new(),
    };
    for (user_id, outcome) in outcomes {
        match outcome {
            Ok(value) => summary.succeeded.push(value),
            Err(err) => {
                error!(job, %user_id, code = err.code(), error = %err, "User job failed");
                summary.failed.push(UserFailure {
                    user_id,
                    code: err.code(),
                    reason: err.user_message(),
                });
            }
        }
    }

    info!(
        job,
        users = total,
        succeeded = summary.succeeded.len(),
        failed = summary.failed.len(),
        "Batch run finished"
    );
    summary
}
