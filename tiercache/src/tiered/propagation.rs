//! Background propagation of mutations to both tiers
//!
//! `TieredCache::write`/`delete`/`clear` spawn one task per tier and hand
//! back a [`Propagation`]. Dropping it leaves the tasks running
//! (fire-and-forget); awaiting it reports what each tier did.

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::core::{CacheError, Operation, Result, Tier};

/// A tier task that failed after the caller had already returned
#[derive(Debug)]
pub struct PropagationFailure<'a> {
    pub tier: Tier,
    pub operation: Operation,
    pub error: &'a CacheError,
}

/// Callback invoked from the background task of a failed tier
pub type FailureHook = Arc<dyn Fn(&PropagationFailure<'_>) + Send + Sync>;

/// Handle to the two in-flight tier tasks of one mutation
#[derive(Debug)]
pub struct Propagation {
    operation: Operation,
    local: JoinHandle<Result<()>>,
    remote: JoinHandle<Result<()>>,
}

/// Per-tier results of one mutation
#[derive(Debug)]
pub struct PropagationOutcome {
    pub operation: Operation,
    pub local: Result<()>,
    pub remote: Result<()>,
}

impl PropagationOutcome {
    pub fn is_success(&self) -> bool {
        self.local.is_ok() && self.remote.is_ok()
    }

    /// First failure, remote tier first
    pub fn into_result(self) -> Result<()> {
        self.remote.and(self.local)
    }

    pub fn tier(&self, tier: Tier) -> &Result<()> {
        match tier {
            Tier::Local => &self.local,
            Tier::Remote => &self.remote,
        }
    }
}

impl Propagation {
    pub(crate) fn new(
        operation: Operation,
        local: JoinHandle<Result<()>>,
        remote: JoinHandle<Result<()>>,
    ) -> Self {
        Self {
            operation,
            local,
            remote,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// True once both tier tasks have finished
    pub fn is_finished(&self) -> bool {
        self.local.is_finished() && self.remote.is_finished()
    }

    /// Wait for both tiers and report each result
    pub async fn outcome(self) -> PropagationOutcome {
        let (local, remote) = tokio::join!(self.local, self.remote);

        PropagationOutcome {
            operation: self.operation,
            local: flatten(local),
            remote: flatten(remote),
        }
    }

    /// Wait for both tiers; first failure wins, remote first
    pub async fn wait(self) -> Result<()> {
        self.outcome().await.into_result()
    }

    /// Let the tasks finish on their own
    pub fn detach(self) {}
}

impl IntoFuture for Propagation {
    type Output = Result<()>;
    type IntoFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.wait())
    }
}

fn flatten(joined: std::result::Result<Result<()>, tokio::task::JoinError>) -> Result<()> {
    match joined {
        Ok(result) => result,
        Err(e) => Err(CacheError::from(e)),
    }
}
