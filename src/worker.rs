//! Runs the pipeline off the async executor.
//!
//! Each request gets a generation number; a reply that arrives after a newer
//! request was issued is reported as stale instead of being handed out.
//! Runs are never cancelled, a superseded run finishes and is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::oneshot;

use crate::config::Params;
use crate::error::WorldgenError;
use crate::{Timing, World};

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Failed(#[from] WorldgenError),
    #[error("generation {generation} superseded by {latest}")]
    Stale { generation: u64, latest: u64 },
    #[error("worker dropped the reply")]
    Disconnected,
}

/// The buffers of one finished run, owned by whoever received them.
pub struct Generated {
    pub generation: u64,
    pub world: World,
    pub timings: Vec<Timing>,
}

#[derive(Clone, Default)]
pub struct Worldgen {
    latest: Arc<AtomicU64>,
}

pub struct Job {
    generation: u64,
    latest: Arc<AtomicU64>,
    reply: oneshot::Receiver<Result<(World, Vec<Timing>), WorldgenError>>,
}

impl Worldgen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation number of the most recent request, 0 before any.
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Start a run on the blocking pool. Must be called inside a tokio runtime.
    pub fn request(&self, params: Params) -> Job {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, rx) = oneshot::channel();
        tokio::task::spawn_blocking(move || {
            log::debug!("worker: generation {generation} started");
            // The receiver may be gone already; the result is simply dropped.
            let _ = tx.send(crate::generate(&params));
        });
        Job {
            generation,
            latest: Arc::clone(&self.latest),
            reply: rx,
        }
    }
}

impl Job {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn recv(self) -> Result<Generated, WorkerError> {
        let result = self.reply.await.map_err(|_| WorkerError::Disconnected)?;
        let latest = self.latest.load(Ordering::SeqCst);
        if latest != self.generation {
            log::debug!("worker: discarding generation {} (latest {latest})", self.generation);
            return Err(WorkerError::Stale {
                generation: self.generation,
                latest,
            });
        }
        let (world, timings) = result?;
        Ok(Generated {
            generation: self.generation,
            world,
            timings,
        })
    }
}
