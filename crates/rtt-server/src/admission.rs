//! Transcoder admission control.
//!
//! A single process-wide gate bounds the number of ffmpeg processes running
//! at once. Admission never waits: when every slot is taken the request is
//! rejected immediately and the client is expected to retry.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use rtt_core::{Error, Result};

/// Shared capacity gate. Cloning yields another handle to the same gate.
#[derive(Debug, Clone)]
pub struct AdmissionController {
    permits: Arc<Semaphore>,
    limit: usize,
}

/// One unit of transcoding capacity.
///
/// Capacity returns to the controller when the permit is dropped, on every
/// exit path of the holder, including cancellation.
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionController {
    /// A gate admitting at most `limit` concurrent transcodes.
    ///
    /// A limit of 0 rejects every request.
    pub fn new(limit: usize) -> Self {
        let limit = limit.min(Semaphore::MAX_PERMITS);
        Self {
            permits: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    /// Take a slot, or fail with [`Error::CapacityExceeded`] right away.
    pub fn try_acquire(&self) -> Result<AdmissionPermit> {
        self.permits
            .clone()
            .try_acquire_owned()
            .map(|permit| AdmissionPermit { _permit: permit })
            .map_err(|_| {
                tracing::warn!(limit = self.limit, "Transcoder capacity exceeded");
                Error::CapacityExceeded { limit: self.limit }
            })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of permits currently held.
    pub fn in_flight(&self) -> usize {
        self.limit - self.permits.available_permits()
    }
}
