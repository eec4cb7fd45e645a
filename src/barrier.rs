//! Round barriers.
//!
//! A round barrier is both a rendezvous and a visibility fence: once `wait`
//! returns, every score written by any participant before it arrived is
//! visible to the caller.
//!
//! [`SharedBarrier`] keeps all of its state in plain atomics with a `repr(C)`
//! layout, so it works unchanged when placed in memory shared between forked
//! processes. It never allocates and never blocks in the kernel, which keeps
//! it usable in a child after `fork`.

use std::hint;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Barrier;
use std::thread;

use crate::error::SyncError;

/// Busy-wait iterations before falling back to yielding the CPU.
const SPIN_LIMIT: u32 = 1 << 10;

/// A reusable barrier gating one DP round.
pub trait RoundBarrier: Sync {
    /// Block until every participant has arrived.
    ///
    /// Returns `Ok(true)` for exactly one participant per round (the one that
    /// released the others).
    fn wait(&self) -> Result<bool, SyncError>;
}

impl RoundBarrier for Barrier {
    #[inline]
    fn wait(&self) -> Result<bool, SyncError> {
        Ok(Barrier::wait(self).is_leader())
    }
}

/// Sense-reversing counter barrier made only of atomics.
#[repr(C)]
#[derive(Debug)]
pub struct SharedBarrier {
    participants: u32,
    arrived: AtomicU32,
    generation: AtomicU32,
    faults: AtomicU32,
}

impl SharedBarrier {
    pub const fn new(participants: u32) -> Self {
        Self {
            participants,
            arrived: AtomicU32::new(0),
            generation: AtomicU32::new(0),
            faults: AtomicU32::new(0),
        }
    }

    #[inline]
    pub fn participants(&self) -> u32 {
        self.participants
    }

    /// Number of waits that observed an impossible arrival count.
    pub fn faults(&self) -> u32 {
        self.faults.load(Ordering::Acquire)
    }

    /// Rounds completed so far (wrapping).
    #[cfg(test)]
    fn generation(&self) -> u32 {
        self.generation.load(Ordering::Acquire)
    }
}

impl RoundBarrier for SharedBarrier {
    fn wait(&self) -> Result<bool, SyncError> {
        let generation = self.generation.load(Ordering::Acquire);
        let arrived = self.arrived.fetch_add(1, Ordering::AcqRel) + 1;

        if arrived > self.participants {
            self.faults.fetch_add(1, Ordering::AcqRel);
            return Err(SyncError {
                arrived,
                participants: self.participants,
            });
        }

        if arrived == self.participants {
            // Reset before release: the next round's arrivals happen after they
            // observe the new generation.
            self.arrived.store(0, Ordering::Relaxed);
            self.generation.store(generation.wrapping_add(1), Ordering::Release);
            return Ok(true);
        }

        let mut spins = 0u32;
        while self.generation.load(Ordering::Acquire) == generation {
            if spins < SPIN_LIMIT {
                hint::spin_loop();
                spins += 1;
            } else {
                thread::yield_now();
            }
        }
        Ok(false)
    }
}
