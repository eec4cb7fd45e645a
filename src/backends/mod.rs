//! Concurrency backends implementing [`RowScheduler`](crate::traits::RowScheduler).
//!
//! - [`threads`]   : scoped OS threads gated by `std::sync::Barrier`.
//! - [`processes`] : forked workers sharing an anonymous mapping (Unix).
//! - [`rayon_pool`]: a dedicated rayon pool, one parallel loop per round.
//!
//! The threads and processes backends share [`run_worker`], so the round
//! structure is identical between them.

use crate::barrier::RoundBarrier;
use crate::blocks::ColumnBlock;
use crate::error::SyncError;
use crate::rows::{fill_block_atomic, AtomicRows};
use crate::traits::LcsJob;

#[cfg(unix)]
pub mod processes;
#[cfg(feature = "parallel")]
pub mod rayon_pool;
pub mod threads;

/// Body of one barrier-gated worker: wait, fill the block, repeat.
///
/// Never allocates, so it is safe to run in a forked child.
/// `on_fault` sees every barrier wait that returned an error; the round
/// still proceeds.
pub(crate) fn run_worker<B, F>(
    job: &LcsJob<'_>,
    rows: AtomicRows<'_>,
    block: &ColumnBlock,
    barrier: &B,
    mut on_fault: F,
) where
    B: RoundBarrier + ?Sized,
    F: FnMut(usize, SyncError),
{
    for round in 1..=job.rounds() {
        if let Err(err) = barrier.wait() {
            on_fault(round, err);
        }
        fill_block_atomic(
            job.last_match(round),
            rows.previous(round),
            block,
            rows.block(round, block),
        );
    }
}

/// Render a thread panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}
