//! Thread-pool backend: W scoped threads, one `std::sync::Barrier` per run.
//!
//! Workers first wait on a start gate so that a failed spawn can release the
//! already-running workers instead of leaving them parked at the barrier.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Barrier, Condvar, Mutex};
use std::thread;

use crate::backends::{panic_message, run_worker};
use crate::error::{LcsError, ResourceError, Result};
use crate::rows::{atomic_row, AtomicRows};
use crate::traits::{LcsJob, Outcome, RowScheduler};

/// Scoped-thread scheduler.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadScheduler;

#[derive(Clone, Copy, PartialEq, Eq)]
enum GateState {
    Pending,
    Go,
    Abort,
}

struct StartGate {
    state: Mutex<GateState>,
    cond: Condvar,
}

impl StartGate {
    fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Pending),
            cond: Condvar::new(),
        }
    }

    fn open(&self, to: GateState) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        *state = to;
        self.cond.notify_all();
    }

    /// Returns true once the gate opens for work, false on abort.
    fn pass(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        while *state == GateState::Pending {
            state = self.cond.wait(state).unwrap_or_else(|e| e.into_inner());
        }
        *state == GateState::Go
    }
}

impl RowScheduler for ThreadScheduler {
    fn name(&self) -> &'static str {
        "threads"
    }

    fn run(&self, job: &LcsJob<'_>) -> Result<Outcome> {
        let row0 = atomic_row(job.columns());
        let row1 = atomic_row(job.columns());
        let rows = AtomicRows::new(&row0, &row1);
        let barrier = Barrier::new(job.workers());
        let gate = StartGate::new();
        let faults = AtomicU32::new(0);

        thread::scope(|s| -> Result<()> {
            let mut handles = Vec::with_capacity(job.workers());
            for block in job.partition.blocks() {
                let (barrier, gate, faults) = (&barrier, &gate, &faults);
                let spawned = thread::Builder::new()
                    .name(format!("lcs-worker-{}", block.worker))
                    .spawn_scoped(s, move || {
                        if !gate.pass() {
                            return;
                        }
                        #[cfg(feature = "tracing")]
                        let span = tracing::trace_span!(
                            "worker",
                            id = block.worker,
                            start = block.start,
                            end = block.end
                        );
                        #[cfg(feature = "tracing")]
                        let _enter = span.enter();
                        run_worker(job, rows, block, barrier, |_round, _err| {
                            #[cfg(feature = "tracing")]
                            tracing::warn!(
                                worker = block.worker,
                                round = _round,
                                error = %_err,
                                "barrier wait returned an unexpected status"
                            );
                            faults.fetch_add(1, Ordering::Relaxed);
                        });
                    });
                match spawned {
                    Ok(handle) => handles.push((block.worker, handle)),
                    Err(source) => {
                        gate.open(GateState::Abort);
                        return Err(ResourceError::Spawn(source).into());
                    }
                }
            }
            gate.open(GateState::Go);

            let mut failure = None;
            for (worker, handle) in handles {
                if let Err(payload) = handle.join() {
                    failure.get_or_insert(LcsError::WorkerFailed {
                        worker,
                        detail: panic_message(payload.as_ref()),
                    });
                }
            }
            failure.map_or(Ok(()), Err)
        })?;

        Ok(Outcome {
            score: rows.final_score(job.rounds()),
            barrier_faults: faults.load(Ordering::Relaxed),
        })
    }
}
