//! The seam between the coordinator and the concurrency backends.
//!
//! The coordinator prepares an [`LcsJob`] (match index, row symbols, column
//! partition) and hands it to a [`RowScheduler`]. A scheduler owns the worker
//! lifecycle and the score rows for the duration of one run:
//!
//! - it must run exactly `job.rounds()` rounds, in order;
//! - round `i` may only start once every worker has finished round `i - 1`;
//! - worker `k` writes only the columns of `job.partition.blocks()[k]`;
//! - the returned score is column `M` of the row written in the last round.
//!
//! Schedulers are free to choose their execution units (threads, processes,
//! a work-stealing pool) as long as they keep these rules.

use crate::alphabet::Symbol;
use crate::blocks::Partition;
use crate::error::Result;
use crate::match_index::MatchIndex;

/// Everything a backend needs to run the rounds. Built once, read-only.
#[derive(Debug, Clone, Copy)]
pub struct LcsJob<'a> {
    /// Last-match table over the column sequence.
    pub index: &'a MatchIndex,
    /// Row sequence; round `i` uses `row_symbols[i - 1]`.
    pub row_symbols: &'a [Symbol],
    /// Static column assignment, one block per worker.
    pub partition: &'a Partition,
}

impl<'a> LcsJob<'a> {
    /// Number of columns M.
    #[inline]
    pub fn columns(&self) -> usize {
        self.index.columns()
    }

    /// Number of rounds N.
    #[inline]
    pub fn rounds(&self) -> usize {
        self.row_symbols.len()
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.partition.workers()
    }

    /// Last-match row for the symbol of `round` (1-based).
    #[inline]
    pub fn last_match(&self, round: usize) -> &'a [u32] {
        self.index.row(self.row_symbols[round - 1])
    }
}

/// What a backend reports back after its last round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub score: u32,
    /// Barrier waits that returned an unexpected status. Non-fatal.
    pub barrier_faults: u32,
}

/// A concurrency backend driving the barrier-gated rounds.
pub trait RowScheduler {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Run every round of `job` and return the final score.
    ///
    /// Resources acquired here must be released on every return path.
    fn run(&self, job: &LcsJob<'_>) -> Result<Outcome>;
}
