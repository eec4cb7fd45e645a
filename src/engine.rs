//! The coordinator: validates configuration, prepares the shared read-only
//! state, picks a backend and reads the final score.
//!
//! ```
//! use par_lcs::{Backend, LcsEngine, Sequence};
//!
//! let cols: Sequence = "ATCG".parse().unwrap();
//! let rows: Sequence = "ATCG".parse().unwrap();
//! let report = LcsEngine::with_backend(2, Backend::Threads)
//!     .unwrap()
//!     .run(&cols, &rows)
//!     .unwrap();
//! assert_eq!(report.score, 4);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::alphabet::Sequence;
use crate::backends::threads::ThreadScheduler;
use crate::blocks::Partition;
use crate::error::{ConfigError, Result};
use crate::match_index::MatchIndex;
use crate::traits::{LcsJob, RowScheduler};

/// Which concurrency backend drives the rounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Scoped threads and `std::sync::Barrier`.
    #[default]
    Threads,
    /// Forked processes over shared memory (Unix).
    Processes,
    /// A dedicated rayon pool (`parallel` feature).
    Rayon,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::Threads, Backend::Processes, Backend::Rayon];

    pub fn name(self) -> &'static str {
        match self {
            Backend::Threads => "threads",
            Backend::Processes => "processes",
            Backend::Rayon => "rayon",
        }
    }

    /// Backends usable in this build on this platform.
    pub fn available() -> Vec<Backend> {
        Self::ALL
            .into_iter()
            .filter(|b| b.scheduler().is_ok())
            .collect()
    }

    /// Instantiate the scheduler, or fail if it is compiled out.
    pub fn scheduler(self) -> std::result::Result<Box<dyn RowScheduler>, ConfigError> {
        match self {
            Backend::Threads => Ok(Box::new(ThreadScheduler)),
            #[cfg(unix)]
            Backend::Processes => Ok(Box::new(crate::backends::processes::ProcessScheduler)),
            #[cfg(feature = "parallel")]
            Backend::Rayon => Ok(Box::new(crate::backends::rayon_pool::RayonScheduler)),
            #[allow(unreachable_patterns)]
            other => Err(ConfigError::UnsupportedBackend(other.name())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "threads" | "thread" | "pthreads" => Ok(Backend::Threads),
            "processes" | "process" | "fork" => Ok(Backend::Processes),
            "rayon" | "omp" => Ok(Backend::Rayon),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

/// Result of one engine run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// LCS length.
    pub score: u32,
    pub backend: Backend,
    /// Workers actually used, after clamping to the column count.
    pub workers: usize,
    /// Rounds run (N, or 0 when either sequence is empty).
    pub rounds: usize,
    /// Barrier waits that returned an unexpected status.
    pub barrier_faults: u32,
}

/// Barrier-synchronised, column-partitioned LCS engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LcsEngine {
    workers: usize,
    backend: Backend,
}

impl LcsEngine {
    /// Engine with `workers` workers on the default (threads) backend.
    pub fn new(workers: usize) -> Result<Self> {
        Self::with_backend(workers, Backend::default())
    }

    /// Engine with an explicit backend.
    ///
    /// Fails on zero workers or a backend this build cannot run.
    pub fn with_backend(workers: usize, backend: Backend) -> Result<Self> {
        if workers == 0 {
            return Err(ConfigError::ZeroWorkers.into());
        }
        backend.scheduler()?;
        Ok(Self { workers, backend })
    }

    /// Requested worker count.
    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Workers used for `columns` columns: the request clamped to `columns`.
    pub fn effective_workers(&self, columns: usize) -> usize {
        self.workers.min(columns)
    }

    /// LCS length of `columns` and `rows`.
    ///
    /// `columns` is scanned into the match index and sizes the score rows
    /// (M); `rows` supplies one symbol per round (N).
    pub fn run(&self, columns: &Sequence, rows: &Sequence) -> Result<RunReport> {
        let (m, n) = (columns.len(), rows.len());
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("lcs_run", backend = %self.backend, m, n);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        if m == 0 || n == 0 {
            return Ok(RunReport {
                score: 0,
                backend: self.backend,
                workers: 0,
                rounds: 0,
                barrier_faults: 0,
            });
        }

        let workers = self.effective_workers(m);
        if workers < self.workers {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                requested = self.workers,
                workers,
                "more workers than columns, clamping"
            );
        }

        let index = MatchIndex::build(columns);
        let partition = Partition::new(m, workers)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(blocks = ?partition.blocks(), "column partition");

        let scheduler = self.backend.scheduler()?;
        let job = LcsJob {
            index: &index,
            row_symbols: rows.symbols(),
            partition: &partition,
        };
        let outcome = scheduler.run(&job)?;

        if outcome.barrier_faults > 0 {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                faults = outcome.barrier_faults,
                backend = scheduler.name(),
                "barrier reported unexpected statuses; result may be unreliable"
            );
        }

        Ok(RunReport {
            score: outcome.score,
            backend: self.backend,
            workers,
            rounds: n,
            barrier_faults: outcome.barrier_faults,
        })
    }

    /// Convenience wrapper returning only the score.
    pub fn score(&self, columns: &Sequence, rows: &Sequence) -> Result<u32> {
        self.run(columns, rows).map(|r| r.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LcsError;

    fn seq(s: &str) -> Sequence {
        s.parse().unwrap()
    }

    #[test]
    fn rejects_zero_workers() {
        assert!(matches!(
            LcsEngine::new(0),
            Err(LcsError::Config(ConfigError::ZeroWorkers))
        ));
    }

    #[test]
    fn empty_inputs_short_circuit() {
        let engine = LcsEngine::new(3).unwrap();
        let report = engine.run(&Sequence::default(), &seq("ACGT")).unwrap();
        assert_eq!((report.score, report.workers, report.rounds), (0, 0, 0));
        assert_eq!(engine.score(&seq("ACGT"), &Sequence::default()).unwrap(), 0);
    }

    #[test]
    fn clamps_workers_to_columns() {
        let engine = LcsEngine::new(16).unwrap();
        let report = engine.run(&seq("ATC"), &seq("TCA")).unwrap();
        assert_eq!(report.workers, 3);
        assert_eq!(report.rounds, 3);
        assert_eq!(report.score, 2);
    }

    #[test]
    fn backend_names_round_trip() {
        for backend in Backend::ALL {
            assert_eq!(backend.name().parse::<Backend>().unwrap(), backend);
        }
        assert_eq!("OMP".parse::<Backend>().unwrap(), Backend::Rayon);
        assert!(matches!(
            "gpu".parse::<Backend>(),
            Err(ConfigError::UnknownBackend(_))
        ));
    }

    #[test]
    fn threads_backend_is_always_available() {
        assert!(Backend::available().contains(&Backend::Threads));
    }
}
