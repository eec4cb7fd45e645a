//! Error types for the LCS engine.
//!
//! Errors are grouped the way they are detected: configuration and input
//! problems surface before any worker starts, resource problems while the
//! backend sets up, worker failures at join time. Barrier faults are not
//! fatal and are reported separately (see [`SyncError`]).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, LcsError>;

/// Top-level error returned by the engine, the loader and the binaries.
#[derive(Debug, Error)]
pub enum LcsError {
    /// Invalid worker count, backend or partition request.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A sequence source could not be read or parsed.
    #[error("input error in {}: {source}", .path.display())]
    Input {
        /// Source the error was found in.
        path: PathBuf,
        /// What was wrong with it.
        #[source]
        source: InputError,
    },

    /// A concurrency primitive or shared resource could not be created.
    #[error("resource error: {0}")]
    Resource(#[from] ResourceError),

    /// A worker did not finish its rounds normally.
    #[error("worker {worker} failed: {detail}")]
    WorkerFailed {
        /// Index of the worker in partition order.
        worker: usize,
        /// Panic payload or exit status.
        detail: String,
    },
}

/// Configuration errors, detected before any parallel work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("worker count must be at least 1")]
    ZeroWorkers,

    #[error("cannot split {columns} columns across {workers} workers")]
    TooManyWorkers { columns: usize, workers: usize },

    #[error("unknown backend `{0}` (expected threads, processes or rayon)")]
    UnknownBackend(String),

    #[error("backend `{0}` is not available in this build or on this platform")]
    UnsupportedBackend(&'static str),
}

/// Problems with a sequence source.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot read source: {0}")]
    Io(#[from] io::Error),

    #[error("missing declared length")]
    MissingLength,

    #[error("declared length `{0}` is not a non-negative integer")]
    InvalidLength(String),

    #[error("invalid symbol {symbol:?} at position {position}")]
    InvalidSymbol { symbol: char, position: usize },

    #[error("declared length {declared} but found {actual} symbols")]
    LengthMismatch { declared: usize, actual: usize },
}

/// Failures to set up the execution units or their shared state.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to build worker thread pool: {0}")]
    ThreadPool(String),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("failed to map shared memory ({bytes} bytes): {source}")]
    SharedMemory {
        bytes: usize,
        #[source]
        source: io::Error,
    },

    #[error("fork failed for worker {worker}: {source}")]
    Fork {
        worker: usize,
        #[source]
        source: io::Error,
    },

    #[error("waiting for worker processes failed: {0}")]
    Wait(#[source] io::Error),
}

/// A barrier wait observed a state that no correct sequence of waits can
/// produce (more arrivals than participants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("barrier saw {arrived} arrivals for {participants} participants")]
pub struct SyncError {
    pub arrived: u32,
    pub participants: u32,
}

impl LcsError {
    /// Attach a source path to an input error.
    pub fn input(path: impl Into<PathBuf>, source: InputError) -> Self {
        LcsError::Input {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error class.
    pub fn exit_code(&self) -> i32 {
        match self {
            LcsError::Config(_) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_error_names_the_source() {
        let err = LcsError::input("seq1.txt", InputError::MissingLength);
        assert_eq!(
            err.to_string(),
            "input error in seq1.txt: missing declared length"
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn config_errors_exit_with_usage_code() {
        let err: LcsError = ConfigError::ZeroWorkers.into();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("at least 1"));
    }
}
