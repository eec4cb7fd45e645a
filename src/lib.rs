//! Parallel LCS length over DNA sequences.
//!
//! This crate computes the length of the longest common subsequence of two
//! sequences over {A, T, C, G} one DP row at a time, splitting every row's
//! columns across a fixed pool of workers that meet at a barrier between
//! rows.
//!
//! ## Core idea
//! 1. Scan the column sequence once into a per-symbol "last match" table
//!    ([`MatchIndex`]).
//! 2. Keep only two score rows. Each column of a new row depends only on the
//!    previous row and the table, so a row splits into independent column
//!    blocks ([`Partition`]).
//! 3. Run one round per symbol of the row sequence; a barrier between rounds
//!    makes the previous row complete and visible before anyone reads it.
//!
//! Three backends drive the rounds ([`Backend`]): scoped threads, forked
//! processes over shared memory, and a rayon pool.
//!
//! ## Quick start
//! ```
//! use par_lcs::{LcsEngineBuilder, Sequence};
//!
//! let cols: Sequence = "GATTACA".parse().unwrap();
//! let rows: Sequence = "TACA".parse().unwrap();
//! let engine = LcsEngineBuilder::new().with_workers(3).build().unwrap();
//! assert_eq!(engine.score(&cols, &rows).unwrap(), 4);
//! ```

pub mod alphabet;
pub mod backends;
pub mod barrier;
pub mod blocks;
pub mod builder;
pub mod engine;
pub mod error;
pub mod loader;
pub mod match_index;
pub mod rows;
pub mod traits;
pub mod utils;

pub use crate::alphabet::{Sequence, Symbol};
pub use crate::blocks::{ColumnBlock, Partition};
pub use crate::builder::LcsEngineBuilder;
pub use crate::engine::{Backend, LcsEngine, RunReport};
pub use crate::error::{LcsError, Result};
pub use crate::match_index::MatchIndex;
pub use crate::traits::{LcsJob, Outcome, RowScheduler};
