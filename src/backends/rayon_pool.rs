//! Rayon backend: one parallel loop over the column blocks per round.
//!
//! Rounds run strictly one after another; the implicit join at the end of
//! each round's `for_each` plays the role of the barrier. Only the columns
//! of a row are spread across the pool, never the rows themselves.

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::error::{ResourceError, Result};
use crate::rows::{fill_block, ScoreRows};
use crate::traits::{LcsJob, Outcome, RowScheduler};

/// Scheduler running on a dedicated pool of exactly W rayon threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct RayonScheduler;

impl RowScheduler for RayonScheduler {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn run(&self, job: &LcsJob<'_>) -> Result<Outcome> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(job.workers())
            .thread_name(|i| format!("lcs-rayon-{i}"))
            .build()
            .map_err(|e| ResourceError::ThreadPool(e.to_string()))?;

        let mut rows = ScoreRows::new(job.columns());
        pool.install(|| {
            for round in 1..=job.rounds() {
                let last_match = job.last_match(round);
                let (previous, blocks) = rows.split_round(round, job.partition);
                blocks
                    .into_par_iter()
                    .for_each(|(block, out)| fill_block(last_match, previous, block, out));
            }
        });

        Ok(Outcome {
            score: rows.final_score(job.rounds()),
            barrier_faults: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Sequence;
    use crate::blocks::Partition;
    use crate::match_index::MatchIndex;

    #[test]
    fn matches_small_examples() {
        let cols: Sequence = "ACCGGTCGAG".parse().unwrap();
        let rows: Sequence = "GTCGTTCGGA".parse().unwrap();
        let index = MatchIndex::build(&cols);
        for w in 1..=cols.len() {
            let partition = Partition::new(cols.len(), w).unwrap();
            let job = LcsJob {
                index: &index,
                row_symbols: rows.symbols(),
                partition: &partition,
            };
            let outcome = RayonScheduler.run(&job).unwrap();
            assert_eq!(outcome.score, 6, "w = {w}");
        }
    }
}
