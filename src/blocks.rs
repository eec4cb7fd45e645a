//! Static column partitioning.
//!
//! Each `ColumnBlock` is the closed interval [start, end] of columns one
//! worker fills every round. A `Partition` covers [1, M] exactly once.

use std::ops::RangeInclusive;

use crate::error::ConfigError;

/// Closed column interval assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnBlock {
    /// Worker index in partition order.
    pub worker: usize,
    /// First column, inclusive (>= 1).
    pub start: usize,
    /// Last column, inclusive.
    pub end: usize,
}

impl ColumnBlock {
    /// Number of columns in the block.
    #[inline]
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn columns(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// The full assignment of columns [1, M] to W workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    blocks: Vec<ColumnBlock>,
}

impl Partition {
    /// Split `columns` into `workers` contiguous blocks of `columns / workers`
    /// columns; the last block absorbs the remainder.
    ///
    /// Requires `1 <= workers <= columns`.
    pub fn new(columns: usize, workers: usize) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if workers > columns {
            return Err(ConfigError::TooManyWorkers { columns, workers });
        }

        let block = columns / workers;
        let remainder = columns - block * workers;
        let blocks = (0..workers)
            .map(|worker| {
                let start = worker * block + 1;
                let mut end = start + block - 1;
                if worker == workers - 1 {
                    end += remainder;
                }
                ColumnBlock { worker, start, end }
            })
            .collect();

        Ok(Self { blocks })
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn blocks(&self) -> &[ColumnBlock] {
        &self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainder_goes_to_last_block() {
        let p = Partition::new(10, 3).unwrap();
        let spans: Vec<(usize, usize)> = p.blocks().iter().map(|b| (b.start, b.end)).collect();
        assert_eq!(spans, vec![(1, 3), (4, 6), (7, 10)]);
        assert_eq!(p.blocks()[2].len(), 4);
    }

    #[test]
    fn one_worker_takes_everything() {
        let p = Partition::new(7, 1).unwrap();
        assert_eq!(
            p.blocks(),
            &[ColumnBlock {
                worker: 0,
                start: 1,
                end: 7
            }]
        );
    }

    #[test]
    fn one_column_per_worker() {
        let p = Partition::new(4, 4).unwrap();
        assert!(p.blocks().iter().all(|b| b.len() == 1 && b.start == b.end));
    }

    #[test]
    fn rejects_zero_and_excess_workers() {
        assert_eq!(Partition::new(5, 0), Err(ConfigError::ZeroWorkers));
        assert_eq!(
            Partition::new(3, 4),
            Err(ConfigError::TooManyWorkers {
                columns: 3,
                workers: 4
            })
        );
        assert!(Partition::new(0, 1).is_err());
    }
}
