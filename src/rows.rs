//! The row recurrence and the two-row rolling score buffer.
//!
//! Round `i` (1-based, one per symbol of the row sequence) reads physical row
//! `(i - 1) % 2` and writes physical row `i % 2`. Row 0 starts as the all-zero
//! base row, so after `N` rounds the answer sits in row `N % 2` at column `M`.
//!
//! Every column of a round depends only on the previous row and the
//! [`MatchIndex`](crate::match_index::MatchIndex), which is what lets a round
//! be split into disjoint column blocks without any per-column locking.
//!
//! Two storage flavours drive the same recurrence:
//! - [`ScoreRows`]: owned `u32` rows, handed out as a shared previous row and
//!   disjoint `&mut` blocks of the current row.
//! - [`AtomicRows`]: views of `AtomicU32` rows living in a `Vec` or a shared
//!   mapping. Stores are relaxed; the per-round barrier publishes them.

use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::blocks::{ColumnBlock, Partition};
use crate::match_index::MatchIndex;

/// Read access to one score row.
pub trait ScoreRow {
    fn score(&self, column: usize) -> u32;
}

impl ScoreRow for [u32] {
    #[inline(always)]
    fn score(&self, column: usize) -> u32 {
        self[column]
    }
}

impl ScoreRow for [AtomicU32] {
    #[inline(always)]
    fn score(&self, column: usize) -> u32 {
        self[column].load(Ordering::Relaxed)
    }
}

/// One cell of the recurrence, written without a data-dependent branch.
///
/// `last_match` is the last 1-based position at or before `column` where the
/// round's symbol occurs (0 if none). With `y = (last_match > 0)`:
/// `current = previous[column] + y * (previous[column] <= y * previous[last_match - 1])`.
#[inline(always)]
pub fn cell<R: ScoreRow + ?Sized>(previous: &R, last_match: u32, column: usize) -> u32 {
    let y = (last_match > 0) as u32;
    let up = previous.score(column);
    // last_match == 0 reads the base column, and the product zeroes it anyway.
    let diag = y * previous.score((last_match as usize).saturating_sub(1));
    let z = (up > diag) as u32;
    up + y * (1 - z)
}

/// Apply the recurrence to `columns`, handing every result to `write`.
///
/// `last_match` is the match-index row for the round's symbol.
#[inline]
pub fn fill_columns<R, F>(
    last_match: &[u32],
    previous: &R,
    columns: RangeInclusive<usize>,
    mut write: F,
) where
    R: ScoreRow + ?Sized,
    F: FnMut(usize, u32),
{
    for j in columns {
        write(j, cell(previous, last_match[j], j));
    }
}

/// Fill one worker's block of a plain row. `out` covers exactly the block.
#[inline]
pub fn fill_block(last_match: &[u32], previous: &[u32], block: &ColumnBlock, out: &mut [u32]) {
    debug_assert_eq!(out.len(), block.len());
    let start = block.start;
    fill_columns(last_match, previous, block.columns(), |j, v| out[j - start] = v);
}

/// Fill one worker's block of an atomic row. `out` covers exactly the block.
#[inline]
pub fn fill_block_atomic(
    last_match: &[u32],
    previous: &[AtomicU32],
    block: &ColumnBlock,
    out: &[AtomicU32],
) {
    debug_assert_eq!(out.len(), block.len());
    let start = block.start;
    fill_columns(last_match, previous, block.columns(), |j, v| {
        out[j - start].store(v, Ordering::Relaxed)
    });
}

/// Physical row written in `round` (1-based).
#[inline]
pub fn current_row(round: usize) -> usize {
    round % 2
}

/// Physical row read in `round` (1-based).
#[inline]
pub fn previous_row(round: usize) -> usize {
    (round + 1) % 2
}

/// Owned pair of `u32` rows of width `columns + 1`.
#[derive(Debug, Clone)]
pub struct ScoreRows {
    rows: [Vec<u32>; 2],
}

impl ScoreRows {
    pub fn new(columns: usize) -> Self {
        Self {
            rows: [vec![0; columns + 1], vec![0; columns + 1]],
        }
    }

    /// Previous row and the disjoint per-block slices of the current row.
    ///
    /// Each returned slice covers exactly its block, so a worker cannot
    /// touch a column it does not own.
    pub fn split_round<'a>(
        &'a mut self,
        round: usize,
        partition: &'a Partition,
    ) -> (&'a [u32], Vec<(&'a ColumnBlock, &'a mut [u32])>) {
        let [row0, row1] = &mut self.rows;
        let (previous, current): (&[u32], &mut [u32]) = if current_row(round) == 1 {
            (row0.as_slice(), row1.as_mut_slice())
        } else {
            (row1.as_slice(), row0.as_mut_slice())
        };

        // Column 0 is the base case and is never handed out.
        let mut rest = &mut current[1..];
        let mut slices = Vec::with_capacity(partition.workers());
        for block in partition.blocks() {
            let (mine, tail) = std::mem::take(&mut rest).split_at_mut(block.len());
            slices.push((block, mine));
            rest = tail;
        }
        (previous, slices)
    }

    /// Column `M` of the row holding round `rounds`.
    pub fn final_score(&self, rounds: usize) -> u32 {
        let row = &self.rows[current_row(rounds)];
        row[row.len() - 1]
    }
}

/// Borrowed pair of atomic rows of width `columns + 1`.
#[derive(Debug, Clone, Copy)]
pub struct AtomicRows<'a> {
    rows: [&'a [AtomicU32]; 2],
}

impl<'a> AtomicRows<'a> {
    /// Both rows must have the same width and start zeroed.
    pub fn new(row0: &'a [AtomicU32], row1: &'a [AtomicU32]) -> Self {
        debug_assert_eq!(row0.len(), row1.len());
        Self { rows: [row0, row1] }
    }

    #[inline]
    pub fn previous(&self, round: usize) -> &'a [AtomicU32] {
        self.rows[previous_row(round)]
    }

    /// Slice of the current row covering exactly `block`.
    #[inline]
    pub fn block(&self, round: usize, block: &ColumnBlock) -> &'a [AtomicU32] {
        &self.rows[current_row(round)][block.columns()]
    }

    pub fn final_score(&self, rounds: usize) -> u32 {
        self.rows[current_row(rounds)].score(self.rows[0].len() - 1)
    }
}

/// Allocate a zeroed atomic row.
pub fn atomic_row(columns: usize) -> Vec<AtomicU32> {
    (0..=columns).map(|_| AtomicU32::new(0)).collect()
}

/// Single-worker reference run of the same recurrence, no partitioning.
pub fn serial_score(index: &MatchIndex, row_seq: &[crate::alphabet::Symbol]) -> u32 {
    let m = index.columns();
    let mut previous = vec![0u32; m + 1];
    let mut current = vec![0u32; m + 1];
    for &symbol in row_seq {
        let last_match = index.row(symbol);
        fill_columns(last_match, previous.as_slice(), 1..=m, |j, v| current[j] = v);
        std::mem::swap(&mut previous, &mut current);
    }
    previous[m]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Sequence;

    fn seq(s: &str) -> Sequence {
        s.parse().unwrap()
    }

    #[test]
    fn cell_without_match_copies_previous() {
        let previous = [0u32, 1, 2, 2];
        assert_eq!(cell(&previous[..], 0, 3), 2);
    }

    #[test]
    fn cell_extends_when_match_improves() {
        // previous[p-1] = previous[j]: taking the match adds one.
        let previous = [0u32, 1, 1, 1];
        assert_eq!(cell(&previous[..], 3, 3), 2);
        // previous[p-1] < previous[j]: the match cannot improve the score.
        let previous = [0u32, 1, 2, 2];
        assert_eq!(cell(&previous[..], 1, 3), 2);
    }

    #[test]
    fn cell_match_at_first_column_reads_base_case() {
        let previous = [0u32, 0, 0];
        assert_eq!(cell(&previous[..], 1, 2), 1);
    }

    #[test]
    fn parity_alternates_rows() {
        assert_eq!((previous_row(1), current_row(1)), (0, 1));
        assert_eq!((previous_row(2), current_row(2)), (1, 0));
        assert_eq!(current_row(0), 0);
    }

    #[test]
    fn split_round_hands_out_disjoint_blocks() {
        let partition = Partition::new(7, 3).unwrap();
        let mut rows = ScoreRows::new(7);
        let (previous, slices) = rows.split_round(1, &partition);
        assert_eq!(previous.len(), 8);
        let lens: Vec<usize> = slices.iter().map(|(_, s)| s.len()).collect();
        assert_eq!(lens, vec![2, 2, 3]);
    }

    #[test]
    fn serial_matches_small_examples() {
        let cols = seq("ATCG");
        let index = MatchIndex::build(&cols);
        assert_eq!(serial_score(&index, seq("ATCG").symbols()), 4);
        assert_eq!(serial_score(&index, seq("GCTA").symbols()), 1);
        assert_eq!(serial_score(&index, &[]), 0);
    }

    #[test]
    fn atomic_rows_final_score_follows_parity() {
        let r0 = atomic_row(2);
        let r1 = atomic_row(2);
        r1[2].store(7, Ordering::Relaxed);
        let rows = AtomicRows::new(&r0, &r1);
        assert_eq!(rows.final_score(1), 7);
        assert_eq!(rows.final_score(2), 0);
    }
}
