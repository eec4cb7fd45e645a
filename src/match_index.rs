//! Per-symbol "last match" index over the column sequence.
//!
//! `position(class, j)` is the largest 1-based position `p <= j` whose symbol
//! has the given class, or 0 when the symbol has not occurred in the first
//! `j` symbols. The table is built once and only read afterwards, so it can
//! be shared by reference across every worker.

use crate::alphabet::{Sequence, Symbol, NUM_CLASSES};

/// Flat `(NUM_CLASSES) x (columns + 1)` table, row-major by class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchIndex {
    columns: usize,
    table: Vec<u32>,
}

impl MatchIndex {
    /// Forward scan per symbol class. Class 0 stays all zeros.
    pub fn build(column_seq: &Sequence) -> Self {
        let columns = column_seq.len();
        let width = columns + 1;
        let mut table = vec![0u32; NUM_CLASSES * width];

        for symbol in Symbol::ALL {
            let row = &mut table[symbol.class() * width..(symbol.class() + 1) * width];
            for (j, &s) in column_seq.symbols().iter().enumerate() {
                let col = j + 1;
                row[col] = if s == symbol { col as u32 } else { row[col - 1] };
            }
        }

        Self { columns, table }
    }

    /// Number of columns M (the table has M + 1 entries per class).
    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Last-match row for one class, length `columns + 1`.
    #[inline]
    pub fn class_row(&self, class: usize) -> &[u32] {
        let width = self.columns + 1;
        &self.table[class * width..(class + 1) * width]
    }

    /// Last-match row for a symbol.
    #[inline]
    pub fn row(&self, symbol: Symbol) -> &[u32] {
        self.class_row(symbol.class())
    }

    #[inline]
    pub fn position(&self, class: usize, column: usize) -> u32 {
        self.class_row(class)[column]
    }
}
