//! The 4-symbol DNA alphabet and validated sequences over it.
//!
//! Symbols map to classes 1..=4; class 0 is reserved as the "no match"
//! sentinel so that match positions can stay 1-based.

use std::fmt;

use crate::error::InputError;

/// Number of symbols in the alphabet.
pub const ALPHABET_SIZE: usize = 4;

/// Number of symbol classes including the sentinel class 0.
pub const NUM_CLASSES: usize = ALPHABET_SIZE + 1;

/// One nucleotide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Symbol {
    A = 1,
    T = 2,
    C = 3,
    G = 4,
}

/// Byte -> symbol class (0 = not in the alphabet). Lowercase is accepted.
const CLASS_OF_BYTE: [u8; 256] = {
    let mut table = [0u8; 256];
    table[b'A' as usize] = 1;
    table[b'a' as usize] = 1;
    table[b'T' as usize] = 2;
    table[b't' as usize] = 2;
    table[b'C' as usize] = 3;
    table[b'c' as usize] = 3;
    table[b'G' as usize] = 4;
    table[b'g' as usize] = 4;
    table
};

impl Symbol {
    /// All symbols in class order.
    pub const ALL: [Symbol; ALPHABET_SIZE] = [Symbol::A, Symbol::T, Symbol::C, Symbol::G];

    /// Decode a byte, `None` if it is not A/T/C/G (either case).
    #[inline]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match CLASS_OF_BYTE[byte as usize] {
            0 => None,
            class => Some(Self::ALL[class as usize - 1]),
        }
    }

    /// Symbol class in 1..=4.
    #[inline]
    pub fn class(self) -> usize {
        self as usize
    }

    /// Uppercase ASCII letter.
    pub fn to_byte(self) -> u8 {
        match self {
            Symbol::A => b'A',
            Symbol::T => b'T',
            Symbol::C => b'C',
            Symbol::G => b'G',
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_byte() as char)
    }
}

/// An immutable sequence of symbols.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sequence {
    symbols: Vec<Symbol>,
}

impl Sequence {
    /// Validate raw bytes. Fails on the first byte outside the alphabet.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InputError> {
        let symbols = bytes
            .iter()
            .enumerate()
            .map(|(position, &b)| {
                Symbol::from_byte(b).ok_or(InputError::InvalidSymbol {
                    symbol: b as char,
                    position,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { symbols })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    #[inline]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Symbol at 0-based `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Symbol> {
        self.symbols.get(index).copied()
    }
}

impl From<Vec<Symbol>> for Sequence {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }
}

impl std::str::FromStr for Sequence {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.symbols {
            write!(f, "{s}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_are_one_based_and_distinct() {
        let classes: Vec<usize> = Symbol::ALL.iter().map(|s| s.class()).collect();
        assert_eq!(classes, vec![1, 2, 3, 4]);
    }

    #[test]
    fn mapping_is_total_over_bytes() {
        let accepted = (0u8..=255).filter(|&b| Symbol::from_byte(b).is_some()).count();
        assert_eq!(accepted, 8);
        assert_eq!(Symbol::from_byte(b'g'), Some(Symbol::G));
        assert_eq!(Symbol::from_byte(b'N'), None);
    }

    #[test]
    fn rejects_first_invalid_symbol() {
        let err = Sequence::from_bytes(b"ACGXN").unwrap_err();
        match err {
            InputError::InvalidSymbol { symbol, position } => {
                assert_eq!(symbol, 'X');
                assert_eq!(position, 3);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn display_normalises_case() {
        let seq: Sequence = "acGt".parse().unwrap();
        assert_eq!(seq.to_string(), "ACGT");
        assert_eq!(seq.len(), 4);
    }
}
