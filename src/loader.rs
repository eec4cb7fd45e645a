//! Reading sequence sources.
//!
//! A source is whitespace-separated text: a declared length followed by the
//! symbols, which may be wrapped over several lines.
//!
//! ```text
//! 12
//! ATCGGA
//! TTACGA
//! ```

use std::fs;
use std::path::Path;

use crate::alphabet::Sequence;
use crate::error::{InputError, LcsError, Result};

/// Parse a source held in memory.
pub fn parse_sequence(text: &str) -> std::result::Result<Sequence, InputError> {
    let mut tokens = text.split_whitespace();
    let declared_token = tokens.next().ok_or(InputError::MissingLength)?;
    let declared = declared_token
        .parse::<usize>()
        .map_err(|_| InputError::InvalidLength(declared_token.to_string()))?;

    // Sized from the text: the declared length is untrusted until counted.
    let mut symbols = String::with_capacity(text.len());
    for token in tokens {
        symbols.push_str(token);
    }
    let sequence = Sequence::from_bytes(symbols.as_bytes())?;
    if sequence.len() != declared {
        return Err(InputError::LengthMismatch {
            declared,
            actual: sequence.len(),
        });
    }
    Ok(sequence)
}

/// Read and parse one source file.
pub fn load_sequence(path: impl AsRef<Path>) -> Result<Sequence> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| LcsError::input(path, e.into()))?;
    let sequence = parse_sequence(&text).map_err(|e| LcsError::input(path, e))?;
    #[cfg(feature = "tracing")]
    tracing::debug!(path = %path.display(), len = sequence.len(), "loaded sequence");
    Ok(sequence)
}

/// Load both sources; both are validated before anything is computed.
///
/// The first source supplies the columns (M), the second the rows (N).
pub fn load_pair(
    first: impl AsRef<Path>,
    second: impl AsRef<Path>,
) -> Result<(Sequence, Sequence)> {
    let columns = load_sequence(first)?;
    let rows = load_sequence(second)?;
    Ok((columns, rows))
}
