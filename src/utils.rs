//! Assorted utilities and helpers.

use std::num::NonZeroUsize;
use std::thread;

/// Worker count used when the caller does not pick one.
///
/// Falls back to 1 when the platform cannot report its parallelism.
#[inline]
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Classic full-table LCS length, used as the reference the engine is
/// checked against. O(|s| x |t|) time and space.
pub fn classic_lcs_len(s: &[u8], t: &[u8]) -> u32 {
    let n = s.len();
    let m = t.len();
    let mut dp = vec![vec![0u32; m + 1]; n + 1];
    for i in 1..=n {
        for j in 1..=m {
            dp[i][j] = if s[i - 1] == t[j - 1] {
                dp[i - 1][j - 1] + 1
            } else {
                dp[i - 1][j].max(dp[i][j - 1])
            };
        }
    }
    dp[n][m]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_workers_is_positive() {
        assert!(default_workers() >= 1);
    }

    #[test]
    fn classic_basic_cases() {
        assert_eq!(classic_lcs_len(b"", b""), 0);
        assert_eq!(classic_lcs_len(b"A", b""), 0);
        assert_eq!(classic_lcs_len(b"A", b"A"), 1);
        assert_eq!(classic_lcs_len(b"AAAA", b"TTTT"), 0);
        assert_eq!(classic_lcs_len(b"GATTACA", b"TACA"), 4);
    }

    #[test]
    fn classic_is_symmetric() {
        let s = b"ACCGGTCGAGTGCGCGGAAGCCGGCCGAA";
        let t = b"GTCGTTCGGAATGCCGTTGCTCTGTAAA";
        assert_eq!(classic_lcs_len(s, t), 20);
        assert_eq!(classic_lcs_len(t, s), 20);
    }
}
