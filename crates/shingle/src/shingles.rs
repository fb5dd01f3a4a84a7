//! Whitespace tokenization and shingle hashing.
//!
//! A shingle is `w` consecutive whitespace-delimited tokens joined by a single
//! ASCII space. Each shingle is hashed with XXH3-64 over its UTF-8 bytes, so
//! the hash is sensitive to token order and to token boundaries.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Default seed used for shingle hashing.
///
/// Fingerprints computed with different seeds live in unrelated hash spaces
/// and must never be compared with each other.
pub const DEFAULT_SEED: u64 = 0;

/// How the shingle window behaves near the end of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShingleMode {
    /// Emit only complete windows: start indices `0..=T-w`. Documents with
    /// fewer than `w` tokens produce no shingles.
    #[default]
    Strict,
    /// Legacy behavior: start indices run over `0..T` and trailing windows
    /// are truncated to the remaining tokens.
    TrailingPartial,
}

/// Split `text` on Unicode whitespace.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Hash a single shingle given as its already-joined text.
#[inline]
pub fn hash_shingle(shingle: &str, seed: u64) -> u64 {
    xxh3_64_with_seed(shingle.as_bytes(), seed)
}

/// Hash every shingle of width `w` over `tokens`, in document order.
///
/// Duplicate shingles produce duplicate hashes here; deduplication is the
/// fingerprint's job. A width of zero yields nothing.
pub fn shingle_hashes<S: AsRef<str>>(
    tokens: &[S],
    w: usize,
    mode: ShingleMode,
    seed: u64,
) -> Vec<u64> {
    let n = tokens.len();
    if w == 0 || n == 0 {
        return Vec::new();
    }

    let starts = match mode {
        ShingleMode::Strict => {
            if n < w {
                return Vec::new();
            }
            n - w + 1
        }
        ShingleMode::TrailingPartial => n,
    };

    // One scratch buffer for the whole document; shingles are rebuilt in place.
    let mut scratch = String::new();
    let mut out = Vec::with_capacity(starts);
    for start in 0..starts {
        let end = start.saturating_add(w).min(n);
        scratch.clear();
        for (i, token) in tokens[start..end].iter().enumerate() {
            if i > 0 {
                scratch.push(' ');
            }
            scratch.push_str(token.as_ref());
        }
        out.push(hash_shingle(&scratch, seed));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_collapses_any_whitespace() {
        assert_eq!(tokenize("  a\tb\n\nc  "), vec!["a", "b", "c"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn strict_window_count() {
        let tokens = vec!["a", "b", "c", "d", "e"];
        let hashes = shingle_hashes(&tokens, 3, ShingleMode::Strict, DEFAULT_SEED);
        assert_eq!(hashes.len(), 3);
    }

    #[test]
    fn strict_short_document_is_empty() {
        let tokens = vec!["a", "b"];
        assert!(shingle_hashes(&tokens, 3, ShingleMode::Strict, DEFAULT_SEED).is_empty());
    }

    #[test]
    fn strict_exact_width_gives_one_shingle() {
        let tokens = vec!["a", "b", "c"];
        let hashes = shingle_hashes(&tokens, 3, ShingleMode::Strict, DEFAULT_SEED);
        assert_eq!(hashes, vec![hash_shingle("a b c", DEFAULT_SEED)]);
    }

    #[test]
    fn zero_width_yields_nothing() {
        let tokens = vec!["a", "b", "c"];
        assert!(shingle_hashes(&tokens, 0, ShingleMode::Strict, DEFAULT_SEED).is_empty());
        assert!(shingle_hashes(&tokens, 0, ShingleMode::TrailingPartial, DEFAULT_SEED).is_empty());
    }

    #[test]
    fn trailing_partial_emits_truncated_windows() {
        let tokens = vec!["a", "b", "c"];
        let hashes = shingle_hashes(&tokens, 2, ShingleMode::TrailingPartial, DEFAULT_SEED);
        assert_eq!(
            hashes,
            vec![
                hash_shingle("a b", DEFAULT_SEED),
                hash_shingle("b c", DEFAULT_SEED),
                hash_shingle("c", DEFAULT_SEED),
            ]
        );
    }

    #[test]
    fn trailing_partial_short_document_is_not_empty() {
        let tokens = vec!["a", "b"];
        let hashes = shingle_hashes(&tokens, 5, ShingleMode::TrailingPartial, DEFAULT_SEED);
        assert_eq!(hashes.len(), 2);
    }

    #[test]
    fn huge_width_does_not_overflow() {
        let tokens = vec!["a", "b", "c"];
        assert!(shingle_hashes(&tokens, usize::MAX, ShingleMode::Strict, DEFAULT_SEED).is_empty());
        let hashes = shingle_hashes(&tokens, usize::MAX, ShingleMode::TrailingPartial, DEFAULT_SEED);
        assert_eq!(
            hashes,
            vec![
                hash_shingle("a b c", DEFAULT_SEED),
                hash_shingle("b c", DEFAULT_SEED),
                hash_shingle("c", DEFAULT_SEED),
            ]
        );
    }

    #[test]
    fn hash_is_order_sensitive() {
        let forward = shingle_hashes(&["x", "y"], 2, ShingleMode::Strict, DEFAULT_SEED);
        let reverse = shingle_hashes(&["y", "x"], 2, ShingleMode::Strict, DEFAULT_SEED);
        assert_ne!(forward, reverse);
    }

    #[test]
    fn hash_respects_token_boundaries() {
        // "ab c" and "a bc" share bytes but not tokens.
        let left = shingle_hashes(&["ab", "c"], 2, ShingleMode::Strict, DEFAULT_SEED);
        let right = shingle_hashes(&["a", "bc"], 2, ShingleMode::Strict, DEFAULT_SEED);
        assert_ne!(left, right);
    }

    #[test]
    fn seed_changes_hash_space() {
        assert_ne!(hash_shingle("a b", 1), hash_shingle("a b", 2));
    }

    #[test]
    fn works_with_owned_tokens() {
        let tokens: Vec<String> = (0..100).map(|i| format!("token{i}")).collect();
        let hashes = shingle_hashes(&tokens, 10, ShingleMode::Strict, DEFAULT_SEED);
        assert_eq!(hashes.len(), 91);
    }

    #[test]
    fn mode_serde_names() {
        assert_eq!(
            serde_json::to_string(&ShingleMode::TrailingPartial).unwrap(),
            "\"trailing_partial\""
        );
        let mode: ShingleMode = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(mode, ShingleMode::Strict);
    }
}
