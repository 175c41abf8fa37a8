//! Run statistics and token accounting.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Counts tokens with the `cl100k_base` encoding.
pub struct TokenCounter {
    bpe: Option<tiktoken_rs::CoreBPE>,
}

impl TokenCounter {
    /// Load the `cl100k_base` encoding. If it cannot be loaded, counts fall
    /// back to whitespace-separated words.
    pub fn new() -> Self {
        let bpe = match tiktoken_rs::cl100k_base() {
            Ok(bpe) => Some(bpe),
            Err(e) => {
                warn!(error = %e, "Failed to load cl100k_base encoding, counting words");
                None
            }
        };
        Self { bpe }
    }

    /// Shared instance.
    pub fn global() -> &'static TokenCounter {
        lazy_static::lazy_static! {
            static ref COUNTER: TokenCounter = TokenCounter::new();
        }
        &COUNTER
    }

    pub fn count(&self, text: &str) -> usize {
        match &self.bpe {
            Some(bpe) => bpe.encode_ordinary(text).len(),
            None => text.split_whitespace().count(),
        }
    }
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters describing one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistillStats {
    /// Files in the related set, including the analyzed file
    pub files: usize,
    /// Indexed definitions across all related files
    pub symbols: usize,
    /// Call-graph edges
    pub edges: usize,
    /// Entries in the used set (FQNs and type names)
    pub used_symbols: usize,
    /// Tokens of every related file's original content
    pub original_tokens: usize,
    /// Tokens of the distilled output
    pub distilled_tokens: usize,
    /// Whether discovery stopped at the deadline
    pub timed_out: bool,
}

impl DistillStats {
    /// Fraction of tokens removed, in `0.0..=1.0`.
    pub fn reduction(&self) -> f64 {
        if self.original_tokens == 0 {
            return 0.0;
        }
        let kept = self.distilled_tokens.min(self.original_tokens) as f64;
        1.0 - kept / self.original_tokens as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tokens() {
        let counter = TokenCounter::global();
        assert_eq!(counter.count(""), 0);
        assert!(counter.count("def main():\n    helper()\n") > 3);
    }

    #[test]
    fn test_reduction() {
        let stats = DistillStats {
            original_tokens: 200,
            distilled_tokens: 50,
            ..Default::default()
        };
        assert!((stats.reduction() - 0.75).abs() < f64::EPSILON);
        assert_eq!(DistillStats::default().reduction(), 0.0);
    }
}
