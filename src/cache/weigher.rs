//! Entry weight estimators.
//!
//! A weigher estimates the memory cost of a cached `(query, candidates)` pair.
//! Only relative sizes matter: the cache compares the sum of weights against
//! its configured budget.

use crate::candidate::CandidateSet;
use std::sync::Arc;

/// Shared weight function for cache entries.
pub type Weigher<Q, L> = Arc<dyn Fn(&Q, &CandidateSet<L>) -> usize + Send + Sync>;

/// One unit for the entry plus one per candidate.
pub fn unit_weight<Q, L>(_query: &Q, candidates: &CandidateSet<L>) -> usize
where
    L: crate::candidate::Key,
{
    1 + candidates.len()
}

/// Approximate heap footprint of string keys and candidates.
///
/// Two references for the entry, UTF-16 code units for the key, and a
/// reference plus UTF-16 code units for every candidate.
pub fn string_weight<Q, L>(query: &Q, candidates: &CandidateSet<L>) -> usize
where
    Q: AsRef<str>,
    L: AsRef<str> + crate::candidate::Key,
{
    let key_cost = 4 * 2 + 2 * utf16_len(query.as_ref());
    candidates
        .iter()
        .fold(key_cost, |sum, candidate| sum + 4 + 2 * utf16_len(candidate.as_ref()))
}

fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_weight() {
        let empty: CandidateSet<u8> = CandidateSet::new();
        assert_eq!(unit_weight(&"q", &empty), 1);
        assert_eq!(unit_weight(&"q", &[1u8, 2, 3].into_iter().collect()), 4);
    }

    #[test]
    fn test_string_weight() {
        let candidates: CandidateSet<String> = ["/m/0d6lp".to_string()].into_iter().collect();
        // 8 + 2*5 for the key, 4 + 2*8 for the one candidate
        assert_eq!(string_weight(&"Paris".to_string(), &candidates), 18 + 20);
    }

    #[test]
    fn test_string_weight_counts_utf16_units() {
        let none: CandidateSet<String> = CandidateSet::new();
        assert_eq!(string_weight(&"Zürich".to_string(), &none), 8 + 12);
    }
}
