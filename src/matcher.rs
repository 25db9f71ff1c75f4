//! Gap-tolerant template search over direction-code sequences.
//!
//! A template matches when its elements occur in order and at most `max_gap`
//! non-matching elements sit between two consecutive template elements. Every
//! start position is tried on its own, so a failed attempt never hides a later match.
//! Works on any element width; the pipeline runs it over `u8` codes.

use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    /// Leftmost window starting at or after the offset.
    #[default]
    Forward,
    /// Rightmost window ending at or before the offset.
    Reverse,
}

/// `start <= end` whatever the direction; both index the searched sequence.
#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct MatchResult {
    pub matched: bool,
    pub start: usize,
    pub end: usize,
    pub total_gap: usize,
    /// 1.0 for a contiguous match, 0.0 when every gap is at its maximum.
    pub confidence: f32,
}

impl MatchResult {
    fn found(a: usize, b: usize, total_gap: usize, pattern_len: usize, max_gap: usize) -> Self {
        let max_total = (pattern_len - 1) * max_gap;

        let confidence = if max_total == 0 {
            if total_gap == 0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - total_gap as f32 / max_total as f32
        };

        Self {
            matched: true,
            start: a.min(b),
            end: a.max(b),
            total_gap,
            confidence,
        }
    }
}

/// Searches `input` for `pattern` from `start` in `direction`.
///
/// A reverse search reads the template back to front, so the returned span is
/// the same one a forward search would report for that window.
pub fn find<T: Copy + PartialEq>(
    input: &[T],
    pattern: &[T],
    max_gap: usize,
    start: usize,
    direction: SearchDirection,
) -> MatchResult {
    if input.is_empty()
        || pattern.is_empty()
        || start >= input.len()
        || pattern.len() > input.len()
    {
        return MatchResult::default();
    }

    let found = match direction {
        SearchDirection::Forward => (start..=input.len() - pattern.len())
            .find_map(|s| attempt(input, pattern, max_gap, s, direction)),
        SearchDirection::Reverse => (pattern.len() - 1..=start)
            .rev()
            .find_map(|s| attempt(input, pattern, max_gap, s, direction)),
    };

    found.unwrap_or_default()
}

/// One anchored attempt with the first template element at `anchor`.
fn attempt<T: Copy + PartialEq>(
    input: &[T],
    pattern: &[T],
    max_gap: usize,
    anchor: usize,
    direction: SearchDirection,
) -> Option<MatchResult> {
    let element = |k: usize| match direction {
        SearchDirection::Forward => pattern[k],
        SearchDirection::Reverse => pattern[pattern.len() - 1 - k],
    };

    let advance = |pos: usize| match direction {
        SearchDirection::Forward => Some(pos + 1).filter(|&p| p < input.len()),
        SearchDirection::Reverse => pos.checked_sub(1),
    };

    if input[anchor] != element(0) {
        return None;
    }

    let mut pos = anchor;
    let mut total_gap = 0;

    for k in 1..pattern.len() {
        let want = element(k);
        let mut gap = 0;

        loop {
            pos = advance(pos)?;

            if input[pos] == want {
                break;
            }

            gap += 1;

            if gap > max_gap {
                return None;
            }
        }

        total_gap += gap;
    }

    Some(MatchResult::found(
        anchor,
        pos,
        total_gap,
        pattern.len(),
        max_gap,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    use SearchDirection::{Forward, Reverse};

    /// Deterministic pseudo-random codes in 0..4, dense enough to hit short patterns.
    fn codes(seed: u32, len: usize) -> Vec<u8> {
        let mut state = seed;

        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                ((state >> 16) % 4) as u8
            })
            .collect()
    }

    #[test]
    fn contiguous_match_without_gap() {
        let r = find(&[1u8, 2, 3, 3, 4], &[3, 4], 0, 0, Forward);

        assert!(r.matched);
        assert_eq!((r.start, r.end), (3, 4));
        assert_relative_eq!(r.confidence, 1.0);

        assert!(!find(&[3u8, 1, 4], &[3, 4], 0, 0, Forward).matched);
    }

    #[test]
    fn gaps_lower_confidence() {
        let r = find(&[3u16, 9, 3, 9, 9, 3], &[3, 3, 3], 2, 0, Forward);

        assert!(r.matched);
        assert_eq!((r.start, r.end), (0, 5));
        assert_eq!(r.total_gap, 3);
        assert_relative_eq!(r.confidence, 0.25);
    }

    #[test]
    fn gap_over_tolerance_fails() {
        assert!(!find(&[3u8, 9, 9, 9, 3], &[3, 3], 2, 0, Forward).matched);
    }

    #[test]
    fn failed_attempt_does_not_block_later_start() {
        let r = find(&[1u8, 9, 9, 9, 1, 2], &[1, 2], 1, 0, Forward);

        assert!(r.matched);
        assert_eq!((r.start, r.end), (4, 5));
    }

    #[test]
    fn forward_respects_offset() {
        let input = [5u8, 5, 0, 5, 5];

        assert_eq!(find(&input, &[5, 5], 0, 0, Forward).start, 0);
        assert_eq!(find(&input, &[5, 5], 0, 1, Forward).start, 3);
    }

    #[test]
    fn reverse_finds_rightmost_window() {
        let input = [1u8, 2, 0, 1, 2];

        let r = find(&input, &[1, 2], 0, 4, Reverse);
        assert!(r.matched);
        assert_eq!((r.start, r.end), (3, 4));

        let r = find(&input, &[1, 2], 0, 2, Reverse);
        assert!(r.matched);
        assert_eq!((r.start, r.end), (0, 1));
    }

    #[test]
    fn reverse_tolerates_gaps() {
        // corner shape: climb, turn, outward run
        let input = [3u8, 3, 3, 2, 1, 1, 1, 1, 1, 3, 3];
        let r = find(&input, &[3, 3, 2, 1, 1, 1], 4, input.len() - 1, Reverse);

        assert!(r.matched);
        assert_eq!(r.start, 1);
        assert!(r.end >= 6);
        assert!(r.start <= r.end);
    }

    #[test]
    fn invalid_queries_fail() {
        assert_eq!(find(&[1u8, 2], &[1], 0, 2, Forward), MatchResult::default());
        assert!(!find::<u8>(&[], &[1], 0, 0, Forward).matched);
        assert!(!find(&[1u8, 2], &[], 0, 0, Forward).matched);
        assert!(!find(&[1u8], &[1, 1], 3, 0, Forward).matched);
        assert!(!find(&[1u8, 1, 1], &[1, 1, 1], 0, 1, Reverse).matched);
    }

    #[test]
    fn zero_gap_matches_exactly_contiguous_runs() {
        let patterns: [&[u8]; 3] = [&[1, 2], &[3, 3, 3], &[0, 1, 2, 3]];

        for seed in 0..40 {
            let input = codes(seed, 60);

            for pattern in patterns {
                let expected = input.windows(pattern.len()).any(|w| w == pattern);
                let r = find(&input, pattern, 0, 0, Forward);

                assert_eq!(r.matched, expected, "seed {} pattern {:?}", seed, pattern);

                if r.matched {
                    assert_eq!(&input[r.start..=r.end], pattern);
                }
            }
        }
    }

    #[test]
    fn results_are_bounded_and_repeatable() {
        let pattern = [1u8, 1, 2, 3];

        for seed in 0..40 {
            let input = codes(seed, 80);

            for direction in [Forward, Reverse] {
                for start in [0, 20, 79] {
                    let r = find(&input, &pattern, 2, start, direction);

                    if r.matched {
                        assert!(r.start <= r.end);
                        assert!((0.0..=1.0).contains(&r.confidence));
                        assert_eq!(find(&input, &pattern, 2, start, direction), r);
                    }
                }
            }
        }
    }
}
