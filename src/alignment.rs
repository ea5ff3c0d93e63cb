//! Disjoint/excess classification of two innovation-marker sets.

use std::collections::HashSet;

/// Result of aligning two marker sets: how many markers fall outside the
/// overlap of the two genomes' historical ranges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GeneAlignment {
    /// Markers present in exactly one set, within the range both sets cover.
    pub disjoint: usize,
    /// Markers present in one set beyond the other set's maximum.
    pub excess: usize,
}

/// Classify the markers of two genomes into disjoint and excess counts.
///
/// Let `min_max` be the smaller of the two sets' maxima. Every marker up to
/// the larger maximum is disjoint if it is `<= min_max` and present in
/// exactly one set, and excess if it is `> min_max` and present in either.
/// Markers in both sets (matching genes) count as neither. Input ordering is
/// irrelevant.
///
/// An empty set covers no range at all, so every marker of the other set is
/// excess; two empty sets align perfectly.
pub fn align(xs: &[u64], ys: &[u64]) -> GeneAlignment {
    let xs: HashSet<u64> = xs.iter().copied().collect();
    let ys: HashSet<u64> = ys.iter().copied().collect();

    let (max_x, max_y) = match (xs.iter().max(), ys.iter().max()) {
        (Some(&x), Some(&y)) => (x, y),
        (Some(_), None) => {
            return GeneAlignment {
                disjoint: 0,
                excess: xs.len(),
            }
        }
        (None, Some(_)) => {
            return GeneAlignment {
                disjoint: 0,
                excess: ys.len(),
            }
        }
        (None, None) => return GeneAlignment::default(),
    };

    let max = max_x.max(max_y);
    let min_max = max_x.min(max_y);

    let mut disjoint = 0;
    let mut excess = 0;
    for marker in 0..=max {
        if marker <= min_max {
            if xs.contains(&marker) != ys.contains(&marker) {
                disjoint += 1;
            }
        } else if xs.contains(&marker) || ys.contains(&marker) {
            excess += 1;
        }
    }

    GeneAlignment { disjoint, excess }
}
