use std::collections::BTreeSet;

use crate::model::{BoundsReport, Cents, Window};

/// Narrow `[user_min, user_max]` to the sizes that can possibly land in
/// `window`.
///
/// The top-k values give the largest sum any k-subset can reach and the
/// bottom-k values give the smallest, so any size whose extremes miss the
/// window is unsatisfiable. Only sound for non-negative values.
pub fn estimate_bounds(
    values: &[Cents],
    window: Window,
    user_min: usize,
    user_max: usize,
) -> BoundsReport {
    let n = values.len();
    if n == 0 {
        return BoundsReport {
            requested_min: user_min,
            requested_max: user_max,
            effective_min: 1,
            effective_max: 0,
            skipped_sizes: BTreeSet::new(),
            infeasible: true,
        };
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    // Smallest k whose top-k sum reaches the lower edge.
    let mut running = Cents::ZERO;
    let mut reach_lower = None;
    for (i, v) in sorted.iter().rev().enumerate() {
        running += *v;
        if running >= window.lower {
            reach_lower = Some(i + 1);
            break;
        }
    }
    let effective_min = match reach_lower {
        Some(k) => k.max(user_min),
        None => (n + 1).max(user_min),
    };

    // First k whose bottom-k sum overshoots the upper edge.
    let cap = user_max.min(n);
    let mut running = Cents::ZERO;
    let mut effective_max = cap;
    for (i, v) in sorted.iter().enumerate() {
        running += *v;
        if running > window.upper {
            effective_max = i.min(cap);
            break;
        }
    }

    let effective = effective_min..=effective_max;
    let skipped_sizes: BTreeSet<usize> =
        (user_min..=user_max).filter(|s| !effective.contains(s)).collect();
    let infeasible = effective_min > effective_max;

    log::debug!(
        "bounds: requested {user_min}..={user_max}, effective {effective_min}..={effective_max}, {} skipped{}",
        skipped_sizes.len(),
        if infeasible { ", infeasible" } else { "" }
    );

    BoundsReport {
        requested_min: user_min,
        requested_max: user_max,
        effective_min,
        effective_max,
        skipped_sizes,
        infeasible,
    }
}
