use crate::model::{Cents, Item, Window};

/// Cheap O(n) screen run before a search is built.
///
/// `false` guarantees no subset of the available (non-consumed) items can
/// land in `window`; `true` only means one might. Assumes non-negative
/// values.
pub fn quick_check_possible(items: &[Item], window: Window) -> bool {
    let mut available = items.iter().filter(|i| !i.consumed).map(|i| i.value);

    let Some(first) = available.next() else {
        return false;
    };
    let (min_value, total) = available.fold((first, first), |(min, total), v| (min.min(v), total + v));

    if min_value > window.upper {
        return false;
    }
    if total < window.lower {
        return false;
    }
    true
}

/// C(n, k). Zero when `k > n`.
pub fn combinations_for_size(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        // Exact at every step: result * (n - i) is divisible by (i + 1).
        result = result.saturating_mul((n - i) as u128) / (i + 1) as u128;
    }
    result
}

/// Total subsets a search over sizes `min_k..=max_k` would visit, before
/// any bounds pruning.
pub fn estimate_combinations(n: usize, min_k: usize, max_k: usize) -> u128 {
    (min_k..=max_k.min(n))
        .map(|k| combinations_for_size(n, k))
        .fold(0u128, u128::saturating_add)
}

/// Sum of every available value, used for diagnostics.
pub fn available_total(items: &[Item]) -> Cents {
    items.iter().filter(|i| !i.consumed).map(|i| i.value).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Position;

    fn items(values: &[f64]) -> Vec<Item> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Item::from_f64(*v, Position::line(i)))
            .collect()
    }

    fn window(target: f64, tolerance: f64) -> Window {
        Window::around(Cents::from_f64(target), Cents::from_f64(tolerance))
    }

    #[test]
    fn empty_pool_is_impossible() {
        assert!(!quick_check_possible(&[], window(10.0, 0.0)));
    }

    #[test]
    fn smallest_value_above_window() {
        let pool = items(&[60.0, 70.0]);
        assert!(!quick_check_possible(&pool, window(50.0, 5.0)));
        assert!(quick_check_possible(&pool, window(50.0, 10.0)));
    }

    #[test]
    fn total_below_window() {
        let pool = items(&[10.0, 20.0, 30.0]);
        assert!(!quick_check_possible(&pool, window(100.0, 39.99)));
        assert!(quick_check_possible(&pool, window(100.0, 40.0)));
    }

    #[test]
    fn consumed_items_are_ignored() {
        let mut pool = items(&[10.0, 500.0]);
        pool[1].consumed = true;
        assert!(!quick_check_possible(&pool, window(500.0, 0.0)));
        pool[0].consumed = true;
        assert!(!quick_check_possible(&pool, window(0.0, 100.0)));
    }

    #[test]
    fn possible_is_not_a_guarantee() {
        // Passes the screen although no subset hits 50.
        let pool = items(&[1.0, 100.0]);
        assert!(quick_check_possible(&pool, window(50.0, 0.0)));
    }

    #[test]
    fn large_pool_total_saturates() {
        let pool: Vec<Item> = (0..10_000)
            .map(|i| Item::new(Cents::MAX_AMOUNT, Position::line(i)))
            .collect();
        let window = Window::around(Cents::MAX_AMOUNT, Cents::ZERO);
        assert!(quick_check_possible(&pool, window));
        assert_eq!(available_total(&pool), Cents(i64::MAX));
    }

    #[test]
    fn binomial_counts() {
        assert_eq!(combinations_for_size(4, 2), 6);
        assert_eq!(combinations_for_size(10, 0), 1);
        assert_eq!(combinations_for_size(3, 4), 0);
        assert_eq!(combinations_for_size(40, 20), 137_846_528_820);
        assert_eq!(estimate_combinations(4, 1, 4), 15);
        assert_eq!(estimate_combinations(4, 2, 10), 11);
    }
}
