use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::bounds::estimate_bounds;
use crate::collector::ResultCollector;
use crate::config::SearchParams;
use crate::model::{
    BoundsReport, Cents, Combination, Item, Progress, SearchResult, StreamSummary, Window,
};

/// Cooperative stop flag shared between a search and its controller.
pub type CancelToken = Arc<AtomicBool>;

/// Progress fires every this many evaluated candidates.
pub const PROGRESS_INTERVAL: u64 = 1000;

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// One search over a borrowed item pool.
///
/// Consumed items are dropped from the pool up front; the items themselves
/// are never modified. Sizes are walked in ascending order inside the range
/// left by [`estimate_bounds`], and subsets of a size in index-lexicographic
/// order over the pool, so the discovery order is fully deterministic.
pub struct Solver<'a> {
    pool: Vec<&'a Item>,
    target: Cents,
    tolerance: Cents,
    window: Window,
    min_size: usize,
    max_size: usize,
    max_results: usize,
    bounds: BoundsReport,
    cancel: CancelToken,
}

impl<'a> Solver<'a> {
    pub fn new(items: &'a [Item], params: &SearchParams) -> Self {
        let pool: Vec<&Item> = items.iter().filter(|i| !i.consumed).collect();
        let tolerance = params.tolerance.abs();
        let window = Window::around(params.target, tolerance);
        let min_size = params.min_size.max(1);

        let values: Vec<Cents> = pool.iter().map(|i| i.value).collect();
        let bounds = estimate_bounds(&values, window, min_size, params.max_size);

        Self {
            max_size: params.max_size.min(pool.len()),
            pool,
            target: params.target,
            tolerance,
            window,
            min_size,
            max_results: params.max_results,
            bounds,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an existing stop flag instead of the solver's own.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        Arc::clone(&self.cancel)
    }

    pub fn stop(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn bounds(&self) -> &BoundsReport {
        &self.bounds
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    /// Batch search without progress reporting.
    pub fn find_combinations(&self) -> SearchResult {
        self.find_combinations_with_progress(|_| {})
    }

    /// Batch search. The cap is checked only once a size is exhausted, so
    /// the size in progress is always enumerated to the end.
    pub fn find_combinations_with_progress(
        &self,
        mut on_progress: impl FnMut(Progress),
    ) -> SearchResult {
        let mut walk = self.walk();
        let mut collector = ResultCollector::new(self.max_results);

        while let Some(step) = walk.step() {
            if let Some(combination) = step.accepted {
                collector.add(combination);
            }
            if walk.checked % PROGRESS_INTERVAL == 0 {
                on_progress(walk.progress());
            }
            if step.last_in_size && collector.is_full() {
                log::debug!("result cap {} reached after size {}", self.max_results, walk.size);
                break;
            }
        }

        let (combinations, total_found) = collector.finish();
        log::info!(
            "search finished: {} found, {} kept, {} checked{}",
            total_found,
            combinations.len(),
            walk.checked,
            if walk.cancelled { " (cancelled)" } else { "" }
        );

        SearchResult {
            combinations,
            target: self.target,
            tolerance: self.tolerance,
            min_size: self.min_size,
            max_size: self.max_size,
            max_results: self.max_results,
            total_found,
            total_checked: walk.checked,
            cancelled: walk.cancelled,
            bounds: self.bounds.clone(),
        }
    }

    /// Lazy search yielding each match as it is found. Stops as soon as
    /// `max_results` matches were yielded, even in the middle of a size.
    pub fn stream(&self) -> MatchStream<'_> {
        MatchStream {
            walk: self.walk(),
            found: 0,
            max_results: self.max_results as u64,
            on_progress: None,
        }
    }

    fn walk(&self) -> Walk<'_> {
        Walk {
            pool: &self.pool,
            target: self.target,
            window: self.window,
            next_size: self.bounds.effective_min,
            last_size: self.bounds.effective_max,
            size: 0,
            cursor: Vec::new(),
            checked: 0,
            cancel: &self.cancel,
            cancelled: false,
        }
    }
}

// ---------------------------------------------------------------------------
// MatchStream
// ---------------------------------------------------------------------------

pub struct MatchStream<'s> {
    walk: Walk<'s>,
    found: u64,
    max_results: u64,
    on_progress: Option<Box<dyn FnMut(Progress) + Send + 's>>,
}

impl<'s> MatchStream<'s> {
    pub fn with_progress(mut self, on_progress: impl FnMut(Progress) + Send + 's) -> Self {
        self.on_progress = Some(Box::new(on_progress));
        self
    }

    pub fn total_found(&self) -> u64 {
        self.found
    }

    pub fn total_checked(&self) -> u64 {
        self.walk.checked
    }

    pub fn summary(&self) -> StreamSummary {
        StreamSummary {
            total_found: self.found,
            total_checked: self.walk.checked,
            cancelled: self.walk.cancelled,
        }
    }
}

impl Iterator for MatchStream<'_> {
    type Item = Combination;

    fn next(&mut self) -> Option<Combination> {
        loop {
            if self.found >= self.max_results {
                return None;
            }
            let step = self.walk.step()?;
            if self.walk.checked % PROGRESS_INTERVAL == 0 {
                if let Some(on_progress) = self.on_progress.as_mut() {
                    on_progress(self.walk.progress());
                }
            }
            if let Some(combination) = step.accepted {
                self.found += 1;
                return Some(combination);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Walk: shared enumeration core
// ---------------------------------------------------------------------------

struct Step {
    accepted: Option<Combination>,
    last_in_size: bool,
}

struct Walk<'s> {
    pool: &'s [&'s Item],
    target: Cents,
    window: Window,
    next_size: usize,
    last_size: usize,
    /// Size currently being enumerated.
    size: usize,
    /// Indices of the next candidate; empty between sizes.
    cursor: Vec<usize>,
    checked: u64,
    cancel: &'s AtomicBool,
    cancelled: bool,
}

impl Walk<'_> {
    /// Evaluate one candidate. `None` once every size is exhausted or the
    /// stop flag was seen.
    fn step(&mut self) -> Option<Step> {
        if self.cancel.load(Ordering::Relaxed) {
            if !self.cancelled {
                log::debug!("search cancelled at size {} after {} checks", self.size, self.checked);
            }
            self.cancelled = true;
            return None;
        }

        if self.cursor.is_empty() {
            if self.next_size > self.last_size || self.next_size > self.pool.len() {
                return None;
            }
            self.size = self.next_size;
            self.next_size += 1;
            self.cursor.extend(0..self.size);
            log::trace!("enumerating size {}", self.size);
        }

        self.checked += 1;
        let sum: Cents = self.cursor.iter().map(|&i| self.pool[i].value).sum();
        let accepted = self.window.contains(sum).then(|| {
            let items = self.cursor.iter().map(|&i| self.pool[i].clone()).collect();
            Combination::new(items, self.target)
        });

        let last_in_size = !next_combination(&mut self.cursor, self.pool.len());
        if last_in_size {
            self.cursor.clear();
        }

        Some(Step { accepted, last_in_size })
    }

    fn progress(&self) -> Progress {
        Progress { size: self.size, checked: self.checked }
    }
}

/// Advance `indices` to the next k-subset of `0..n` in lexicographic order.
/// Returns `false` when `indices` already held the last one.
fn next_combination(indices: &mut [usize], n: usize) -> bool {
    let k = indices.len();
    for i in (0..k).rev() {
        if indices[i] < n - k + i {
            indices[i] += 1;
            for j in i + 1..k {
                indices[j] = indices[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

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

    fn params(target: f64, tolerance: f64, min: usize, max: usize, cap: usize) -> SearchParams {
        SearchParams::new(Cents::from_f64(target))
            .with_tolerance(Cents::from_f64(tolerance))
            .with_sizes(min, max)
            .with_max_results(cap)
    }

    fn values(c: &Combination) -> Vec<i64> {
        c.items().iter().map(|i| i.value.0 / 100).collect()
    }

    #[test]
    fn next_combination_is_lexicographic() {
        let mut idx = vec![0, 1];
        let mut seen = vec![idx.clone()];
        while next_combination(&mut idx, 4) {
            seen.push(idx.clone());
        }
        assert_eq!(
            seen,
            vec![vec![0, 1], vec![0, 2], vec![0, 3], vec![1, 2], vec![1, 3], vec![2, 3]]
        );
    }

    #[test]
    fn exact_pairs() {
        let pool = items(&[100.0, 200.0, 300.0, 400.0]);
        let result = Solver::new(&pool, &params(500.0, 0.0, 1, 4, 10)).find_combinations();
        assert_eq!(result.combinations.len(), 2);
        assert_eq!(result.total_found, 2);
        assert_eq!(values(&result.combinations[0]), vec![100, 400]);
        assert_eq!(values(&result.combinations[1]), vec![200, 300]);
        for c in &result.combinations {
            assert_eq!(c.size(), 2);
            assert_eq!(c.difference(), Cents::ZERO);
        }
    }

    #[test]
    fn tolerance_window_excludes_outside_sums() {
        let pool = items(&[100.0, 200.0, 300.0, 400.0]);
        let result = Solver::new(&pool, &params(500.0, 50.0, 1, 4, 10)).find_combinations();
        assert_eq!(result.combinations.len(), 2);
        assert!(result.combinations.iter().all(|c| c.sum() == Cents(50000)));
    }

    #[test]
    fn infeasible_bounds_skip_enumeration() {
        let pool = items(&[1.0; 10]);
        let solver = Solver::new(&pool, &params(100.0, 0.0, 1, 10, 10));
        assert!(solver.bounds().infeasible);
        let result = solver.find_combinations();
        assert_eq!(result.total_checked, 0);
        assert!(result.is_empty());
        assert_eq!(solver.stream().count(), 0);
    }

    #[test]
    fn cap_keeps_counting() {
        let pool = items(&[5.0, 5.0, 5.0]);
        let result = Solver::new(&pool, &params(5.0, 0.0, 1, 3, 1)).find_combinations();
        assert_eq!(result.total_found, 3);
        assert_eq!(result.combinations.len(), 1);
        assert!(result.truncated());
    }

    #[test]
    fn batch_finishes_current_size() {
        // Size 1 holds two matches; cap 1 stops before size 2 only.
        let pool = items(&[10.0, 10.0, 3.0, 7.0]);
        let result = Solver::new(&pool, &params(10.0, 0.0, 1, 4, 1)).find_combinations();
        assert_eq!(result.total_checked, 4);
        assert_eq!(result.total_found, 2);
        assert_eq!(result.combinations.len(), 1);
    }

    #[test]
    fn stream_stops_mid_size() {
        let pool = items(&[10.0, 10.0, 3.0, 7.0]);
        let solver = Solver::new(&pool, &params(10.0, 0.0, 1, 4, 1));
        let mut stream = solver.stream();
        let first = stream.next().unwrap();
        assert_eq!(first.items()[0].position, Position::line(0));
        assert!(stream.next().is_none());
        assert_eq!(stream.total_checked(), 1);
        assert_eq!(stream.summary().total_found, 1);
    }

    #[test]
    fn consumed_items_never_match() {
        let mut pool = items(&[100.0, 400.0, 200.0, 300.0]);
        pool[0].consumed = true;
        let result = Solver::new(&pool, &params(500.0, 0.0, 1, 4, 10)).find_combinations();
        assert_eq!(result.combinations.len(), 1);
        assert_eq!(values(&result.combinations[0]), vec![200, 300]);
        assert_eq!(result.max_size, 3);
    }

    #[test]
    fn negative_tolerance_is_absolute() {
        let pool = items(&[95.0]);
        let result = Solver::new(&pool, &params(100.0, -5.0, 1, 1, 10)).find_combinations();
        assert_eq!(result.tolerance, Cents(500));
        assert_eq!(result.combinations.len(), 1);
    }

    #[test]
    fn extreme_values_saturate_instead_of_overflowing() {
        let big = i64::MAX - 1;
        let pool = vec![
            Item::new(Cents(big), Position::line(0)),
            Item::new(Cents(big), Position::line(1)),
            Item::new(Cents(-big), Position::line(2)),
        ];
        let params = SearchParams::new(Cents::ZERO).with_sizes(1, 3);
        let solver = Solver::new(&pool, &params);
        assert_eq!(solver.bounds().effective_max, 2);

        // big + big saturates and falls outside [0, 0].
        let result = solver.find_combinations();
        assert_eq!(result.total_found, 2);
        assert!(result.combinations.iter().all(|c| c.sum() == Cents::ZERO));
        assert_eq!(solver.stream().count(), 2);
    }

    #[test]
    fn stop_before_run_checks_nothing() {
        let pool = items(&[1.0, 2.0, 3.0]);
        let solver = Solver::new(&pool, &params(3.0, 0.0, 1, 3, 10));
        solver.stop();
        let result = solver.find_combinations();
        assert!(result.cancelled);
        assert_eq!(result.total_checked, 0);
    }

    #[test]
    fn stop_from_progress_callback() {
        let pool = items(&[1.0; 20]);
        let solver = Solver::new(&pool, &params(5.0, 0.0, 1, 20, 10_000));
        let token = solver.cancel_token();
        let mut ticks = Vec::new();
        let result = solver.find_combinations_with_progress(|p| {
            ticks.push(p);
            token.store(true, Ordering::Relaxed);
        });
        assert!(result.cancelled);
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].checked, PROGRESS_INTERVAL);
        assert_eq!(result.total_checked, PROGRESS_INTERVAL);
    }

    #[test]
    fn progress_every_thousand_candidates() {
        // C(15, 5) = 3003 candidates at size 5 only.
        let pool = items(&[1.0; 15]);
        let solver = Solver::new(&pool, &params(5.0, 0.0, 5, 5, 1));
        let mut ticks = Vec::new();
        let result = solver.find_combinations_with_progress(|p| ticks.push(p));
        assert_eq!(result.total_checked, 3003);
        assert_eq!(ticks.len(), 3);
        assert!(ticks.iter().all(|p| p.size == 5));
        assert_eq!(ticks[2].checked, 3000);
    }
}
