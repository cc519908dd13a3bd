use crate::model::Combination;

/// Keeps at most `max_results` combinations while counting every match.
#[derive(Debug)]
pub struct ResultCollector {
    stored: Vec<Combination>,
    total_found: u64,
    max_results: usize,
}

impl ResultCollector {
    pub fn new(max_results: usize) -> Self {
        Self {
            stored: Vec::with_capacity(max_results.min(1024)),
            total_found: 0,
            max_results,
        }
    }

    /// Count the match; store it only while under the cap. Returns whether
    /// it was stored.
    pub fn add(&mut self, combination: Combination) -> bool {
        self.total_found += 1;
        if self.stored.len() < self.max_results {
            self.stored.push(combination);
            true
        } else {
            false
        }
    }

    pub fn is_full(&self) -> bool {
        self.stored.len() >= self.max_results
    }

    pub fn len(&self) -> usize {
        self.stored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stored.is_empty()
    }

    pub fn total_found(&self) -> u64 {
        self.total_found
    }

    /// Sorted combinations plus the total match count.
    pub fn finish(mut self) -> (Vec<Combination>, u64) {
        sort_combinations(&mut self.stored);
        (self.stored, self.total_found)
    }
}

/// Stable sort by (size, |difference|); ties keep discovery order.
pub fn sort_combinations(combinations: &mut [Combination]) {
    combinations.sort_by_key(|c| (c.size(), c.difference().abs()));
}
