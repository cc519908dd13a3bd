use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::model::{Cents, Window};

/// Largest combination size accepted from callers.
pub const MAX_COMBINATION_SIZE: usize = 100;

/// Largest result cap accepted from callers.
pub const MAX_RESULTS_LIMIT: usize = 10_000;

// ---------------------------------------------------------------------------
// Search parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub target: Cents,
    #[serde(default)]
    pub tolerance: Cents,
    #[serde(default = "default_min_size")]
    pub min_size: usize,
    #[serde(default = "default_max_size")]
    pub max_size: usize,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_min_size() -> usize {
    1
}

fn default_max_size() -> usize {
    10
}

fn default_max_results() -> usize {
    100
}

impl SearchParams {
    pub fn new(target: Cents) -> Self {
        Self {
            target,
            tolerance: Cents::ZERO,
            min_size: default_min_size(),
            max_size: default_max_size(),
            max_results: default_max_results(),
        }
    }

    pub fn with_tolerance(mut self, tolerance: Cents) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_sizes(mut self, min_size: usize, max_size: usize) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn window(&self) -> Window {
        Window::around(self.target, self.tolerance)
    }

    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let params: SearchParams =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    /// Check every constraint and report all violations at once.
    pub fn validate(&self) -> Result<(), ReconError> {
        let mut problems = Vec::new();

        if self.tolerance < Cents::ZERO {
            problems.push("tolerance cannot be negative".to_string());
        }
        if self.min_size < 1 {
            problems.push("minimum size must be at least 1".to_string());
        }
        if self.max_size < 1 {
            problems.push("maximum size must be at least 1".to_string());
        }
        if self.max_size > MAX_COMBINATION_SIZE {
            problems.push(format!(
                "maximum size cannot exceed {MAX_COMBINATION_SIZE}, got {}",
                self.max_size
            ));
        }
        if self.max_results < 1 {
            problems.push("maximum results must be at least 1".to_string());
        }
        if self.max_results > MAX_RESULTS_LIMIT {
            problems.push(format!(
                "maximum results cannot exceed {MAX_RESULTS_LIMIT}, got {}",
                self.max_results
            ));
        }
        if self.min_size > self.max_size {
            problems.push(format!(
                "minimum size ({}) cannot be greater than maximum size ({})",
                self.min_size, self.max_size
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ReconError::InvalidParams(problems))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_params() {
        let input = r#"
target = "1500.00"
tolerance = 0.5
min_size = 2
max_size = 6
max_results = 25
"#;
        let params = SearchParams::from_toml(input).unwrap();
        assert_eq!(params.target, Cents(150000));
        assert_eq!(params.tolerance, Cents(50));
        assert_eq!(params.min_size, 2);
        assert_eq!(params.max_size, 6);
        assert_eq!(params.max_results, 25);
    }

    #[test]
    fn parse_defaults() {
        let params = SearchParams::from_toml("target = 500").unwrap();
        assert_eq!(params.target, Cents(50000));
        assert_eq!(params.tolerance, Cents::ZERO);
        assert_eq!(params.min_size, 1);
        assert_eq!(params.max_size, 10);
        assert_eq!(params.max_results, 100);
    }

    #[test]
    fn reject_missing_target() {
        let err = SearchParams::from_toml("tolerance = 1").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_inverted_sizes() {
        let err = SearchParams::new(Cents(100)).with_sizes(5, 2).validate().unwrap_err();
        assert!(err.to_string().contains("cannot be greater than maximum size"));
    }

    #[test]
    fn reject_collects_every_problem() {
        let params = SearchParams {
            target: Cents(100),
            tolerance: Cents(-1),
            min_size: 0,
            max_size: 0,
            max_results: 0,
        };
        match params.validate().unwrap_err() {
            ReconError::InvalidParams(problems) => assert_eq!(problems.len(), 4),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reject_out_of_range_limits() {
        let err = SearchParams::new(Cents(100))
            .with_sizes(1, MAX_COMBINATION_SIZE + 1)
            .with_max_results(MAX_RESULTS_LIMIT + 1)
            .validate()
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("maximum size cannot exceed 100"));
        assert!(msg.contains("maximum results cannot exceed 10000"));
    }

    #[test]
    fn window_from_params() {
        let w = SearchParams::new(Cents(50000)).with_tolerance(Cents(5000)).window();
        assert_eq!(w.lower, Cents(45000));
        assert_eq!(w.upper, Cents(55000));
    }
}
