//! `combimatch-recon` — Subset-sum matching engine.
//!
//! Pure engine crate: receives a pool of amounts, returns every subset whose
//! sum lands within a tolerance of a target. No CLI or input parsing.

pub mod bounds;
pub mod collector;
pub mod config;
pub mod engine;
pub mod error;
pub mod feasibility;
pub mod ledger;
pub mod model;
pub mod worker;

pub use bounds::estimate_bounds;
pub use collector::{sort_combinations, ResultCollector};
pub use config::SearchParams;
pub use engine::{CancelToken, MatchStream, Solver, PROGRESS_INTERVAL};
pub use error::ReconError;
pub use feasibility::{estimate_combinations, quick_check_possible};
pub use ledger::{FinalizedCombination, Ledger};
pub use model::{
    BoundsReport, Cents, Combination, Item, Position, Progress, SearchResult, StreamSummary,
    Window,
};
pub use worker::{spawn_search, SearchEvent, SearchHandle};
