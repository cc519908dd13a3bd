//! Finalized combinations and the items they consume.
//!
//! The ledger lives outside the search: it decides which items are
//! consumed and hands the search a filtered pool.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::model::{Cents, Combination, Item, Position};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedCombination {
    pub combination: Combination,
    /// 0-based order of finalization.
    pub finalized_at: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    entries: Vec<FinalizedCombination>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `combination` and consume its positions. Rejects a
    /// combination that touches an already-consumed position.
    pub fn finalize(&mut self, combination: Combination) -> Result<&FinalizedCombination, ReconError> {
        let consumed = self.consumed_positions();
        if let Some(taken) = combination.positions().find(|p| consumed.contains(*p)) {
            return Err(ReconError::Ledger(format!(
                "item {taken} is already part of a finalized combination"
            )));
        }

        let finalized_at = self.entries.len();
        log::info!(
            "finalized combination {} ({} items, sum {})",
            finalized_at + 1,
            combination.size(),
            combination.sum()
        );
        self.entries.push(FinalizedCombination { combination, finalized_at });
        Ok(&self.entries[finalized_at])
    }

    pub fn consumed_positions(&self) -> BTreeSet<&Position> {
        self.entries
            .iter()
            .flat_map(|e| e.combination.positions())
            .collect()
    }

    pub fn is_consumed(&self, position: &Position) -> bool {
        self.entries
            .iter()
            .any(|e| e.combination.positions().any(|p| p == position))
    }

    /// Set each item's `consumed` flag from the ledger.
    pub fn apply(&self, items: &mut [Item]) {
        let consumed = self.consumed_positions();
        for item in items.iter_mut() {
            item.consumed = consumed.contains(&item.position);
        }
    }

    /// Items still eligible for a search.
    pub fn available(&self, items: &[Item]) -> Vec<Item> {
        let consumed = self.consumed_positions();
        items
            .iter()
            .filter(|i| !i.consumed && !consumed.contains(&i.position))
            .cloned()
            .collect()
    }

    /// Sum of every finalized combination.
    pub fn total(&self) -> Cents {
        self.entries.iter().map(|e| e.combination.sum()).sum()
    }

    pub fn entries(&self) -> &[FinalizedCombination] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Missing file reads as an empty ledger.
    pub fn load(path: &Path) -> Result<Self, ReconError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| ReconError::Ledger(format!("cannot parse {}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<(), ReconError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ReconError::Ledger(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }
}
