//! The run's record set and final ordering.

use std::collections::HashSet;

use crate::error::{RankingError, RankingResult};
use crate::types::RankingRecord;

use super::strategy::RankingStrategy;

/// Holds every ranking record produced in a run.
///
/// Appends must come from a single writer; the record set is read-only once
/// ordering starts.
#[derive(Debug, Default)]
pub struct PrioritizationEngine {
    records: Vec<RankingRecord>,
    seen: HashSet<String>,
}

impl PrioritizationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Item identifiers must be unique within a run.
    pub fn push(&mut self, record: RankingRecord) -> RankingResult<()> {
        if !self.seen.insert(record.item().to_string()) {
            return Err(RankingError::DuplicateItem(record.item().to_string()));
        }
        self.records.push(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in priority order under `strategy`.
    pub fn order(&self, strategy: &dyn RankingStrategy) -> Vec<&RankingRecord> {
        tracing::debug!(
            "Ordering {} record(s) with {}",
            self.records.len(),
            strategy.name()
        );
        strategy.order(&self.records)
    }

    /// Item identifiers in priority order under `strategy`.
    pub fn order_ids(&self, strategy: &dyn RankingStrategy) -> Vec<String> {
        self.order(strategy)
            .into_iter()
            .map(|r| r.item().to_string())
            .collect()
    }
}
