//! Active-learning prioritization: top-2 extraction, accuracy metrics, and
//! item ordering strategies.

pub mod engine;
pub mod extract;
pub mod metrics;
pub mod strategy;

pub use engine::PrioritizationEngine;
pub use extract::{ConfidenceExtractor, TieBreak, TopTwo};
pub use metrics::{AggregateReport, ClassCounters, LabelScore, MetricsAccumulator};
pub use strategy::{Presort, RankingStrategy, Strategy};
