//! Report assembly and the end-to-end analysis pipeline

use serde::Serialize;

use super::aggregator::{AggregateViews, Aggregator};
use super::normalizer::normalize;
use super::recommender::recommend;
use crate::types::{
    CanonicalCostRecord, DailyTotal, DayServiceTotal, RawCostEntry, Recommendation, Rejection,
    ServiceTotal,
};

/// Leading canonical records kept for display
pub const SAMPLE_SIZE: usize = 5;

/// Final read-only result handed to presentation layers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    daily: Vec<DailyTotal>,
    by_service: Vec<ServiceTotal>,
    by_day_service: Vec<DayServiceTotal>,
    recommendations: Vec<Recommendation>,
}

impl Report {
    /// Package already-computed views. Nothing is re-derived.
    pub fn assemble(
        daily: Vec<DailyTotal>,
        by_service: Vec<ServiceTotal>,
        by_day_service: Vec<DayServiceTotal>,
        recommendations: Vec<Recommendation>,
    ) -> Self {
        Self {
            daily,
            by_service,
            by_day_service,
            recommendations,
        }
    }

    /// Daily totals, date ascending
    pub fn daily(&self) -> &[DailyTotal] {
        &self.daily
    }

    /// Service totals, cost descending
    pub fn by_service(&self) -> &[ServiceTotal] {
        &self.by_service
    }

    pub fn by_day_service(&self) -> &[DayServiceTotal] {
        &self.by_day_service
    }

    pub fn recommendations(&self) -> &[Recommendation] {
        &self.recommendations
    }

    pub fn is_empty(&self) -> bool {
        self.daily.is_empty()
    }
}

/// Report plus the entries that normalization dropped
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analysis {
    pub report: Report,
    /// First `SAMPLE_SIZE` canonical records, input order
    pub sample: Vec<CanonicalCostRecord>,
    /// Sum of all accepted costs
    pub total_cost: f64,
    pub rejected: Vec<Rejection>,
    /// Number of raw entries that were accepted
    pub accepted: usize,
}

/// Run normalize → aggregate → recommend → assemble over one input batch.
///
/// Never fails: bad entries end up in `rejected`, and an empty batch gives
/// an empty report.
pub fn analyze(raw: &[RawCostEntry], threshold: f64) -> Analysis {
    let normalized = normalize(raw);
    let AggregateViews {
        daily,
        by_service,
        by_day_service,
    } = Aggregator::aggregate(&normalized.records);
    let recommendations = recommend(&by_day_service, threshold);

    tracing::debug!(
        accepted = normalized.records.len(),
        rejected = normalized.rejected.len(),
        days = daily.len(),
        services = by_service.len(),
        recommendations = recommendations.len(),
        "analysis complete"
    );

    Analysis {
        report: Report::assemble(daily, by_service, by_day_service, recommendations),
        sample: normalized.records.iter().take(SAMPLE_SIZE).cloned().collect(),
        total_cost: Aggregator::total(&normalized.records),
        accepted: normalized.records.len(),
        rejected: normalized.rejected,
    }
}
