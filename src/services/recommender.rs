//! Threshold-based optimization recommendations

use crate::types::{DayServiceTotal, Recommendation};

/// Emit one recommendation per (date, service) total strictly above `threshold`.
///
/// Input order is preserved. `by_day_service` is already unique per pair, so
/// the output never contains duplicates.
pub fn recommend(by_day_service: &[DayServiceTotal], threshold: f64) -> Vec<Recommendation> {
    by_day_service
        .iter()
        .filter(|total| total.cost > threshold)
        .map(|total| Recommendation {
            date: total.date,
            service: total.service.clone(),
            cost: total.cost,
            unit: total.unit.clone(),
            message: recommendation_message(total),
        })
        .collect()
}

fn recommendation_message(total: &DayServiceTotal) -> String {
    format!(
        "On {}, '{}' cost {:.2} {}. Consider reviewing its usage!",
        total.date.format("%Y-%m-%d"),
        total.service,
        total.cost,
        total.unit
    )
}
