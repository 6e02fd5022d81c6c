//! Aggregator service for computing cost views

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{CanonicalCostRecord, DailyTotal, DayServiceTotal, ServiceTotal};

/// The three aggregate views over one canonical record set
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateViews {
    /// Sorted by date ascending
    pub daily: Vec<DailyTotal>,
    /// Sorted by total cost descending, ties by service name ascending
    pub by_service: Vec<ServiceTotal>,
    /// First-encounter order of each (date, service) pair
    pub by_day_service: Vec<DayServiceTotal>,
}

/// Aggregator for computing cost statistics
pub struct Aggregator;

impl Aggregator {
    /// Compute all three views. The views are independent read-only
    /// projections of `records`, so they run in parallel.
    pub fn aggregate(records: &[CanonicalCostRecord]) -> AggregateViews {
        let (daily, (by_service, by_day_service)) = rayon::join(
            || Self::daily(records),
            || rayon::join(|| Self::by_service(records), || Self::by_day_service(records)),
        );

        AggregateViews {
            daily,
            by_service,
            by_day_service,
        }
    }

    /// Aggregate records by day (sorted by date ascending)
    pub fn daily(records: &[CanonicalCostRecord]) -> Vec<DailyTotal> {
        if records.is_empty() {
            return Vec::new();
        }

        let mut daily_map: HashMap<NaiveDate, f64> = HashMap::new();
        for record in records {
            *daily_map.entry(record.date).or_insert(0.0) += record.cost;
        }

        let mut result: Vec<DailyTotal> = daily_map
            .into_iter()
            .map(|(date, total_cost)| DailyTotal { date, total_cost })
            .collect();
        result.sort_by_key(|d| d.date);
        result
    }

    /// Aggregate records by service (sorted by cost descending, then name)
    pub fn by_service(records: &[CanonicalCostRecord]) -> Vec<ServiceTotal> {
        let mut service_map: HashMap<&str, f64> = HashMap::new();
        for record in records {
            *service_map.entry(record.service.as_str()).or_insert(0.0) += record.cost;
        }

        let mut result: Vec<ServiceTotal> = service_map
            .into_iter()
            .map(|(service, total_cost)| ServiceTotal {
                service: service.to_string(),
                total_cost,
            })
            .collect();
        result.sort_by(|a, b| {
            b.total_cost
                .total_cmp(&a.total_cost)
                .then_with(|| a.service.cmp(&b.service))
        });
        result
    }

    /// Sum cost per (date, service) pair. Each pair appears exactly once,
    /// at the position where it was first encountered.
    pub fn by_day_service(records: &[CanonicalCostRecord]) -> Vec<DayServiceTotal> {
        let mut index: HashMap<(NaiveDate, &str), usize> = HashMap::new();
        let mut result: Vec<DayServiceTotal> = Vec::new();

        for record in records {
            let key = (record.date, record.service.as_str());
            match index.get(&key) {
                Some(&i) => result[i].cost += record.cost,
                None => {
                    index.insert(key, result.len());
                    result.push(DayServiceTotal {
                        date: record.date,
                        service: record.service.clone(),
                        cost: record.cost,
                        unit: record.unit.clone(),
                    });
                }
            }
        }

        result
    }

    /// Sum of all record costs (0 for an empty set)
    pub fn total(records: &[CanonicalCostRecord]) -> f64 {
        records.iter().map(|r| r.cost).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(day: u32, service: &str, cost: f64) -> CanonicalCostRecord {
        CanonicalCostRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            service: service.to_string(),
            cost,
            unit: "USD".to_string(),
        }
    }

    // ========== daily() tests ==========

    #[test]
    fn test_daily_empty_records() {
        assert!(Aggregator::daily(&[]).is_empty());
    }

    #[test]
    fn test_daily_multiple_days_sorted_ascending() {
        let records = vec![
            make_record(20, "EC2", 1.0),
            make_record(10, "EC2", 2.0),
            make_record(15, "EC2", 3.0),
        ];

        let result = Aggregator::daily(&records);

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].date.to_string(), "2024-01-10");
        assert_eq!(result[1].date.to_string(), "2024-01-15");
        assert_eq!(result[2].date.to_string(), "2024-01-20");
    }

    #[test]
    fn test_daily_same_day_sums_services() {
        let records = vec![
            make_record(1, "EC2", 5.0),
            make_record(1, "EC2", 6.0),
            make_record(1, "S3", 2.0),
        ];

        let result = Aggregator::daily(&records);

        assert_eq!(result.len(), 1);
        assert!((result[0].total_cost - 13.0).abs() < 1e-9);
    }

    // ========== by_service() tests ==========

    #[test]
    fn test_by_service_empty() {
        assert!(Aggregator::by_service(&[]).is_empty());
    }

    #[test]
    fn test_by_service_sorted_descending() {
        let records = vec![
            make_record(1, "S3", 2.0),
            make_record(1, "EC2", 5.0),
            make_record(2, "EC2", 6.0),
            make_record(2, "RDS", 4.0),
        ];

        let result = Aggregator::by_service(&records);

        let names: Vec<&str> = result.iter().map(|s| s.service.as_str()).collect();
        assert_eq!(names, vec!["EC2", "RDS", "S3"]);
        assert!((result[0].total_cost - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_by_service_ties_broken_by_name() {
        let records = vec![
            make_record(1, "Lambda", 3.0),
            make_record(1, "CloudWatch", 3.0),
            make_record(1, "EC2", 3.0),
        ];

        let result = Aggregator::by_service(&records);

        let names: Vec<&str> = result.iter().map(|s| s.service.as_str()).collect();
        assert_eq!(names, vec!["CloudWatch", "EC2", "Lambda"]);
    }

    // ========== by_day_service() tests ==========

    #[test]
    fn test_by_day_service_dedups_pairs() {
        let records = vec![
            make_record(1, "EC2", 5.0),
            make_record(1, "S3", 2.0),
            make_record(1, "EC2", 6.0),
        ];

        let result = Aggregator::by_day_service(&records);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].service, "EC2");
        assert!((result[0].cost - 11.0).abs() < 1e-9);
        assert_eq!(result[1].service, "S3");
        assert!((result[1].cost - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_by_day_service_same_service_different_days() {
        let records = vec![make_record(2, "EC2", 1.0), make_record(1, "EC2", 1.0)];

        let result = Aggregator::by_day_service(&records);

        assert_eq!(result.len(), 2);
        // Encounter order, not date order
        assert_eq!(result[0].date.to_string(), "2024-01-02");
        assert_eq!(result[1].date.to_string(), "2024-01-01");
    }

    #[test]
    fn test_by_day_service_keeps_first_unit() {
        let mut second = make_record(1, "EC2", 1.0);
        second.unit = "EUR".to_string();
        let records = vec![make_record(1, "EC2", 1.0), second];

        let result = Aggregator::by_day_service(&records);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].unit, "USD");
    }

    // ========== aggregate() tests ==========

    #[test]
    fn test_aggregate_empty() {
        let views = Aggregator::aggregate(&[]);
        assert!(views.daily.is_empty());
        assert!(views.by_service.is_empty());
        assert!(views.by_day_service.is_empty());
    }

    #[test]
    fn test_aggregate_matches_individual_views() {
        let records = vec![
            make_record(2, "EC2", 1.5),
            make_record(1, "S3", 0.25),
            make_record(1, "EC2", 4.0),
            make_record(2, "EC2", 2.5),
        ];

        let views = Aggregator::aggregate(&records);

        assert_eq!(views.daily, Aggregator::daily(&records));
        assert_eq!(views.by_service, Aggregator::by_service(&records));
        assert_eq!(views.by_day_service, Aggregator::by_day_service(&records));
    }

    #[test]
    fn test_total_empty_is_zero() {
        assert!((Aggregator::total(&[]) - 0.0).abs() < f64::EPSILON);
    }
}
