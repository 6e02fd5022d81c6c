//! Record normalization service
//!
//! Converts untrusted billing entries into canonical records. Entries that
//! fail validation are dropped with a reason instead of aborting the run.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::types::{CanonicalCostRecord, Field, RawCostEntry, RejectReason, Rejection};

/// Output of [`normalize`]: accepted records in encounter order plus rejections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub records: Vec<CanonicalCostRecord>,
    pub rejected: Vec<Rejection>,
}

/// Normalize a batch of raw entries.
///
/// Checks run in the order date, service, cost, unit; the first failure
/// decides the rejection reason.
///
/// # Examples
/// ```
/// use costwatch::services::normalizer::normalize;
/// use costwatch::types::RawCostEntry;
///
/// let out = normalize(&[RawCostEntry::new("2024-01-01", "EC2", 5.0, "USD")]);
/// assert_eq!(out.records.len(), 1);
/// assert!(out.rejected.is_empty());
/// ```
pub fn normalize(entries: &[RawCostEntry]) -> Normalized {
    let mut out = Normalized {
        records: Vec::with_capacity(entries.len()),
        rejected: Vec::new(),
    };

    for entry in entries {
        match normalize_entry(entry) {
            Ok(record) => out.records.push(record),
            Err(reason) => {
                tracing::warn!(?entry, %reason, "rejecting billing entry");
                out.rejected.push(Rejection {
                    entry: entry.clone(),
                    reason,
                });
            }
        }
    }

    out
}

/// Validate a single raw entry
pub fn normalize_entry(entry: &RawCostEntry) -> Result<CanonicalCostRecord, RejectReason> {
    let date = match present(&entry.date, Field::Date)? {
        Value::String(s) => required_text(Some(s.as_str()), Field::Date)?,
        _ => return Err(RejectReason::MalformedDate),
    };
    let date = parse_date(date).ok_or(RejectReason::MalformedDate)?;

    let service = required_text(entry.service_str(), Field::Service)?;

    let cost = parse_cost(present(&entry.cost, Field::Cost)?).ok_or(RejectReason::InvalidCost)?;

    let unit = required_text(entry.unit_str(), Field::Unit)?;

    Ok(CanonicalCostRecord {
        date,
        service: service.to_string(),
        cost,
        unit: unit.to_string(),
    })
}

/// The field's value, or `MissingField` when absent or null
fn present(value: &Option<Value>, field: Field) -> Result<&Value, RejectReason> {
    match value {
        None | Some(Value::Null) => Err(RejectReason::MissingField(field)),
        Some(value) => Ok(value),
    }
}

/// Trimmed, non-empty text or a `MissingField` rejection. Non-string values
/// arrive here as `None`.
fn required_text(value: Option<&str>, field: Field) -> Result<&str, RejectReason> {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(RejectReason::MissingField(field)),
    }
}

/// Parse `YYYY-MM-DD`, or an RFC 3339 timestamp reduced to its UTC date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

/// Accept JSON numbers and numeric strings that are finite and non-negative.
pub fn parse_cost(value: &Value) -> Option<f64> {
    let cost = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (cost.is_finite() && cost >= 0.0).then_some(cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(date: Option<&str>, service: Option<&str>, cost: Option<Value>, unit: Option<&str>) -> RawCostEntry {
        RawCostEntry {
            date: date.map(Value::from),
            service: service.map(Value::from),
            cost,
            unit: unit.map(Value::from),
        }
    }

    // ========== Accepted entries ==========

    #[test]
    fn test_normalize_valid_entry() {
        let out = normalize(&[RawCostEntry::new("2024-01-01", "EC2", 5.0, "USD")]);
        assert_eq!(out.records.len(), 1);
        let rec = &out.records[0];
        assert_eq!(rec.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(rec.service, "EC2");
        assert!((rec.cost - 5.0).abs() < f64::EPSILON);
        assert_eq!(rec.unit, "USD");
    }

    #[test]
    fn test_normalize_numeric_string_cost() {
        let entry = raw(Some("2024-01-01"), Some("EC2"), Some(json!("12.50")), Some("USD"));
        let rec = normalize_entry(&entry).unwrap();
        assert!((rec.cost - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_normalize_zero_cost_accepted() {
        let entry = raw(Some("2024-01-01"), Some("Tax"), Some(json!(0)), Some("USD"));
        assert!(normalize_entry(&entry).is_ok());
    }

    #[test]
    fn test_normalize_trims_service_and_unit() {
        let entry = raw(Some("2024-01-01"), Some("  EC2 "), Some(json!(1.0)), Some(" USD"));
        let rec = normalize_entry(&entry).unwrap();
        assert_eq!(rec.service, "EC2");
        assert_eq!(rec.unit, "USD");
    }

    #[test]
    fn test_normalize_rfc3339_date_uses_utc_day() {
        let entry = raw(
            Some("2024-01-01T23:30:00-02:00"),
            Some("EC2"),
            Some(json!(1.0)),
            Some("USD"),
        );
        let rec = normalize_entry(&entry).unwrap();
        assert_eq!(rec.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn test_normalize_preserves_encounter_order() {
        let out = normalize(&[
            RawCostEntry::new("2024-01-03", "S3", 1.0, "USD"),
            RawCostEntry::new("2024-01-01", "EC2", 2.0, "USD"),
            RawCostEntry::new("2024-01-02", "RDS", 3.0, "USD"),
        ]);
        let services: Vec<&str> = out.records.iter().map(|r| r.service.as_str()).collect();
        assert_eq!(services, vec!["S3", "EC2", "RDS"]);
    }

    // ========== Rejections ==========

    #[test]
    fn test_reject_malformed_date() {
        let entry = raw(Some("01/02/2024"), Some("EC2"), Some(json!(1.0)), Some("USD"));
        assert_eq!(normalize_entry(&entry), Err(RejectReason::MalformedDate));
    }

    #[test]
    fn test_reject_impossible_calendar_date() {
        let entry = raw(Some("2024-02-30"), Some("EC2"), Some(json!(1.0)), Some("USD"));
        assert_eq!(normalize_entry(&entry), Err(RejectReason::MalformedDate));
    }

    #[test]
    fn test_reject_non_numeric_cost() {
        let entry = raw(Some("2024-01-01"), Some("EC2"), Some(json!("abc")), Some("USD"));
        assert_eq!(normalize_entry(&entry), Err(RejectReason::InvalidCost));
    }

    #[test]
    fn test_reject_negative_cost() {
        let entry = raw(Some("2024-01-01"), Some("EC2"), Some(json!(-0.5)), Some("USD"));
        assert_eq!(normalize_entry(&entry), Err(RejectReason::InvalidCost));
    }

    #[test]
    fn test_reject_non_finite_string_cost() {
        let entry = raw(Some("2024-01-01"), Some("EC2"), Some(json!("NaN")), Some("USD"));
        assert_eq!(normalize_entry(&entry), Err(RejectReason::InvalidCost));
        let entry = raw(Some("2024-01-01"), Some("EC2"), Some(json!("inf")), Some("USD"));
        assert_eq!(normalize_entry(&entry), Err(RejectReason::InvalidCost));
    }

    #[test]
    fn test_reject_boolean_cost() {
        let entry = raw(Some("2024-01-01"), Some("EC2"), Some(json!(true)), Some("USD"));
        assert_eq!(normalize_entry(&entry), Err(RejectReason::InvalidCost));
    }

    #[test]
    fn test_reject_missing_service() {
        let entry = raw(Some("2024-01-01"), None, Some(json!(1.0)), Some("USD"));
        assert_eq!(
            normalize_entry(&entry),
            Err(RejectReason::MissingField(Field::Service))
        );
    }

    #[test]
    fn test_reject_blank_unit() {
        let entry = raw(Some("2024-01-01"), Some("EC2"), Some(json!(1.0)), Some("   "));
        assert_eq!(
            normalize_entry(&entry),
            Err(RejectReason::MissingField(Field::Unit))
        );
    }

    #[test]
    fn test_reject_missing_date_and_null_cost() {
        let entry = raw(None, Some("EC2"), Some(json!(1.0)), Some("USD"));
        assert_eq!(
            normalize_entry(&entry),
            Err(RejectReason::MissingField(Field::Date))
        );
        let entry = raw(Some("2024-01-01"), Some("EC2"), Some(Value::Null), Some("USD"));
        assert_eq!(
            normalize_entry(&entry),
            Err(RejectReason::MissingField(Field::Cost))
        );
    }

    #[test]
    fn test_reject_non_string_date() {
        let mut entry = raw(None, Some("EC2"), Some(json!(1.0)), Some("USD"));
        entry.date = Some(json!(20240101));
        assert_eq!(normalize_entry(&entry), Err(RejectReason::MalformedDate));
        entry.date = Some(json!({"day": "2024-01-01"}));
        assert_eq!(normalize_entry(&entry), Err(RejectReason::MalformedDate));
    }

    #[test]
    fn test_reject_non_string_service_and_unit() {
        let mut entry = raw(Some("2024-01-01"), None, Some(json!(1.0)), Some("USD"));
        entry.service = Some(json!(42));
        assert_eq!(
            normalize_entry(&entry),
            Err(RejectReason::MissingField(Field::Service))
        );

        let mut entry = raw(Some("2024-01-01"), Some("EC2"), Some(json!(1.0)), None);
        entry.unit = Some(json!(true));
        assert_eq!(
            normalize_entry(&entry),
            Err(RejectReason::MissingField(Field::Unit))
        );
    }

    #[test]
    fn test_null_date_is_missing() {
        let mut entry = raw(None, Some("EC2"), Some(json!(1.0)), Some("USD"));
        entry.date = Some(Value::Null);
        assert_eq!(
            normalize_entry(&entry),
            Err(RejectReason::MissingField(Field::Date))
        );
    }

    #[test]
    fn test_first_failure_wins() {
        // Bad date and bad cost: date is checked first
        let entry = raw(Some("nope"), Some("EC2"), Some(json!("abc")), None);
        assert_eq!(normalize_entry(&entry), Err(RejectReason::MalformedDate));
    }

    #[test]
    fn test_rejections_keep_valid_siblings() {
        let out = normalize(&[
            RawCostEntry::new("2024-01-01", "EC2", 5.0, "USD"),
            raw(Some("2024-01-01"), Some("EC2"), Some(json!("abc")), Some("USD")),
            RawCostEntry::new("2024-01-01", "S3", 2.0, "USD"),
        ]);
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].reason, RejectReason::InvalidCost);
        assert_eq!(out.rejected[0].entry.cost, Some(json!("abc")));
    }

    #[test]
    fn test_normalize_empty() {
        let out = normalize(&[]);
        assert!(out.records.is_empty());
        assert!(out.rejected.is_empty());
    }
}
