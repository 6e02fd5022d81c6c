//! Billing record and aggregate types

use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CostwatchError, Result};

/// A billing line item as delivered by a source, before any validation.
///
/// Keys are accepted in the snapshot spelling (`Date`, `Service`, `Cost`, `Unit`)
/// or lowercase. Every field stays an untyped JSON value so that a wrongly
/// typed field rejects only its own entry in the normalizer, not the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCostEntry {
    #[serde(rename = "Date", alias = "date", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Value>,
    #[serde(rename = "Service", alias = "service", default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Value>,
    #[serde(rename = "Cost", alias = "cost", default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Value>,
    #[serde(rename = "Unit", alias = "unit", default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Value>,
}

impl RawCostEntry {
    /// Build a fully populated entry with a numeric cost
    pub fn new(date: &str, service: &str, cost: f64, unit: &str) -> Self {
        Self {
            date: Some(Value::from(date)),
            service: Some(Value::from(service)),
            cost: serde_json::Number::from_f64(cost).map(Value::Number),
            unit: Some(Value::from(unit)),
        }
    }

    /// `date` when it is a JSON string
    pub fn date_str(&self) -> Option<&str> {
        self.date.as_ref().and_then(Value::as_str)
    }

    /// `service` when it is a JSON string
    pub fn service_str(&self) -> Option<&str> {
        self.service.as_ref().and_then(Value::as_str)
    }

    /// `unit` when it is a JSON string
    pub fn unit_str(&self) -> Option<&str> {
        self.unit.as_ref().and_then(Value::as_str)
    }
}

/// A validated billing line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalCostRecord {
    pub date: NaiveDate,
    pub service: String,
    /// Finite and >= 0
    pub cost: f64,
    /// Currency code, e.g. "USD"
    pub unit: String,
}

/// Field of a raw entry that was absent or blank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Date,
    Service,
    Cost,
    Unit,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Date => "date",
            Self::Service => "service",
            Self::Cost => "cost",
            Self::Unit => "unit",
        };
        f.write_str(name)
    }
}

/// Why a raw entry was dropped during normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "field")]
pub enum RejectReason {
    MalformedDate,
    InvalidCost,
    MissingField(Field),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedDate => f.write_str("malformed date"),
            Self::InvalidCost => f.write_str("invalid cost"),
            Self::MissingField(field) => write!(f, "missing field '{}'", field),
        }
    }
}

/// A raw entry that failed normalization, kept for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub entry: RawCostEntry,
    pub reason: RejectReason,
}

/// Total spend for one calendar date across all services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total_cost: f64,
}

/// Total spend for one service across all dates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTotal {
    pub service: String,
    pub total_cost: f64,
}

/// Summed spend for one (date, service) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayServiceTotal {
    pub date: NaiveDate,
    pub service: String,
    pub cost: f64,
    /// Unit of the first record seen for this pair
    pub unit: String,
}

/// Advisory for a (date, service) pair whose spend exceeded the threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub date: NaiveDate,
    pub service: String,
    pub cost: f64,
    pub unit: String,
    pub message: String,
}

/// Query window handed to billing sources. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(CostwatchError::Config(format!(
                "date range start {} must be before end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The `days` days leading up to `today` (today itself excluded).
    pub fn trailing(today: NaiveDate, days: u32) -> Result<Self> {
        if days == 0 {
            return Err(CostwatchError::Config("query days must be at least 1".into()));
        }
        Self::new(today - Duration::days(i64::from(days)), today)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}
