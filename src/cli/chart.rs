//! Text charts: daily spend trend and per-service distribution

use std::fmt::Write;

use crate::services::Report;
use crate::format::{format_cost, format_percentage_bar, format_sparkline, share};

const BAR_WIDTH: usize = 40;
const SERVICE_NAME_WIDTH: usize = 28;

/// Daily totals as horizontal bars, date ascending
pub fn daily_trend(report: &Report) -> String {
    let mut out = String::from("Daily Total Cost Trend\n\n");
    let max = report
        .daily()
        .iter()
        .map(|d| d.total_cost)
        .fold(0.0_f64, f64::max);

    for day in report.daily() {
        let _ = writeln!(
            out,
            "{}  {}  {:>12}",
            day.date.format("%Y-%m-%d"),
            format_sparkline(day.total_cost, max, BAR_WIDTH),
            format_cost(day.total_cost)
        );
    }
    out
}

/// Service totals as share-of-spend bars, in report order (cost descending)
pub fn service_distribution(report: &Report) -> String {
    let mut out = String::from("Cost Distribution by Service\n\n");
    let total: f64 = report.by_service().iter().map(|s| s.total_cost).sum();

    for service in report.by_service() {
        let percent = share(service.total_cost, total);
        let _ = writeln!(
            out,
            "{:<width$}  {}  {:>12}  {:>5.1}%",
            truncate(&service.service, SERVICE_NAME_WIDTH),
            format_percentage_bar(percent, BAR_WIDTH),
            format_cost(service.total_cost),
            percent,
            width = SERVICE_NAME_WIDTH
        );
    }
    out
}

/// Both charts separated by a blank line
pub fn render(report: &Report) -> String {
    format!("{}\n{}", daily_trend(report), service_distribution(report))
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() > width {
        let head: String = name.chars().take(width - 1).collect();
        format!("{}…", head)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analyze;
    use crate::types::RawCostEntry;

    fn report() -> Report {
        analyze(
            &[
                RawCostEntry::new("2024-01-02", "S3", 1.0, "USD"),
                RawCostEntry::new("2024-01-01", "EC2", 3.0, "USD"),
                RawCostEntry::new("2024-01-02", "EC2", 1.0, "USD"),
            ],
            10.0,
        )
        .report
    }

    #[test]
    fn test_daily_trend_is_date_ascending() {
        let chart = daily_trend(&report());
        let first = chart.find("2024-01-01").unwrap();
        let second = chart.find("2024-01-02").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_daily_trend_max_day_fills_bar() {
        let chart = daily_trend(&report());
        let line = chart.lines().find(|l| l.starts_with("2024-01-01")).unwrap();
        assert!(line.contains(&"▓".repeat(BAR_WIDTH)));
    }

    #[test]
    fn test_service_distribution_order_and_share() {
        let chart = service_distribution(&report());
        let lines: Vec<&str> = chart.lines().skip(2).collect();
        assert!(lines[0].starts_with("EC2"));
        assert!(lines[0].ends_with("80.0%"));
        assert!(lines[1].starts_with("S3"));
        assert!(lines[1].ends_with("20.0%"));
    }

    #[test]
    fn test_empty_report_renders_titles_only() {
        let text = render(&Report::default());
        assert!(text.contains("Daily Total Cost Trend"));
        assert!(text.contains("Cost Distribution by Service"));
    }

    #[test]
    fn test_truncate_long_service_name() {
        let name = "Amazon Elastic Compute Cloud - Compute";
        let short = truncate(name, 10);
        assert_eq!(short.chars().count(), 10);
        assert!(short.ends_with('…'));
        assert_eq!(truncate("S3", 10), "S3");
    }
}
