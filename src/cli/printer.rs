//! Text and JSON rendering of an analysis

use std::fmt::Write;

use crate::services::Analysis;
use crate::types::{RejectReason, Rejection};

const RULE_WIDTH: usize = 44;

/// Printed when no (date, service) pair exceeds the threshold
pub const NO_RECOMMENDATIONS: &str =
    "Costs appear to be under control; no prominent optimization recommendations at this time.";

/// Everything the report printer shows besides the analysis itself
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub source: &'a str,
    pub threshold: f64,
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "--- {} ---", title);
}

/// Render the plain-text report
pub fn render_text(analysis: &Analysis, ctx: ReportContext<'_>) -> String {
    let report = &analysis.report;
    let mut out = String::new();

    let _ = writeln!(out, "Billing data from {}", ctx.source);
    let _ = writeln!(out);

    section(&mut out, &format!("Cost Data Sample (First {} Rows)", analysis.sample.len()));
    let _ = writeln!(out, "{:<12}{:<28}{:>12}  {}", "Date", "Service", "Cost", "Unit");
    for record in &analysis.sample {
        let _ = writeln!(
            out,
            "{:<12}{:<28}{:>12.2}  {}",
            record.date.format("%Y-%m-%d"),
            record.service,
            record.cost,
            record.unit
        );
    }
    let _ = writeln!(out);

    section(&mut out, "Daily Total Costs");
    for day in report.daily() {
        let _ = writeln!(out, "{:<12}{:>12.2}", day.date.format("%Y-%m-%d"), day.total_cost);
    }
    let _ = writeln!(out, "{}", "─".repeat(RULE_WIDTH));
    let _ = writeln!(out, "{:<12}{:>12.2}", "Total", analysis.total_cost);
    let _ = writeln!(out);

    section(&mut out, "Total Costs by Service");
    for service in report.by_service() {
        let _ = writeln!(out, "{:<28}{:>12.2}", service.service, service.total_cost);
    }
    let _ = writeln!(out);

    if report.recommendations().is_empty() {
        let _ = writeln!(out, "{}", NO_RECOMMENDATIONS);
    } else {
        let _ = writeln!(
            out,
            "Optimization Recommendations (daily spend above {:.2}):",
            ctx.threshold
        );
        for rec in report.recommendations() {
            let _ = writeln!(out, "- {}", rec.message);
        }
    }

    if !analysis.rejected.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Skipped {} malformed entr{}:",
            analysis.rejected.len(),
            if analysis.rejected.len() == 1 { "y" } else { "ies" }
        );
        for (reason, count) in rejection_counts(&analysis.rejected) {
            let _ = writeln!(out, "  {:>4}  {}", count, reason);
        }
    }

    out
}

/// Rejection counts per reason, in order of first occurrence
fn rejection_counts(rejected: &[Rejection]) -> Vec<(RejectReason, usize)> {
    let mut counts: Vec<(RejectReason, usize)> = Vec::new();
    for rejection in rejected {
        match counts.iter_mut().find(|(reason, _)| *reason == rejection.reason) {
            Some((_, count)) => *count += 1,
            None => counts.push((rejection.reason, 1)),
        }
    }
    counts
}

/// Render the analysis as pretty JSON
pub fn render_json(analysis: &Analysis) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(analysis)?)
}
