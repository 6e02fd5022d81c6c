pub mod chart;
pub mod printer;

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};

use crate::config::{validate_threshold, Config};
use crate::services::{analyze, Analysis};
use crate::sources::{write_snapshot, BillingSource, CostExplorerClient, SourceChain, SourceLoad};
use crate::types::{CostwatchError, DateRange, Result};

use printer::ReportContext;

/// Daily cloud billing breakdowns and spend recommendations
#[derive(Parser)]
#[command(name = "costwatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    query: QueryArgs,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Print the cost report (default)
    Report {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render daily trend and service distribution charts
    Chart {
        /// Write charts to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Launch the interactive dashboard
    Dashboard,

    /// Fetch live billing data and save it as the fallback snapshot
    Snapshot {
        /// Destination (defaults to the configured snapshot path)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Options shared by every command
#[derive(Args, Debug, Default, PartialEq)]
pub struct QueryArgs {
    /// Config file (overrides $COSTWATCH_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Recommend when a service's daily spend exceeds this amount
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Trailing window in days, ending at --end or today
    #[arg(long, global = true)]
    days: Option<u32>,

    /// First day of the query window (YYYY-MM-DD)
    #[arg(long, global = true)]
    start: Option<NaiveDate>,

    /// Day after the query window (YYYY-MM-DD, exclusive)
    #[arg(long, global = true)]
    end: Option<NaiveDate>,

    /// Snapshot file or directory used as fallback
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Skip the live Cost Explorer source
    #[arg(long, global = true)]
    offline: bool,
}

impl QueryArgs {
    /// Config file with command-line overrides applied
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(days) = self.days {
            config.query.days = days;
        }
        if let Some(path) = &self.snapshot {
            config.snapshot.path = path.clone();
        }
        config.validate()?;
        Ok(config)
    }

    /// `--threshold`, else `default`
    pub fn threshold(&self, default: f64) -> Result<f64> {
        let threshold = self.threshold.unwrap_or(default);
        validate_threshold("--threshold", threshold)?;
        Ok(threshold)
    }

    /// Explicit `--start`/`--end`, else the trailing `query.days` window
    pub fn date_range(&self, config: &Config, today: NaiveDate) -> Result<DateRange> {
        let end = self.end.unwrap_or(today);
        match self.start {
            Some(start) => DateRange::new(start, end),
            None => DateRange::trailing(end, config.query.days),
        }
    }
}

/// Everything needed to load and analyze one batch, movable to a worker thread
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub config: Config,
    pub range: DateRange,
    pub offline: bool,
    pub threshold: f64,
}

/// An analysis together with where its data came from
#[derive(Debug)]
pub struct LoadedAnalysis {
    pub source: String,
    /// Query window the data was fetched for, `None` for static snapshots
    pub range: Option<DateRange>,
    pub analysis: Analysis,
}

impl LoadedAnalysis {
    /// Source name, with the query window when the source applied one
    pub fn provenance(&self) -> String {
        match self.range {
            Some(range) => format!("{} ({})", self.source, range),
            None => self.source.clone(),
        }
    }
}

/// Run the source chain: the first source with data wins.
pub fn fetch_entries(request: &LoadRequest) -> Result<SourceLoad> {
    SourceChain::from_config(&request.config, request.offline).load(&request.range)
}

/// Analyze fetched entries. A batch where every entry was rejected is
/// `NoUsableRecords`.
pub fn analyze_load(load: SourceLoad, request: &LoadRequest) -> Result<LoadedAnalysis> {
    let analysis = analyze(&load.entries, request.threshold);

    if analysis.accepted == 0 {
        return Err(CostwatchError::NoUsableRecords {
            rejected: analysis.rejected.len(),
        });
    }

    Ok(LoadedAnalysis {
        source: load.source,
        range: load.range,
        analysis,
    })
}

/// `fetch_entries` followed by `analyze_load`
pub fn load_analysis(request: &LoadRequest) -> Result<LoadedAnalysis> {
    analyze_load(fetch_entries(request)?, request)
}

impl Cli {
    /// Log filter used when `$COSTWATCH_LOG` is unset; the dashboard owns the
    /// terminal, so it logs nothing by default.
    pub fn default_log_filter(&self) -> &'static str {
        match self.command {
            Some(Commands::Dashboard) => "off",
            _ => "warn",
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        let today = Local::now().date_naive();
        let config = self.query.load_config()?;
        let range = self.query.date_range(&config, today)?;

        match self.command {
            None => run_report(&self.query, config, range, false),
            Some(Commands::Report { json }) => run_report(&self.query, config, range, json),
            Some(Commands::Chart { output }) => {
                run_chart(&self.query, config, range, output.as_deref())
            }
            Some(Commands::Dashboard) => {
                let threshold = self.query.threshold(config.dashboard.threshold)?;
                crate::tui::run(LoadRequest {
                    config,
                    range,
                    offline: self.query.offline,
                    threshold,
                })
            }
            Some(Commands::Snapshot { output }) => run_snapshot(&self.query, config, range, output),
        }
    }
}

fn report_request(query: &QueryArgs, config: Config, range: DateRange) -> Result<LoadRequest> {
    let threshold = query.threshold(config.report.threshold)?;
    Ok(LoadRequest {
        config,
        range,
        offline: query.offline,
        threshold,
    })
}

fn run_report(
    query: &QueryArgs,
    config: Config,
    range: DateRange,
    json: bool,
) -> anyhow::Result<()> {
    let request = report_request(query, config, range)?;
    let loaded = load_analysis(&request)?;

    if json {
        println!("{}", printer::render_json(&loaded.analysis)?);
    } else {
        let source = loaded.provenance();
        let ctx = ReportContext {
            source: &source,
            threshold: request.threshold,
        };
        print!("{}", printer::render_text(&loaded.analysis, ctx));
    }
    Ok(())
}

fn run_chart(
    query: &QueryArgs,
    config: Config,
    range: DateRange,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let request = report_request(query, config, range)?;
    let loaded = load_analysis(&request)?;
    let charts = chart::render(&loaded.analysis.report);

    match output {
        Some(path) => {
            std::fs::write(path, &charts)
                .with_context(|| format!("failed to write charts to {}", path.display()))?;
            println!("Charts saved to {}", path.display());
        }
        None => print!("{}", charts),
    }
    Ok(())
}

fn run_snapshot(
    query: &QueryArgs,
    config: Config,
    range: DateRange,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    if query.offline {
        anyhow::bail!("snapshot needs the live source; drop --offline");
    }

    let client = CostExplorerClient::from_settings(&config.cost_explorer)?;
    let entries = client.fetch(&range)?;
    if entries.is_empty() {
        return Err(CostwatchError::EmptyInput {
            tried: vec![client.name().to_string()],
        }
        .into());
    }

    let path = output.unwrap_or(config.snapshot.path);
    write_snapshot(&path, &entries)?;
    println!("Saved {} entries for {} to {}", entries.len(), range, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ========== Parsing ==========

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::try_parse_from(["costwatch"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.query, QueryArgs::default());
    }

    #[test]
    fn test_cli_parse_report_json() {
        let cli = Cli::try_parse_from(["costwatch", "report", "--json"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Report { json: true }));
    }

    #[test]
    fn test_cli_parse_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "costwatch",
            "report",
            "--threshold",
            "2.5",
            "--start",
            "2024-01-01",
            "--end",
            "2024-02-01",
            "--offline",
        ])
        .unwrap();
        assert_eq!(cli.query.threshold, Some(2.5));
        assert_eq!(cli.query.start, Some(date(2024, 1, 1)));
        assert_eq!(cli.query.end, Some(date(2024, 2, 1)));
        assert!(cli.query.offline);
    }

    #[test]
    fn test_cli_parse_chart_output() {
        let cli = Cli::try_parse_from(["costwatch", "chart", "-o", "charts.txt"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Chart {
                output: Some(PathBuf::from("charts.txt"))
            })
        );
    }

    #[test]
    fn test_cli_parse_snapshot() {
        let cli = Cli::try_parse_from(["costwatch", "snapshot"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Snapshot { output: None }));
    }

    #[test]
    fn test_cli_rejects_bad_date() {
        assert!(Cli::try_parse_from(["costwatch", "--start", "01/02/2024"]).is_err());
    }

    #[test]
    fn test_default_log_filter() {
        let cli = Cli::try_parse_from(["costwatch", "dashboard"]).unwrap();
        assert_eq!(cli.default_log_filter(), "off");
        let cli = Cli::try_parse_from(["costwatch"]).unwrap();
        assert_eq!(cli.default_log_filter(), "warn");
    }

    // ========== Option resolution ==========

    #[test]
    fn test_threshold_override_and_default() {
        let query = QueryArgs::default();
        assert!((query.threshold(10.0).unwrap() - 10.0).abs() < f64::EPSILON);

        let query = QueryArgs {
            threshold: Some(1.0),
            ..Default::default()
        };
        assert!((query.threshold(10.0).unwrap() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let query = QueryArgs {
            threshold: Some(-1.0),
            ..Default::default()
        };
        assert!(query.threshold(10.0).is_err());
    }

    #[test]
    fn test_date_range_trailing_days() {
        let query = QueryArgs {
            days: Some(7),
            ..Default::default()
        };
        let mut config = Config::default();
        config.query.days = 7;

        let range = query.date_range(&config, date(2024, 3, 10)).unwrap();
        assert_eq!(range.start, date(2024, 3, 3));
        assert_eq!(range.end, date(2024, 3, 10));
    }

    #[test]
    fn test_date_range_explicit() {
        let query = QueryArgs {
            start: Some(date(2024, 1, 1)),
            end: Some(date(2024, 1, 15)),
            ..Default::default()
        };
        let range = query.date_range(&Config::default(), date(2024, 3, 10)).unwrap();
        assert_eq!(range.start, date(2024, 1, 1));
        assert_eq!(range.end, date(2024, 1, 15));
    }

    #[test]
    fn test_date_range_inverted_rejected() {
        let query = QueryArgs {
            start: Some(date(2024, 2, 1)),
            end: Some(date(2024, 1, 1)),
            ..Default::default()
        };
        assert!(query.date_range(&Config::default(), date(2024, 3, 10)).is_err());
    }

    // ========== load_analysis ==========

    fn offline_request(snapshot: PathBuf) -> LoadRequest {
        let mut config = Config::default();
        config.snapshot.path = snapshot;
        LoadRequest {
            config,
            range: DateRange::new(date(2024, 1, 1), date(2024, 2, 1)).unwrap(),
            offline: true,
            threshold: 10.0,
        }
    }

    #[test]
    fn test_load_analysis_from_snapshot() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("snap.json");
        std::fs::write(
            &path,
            r#"[{"Date":"2024-01-01","Service":"EC2","Cost":12,"Unit":"USD"}]"#,
        )
        .unwrap();

        let loaded = load_analysis(&offline_request(path)).unwrap();
        assert_eq!(loaded.source, "snapshot");
        assert_eq!(loaded.analysis.report.recommendations().len(), 1);
        assert_eq!(loaded.range, None);
        assert_eq!(loaded.provenance(), "snapshot");
    }

    #[test]
    fn test_provenance_shows_range_when_applied() {
        let loaded = LoadedAnalysis {
            source: "cost-explorer".into(),
            range: Some(DateRange::new(date(2024, 1, 1), date(2024, 2, 1)).unwrap()),
            analysis: Analysis::default(),
        };
        assert_eq!(loaded.provenance(), "cost-explorer (2024-01-01 - 2024-02-01)");
    }

    #[test]
    fn test_load_analysis_all_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("snap.json");
        std::fs::write(
            &path,
            r#"[{"Date":"2024-01-01","Service":"EC2","Cost":"abc","Unit":"USD"}]"#,
        )
        .unwrap();

        let err = load_analysis(&offline_request(path)).unwrap_err();
        assert!(matches!(err, CostwatchError::NoUsableRecords { rejected: 1 }));
        assert!(err.is_no_data());
    }

    #[test]
    fn test_load_analysis_missing_snapshot_is_empty_input() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = load_analysis(&offline_request(tmp.path().join("none.json"))).unwrap_err();
        assert!(matches!(err, CostwatchError::EmptyInput { .. }));
    }
}
