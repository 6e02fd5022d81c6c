//! Billing sources and the fallback chain that picks one per run

mod cost_explorer;
mod snapshot;

pub use cost_explorer::CostExplorerClient;
pub use snapshot::{read_snapshot, write_snapshot, SnapshotSource};

use crate::config::Config;
use crate::types::{CostwatchError, DateRange, RawCostEntry, Result};

/// Anything that can supply raw billing entries for a date range
pub trait BillingSource: Send + Sync {
    /// Source name used in logs and errors (e.g., "cost-explorer")
    fn name(&self) -> &str;

    /// Fetch entries. `Ok(vec![])` means the source had no data.
    fn fetch(&self, range: &DateRange) -> Result<Vec<RawCostEntry>>;

    /// Whether fetched entries are limited to the requested range
    fn applies_range(&self) -> bool {
        true
    }
}

/// Entries from the first source that produced any
#[derive(Debug)]
pub struct SourceLoad {
    pub source: String,
    /// Range the entries were fetched for; `None` when the source ignores it
    pub range: Option<DateRange>,
    pub entries: Vec<RawCostEntry>,
}

/// Ordered list of sources tried until one yields data
pub struct SourceChain {
    sources: Vec<Box<dyn BillingSource>>,
}

impl SourceChain {
    pub fn new(sources: Vec<Box<dyn BillingSource>>) -> Self {
        Self { sources }
    }

    /// Live Cost Explorer (unless disabled or offline), then the snapshot.
    ///
    /// A Cost Explorer client that cannot be built is logged and left out.
    pub fn from_config(config: &Config, offline: bool) -> Self {
        let mut sources: Vec<Box<dyn BillingSource>> = Vec::new();

        if config.cost_explorer.enabled && !offline {
            match CostExplorerClient::from_settings(&config.cost_explorer) {
                Ok(client) => sources.push(Box::new(client)),
                Err(e) => tracing::warn!("cost explorer client unavailable: {}", e),
            }
        }
        sources.push(Box::new(SnapshotSource::new(config.snapshot.path.clone())));

        Self::new(sources)
    }

    pub fn sources(&self) -> &[Box<dyn BillingSource>] {
        &self.sources
    }

    /// Try each source in order. Errors and empty results fall through to the
    /// next source; running out of sources is `EmptyInput`.
    pub fn load(&self, range: &DateRange) -> Result<SourceLoad> {
        let mut tried = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            tried.push(source.name().to_string());
            match source.fetch(range) {
                Ok(entries) if !entries.is_empty() => {
                    tracing::info!(
                        source = source.name(),
                        entries = entries.len(),
                        %range,
                        "loaded billing data"
                    );
                    return Ok(SourceLoad {
                        source: source.name().to_string(),
                        range: source.applies_range().then_some(*range),
                        entries,
                    });
                }
                Ok(_) => {
                    tracing::warn!(source = source.name(), %range, "source returned no data");
                }
                Err(e) => {
                    tracing::warn!(source = source.name(), "source failed: {}", e);
                }
            }
        }

        Err(CostwatchError::EmptyInput { tried })
    }
}
