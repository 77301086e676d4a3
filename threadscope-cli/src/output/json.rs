//! JSON output formatting.

use anyhow::Result;
use serde::Serialize;
use threadscope_core::ThreadResult;
use threadscope_fetch::StrategyInfo;

// ============================================================================
// Output Types
// ============================================================================

/// One entry of the strategy listing.
#[derive(Debug, Serialize)]
pub struct StrategyOutput {
    pub id: String,
    pub display_name: String,
    pub priority: u32,
}

impl From<&StrategyInfo> for StrategyOutput {
    fn from(info: &StrategyInfo) -> Self {
        Self {
            id: info.id.clone(),
            display_name: info.kind.display_name().to_string(),
            priority: info.priority,
        }
    }
}

/// Threads found for a search query.
#[derive(Debug, Serialize)]
pub struct SearchThreadsOutput {
    pub query: String,
    pub max_depth: u32,
    pub threads: Vec<ThreadResult>,
}

// ============================================================================
// Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats the strategy listing.
    pub fn format_strategies(&self, strategies: &[StrategyInfo]) -> Result<String> {
        let outputs: Vec<StrategyOutput> = strategies.iter().map(StrategyOutput::from).collect();
        self.format(&outputs)
    }
}
