use serde::Deserialize;
use serde_json::Value;

use crate::api_response::parse_response_items;
use crate::error::FetchError;

const CORNER_KICKS: &str = "Corner Kicks";

/// Corner kicks awarded to each side of one fixture. `None` means the source
/// reported no usable value for that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CornerCounts {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

impl CornerCounts {
    pub fn new(home: Option<u32>, away: Option<u32>) -> Self {
        Self { home, away }
    }

    /// Both sides summed, or `None` when either side is missing or the sum
    /// does not fit.
    pub fn total(&self) -> Option<u32> {
        self.home?.checked_add(self.away?)
    }
}

#[derive(Debug, Deserialize)]
struct TeamStatistics {
    #[serde(default)]
    statistics: Vec<StatEntry>,
}

#[derive(Debug, Deserialize)]
struct StatEntry {
    #[serde(rename = "type")]
    kind: Option<String>,
    value: Option<Value>,
}

/// Parses `/fixtures/statistics`. The first side listed is the home side.
pub fn parse_statistics_json(raw: &str) -> Result<CornerCounts, FetchError> {
    let items = parse_response_items("fixtures/statistics", raw)?;
    let mut sides = Vec::with_capacity(2);
    for item in items {
        let parsed: TeamStatistics =
            serde_json::from_value(item).map_err(|source| FetchError::Decode {
                endpoint: "fixtures/statistics".to_string(),
                source,
            })?;
        sides.push(corner_value(&parsed.statistics));
    }

    Ok(CornerCounts {
        home: sides.first().copied().flatten(),
        away: sides.get(1).copied().flatten(),
    })
}

fn corner_value(stats: &[StatEntry]) -> Option<u32> {
    let entry = stats
        .iter()
        .find(|s| s.kind.as_deref() == Some(CORNER_KICKS))?;
    match entry.value.as_ref()? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        // Observed occasionally as a numeric string.
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}
