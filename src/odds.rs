use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::aggregator::CornerLine;
use crate::api_response::parse_response_items;
use crate::error::FetchError;

/// Bet names searched for the corner over/under market.
const BET_NAMES: [&str; 2] = ["Corners", "Over/Under"];

/// Which quote wins when several bookmakers price the same outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OddsTieBreak {
    /// Last quote in response order.
    #[default]
    Last,
    /// First quote in response order.
    First,
    /// Highest decimal price.
    Best,
}

impl OddsTieBreak {
    pub fn label(self) -> &'static str {
        match self {
            OddsTieBreak::Last => "last",
            OddsTieBreak::First => "first",
            OddsTieBreak::Best => "best",
        }
    }
}

impl fmt::Display for OddsTieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OddsTieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last" => Ok(OddsTieBreak::Last),
            "first" => Ok(OddsTieBreak::First),
            "best" | "max" => Ok(OddsTieBreak::Best),
            other => Err(format!("unknown odds tie-break {other:?}, expected last/first/best")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OddsEntry {
    #[serde(default)]
    bookmakers: Vec<Bookmaker>,
}

#[derive(Debug, Deserialize)]
struct Bookmaker {
    #[serde(default)]
    bets: Vec<Bet>,
}

#[derive(Debug, Deserialize)]
struct Bet {
    name: Option<String>,
    #[serde(default)]
    values: Vec<BetValue>,
}

#[derive(Debug, Deserialize)]
struct BetValue {
    value: Option<serde_json::Value>,
    odd: Option<serde_json::Value>,
}

/// Parses `/odds` and returns the price for `"Over {threshold}"`, or `None`
/// when no bookmaker offers it.
pub fn parse_odds_json(
    raw: &str,
    line: CornerLine,
    tie_break: OddsTieBreak,
) -> Result<Option<f64>, FetchError> {
    let items = parse_response_items("odds", raw)?;
    let mut entries = Vec::with_capacity(items.len());
    for item in items {
        let entry: OddsEntry = serde_json::from_value(item).map_err(|source| FetchError::Decode {
            endpoint: "odds".to_string(),
            source,
        })?;
        entries.push(entry);
    }
    Ok(pick_quote(collect_quotes(&entries, line), tie_break))
}

fn collect_quotes(entries: &[OddsEntry], line: CornerLine) -> Vec<f64> {
    let outcome = line.label();
    let mut quotes = Vec::new();
    for entry in entries {
        for bookmaker in &entry.bookmakers {
            for bet in &bookmaker.bets {
                let Some(name) = bet.name.as_deref() else {
                    continue;
                };
                if !BET_NAMES.contains(&name.trim()) {
                    continue;
                }
                // At most one quote per bet: the first matching outcome value.
                let price = bet
                    .values
                    .iter()
                    .find(|v| text_of(v.value.as_ref()).as_deref() == Some(outcome))
                    .and_then(|v| price_of(v.odd.as_ref()));
                if let Some(price) = price {
                    quotes.push(price);
                }
            }
        }
    }
    quotes
}

pub(crate) fn pick_quote(quotes: Vec<f64>, tie_break: OddsTieBreak) -> Option<f64> {
    match tie_break {
        OddsTieBreak::Last => quotes.last().copied(),
        OddsTieBreak::First => quotes.first().copied(),
        OddsTieBreak::Best => quotes.into_iter().reduce(f64::max),
    }
}

fn text_of(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

fn price_of(value: Option<&serde_json::Value>) -> Option<f64> {
    let price = match value? {
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        serde_json::Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    if price.is_finite() && price > 0.0 {
        Some(price)
    } else {
        None
    }
}
