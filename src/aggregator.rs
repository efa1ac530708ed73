//! Corner-kick aggregation for one team.
//!
//! The fold turns the team's most recent fixtures (newest first) into a
//! simple mean, a recency-weighted mean and the share of matches over the
//! corner line. Fixtures with a missing corner count on either side are
//! dropped from every figure.

use std::fmt;
use std::str::FromStr;

use crate::error::FetchError;
use crate::fixtures::Fixture;
use crate::odds::OddsTieBreak;
use crate::source::CornerDataSource;
use crate::statistics::CornerCounts;

pub const DEFAULT_WINDOW: usize = 10;
/// Weight slots: the most recent fixture weighs 10, the tenth weighs 1.
pub const WEIGHT_SLOTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CornerLine {
    #[default]
    Over7_5,
    Over8_5,
}

impl CornerLine {
    pub const ALL: [CornerLine; 2] = [CornerLine::Over7_5, CornerLine::Over8_5];

    pub fn threshold(self) -> f64 {
        match self {
            CornerLine::Over7_5 => 7.5,
            CornerLine::Over8_5 => 8.5,
        }
    }

    /// Outcome label as bookmakers write it.
    pub fn label(self) -> &'static str {
        match self {
            CornerLine::Over7_5 => "Over 7.5",
            CornerLine::Over8_5 => "Over 8.5",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            CornerLine::Over7_5 => CornerLine::Over8_5,
            CornerLine::Over8_5 => CornerLine::Over7_5,
        }
    }

    pub fn is_over(self, corners: u32) -> bool {
        f64::from(corners) > self.threshold()
    }

    pub fn tier(self, corners: u32) -> Tier {
        let c = f64::from(corners);
        let threshold = self.threshold();
        if c > threshold {
            Tier::Green
        } else if c >= threshold - 1.5 {
            Tier::Yellow
        } else {
            Tier::Red
        }
    }
}

impl fmt::Display for CornerLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CornerLine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = s
            .trim()
            .to_ascii_lowercase()
            .replace("over", "")
            .replace([' ', '_'], "");
        match cleaned.as_str() {
            "7.5" | "75" => Ok(CornerLine::Over7_5),
            "8.5" | "85" => Ok(CornerLine::Over8_5),
            _ => Err(format!("unsupported corner line {s:?}, expected 7.5 or 8.5")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Green,
    Yellow,
    Red,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Tier::Green => "GREEN",
            Tier::Yellow => "YELLOW",
            Tier::Red => "RED",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AggregatorOptions {
    /// Fixtures requested, at most [`WEIGHT_SLOTS`].
    pub window: usize,
    pub line: CornerLine,
    pub include_odds: bool,
    pub odds_tie_break: OddsTieBreak,
    /// Divide the weighted total by the weight sum of all ten slots (55) even
    /// when fixtures are missing or invalid.
    pub fixed_window_denominator: bool,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            line: CornerLine::default(),
            include_odds: true,
            odds_tie_break: OddsTieBreak::default(),
            fixed_window_denominator: true,
        }
    }
}

impl AggregatorOptions {
    pub fn with_line(&self, line: CornerLine) -> Self {
        Self {
            line,
            ..self.clone()
        }
    }

    fn effective_window(&self) -> usize {
        self.window.clamp(1, WEIGHT_SLOTS)
    }
}

/// One fetched fixture with its statistics and (optional) quote.
#[derive(Debug, Clone)]
pub struct FixtureObservation {
    pub fixture: Fixture,
    pub corners: CornerCounts,
    pub odds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub fixture_id: u64,
    pub date: String,
    pub opponent: String,
    pub corners: u32,
    pub tier: Tier,
    pub odds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamCornerSummary {
    pub team_id: u32,
    pub line: CornerLine,
    pub fixtures_returned: usize,
    pub valid_count: usize,
    pub over_count: usize,
    pub mean_corners: f64,
    pub weighted_mean_corners: f64,
    pub over_percentage: f64,
    /// Most recent first, in fetch order.
    pub history: Vec<MatchRecord>,
}

impl TeamCornerSummary {
    /// History oldest first, for charting.
    pub fn trend(&self) -> Vec<&MatchRecord> {
        self.history.iter().rev().collect()
    }

    pub fn has_data(&self) -> bool {
        self.valid_count > 0
    }
}

/// Fetches the team's recent fixtures and folds them into a summary.
///
/// Any failed fetch fails the whole team. Statistics and odds are requested
/// one fixture at a time; odds are skipped for fixtures without usable corner
/// counts since those never reach the history.
pub fn compute_summary(
    source: &dyn CornerDataSource,
    team_id: u32,
    options: &AggregatorOptions,
) -> Result<TeamCornerSummary, FetchError> {
    let window = options.effective_window();
    let mut fixtures = source.fetch_fixtures(team_id, window)?;
    let fixtures_returned = fixtures.len();
    fixtures.truncate(window);

    let mut observations = Vec::with_capacity(fixtures.len());
    for fixture in fixtures {
        let corners = source.fetch_statistics(fixture.id)?;
        let odds = if options.include_odds && corners.total().is_some() {
            source.fetch_odds(fixture.id, options.line, options.odds_tie_break)?
        } else {
            None
        };
        observations.push(FixtureObservation {
            fixture,
            corners,
            odds,
        });
    }

    let mut summary = summarize(team_id, &observations, options);
    summary.fixtures_returned = fixtures_returned;
    Ok(summary)
}

/// Pure fold over already-fetched observations, newest first.
pub fn summarize(
    team_id: u32,
    observations: &[FixtureObservation],
    options: &AggregatorOptions,
) -> TeamCornerSummary {
    let window = options.effective_window();
    let line = options.line;

    let mut total = 0u64;
    let mut weighted_total = 0u64;
    let mut weights_used = 0u64;
    let mut valid_count = 0usize;
    let mut over_count = 0usize;
    let mut history = Vec::new();

    for (i, obs) in observations.iter().take(window).enumerate() {
        let Some(corners) = obs.corners.total() else {
            continue;
        };
        let weight = (WEIGHT_SLOTS - i) as u64;
        total += u64::from(corners);
        weighted_total += u64::from(corners) * weight;
        weights_used += weight;
        valid_count += 1;
        if line.is_over(corners) {
            over_count += 1;
        }

        history.push(MatchRecord {
            fixture_id: obs.fixture.id,
            date: obs.fixture.date(),
            opponent: obs.fixture.opponent_name(team_id).to_string(),
            corners,
            tier: line.tier(corners),
            odds: obs.odds,
        });
    }

    let (mean_corners, weighted_mean_corners, over_percentage) = if valid_count == 0 {
        (0.0, 0.0, 0.0)
    } else {
        let denominator = if options.fixed_window_denominator {
            window_weight_sum(WEIGHT_SLOTS)
        } else {
            weights_used
        };
        (
            round_to(total as f64 / valid_count as f64, 2),
            round_to(weighted_total as f64 / denominator as f64, 2),
            round_to(100.0 * over_count as f64 / valid_count as f64, 1),
        )
    };

    TeamCornerSummary {
        team_id,
        line,
        fixtures_returned: observations.len(),
        valid_count,
        over_count,
        mean_corners,
        weighted_mean_corners,
        over_percentage,
        history,
    }
}

/// 1 + 2 + ... + window.
pub fn window_weight_sum(window: usize) -> u64 {
    let w = window as u64;
    w * (w + 1) / 2
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
