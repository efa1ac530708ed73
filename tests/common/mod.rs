#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{Duration, NaiveDate};

use corner_dashboard::aggregator::CornerLine;
use corner_dashboard::error::FetchError;
use corner_dashboard::fixtures::Fixture;
use corner_dashboard::odds::OddsTieBreak;
use corner_dashboard::source::CornerDataSource;
use corner_dashboard::statistics::CornerCounts;
use corner_dashboard::teams::TeamRef;

pub fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// In-memory source; fixture ids are `team_id * 100 + position`.
#[derive(Default)]
pub struct MockSource {
    pub fixtures: HashMap<u32, Vec<Fixture>>,
    pub stats: HashMap<u64, CornerCounts>,
    pub odds: HashMap<u64, f64>,
    pub rosters: HashMap<u32, Vec<TeamRef>>,
    pub failing_teams: HashSet<u32>,
    pub failing_odds: HashSet<u64>,
    pub failing_leagues: HashSet<u32>,
    /// Return every stored fixture regardless of the requested limit.
    pub ignore_limit: bool,
    pub statistics_calls: AtomicUsize,
    pub odds_calls: AtomicUsize,
}

impl MockSource {
    /// Adds a team whose fixtures (newest first) carry the given per-side
    /// corner counts. The team alternates away / home, starting away.
    pub fn with_team(mut self, team_id: u32, corners: &[(Option<u32>, Option<u32>)]) -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 5, 19).expect("valid date");
        let mut fixtures = Vec::with_capacity(corners.len());
        for (i, (home, away)) in corners.iter().enumerate() {
            let id = u64::from(team_id) * 100 + i as u64;
            let date = start - Duration::days(7 * i as i64);
            let opponent_id = 9000 + i as u32;
            let opponent = format!("Opponent {i}");
            let (home_id, home_name, away_id, away_name) = if i % 2 == 0 {
                (opponent_id, opponent, team_id, format!("Team {team_id}"))
            } else {
                (team_id, format!("Team {team_id}"), opponent_id, opponent)
            };
            fixtures.push(Fixture {
                id,
                kickoff: format!("{}T15:00:00+00:00", date.format("%Y-%m-%d")),
                home_id,
                home_name,
                away_id,
                away_name,
            });
            self.stats.insert(id, CornerCounts::new(*home, *away));
        }
        self.fixtures.insert(team_id, fixtures);
        self
    }

    /// Same as [`MockSource::with_team`] from match totals, all valid.
    pub fn with_totals(self, team_id: u32, totals: &[u32]) -> Self {
        let corners: Vec<(Option<u32>, Option<u32>)> = totals
            .iter()
            .map(|t| (Some(t / 2 + t % 2), Some(t / 2)))
            .collect();
        self.with_team(team_id, &corners)
    }

    pub fn with_roster(mut self, league_id: u32, team_ids: &[u32]) -> Self {
        let teams = team_ids
            .iter()
            .map(|id| TeamRef {
                id: *id,
                name: format!("Team {id}"),
                league_id: Some(league_id),
                country: None,
            })
            .collect();
        self.rosters.insert(league_id, teams);
        self
    }
}

fn failure(endpoint: &str) -> FetchError {
    FetchError::Status {
        endpoint: endpoint.to_string(),
        status: 500,
        snippet: "mock failure".to_string(),
    }
}

impl CornerDataSource for MockSource {
    fn fetch_fixtures(&self, team_id: u32, limit: usize) -> Result<Vec<Fixture>, FetchError> {
        if self.failing_teams.contains(&team_id) {
            return Err(failure("fixtures"));
        }
        Ok(self
            .fixtures
            .get(&team_id)
            .map(|f| {
                let take = if self.ignore_limit { f.len() } else { limit };
                f.iter().take(take).cloned().collect()
            })
            .unwrap_or_default())
    }

    fn fetch_statistics(&self, fixture_id: u64) -> Result<CornerCounts, FetchError> {
        self.statistics_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.stats.get(&fixture_id).copied().unwrap_or_default())
    }

    fn fetch_odds(
        &self,
        fixture_id: u64,
        _line: CornerLine,
        _tie_break: OddsTieBreak,
    ) -> Result<Option<f64>, FetchError> {
        self.odds_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_odds.contains(&fixture_id) {
            return Err(failure("odds"));
        }
        Ok(self.odds.get(&fixture_id).copied())
    }

    fn fetch_league_teams(&self, league_id: u32, _season: u16) -> Result<Vec<TeamRef>, FetchError> {
        if self.failing_leagues.contains(&league_id) {
            return Err(failure("teams"));
        }
        Ok(self.rosters.get(&league_id).cloned().unwrap_or_default())
    }

    fn search_teams(&self, query: &str) -> Result<Vec<TeamRef>, FetchError> {
        let needle = query.to_ascii_lowercase();
        let mut out: Vec<TeamRef> = self
            .rosters
            .values()
            .flatten()
            .filter(|t| t.name.to_ascii_lowercase().contains(&needle))
            .cloned()
            .collect();
        out.sort_by_key(|t| t.id);
        out.dedup_by_key(|t| t.id);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
