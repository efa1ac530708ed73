use std::cmp::Ordering;
use std::collections::HashSet;

use rayon::prelude::*;

use crate::aggregator::{AggregatorOptions, TeamCornerSummary, compute_summary};
use crate::error::FetchError;
use crate::source::CornerDataSource;
use crate::teams::TeamRef;

#[derive(Debug, Clone)]
pub struct TeamRow {
    pub team: TeamRef,
    pub summary: TeamCornerSummary,
}

/// A league listing or a team that could not be loaded.
#[derive(Debug)]
pub struct ScanFailure {
    pub league_id: Option<u32>,
    pub team: Option<TeamRef>,
    pub error: FetchError,
}

impl ScanFailure {
    pub fn label(&self) -> String {
        match (&self.team, self.league_id) {
            (Some(team), _) => format!("{} ({})", team.name, team.id),
            (None, Some(league_id)) => format!("league {league_id}"),
            (None, None) => "search".to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanReport {
    /// Every team that loaded, in scan order.
    pub rows: Vec<TeamRow>,
    pub failures: Vec<ScanFailure>,
    pub teams_scanned: usize,
}

impl ScanReport {
    /// Teams at or above `min_over_percentage`, best first.
    pub fn qualifying(&self, min_over_percentage: f64) -> Vec<&TeamRow> {
        let mut rows: Vec<&TeamRow> = self
            .rows
            .iter()
            .filter(|row| row.summary.over_percentage >= min_over_percentage)
            .collect();
        rows.sort_by(|a, b| rank_rows(a, b));
        rows
    }

    /// Failures caused by a request timing out rather than a bad answer.
    pub fn timeout_count(&self) -> usize {
        self.failures.iter().filter(|f| f.error.is_timeout()).count()
    }

    pub fn find(&self, team_id: u32) -> Option<&TeamRow> {
        self.rows.iter().find(|row| row.team.id == team_id)
    }
}

fn rank_rows(a: &TeamRow, b: &TeamRow) -> Ordering {
    b.summary
        .over_percentage
        .partial_cmp(&a.summary.over_percentage)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            b.summary
                .weighted_mean_corners
                .partial_cmp(&a.summary.weighted_mean_corners)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.team.name.cmp(&b.team.name))
}

/// Lists every team of `league_ids` for `season` and summarizes each one.
///
/// A team that appears in two leagues is scanned once, under the first.
pub fn scan_leagues(
    source: &dyn CornerDataSource,
    league_ids: &[u32],
    season: u16,
    options: &AggregatorOptions,
    parallelism: usize,
) -> ScanReport {
    let mut failures = Vec::new();
    let mut teams = Vec::new();
    let mut seen = HashSet::new();

    for &league_id in league_ids {
        match source.fetch_league_teams(league_id, season) {
            Ok(listed) => {
                for team in listed {
                    if seen.insert(team.id) {
                        teams.push(team);
                    }
                }
            }
            Err(error) => failures.push(ScanFailure {
                league_id: Some(league_id),
                team: None,
                error,
            }),
        }
    }

    let mut report = summarize_teams(source, teams, options, parallelism);
    failures.append(&mut report.failures);
    report.failures = failures;
    report
}

/// Resolves `query` by name search and summarizes every match.
pub fn search_team(
    source: &dyn CornerDataSource,
    query: &str,
    options: &AggregatorOptions,
    parallelism: usize,
) -> ScanReport {
    match source.search_teams(query) {
        Ok(teams) => summarize_teams(source, teams, options, parallelism),
        Err(error) => ScanReport {
            rows: Vec::new(),
            failures: vec![ScanFailure {
                league_id: None,
                team: None,
                error,
            }],
            teams_scanned: 0,
        },
    }
}

pub fn summarize_teams(
    source: &dyn CornerDataSource,
    teams: Vec<TeamRef>,
    options: &AggregatorOptions,
    parallelism: usize,
) -> ScanReport {
    let teams_scanned = teams.len();
    let summarize = |team: TeamRef| {
        let result = compute_summary(source, team.id, options);
        (team, result)
    };
    let results: Vec<(TeamRef, Result<TeamCornerSummary, FetchError>)> = if parallelism <= 1 {
        teams.into_iter().map(summarize).collect()
    } else {
        let pool = build_scan_pool(parallelism);
        with_scan_pool(&pool, || teams.into_par_iter().map(summarize).collect())
    };

    let mut rows = Vec::new();
    let mut failures = Vec::new();
    for (team, result) in results {
        match result {
            Ok(summary) => rows.push(TeamRow { team, summary }),
            Err(error) => failures.push(ScanFailure {
                league_id: team.league_id,
                team: Some(team),
                error,
            }),
        }
    }

    ScanReport {
        rows,
        failures,
        teams_scanned,
    }
}

fn build_scan_pool(parallelism: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(parallelism.min(16))
        .build()
        .ok()
}

fn with_scan_pool<T>(pool: &Option<rayon::ThreadPool>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    if let Some(pool) = pool.as_ref() {
        pool.install(action)
    } else {
        action()
    }
}
