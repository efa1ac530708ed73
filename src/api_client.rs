use reqwest::blocking::Client;

use crate::aggregator::CornerLine;
use crate::api_response::snippet;
use crate::config::DashboardConfig;
use crate::error::FetchError;
use crate::fixtures::{Fixture, parse_fixtures_json};
use crate::http_client::http_client_with_timeout;
use crate::odds::{OddsTieBreak, parse_odds_json};
use crate::source::CornerDataSource;
use crate::statistics::{CornerCounts, parse_statistics_json};
use crate::teams::{TeamRef, parse_teams_json};

const API_KEY_HEADER: &str = "x-apisports-key";

/// Blocking client for API-Football (API-Sports v3).
pub struct ApiFootballClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl ApiFootballClient {
    pub fn new(cfg: &DashboardConfig) -> Result<Self, FetchError> {
        let Some(api_key) = cfg.api_key.clone() else {
            return Err(FetchError::MissingApiKey);
        };
        Ok(Self {
            http: http_client_with_timeout(cfg.timeout_secs)?,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn get(&self, endpoint: &str, query: &[(&str, String)]) -> Result<String, FetchError> {
        let url = format!("{}/{endpoint}", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(query)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .send()
            .map_err(|source| FetchError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;
        let status = resp.status();
        let body = resp.text().map_err(|source| FetchError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                snippet: snippet(&body),
            });
        }
        Ok(body)
    }
}

impl CornerDataSource for ApiFootballClient {
    fn fetch_fixtures(&self, team_id: u32, limit: usize) -> Result<Vec<Fixture>, FetchError> {
        let body = self.get(
            "fixtures",
            &[("team", team_id.to_string()), ("last", limit.to_string())],
        )?;
        parse_fixtures_json(&body)
    }

    fn fetch_statistics(&self, fixture_id: u64) -> Result<CornerCounts, FetchError> {
        let body = self.get("fixtures/statistics", &[("fixture", fixture_id.to_string())])?;
        parse_statistics_json(&body)
    }

    fn fetch_odds(
        &self,
        fixture_id: u64,
        line: CornerLine,
        tie_break: OddsTieBreak,
    ) -> Result<Option<f64>, FetchError> {
        let body = self.get("odds", &[("fixture", fixture_id.to_string())])?;
        parse_odds_json(&body, line, tie_break)
    }

    fn fetch_league_teams(&self, league_id: u32, season: u16) -> Result<Vec<TeamRef>, FetchError> {
        let body = self.get(
            "teams",
            &[("league", league_id.to_string()), ("season", season.to_string())],
        )?;
        parse_teams_json(&body, Some(league_id))
    }

    fn search_teams(&self, query: &str) -> Result<Vec<TeamRef>, FetchError> {
        let body = self.get("teams", &[("search", query.trim().to_string())])?;
        parse_teams_json(&body, None)
    }

    fn name(&self) -> &'static str {
        "api-football"
    }
}
