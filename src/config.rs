use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::aggregator::{AggregatorOptions, CornerLine, DEFAULT_WINDOW, WEIGHT_SLOTS};
use crate::http_client::DEFAULT_TIMEOUT_SECS;
use crate::odds::OddsTieBreak;

pub const DEFAULT_BASE_URL: &str = "https://v3.football.api-sports.io";
const DEFAULT_SEASON: u16 = 2024;
const DEFAULT_MIN_OVER_PCT: f64 = 85.0;
const DEFAULT_PARALLELISM: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryLeagues {
    pub country: String,
    pub league_ids: Vec<u32>,
}

/// Countries and the league ids scanned for each, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueCatalog {
    pub countries: Vec<CountryLeagues>,
}

impl Default for LeagueCatalog {
    fn default() -> Self {
        let entries: [(&str, &[u32]); 15] = [
            ("England", &[39, 40]),
            ("Spain", &[140, 141]),
            ("Italy", &[135, 136]),
            ("Germany", &[78, 79]),
            ("France", &[61, 62]),
            ("Netherlands", &[88]),
            ("Portugal", &[94]),
            ("Brazil", &[71, 72]),
            ("Argentina", &[128]),
            ("Colombia", &[76]),
            ("United States", &[253]),
            ("Mexico", &[262]),
            ("Belgium", &[144]),
            ("Japan", &[98]),
            ("South Korea", &[292]),
        ];
        Self {
            countries: entries
                .iter()
                .map(|(country, ids)| CountryLeagues {
                    country: country.to_string(),
                    league_ids: ids.to_vec(),
                })
                .collect(),
        }
    }
}

impl LeagueCatalog {
    /// Reads a catalog file: either `{"countries": [...]}` or a bare
    /// `{"Country": [ids]}` map.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read league catalog {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parse league catalog {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        if let Ok(catalog) = serde_json::from_str::<LeagueCatalog>(raw) {
            return Ok(catalog);
        }
        let map: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(raw).context("invalid league catalog json")?;
        let mut countries = Vec::with_capacity(map.len());
        for (country, ids) in map {
            let league_ids: Vec<u32> = serde_json::from_value(ids)
                .with_context(|| format!("league ids for {country}"))?;
            countries.push(CountryLeagues {
                country,
                league_ids,
            });
        }
        Ok(Self { countries })
    }

    pub fn country_names(&self) -> Vec<String> {
        self.countries.iter().map(|c| c.country.clone()).collect()
    }

    pub fn leagues_for(&self, country: &str) -> Option<&[u32]> {
        let wanted = country.trim();
        self.countries
            .iter()
            .find(|c| c.country.eq_ignore_ascii_case(wanted))
            .map(|c| c.league_ids.as_slice())
    }

    pub fn all_league_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .countries
            .iter()
            .flat_map(|c| c.league_ids.iter().copied())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub season: u16,
    pub league_catalog: LeagueCatalog,
    pub window: usize,
    pub line: CornerLine,
    pub min_over_percentage: f64,
    pub include_odds: bool,
    pub odds_tie_break: OddsTieBreak,
    pub fixed_window_denominator: bool,
    pub parallelism: usize,
    pub timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            season: DEFAULT_SEASON,
            league_catalog: LeagueCatalog::default(),
            window: DEFAULT_WINDOW,
            line: CornerLine::default(),
            min_over_percentage: DEFAULT_MIN_OVER_PCT,
            include_odds: true,
            odds_tie_break: OddsTieBreak::default(),
            fixed_window_denominator: true,
            parallelism: DEFAULT_PARALLELISM,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl DashboardConfig {
    /// Loads `.env.local` / `.env` (if present) and then reads the environment.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_env()
    }

    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let api_key = env::var("API_FOOTBALL_KEY")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let base_url = env::var("API_FOOTBALL_BASE_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.base_url);
        let season = env_parse("CORNER_SEASON").unwrap_or(defaults.season);
        let window = env_parse::<usize>("CORNER_WINDOW")
            .unwrap_or(defaults.window)
            .clamp(1, WEIGHT_SLOTS);
        let line = match env::var("CORNER_LINE") {
            Ok(raw) if !raw.trim().is_empty() => raw
                .parse::<CornerLine>()
                .map_err(anyhow::Error::msg)
                .context("CORNER_LINE")?,
            _ => defaults.line,
        };
        let min_over_percentage = env_parse::<f64>("CORNER_MIN_PCT")
            .filter(|v| v.is_finite())
            .unwrap_or(defaults.min_over_percentage)
            .clamp(0.0, 100.0);
        let include_odds = env_bool("CORNER_ODDS", defaults.include_odds);
        let odds_tie_break = match env::var("CORNER_ODDS_TIE_BREAK") {
            Ok(raw) if !raw.trim().is_empty() => raw
                .parse::<OddsTieBreak>()
                .map_err(anyhow::Error::msg)
                .context("CORNER_ODDS_TIE_BREAK")?,
            _ => defaults.odds_tie_break,
        };
        let fixed_window_denominator =
            env_bool("CORNER_FIXED_DENOMINATOR", defaults.fixed_window_denominator);
        let parallelism = env_parse::<usize>("CORNER_PARALLELISM")
            .unwrap_or(defaults.parallelism)
            .clamp(1, 16);
        let timeout_secs = env_parse::<u64>("HTTP_TIMEOUT_SECS")
            .unwrap_or(defaults.timeout_secs)
            .clamp(1, 120);
        let league_catalog = match env::var("LEAGUE_CATALOG_PATH") {
            Ok(path) if !path.trim().is_empty() => LeagueCatalog::load(Path::new(path.trim()))?,
            _ => defaults.league_catalog,
        };

        Ok(Self {
            api_key,
            base_url,
            season,
            league_catalog,
            window,
            line,
            min_over_percentage,
            include_odds,
            odds_tie_break,
            fixed_window_denominator,
            parallelism,
            timeout_secs,
        })
    }

    pub fn aggregator_options(&self) -> AggregatorOptions {
        AggregatorOptions {
            window: self.window,
            line: self.line,
            include_odds: self.include_odds,
            odds_tie_break: self.odds_tie_break,
            fixed_window_denominator: self.fixed_window_denominator,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| {
            let t = v.trim().to_ascii_lowercase();
            !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
        })
        .unwrap_or(default)
}
