use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::api_response::parse_response_items;
use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub id: u64,
    /// Kickoff as reported by the source (ISO 8601 with offset for API-Sports).
    pub kickoff: String,
    pub home_id: u32,
    pub home_name: String,
    pub away_id: u32,
    pub away_name: String,
}

impl Fixture {
    /// Kickoff truncated to the calendar day, `YYYY-MM-DD`.
    pub fn date(&self) -> String {
        if let Some(day) = parse_kickoff_date(&self.kickoff) {
            return day.format("%Y-%m-%d").to_string();
        }
        self.kickoff.trim().chars().take(10).collect()
    }

    /// The other side's name. A team listed as away plays the home side;
    /// anything else is treated as the home team.
    pub fn opponent_name(&self, team_id: u32) -> &str {
        if self.away_id == team_id {
            &self.home_name
        } else {
            &self.away_name
        }
    }
}

pub fn parse_fixtures_json(raw: &str) -> Result<Vec<Fixture>, FetchError> {
    let items = parse_response_items("fixtures", raw)?;
    Ok(items.iter().filter_map(parse_fixture).collect())
}

fn parse_fixture(v: &Value) -> Option<Fixture> {
    let info = v.get("fixture")?;
    let id = info.get("id")?.as_u64()?;
    let kickoff = info
        .get("date")
        .and_then(|x| x.as_str())
        .unwrap_or_default()
        .to_string();

    let teams = v.get("teams")?;
    let home = teams.get("home")?;
    let away = teams.get("away")?;
    let home_id = u32::try_from(home.get("id")?.as_u64()?).ok()?;
    let away_id = u32::try_from(away.get("id")?.as_u64()?).ok()?;
    let home_name = team_name(home);
    let away_name = team_name(away);

    Some(Fixture {
        id,
        kickoff,
        home_id,
        home_name,
        away_id,
        away_name,
    })
}

fn team_name(side: &Value) -> String {
    side.get("name")
        .and_then(|x| x.as_str())
        .unwrap_or_default()
        .to_string()
}

fn parse_kickoff_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        // API-Sports reports the local offset; the calendar day is taken as written.
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(naive.date());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(kickoff: &str) -> Fixture {
        Fixture {
            id: 1,
            kickoff: kickoff.to_string(),
            home_id: 10,
            home_name: "Home".to_string(),
            away_id: 20,
            away_name: "Away".to_string(),
        }
    }

    #[test]
    fn date_keeps_written_calendar_day() {
        assert_eq!(fixture("2024-05-19T23:30:00-03:00").date(), "2024-05-19");
        assert_eq!(fixture("2024-05-19T15:00:00+00:00").date(), "2024-05-19");
        assert_eq!(fixture("2024-05-19").date(), "2024-05-19");
    }

    #[test]
    fn unparsable_date_falls_back_to_prefix() {
        assert_eq!(fixture("2024-05-19 garbage").date(), "2024-05-19");
    }

    #[test]
    fn opponent_is_resolved_from_away_id() {
        let f = fixture("2024-05-19");
        assert_eq!(f.opponent_name(20), "Home");
        assert_eq!(f.opponent_name(10), "Away");
    }
}
