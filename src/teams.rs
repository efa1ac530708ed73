use serde_json::Value;

use crate::api_response::parse_response_items;
use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRef {
    pub id: u32,
    pub name: String,
    /// League the team was listed under; `None` for name-search results.
    pub league_id: Option<u32>,
    pub country: Option<String>,
}

impl TeamRef {
    /// Name with the country appended when known, e.g. `Arsenal (England)`.
    pub fn display_name(&self) -> String {
        match self.country.as_deref().map(str::trim) {
            Some(country) if !country.is_empty() => format!("{} ({country})", self.name),
            _ => self.name.clone(),
        }
    }
}

/// Parses `/teams` (league roster or name search).
pub fn parse_teams_json(raw: &str, league_id: Option<u32>) -> Result<Vec<TeamRef>, FetchError> {
    let items = parse_response_items("teams", raw)?;
    Ok(items
        .iter()
        .filter_map(|item| parse_team(item, league_id))
        .collect())
}

fn parse_team(v: &Value, league_id: Option<u32>) -> Option<TeamRef> {
    let team = v.get("team")?;
    let id = u32::try_from(team.get("id")?.as_u64()?).ok()?;
    let name = team.get("name")?.as_str()?.trim().to_string();
    if name.is_empty() {
        return None;
    }
    let country = team
        .get("country")
        .and_then(|x| x.as_str())
        .map(|s| s.to_string());
    Some(TeamRef {
        id,
        name,
        league_id,
        country,
    })
}
