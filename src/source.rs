use crate::aggregator::CornerLine;
use crate::error::FetchError;
use crate::fixtures::Fixture;
use crate::odds::OddsTieBreak;
use crate::statistics::CornerCounts;
use crate::teams::TeamRef;

/// Read-only access to fixtures, statistics, odds and team listings.
///
/// Implementations must be shareable across scan threads.
pub trait CornerDataSource: Sync {
    /// The team's most recent fixtures, newest first.
    fn fetch_fixtures(&self, team_id: u32, limit: usize) -> Result<Vec<Fixture>, FetchError>;

    fn fetch_statistics(&self, fixture_id: u64) -> Result<CornerCounts, FetchError>;

    fn fetch_odds(
        &self,
        fixture_id: u64,
        line: CornerLine,
        tie_break: OddsTieBreak,
    ) -> Result<Option<f64>, FetchError>;

    fn fetch_league_teams(&self, league_id: u32, season: u16) -> Result<Vec<TeamRef>, FetchError>;

    fn search_teams(&self, query: &str) -> Result<Vec<TeamRef>, FetchError>;

    /// Short name for logs and headers.
    fn name(&self) -> &'static str;
}
