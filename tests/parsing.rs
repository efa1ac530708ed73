mod common;

use corner_dashboard::aggregator::CornerLine;
use corner_dashboard::error::FetchError;
use corner_dashboard::fixtures::parse_fixtures_json;
use corner_dashboard::odds::{OddsTieBreak, parse_odds_json};
use corner_dashboard::statistics::parse_statistics_json;
use corner_dashboard::teams::parse_teams_json;

use common::read_fixture;

#[test]
fn parses_fixtures_fixture() {
    let raw = read_fixture("fixtures_last3.json");
    let fixtures = parse_fixtures_json(&raw).expect("fixture should parse");
    // The entry without a fixture id is skipped.
    assert_eq!(fixtures.len(), 3);
    assert_eq!(fixtures[0].id, 1035550);
    assert_eq!(fixtures[0].date(), "2024-05-25");
    assert_eq!(fixtures[0].opponent_name(33), "Manchester City");
    assert_eq!(fixtures[1].opponent_name(33), "Brighton");
    assert_eq!(fixtures[2].home_id, 33);
    assert_eq!(fixtures[2].opponent_name(33), "Newcastle");
    assert_eq!(fixtures[2].date(), "2024-05-15");
}

#[test]
fn parses_statistics_fixture() {
    let raw = read_fixture("statistics_full.json");
    let corners = parse_statistics_json(&raw).expect("fixture should parse");
    assert_eq!(corners.home, Some(6));
    assert_eq!(corners.away, Some(4));
    assert_eq!(corners.total(), Some(10));
}

#[test]
fn null_corner_count_makes_fixture_invalid() {
    let raw = read_fixture("statistics_null_away.json");
    let corners = parse_statistics_json(&raw).expect("fixture should parse");
    assert_eq!(corners.home, Some(7));
    assert_eq!(corners.away, None);
    assert_eq!(corners.total(), None);
}

#[test]
fn missing_corner_row_makes_fixture_invalid() {
    let raw = read_fixture("statistics_missing_row.json");
    let corners = parse_statistics_json(&raw).expect("fixture should parse");
    assert_eq!(corners.home, Some(5));
    assert_eq!(corners.away, None);
    assert_eq!(corners.total(), None);
}

#[test]
fn fewer_than_two_sides_makes_fixture_invalid() {
    let one_side = r#"{"errors":[],"response":[{"team":{"id":33},"statistics":[{"type":"Corner Kicks","value":6}]}]}"#;
    let corners = parse_statistics_json(one_side).unwrap();
    assert_eq!(corners.home, Some(6));
    assert_eq!(corners.total(), None);

    let empty = r#"{"errors":[],"response":[]}"#;
    assert_eq!(parse_statistics_json(empty).unwrap().total(), None);
    assert_eq!(parse_statistics_json("").unwrap().total(), None);
}

#[test]
fn out_of_range_corner_counts_are_invalid() {
    // Sum of both sides does not fit in u32.
    let overflow = r#"{"errors":[],"response":[
        {"statistics":[{"type":"Corner Kicks","value":4294967295}]},
        {"statistics":[{"type":"Corner Kicks","value":"3"}]}
    ]}"#;
    let corners = parse_statistics_json(overflow).unwrap();
    assert_eq!(corners.home, Some(u32::MAX));
    assert_eq!(corners.away, Some(3));
    assert_eq!(corners.total(), None);

    // A side that does not fit is not truncated.
    let too_large = r#"{"errors":[],"response":[
        {"statistics":[{"type":"Corner Kicks","value":4294967301}]},
        {"statistics":[{"type":"Corner Kicks","value":2}]}
    ]}"#;
    let corners = parse_statistics_json(too_large).unwrap();
    assert_eq!(corners.home, None);
    assert_eq!(corners.total(), None);
}

#[test]
fn out_of_range_team_ids_are_skipped() {
    let fixtures = r#"{"errors":[],"response":[
        {"fixture":{"id":1,"date":"2024-05-19T15:00:00+00:00"},
         "teams":{"home":{"id":4294967329,"name":"Wrapped"},"away":{"id":33,"name":"Manchester United"}}},
        {"fixture":{"id":2,"date":"2024-05-12T15:00:00+00:00"},
         "teams":{"home":{"id":34,"name":"Newcastle"},"away":{"id":33,"name":"Manchester United"}}}
    ]}"#;
    let parsed = parse_fixtures_json(fixtures).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].id, 2);

    let teams = r#"{"errors":[],"response":[
        {"team":{"id":4294967329,"name":"Wrapped"}},
        {"team":{"id":33,"name":"Manchester United"}}
    ]}"#;
    let parsed = parse_teams_json(teams, None).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].id, 33);
}

#[test]
fn odds_tie_break_policies() {
    let raw = read_fixture("odds_corners.json");
    let line = CornerLine::Over7_5;
    assert_eq!(parse_odds_json(&raw, line, OddsTieBreak::Last).unwrap(), Some(1.55));
    assert_eq!(parse_odds_json(&raw, line, OddsTieBreak::First).unwrap(), Some(1.62));
    // The second "Over 7.5" inside one bet is never considered.
    assert_eq!(parse_odds_json(&raw, line, OddsTieBreak::Best).unwrap(), Some(1.80));
}

#[test]
fn odds_for_the_higher_line() {
    let raw = read_fixture("odds_corners.json");
    let quote = parse_odds_json(&raw, CornerLine::Over8_5, OddsTieBreak::Last).unwrap();
    assert_eq!(quote, Some(1.95));
}

#[test]
fn odds_missing_market_is_none() {
    let raw = r#"{"errors":[],"response":[{"bookmakers":[{"bets":[{"name":"Match Winner","values":[{"value":"Home","odd":"2.00"}]}]}]}]}"#;
    let quote = parse_odds_json(raw, CornerLine::Over7_5, OddsTieBreak::Last).unwrap();
    assert_eq!(quote, None);

    let empty = r#"{"errors":[],"response":[]}"#;
    assert_eq!(
        parse_odds_json(empty, CornerLine::Over7_5, OddsTieBreak::Best).unwrap(),
        None
    );
}

#[test]
fn parses_teams_fixture() {
    let raw = read_fixture("teams_league39.json");
    let teams = parse_teams_json(&raw, Some(39)).expect("fixture should parse");
    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0].id, 33);
    assert_eq!(teams[0].name, "Manchester United");
    assert_eq!(teams[0].league_id, Some(39));
    assert_eq!(teams[0].country.as_deref(), Some("England"));
    assert_eq!(teams[1].name, "Newcastle");
}

#[test]
fn error_envelope_is_an_api_error() {
    let raw = read_fixture("error_missing_key.json");
    let err = parse_fixtures_json(&raw).unwrap_err();
    match &err {
        FetchError::Api { endpoint, message } => {
            assert_eq!(endpoint, "fixtures");
            assert!(message.contains("Missing application key"));
        }
        other => panic!("expected api error, got {other:?}"),
    }
    assert_eq!(err.endpoint(), Some("fixtures"));
    assert!(!err.is_timeout());
}

#[test]
fn malformed_body_is_a_decode_error() {
    let err = parse_statistics_json("{not json").unwrap_err();
    assert!(matches!(err, FetchError::Decode { .. }));
}
