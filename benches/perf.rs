use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use corner_dashboard::aggregator::{
    AggregatorOptions, CornerLine, FixtureObservation, summarize,
};
use corner_dashboard::dashboard::scan_leagues;
use corner_dashboard::demo_source::DemoSource;
use corner_dashboard::fixtures::{Fixture, parse_fixtures_json};
use corner_dashboard::odds::{OddsTieBreak, parse_odds_json};
use corner_dashboard::statistics::{CornerCounts, parse_statistics_json};

fn sample_observations() -> Vec<FixtureObservation> {
    (0..10u32)
        .map(|idx| FixtureObservation {
            fixture: Fixture {
                id: 5000 + u64::from(idx),
                kickoff: format!("2024-05-{:02}T15:00:00+00:00", 28 - idx * 2),
                home_id: 1,
                home_name: "Home FC".to_string(),
                away_id: 100 + idx,
                away_name: format!("Away {idx}"),
            },
            corners: if idx == 3 {
                CornerCounts::new(Some(4), None)
            } else {
                CornerCounts::new(Some(3 + idx % 4), Some(2 + idx % 5))
            },
            odds: Some(1.5 + f64::from(idx) / 20.0),
        })
        .collect()
}

fn bench_summarize(c: &mut Criterion) {
    let observations = sample_observations();
    let options = AggregatorOptions::default();
    c.bench_function("summarize_window", |b| {
        b.iter(|| {
            let summary = summarize(1, black_box(&observations), &options);
            black_box(summary.weighted_mean_corners);
        })
    });
}

fn bench_demo_scan(c: &mut Criterion) {
    let leagues = vec![39, 40];
    let source = DemoSource::new(leagues.clone());
    let options = AggregatorOptions {
        line: CornerLine::Over8_5,
        ..AggregatorOptions::default()
    };
    c.bench_function("demo_scan_two_leagues", |b| {
        b.iter(|| {
            let report = scan_leagues(&source, black_box(&leagues), 2024, &options, 1);
            black_box(report.qualifying(85.0).len());
        })
    });
}

fn bench_fixtures_parse(c: &mut Criterion) {
    c.bench_function("fixtures_parse", |b| {
        b.iter(|| {
            let rows = parse_fixtures_json(black_box(FIXTURES_JSON)).unwrap();
            black_box(rows.len());
        })
    });
}

fn bench_statistics_parse(c: &mut Criterion) {
    c.bench_function("statistics_parse", |b| {
        b.iter(|| {
            let corners = parse_statistics_json(black_box(STATISTICS_JSON)).unwrap();
            black_box(corners.total());
        })
    });
}

fn bench_odds_parse(c: &mut Criterion) {
    c.bench_function("odds_parse", |b| {
        b.iter(|| {
            let quote = parse_odds_json(
                black_box(ODDS_JSON),
                CornerLine::Over7_5,
                OddsTieBreak::Best,
            )
            .unwrap();
            black_box(quote);
        })
    });
}

criterion_group!(
    perf,
    bench_summarize,
    bench_demo_scan,
    bench_fixtures_parse,
    bench_statistics_parse,
    bench_odds_parse
);
criterion_main!(perf);

static FIXTURES_JSON: &str = include_str!("../tests/fixtures/fixtures_last3.json");
static STATISTICS_JSON: &str = include_str!("../tests/fixtures/statistics_full.json");
static ODDS_JSON: &str = include_str!("../tests/fixtures/odds_corners.json");
