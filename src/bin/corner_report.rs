use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use corner_dashboard::aggregator::CornerLine;
use corner_dashboard::config::DashboardConfig;
use corner_dashboard::dashboard::{ScanReport, scan_leagues, search_team};
use corner_dashboard::export::export_report;
use corner_dashboard::provider::open_source;

const MAX_FAILURES_PRINTED: usize = 10;

fn main() -> Result<()> {
    let mut cfg = DashboardConfig::load().context("load configuration")?;
    if let Some(line) = arg_value("line") {
        cfg.line = line.parse::<CornerLine>().map_err(anyhow::Error::msg)?;
    }
    if let Some(min) = arg_value("min") {
        cfg.min_over_percentage = min
            .parse::<f64>()
            .with_context(|| format!("invalid --min={min}"))?
            .clamp(0.0, 100.0);
    }
    if has_flag("no-odds") {
        cfg.include_odds = false;
    }

    let (source, note) = open_source(&cfg, has_flag("demo"));
    if let Some(note) = note {
        eprintln!("{note}");
    }
    let options = cfg.aggregator_options();

    let (scope, report) = if let Some(query) = arg_value("team") {
        let report = search_team(source.as_ref(), &query, &options, cfg.parallelism);
        (format!("search \"{query}\""), report)
    } else {
        let country = arg_value("country")
            .or_else(|| cfg.league_catalog.country_names().into_iter().next())
            .ok_or_else(|| anyhow!("league catalog is empty"))?;
        let league_ids = cfg.league_catalog.leagues_for(&country).ok_or_else(|| {
            anyhow!(
                "unknown country {country:?}; known: {}",
                cfg.league_catalog.country_names().join(", ")
            )
        })?;
        let report = scan_leagues(
            source.as_ref(),
            league_ids,
            cfg.season,
            &options,
            cfg.parallelism,
        );
        (country, report)
    };

    print_report(&scope, &report, &cfg);

    if let Some(path) = arg_value("xlsx") {
        let path = PathBuf::from(path);
        let summary = export_report(&path, &report, cfg.line, cfg.min_over_percentage)?;
        println!(
            "Exported {} teams / {} matches / {} failures to {}",
            summary.teams,
            summary.matches,
            summary.failures,
            path.display()
        );
    }

    Ok(())
}

fn print_report(scope: &str, report: &ScanReport, cfg: &DashboardConfig) {
    let line = cfg.line;
    let rows = report.qualifying(cfg.min_over_percentage);

    println!("Corner report: {scope} | {} | min {:.0}%", line.label(), cfg.min_over_percentage);
    println!(
        "Teams scanned: {} loaded: {} failed: {}",
        report.teams_scanned,
        report.rows.len(),
        report.failures.len()
    );

    if rows.is_empty() {
        if report.rows.is_empty() && !report.failures.is_empty() {
            println!("No data: every fetch failed.");
        } else {
            println!(
                "No teams reach {:.0}% {}.",
                cfg.min_over_percentage,
                line.label()
            );
        }
    } else {
        println!();
        println!(
            "{:<28} {:>8} {:>7} {:>9} {:>6}",
            "Team",
            format!("% {}", line.threshold()),
            "Mean",
            "Weighted",
            "Valid"
        );
        for row in &rows {
            let s = &row.summary;
            println!(
                "{:<28} {:>8.1} {:>7.2} {:>9.2} {:>3}/{:<2}",
                truncate(&row.team.display_name(), 28),
                s.over_percentage,
                s.mean_corners,
                s.weighted_mean_corners,
                s.valid_count,
                s.fixtures_returned
            );
        }

        for row in &rows {
            println!();
            println!("{} [{}]", row.team.display_name(), row.team.id);
            if !row.summary.has_data() {
                println!("  no matches with complete corner data");
            }
            for m in &row.summary.history {
                let odds = m
                    .odds
                    .map(|o| format!("{o:.2}"))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "  {}  {:<26} {:>3}  {:<6} odds {}",
                    m.date,
                    truncate(&m.opponent, 26),
                    m.corners,
                    m.tier.label(),
                    odds
                );
            }
        }
    }

    if !report.failures.is_empty() {
        eprintln!();
        eprintln!("Failures: {}", report.failures.len());
        for failure in report.failures.iter().take(MAX_FAILURES_PRINTED) {
            eprintln!("  - {}: {}", failure.label(), failure.error);
        }
    }
}

fn truncate(raw: &str, max: usize) -> String {
    if raw.chars().count() <= max {
        return raw.to_string();
    }
    let mut out: String = raw.chars().take(max.saturating_sub(1)).collect();
    out.push('~');
    out
}

fn arg_value(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("--{name}=");
    let flag = format!("--{name}");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if *arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() && !next.starts_with("--") {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

fn has_flag(name: &str) -> bool {
    let flag = format!("--{name}");
    std::env::args().skip(1).any(|arg| arg == flag)
}
