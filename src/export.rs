use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::aggregator::{CornerLine, MatchRecord};
use crate::dashboard::{ScanFailure, ScanReport, TeamRow};

pub struct ExportSummary {
    pub teams: usize,
    pub matches: usize,
    pub failures: usize,
}

/// Writes qualifying teams, their match histories and the scan failures to an
/// XLSX workbook (sheets `Summary`, `History`, `Failures`).
pub fn export_report(
    path: &Path,
    report: &ScanReport,
    line: CornerLine,
    min_over_percentage: f64,
) -> Result<ExportSummary> {
    let rows = report.qualifying(min_over_percentage);
    let over_header = format!("% {}", line.label());
    let odds_header = format!("Odds {}", line.label());

    let mut summary_rows = vec![vec![
        "Team ID".to_string(),
        "Team".to_string(),
        "League ID".to_string(),
        over_header,
        "Mean".to_string(),
        "Weighted Mean".to_string(),
        "Valid Matches".to_string(),
        "Fixtures Returned".to_string(),
    ]];
    summary_rows.extend(rows.iter().map(|row| summary_row(row)));

    let mut history_rows = vec![vec![
        "Team".to_string(),
        "Date".to_string(),
        "Opponent".to_string(),
        "Corners".to_string(),
        "Tier".to_string(),
        odds_header,
    ]];
    for row in &rows {
        history_rows.extend(row.summary.history.iter().map(|m| history_row(row, m)));
    }

    let mut failure_rows = vec![vec![
        "Scope".to_string(),
        "League ID".to_string(),
        "Error".to_string(),
    ]];
    failure_rows.extend(report.failures.iter().map(failure_row));

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        write_rows(sheet, &summary_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("History")?;
        write_rows(sheet, &history_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Failures")?;
        write_rows(sheet, &failure_rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;

    Ok(ExportSummary {
        teams: summary_rows.len() - 1,
        matches: history_rows.len() - 1,
        failures: failure_rows.len() - 1,
    })
}

fn summary_row(row: &TeamRow) -> Vec<String> {
    let s = &row.summary;
    vec![
        row.team.id.to_string(),
        row.team.name.clone(),
        opt_to_string(row.team.league_id),
        format!("{:.1}", s.over_percentage),
        format!("{:.2}", s.mean_corners),
        format!("{:.2}", s.weighted_mean_corners),
        s.valid_count.to_string(),
        s.fixtures_returned.to_string(),
    ]
}

fn history_row(row: &TeamRow, m: &MatchRecord) -> Vec<String> {
    vec![
        row.team.name.clone(),
        m.date.clone(),
        m.opponent.clone(),
        m.corners.to_string(),
        m.tier.label().to_string(),
        m.odds.map(|o| format!("{o:.2}")).unwrap_or_default(),
    ]
}

fn failure_row(failure: &ScanFailure) -> Vec<String> {
    vec![
        failure.label(),
        opt_to_string(failure.league_id),
        failure.error.to_string(),
    ]
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
