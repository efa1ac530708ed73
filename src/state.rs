use std::collections::VecDeque;

use crate::aggregator::CornerLine;
use crate::dashboard::{ScanReport, TeamRow};

const MAX_LOGS: usize = 200;
const MAX_FAILURE_LOGS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Teams,
    Detail { team_id: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCommand {
    ScanCountry { country: String, line: CornerLine },
    SearchTeam { query: String, line: CornerLine },
}

#[derive(Debug)]
pub enum Delta {
    Log(String),
    ScanStarted {
        label: String,
    },
    ScanFinished {
        label: String,
        line: CornerLine,
        report: ScanReport,
    },
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub source_name: String,
    pub countries: Vec<String>,
    pub country_idx: usize,
    pub line: CornerLine,
    pub min_over_percentage: f64,
    pub report: Option<ScanReport>,
    pub report_label: Option<String>,
    /// Line the current report was computed for.
    pub report_line: Option<CornerLine>,
    pub scanning: bool,
    pub selected: usize,
    pub search_active: bool,
    pub search_input: String,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(countries: Vec<String>, line: CornerLine, min_over_percentage: f64) -> Self {
        Self {
            screen: Screen::Teams,
            source_name: String::new(),
            countries,
            country_idx: 0,
            line,
            min_over_percentage: min_over_percentage.clamp(0.0, 100.0),
            report: None,
            report_label: None,
            report_line: None,
            scanning: false,
            selected: 0,
            search_active: false,
            search_input: String::new(),
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn current_country(&self) -> Option<&str> {
        self.countries.get(self.country_idx).map(|s| s.as_str())
    }

    pub fn cycle_country(&mut self) {
        if self.countries.is_empty() {
            return;
        }
        self.country_idx = (self.country_idx + 1) % self.countries.len();
    }

    pub fn toggle_line(&mut self) {
        self.line = self.line.toggled();
    }

    pub fn adjust_min(&mut self, delta: f64) {
        self.min_over_percentage = (self.min_over_percentage + delta).clamp(0.0, 100.0);
        self.clamp_selection();
    }

    /// Loaded teams passing the minimum over-percentage, best first.
    pub fn visible_rows(&self) -> Vec<&TeamRow> {
        match &self.report {
            Some(report) => report.qualifying(self.min_over_percentage),
            None => Vec::new(),
        }
    }

    pub fn selected_row(&self) -> Option<&TeamRow> {
        self.visible_rows().get(self.selected).copied()
    }

    pub fn detail_row(&self) -> Option<&TeamRow> {
        let Screen::Detail { team_id } = self.screen else {
            return None;
        };
        self.report.as_ref().and_then(|r| r.find(team_id))
    }

    pub fn failure_count(&self) -> usize {
        self.report.as_ref().map(|r| r.failures.len()).unwrap_or(0)
    }

    pub fn select_next(&mut self) {
        let total = self.visible_rows().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.visible_rows().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = total - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn open_detail(&mut self) -> bool {
        let Some(team_id) = self.selected_row().map(|row| row.team.id) else {
            return false;
        };
        self.screen = Screen::Detail { team_id };
        true
    }

    pub fn back(&mut self) {
        self.screen = Screen::Teams;
    }

    pub fn report_is_stale(&self) -> bool {
        self.report_line.is_some_and(|line| line != self.line)
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    fn clamp_selection(&mut self) {
        let total = self.visible_rows().len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::Log(msg) => state.push_log(msg),
        Delta::ScanStarted { label } => {
            state.scanning = true;
            state.push_log(format!("[INFO] Scanning {label}"));
        }
        Delta::ScanFinished {
            label,
            line,
            report,
        } => {
            state.scanning = false;
            let qualifying = report.qualifying(state.min_over_percentage).len();
            state.push_log(format!(
                "[INFO] {label} ({line}): {} of {} teams loaded, {qualifying} qualifying",
                report.rows.len(),
                report.teams_scanned,
            ));
            if !report.failures.is_empty() {
                let timeouts = report.timeout_count();
                let detail = if timeouts > 0 {
                    format!(", {timeouts} timed out")
                } else {
                    String::new()
                };
                state.push_log(format!(
                    "[WARN] {} fetch failure(s) in {label}{detail}",
                    report.failures.len()
                ));
                for failure in report.failures.iter().take(MAX_FAILURE_LOGS) {
                    state.push_log(format!("[WARN] {}: {}", failure.label(), failure.error));
                }
            }

            if let Screen::Detail { team_id } = state.screen
                && report.find(team_id).is_none()
            {
                state.screen = Screen::Teams;
            }
            state.report = Some(report);
            state.report_label = Some(label);
            state.report_line = Some(line);
            state.clamp_selection();
        }
    }
}
