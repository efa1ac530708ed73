use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::aggregator::AggregatorOptions;
use crate::api_client::ApiFootballClient;
use crate::config::{DashboardConfig, LeagueCatalog};
use crate::dashboard::{ScanReport, scan_leagues, search_team};
use crate::demo_source::DemoSource;
use crate::source::CornerDataSource;
use crate::state::{Delta, ProviderCommand};

pub type SharedSource = Arc<dyn CornerDataSource + Send>;

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub catalog: LeagueCatalog,
    pub season: u16,
    pub options: AggregatorOptions,
    pub parallelism: usize,
}

impl ProviderSettings {
    pub fn from_config(cfg: &DashboardConfig) -> Self {
        Self {
            catalog: cfg.league_catalog.clone(),
            season: cfg.season,
            options: cfg.aggregator_options(),
            parallelism: cfg.parallelism,
        }
    }
}

/// Picks the API client when a key is configured, otherwise the demo source.
/// The second value is a note worth logging.
pub fn open_source(cfg: &DashboardConfig, force_demo: bool) -> (SharedSource, Option<String>) {
    let demo = || -> SharedSource { Arc::new(DemoSource::new(cfg.league_catalog.all_league_ids())) };
    if force_demo {
        return (demo(), Some("[INFO] Demo data source selected".to_string()));
    }
    match ApiFootballClient::new(cfg) {
        Ok(client) => {
            let source: SharedSource = Arc::new(client);
            (source, None)
        }
        Err(err) => (
            demo(),
            Some(format!("[WARN] {err}; falling back to demo data")),
        ),
    }
}

/// Runs scans on a background thread, one command at a time.
pub fn spawn_provider(
    source: SharedSource,
    settings: ProviderSettings,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            let (label, line) = match &cmd {
                ProviderCommand::ScanCountry { country, line } => (country.clone(), *line),
                ProviderCommand::SearchTeam { query, line } => (format!("search \"{query}\""), *line),
            };
            if tx.send(Delta::ScanStarted { label: label.clone() }).is_err() {
                return;
            }

            let report = run_command(source.as_ref(), &settings, &cmd, &tx);
            if tx
                .send(Delta::ScanFinished {
                    label,
                    line,
                    report,
                })
                .is_err()
            {
                return;
            }
        }
    });
}

fn run_command(
    source: &dyn CornerDataSource,
    settings: &ProviderSettings,
    cmd: &ProviderCommand,
    tx: &Sender<Delta>,
) -> ScanReport {
    match cmd {
        ProviderCommand::ScanCountry { country, line } => {
            let Some(league_ids) = settings.catalog.leagues_for(country) else {
                let _ = tx.send(Delta::Log(format!(
                    "[WARN] No leagues configured for {country}"
                )));
                return ScanReport::default();
            };
            let options = settings.options.with_line(*line);
            scan_leagues(
                source,
                league_ids,
                settings.season,
                &options,
                settings.parallelism,
            )
        }
        ProviderCommand::SearchTeam { query, line } => {
            let options = settings.options.with_line(*line);
            search_team(source, query, &options, settings.parallelism)
        }
    }
}
