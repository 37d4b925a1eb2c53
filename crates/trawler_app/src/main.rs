mod cli;
mod ledger;
mod settings;

use std::fs;

use anyhow::Context;
use clap::Parser;
use trawler_engine::webdriver::ChromeBrowser;
use trawler_engine::{ensure_download_dir, ItemEnumerator, LocalDir, SystemClock};
use trawler_logging::{trawl_error, trawl_info, trawl_warn, LogDestination};

use crate::ledger::{load_ledger, save_ledger, Ledger};
use crate::settings::{FileConfig, RunSettings};

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let mut settings = RunSettings::resolve(&cli, file);

    ensure_download_dir(&settings.engine.download_dir)?;
    // The browser needs an absolute path for its download preference.
    settings.engine.download_dir = fs::canonicalize(&settings.engine.download_dir)
        .context("resolving download directory")?;

    trawler_logging::initialize(
        LogDestination::Both(settings.engine.download_dir.clone()),
        settings.log_level,
    );
    trawl_info!(
        "Downloading {} items from {} into {}",
        settings.engine.list.enumeration.extension,
        settings.list_url,
        settings.engine.download_dir.display()
    );

    match load_ledger(&settings.engine.download_dir) {
        Ok(Some(previous)) => trawl_info!(
            "Previous run finished at {} with {} accepted items",
            previous.finished_at,
            previous.counters.accepted
        ),
        Ok(None) => {}
        Err(err) => trawl_warn!("Ignoring previous run ledger: {:#}", err),
    }

    run(&settings)
}

fn run(settings: &RunSettings) -> anyhow::Result<()> {
    let download_dir = &settings.engine.download_dir;
    let mut browser = ChromeBrowser::launch(settings.browser.clone(), download_dir)
        .context("starting browser session")?;
    if let Err(err) = browser.open_list(&settings.list_url) {
        let _ = browser.quit();
        return Err(err).context("opening the list");
    }

    let store = LocalDir::new(download_dir.clone());
    let clock = SystemClock::new();
    let mut enumerator = ItemEnumerator::new(&mut browser, &store, &clock, &settings.engine);
    let result = enumerator.run();
    let report = enumerator.report();

    let error = result.as_ref().err().map(ToString::to_string);
    let ledger = Ledger::from_report(&report, &settings.list_url, error, chrono::Utc::now());
    match save_ledger(download_dir, &ledger) {
        Ok(path) => trawl_info!("Run ledger written to {}", path.display()),
        Err(err) => trawl_error!("Could not write run ledger: {:#}", err),
    }

    let stats = &report.stats;
    trawl_info!(
        "Steps: {}, accepted: {}, filtered: {}, duplicates: {}",
        stats.steps,
        report.accepted.len(),
        stats.filtered,
        stats.duplicates
    );
    trawl_info!(
        "Completed: {}, already present: {}, trigger failed: {}, failed: {}",
        stats.completed,
        stats.already_present,
        stats.trigger_failed,
        stats.failed
    );

    if let Err(err) = browser.quit() {
        trawl_warn!("Browser did not shut down cleanly: {}", err);
    }
    result.map(drop).context("enumeration stopped")
}
