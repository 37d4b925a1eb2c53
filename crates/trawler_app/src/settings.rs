//! Layered run settings: built-in defaults, then an optional RON file, then
//! command-line flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use log::LevelFilter;
use serde::Deserialize;
use trawler_engine::webdriver::BrowserSettings;
use trawler_engine::EngineConfig;

use crate::cli::Cli;

const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

/// Settings file contents. Every field is optional and only overrides the
/// built-in default when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub download_dir: Option<PathBuf>,
    pub extension: Option<String>,
    pub separator: Option<char>,
    pub unchanged_limit: Option<u32>,
    pub max_read_failures: Option<u32>,
    pub ready_timeout_secs: Option<u64>,
    pub step_pace_ms: Option<u64>,
    pub control_timeout_secs: Option<u64>,
    pub start_timeout_secs: Option<u64>,
    pub transient_suffix: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub stall_threshold: Option<u32>,
    pub max_recovery_attempts: Option<u32>,
    pub unbounded_recovery: Option<bool>,
    pub status_settle_secs: Option<u64>,
    pub resume_label: Option<String>,
    pub webdriver_url: Option<String>,
    pub headless: Option<bool>,
    pub status_view_url: Option<String>,
    pub list_selector: Option<String>,
    pub acquire_selector: Option<String>,
    pub label_attribute: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        ron::from_str(&text).with_context(|| format!("parsing settings file {}", path.display()))
    }
}

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub list_url: String,
    pub engine: EngineConfig,
    pub browser: BrowserSettings,
    pub log_level: LevelFilter,
}

impl RunSettings {
    pub fn resolve(cli: &Cli, file: FileConfig) -> Self {
        let download_dir = cli
            .directory
            .clone()
            .or(file.download_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_DIR));

        let mut engine = EngineConfig::default_with_download_dir(download_dir);
        let enumeration = &mut engine.list.enumeration;
        if let Some(extension) = cli.extension.clone().or(file.extension) {
            enumeration.extension = extension;
        }
        if let Some(separator) = file.separator {
            enumeration.separator = separator;
        }
        if let Some(limit) = cli.unchanged_threshold.or(file.unchanged_limit) {
            enumeration.unchanged_limit = limit;
        }
        if let Some(limit) = file.max_read_failures {
            enumeration.max_read_failures = limit;
        }
        if let Some(secs) = cli.ready_timeout.or(file.ready_timeout_secs) {
            engine.list.ready_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = file.step_pace_ms {
            engine.list.step_pace = Duration::from_millis(ms);
        }

        if let Some(secs) = cli.control_timeout.or(file.control_timeout_secs) {
            engine.trigger.control_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.start_timeout_secs {
            engine.trigger.start_timeout = Duration::from_secs(secs);
        }
        if let Some(suffix) = file.transient_suffix {
            engine.trigger.transient_suffix = suffix;
        }

        if let Some(secs) = cli.poll_interval.or(file.poll_interval_secs) {
            engine.monitor.poll_interval = Duration::from_secs(secs);
        }
        if let Some(threshold) = cli.stall_threshold.or(file.stall_threshold) {
            engine.monitor.stall_threshold = threshold;
        }
        engine.monitor.max_recovery_attempts = if cli.unbounded_recovery {
            None
        } else if let Some(max) = cli.max_recoveries {
            Some(max)
        } else if file.unbounded_recovery == Some(true) {
            None
        } else {
            file.max_recovery_attempts
                .or(engine.monitor.max_recovery_attempts)
        };

        if let Some(secs) = file.status_settle_secs {
            engine.recovery.status_settle = Duration::from_secs(secs);
        }
        if let Some(label) = file.resume_label {
            engine.recovery.resume_label = label;
        }

        let mut browser = BrowserSettings::default();
        if let Some(url) = cli.webdriver.clone().or(file.webdriver_url) {
            browser.webdriver_url = url;
        }
        browser.headless = cli.headless || file.headless.unwrap_or(false);
        if let Some(url) = file.status_view_url {
            browser.status_view_url = url;
        }
        if let Some(selector) = file.list_selector {
            browser.list_selector = selector;
        }
        if let Some(selector) = file.acquire_selector {
            browser.acquire_selector = selector;
        }
        if let Some(attribute) = file.label_attribute {
            browser.label_attribute = attribute;
        }

        Self {
            list_url: cli.list_url.clone(),
            engine,
            browser,
            log_level: cli.log_level.into(),
        }
    }
}
