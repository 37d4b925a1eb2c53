use std::path::PathBuf;
use std::time::Duration;

use trawler_core::EnumSettings;

#[derive(Debug, Clone)]
pub struct ListSettings {
    pub enumeration: EnumSettings,
    /// Initial wait for the list to render (covers a manual sign-in).
    pub ready_timeout: Duration,
    /// Per-step wait for the list to still be rendered.
    pub render_timeout: Duration,
    pub render_poll: Duration,
    /// Delay between cursor moves.
    pub step_pace: Duration,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            enumeration: EnumSettings::default(),
            ready_timeout: Duration::from_secs(300),
            render_timeout: Duration::from_secs(10),
            render_poll: Duration::from_millis(500),
            step_pace: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TriggerSettings {
    /// Delay after scrolling the item into view.
    pub reveal_settle: Duration,
    /// How long to wait for the acquire control (T1).
    pub control_timeout: Duration,
    pub control_poll: Duration,
    /// Delay after invoking the control so the transfer can initialize.
    pub settle: Duration,
    /// How long to look for a new entry in the download directory after triggering.
    pub start_timeout: Duration,
    pub start_poll: Duration,
    /// Suffix the transfer mechanism appends to in-progress files.
    pub transient_suffix: String,
}

impl Default for TriggerSettings {
    fn default() -> Self {
        Self {
            reveal_settle: Duration::from_secs(2),
            control_timeout: Duration::from_secs(10),
            control_poll: Duration::from_millis(250),
            settle: Duration::from_secs(2),
            start_timeout: Duration::from_secs(30),
            start_poll: Duration::from_secs(1),
            transient_suffix: ".crdownload".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Poll period (P).
    pub poll_interval: Duration,
    /// Equal-size polls before recovery (M).
    pub stall_threshold: u32,
    /// Recoveries without progress before giving up; `None` retries forever.
    pub max_recovery_attempts: Option<u32>,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            stall_threshold: 3,
            max_recovery_attempts: Some(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecoverySettings {
    /// Delay after switching to the status view before reading it.
    pub status_settle: Duration,
    pub resume_label: String,
}

impl Default for RecoverySettings {
    fn default() -> Self {
        Self {
            status_settle: Duration::from_secs(10),
            resume_label: "Resume".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub download_dir: PathBuf,
    pub list: ListSettings,
    pub trigger: TriggerSettings,
    pub monitor: MonitorSettings,
    pub recovery: RecoverySettings,
}

impl EngineConfig {
    pub fn default_with_download_dir(download_dir: PathBuf) -> Self {
        Self {
            download_dir,
            list: ListSettings::default(),
            trigger: TriggerSettings::default(),
            monitor: MonitorSettings::default(),
            recovery: RecoverySettings::default(),
        }
    }

    /// Name the transfer mechanism uses while `final_name` is still in flight.
    pub fn derived_transient_name(&self, final_name: &str) -> String {
        format!("{final_name}{}", self.trigger.transient_suffix)
    }
}
