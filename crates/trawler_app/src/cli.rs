use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(
    name = "trawler",
    about = "Walk a virtualized file list in the browser and download every new matching item"
)]
pub struct Cli {
    /// Address of the list to enumerate
    pub list_url: String,

    /// Local directory the browser downloads into
    #[arg(short = 'd', long)]
    pub directory: Option<PathBuf>,

    /// RON file with settings; command-line flags win over it
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Only items whose name ends with this suffix are downloaded
    #[arg(short = 'e', long)]
    pub extension: Option<String>,

    /// WebDriver server endpoint
    #[arg(long)]
    pub webdriver: Option<String>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Seconds between checks of an in-flight download
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Polls without size change before a recovery is attempted
    #[arg(long)]
    pub stall_threshold: Option<u32>,

    /// Steps with an unchanged focused entry before the list counts as done
    #[arg(long)]
    pub unchanged_threshold: Option<u32>,

    /// Seconds to wait for the download control of an item
    #[arg(long)]
    pub control_timeout: Option<u64>,

    /// Seconds to wait for the list to first appear (covers signing in)
    #[arg(long)]
    pub ready_timeout: Option<u64>,

    /// Recoveries without progress before an item is given up
    #[arg(long, conflicts_with = "unbounded_recovery")]
    pub max_recoveries: Option<u32>,

    /// Never give up on a stalled download
    #[arg(long)]
    pub unbounded_recovery: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }
}
