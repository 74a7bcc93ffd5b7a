use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use dashboard_core::SortDescriptor;
use dashboard_logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "dashboard")]
#[command(version)]
#[command(about = "Live view of render jobs and workers, plus UPI file upload.")]
pub struct Cli {
    /// Config file (ron). Defaults to ./dashboard.ron when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Where log lines go; overrides the config file.
    #[arg(long, value_enum, global = true)]
    pub log: Option<LogArg>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Follow the jobs collection.
    Jobs(ViewArgs),
    /// Follow the workers collection.
    Workers(ViewArgs),
    /// Upload a .txt UPI file.
    Upload(UploadArgs),
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Streaming endpoint (ws:// or wss://).
    #[arg(long)]
    pub url: Option<String>,

    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Page size; the config default applies when omitted.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: Option<u32>,

    /// Initial sort, `COLUMN` or `COLUMN:asc|desc`.
    #[arg(long)]
    pub sort: Option<SortDescriptor>,

    /// Reopen the stream with backoff when the server drops it.
    #[arg(long)]
    pub reconnect: bool,
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    pub file: PathBuf,

    #[arg(long)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogArg {
    File,
    Terminal,
    Both,
}

impl From<LogArg> for LogDestination {
    fn from(arg: LogArg) -> Self {
        match arg {
            LogArg::File => LogDestination::File,
            LogArg::Terminal => LogDestination::Terminal,
            LogArg::Both => LogDestination::Both,
        }
    }
}
