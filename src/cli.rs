use std::path::PathBuf;

use clap::Parser;

use crate::config::DEFAULT_CONFIG_PATH;
use crate::format::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "slack-suppressor")]
#[command(about = "Marks messages in keyword-named Slack channels and groups as read")]
#[command(version)]
pub struct Cli {
    /// Config file listing the channel and group names to suppress
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Output format for suppressed messages
    #[arg(long, value_enum, default_value_t = OutputFormat::Structured)]
    pub printer: OutputFormat,

    /// Disable bold section labels
    #[arg(long)]
    pub no_color: bool,
}
