use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::ai::TtsProvider;

#[derive(Parser, Debug)]
#[command(name = "curious-cast", version, about = "Daily science podcast generator for kids")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, value_name = "LEVEL", help = "Log filter (overrides --verbose)")]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the topic that would be used today.
    Topic(TopicArgs),
    /// Generate the episode script.
    Script(ScriptArgs),
    /// Narrate the episode script to MP3.
    Audio(AudioArgs),
    /// Upload the episode and promote it to latest.
    Publish(PublishArgs),
    /// Script, audio, then publish when storage is configured.
    All(AllArgs),
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    #[arg(long, value_name = "PATH", help = "Config file")]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "YYYY-MM-DD", help = "Episode date (defaults to today)")]
    pub date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct TopicArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(long, help = "Use this topic instead of asking the model")]
    pub topic: Option<String>,
}

#[derive(Args, Debug)]
pub struct ScriptArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(long, help = "Use this topic instead of asking the model")]
    pub topic: Option<String>,

    #[arg(long, help = "Replace existing output files")]
    pub overwrite: bool,
}

#[derive(Args, Debug)]
pub struct AudioArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(long, help = "Voice name or id")]
    pub voice: Option<String>,

    #[arg(long, value_enum, help = "Speech provider")]
    pub provider: Option<TtsProvider>,

    #[arg(long, help = "Replace existing output files")]
    pub overwrite: bool,
}

#[derive(Args, Debug)]
pub struct PublishArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(long, help = "Also upload episode.md and meta.json")]
    pub include_script: bool,
}

#[derive(Args, Debug)]
pub struct AllArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(long)]
    pub topic: Option<String>,

    #[arg(long)]
    pub voice: Option<String>,

    #[arg(long, value_enum)]
    pub provider: Option<TtsProvider>,

    #[arg(long)]
    pub overwrite: bool,

    #[arg(long)]
    pub include_script: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[arg(long, value_name = "PATH", help = "Config file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Show current config as JSON")]
    pub show: bool,

    #[arg(long, help = "Create default config file")]
    pub init: bool,

    #[arg(long, help = "Validate configuration")]
    pub validate: bool,
}
