//! Command-line interface: argument definitions and dispatch.

mod common;
mod fuzz;
mod links;
mod tips;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use linkprobe::config::Config;
use linkprobe::ui::{colors_enabled, paint, Color, BANNER};

#[derive(Parser, Debug)]
#[command(
    name = "linkprobe",
    version,
    about = "Discover and fuzz the deep links an Android package declares"
)]
pub(crate) struct Cli {
    /// Config file (default: ~/.linkprobe/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
    /// Skip the startup banner
    #[arg(long, global = true)]
    no_banner: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Classify the links a package declares
    Links {
        #[command(flatten)]
        source: PackageSource,
        #[command(flatten)]
        decode: DecodeArgs,
        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Send generated URIs to a connected device
    Fuzz(FuzzArgs),
    /// List Uri accessors worth auditing in link handlers
    Tips,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Where the manifest comes from: a package to decode, or an already
/// decoded manifest.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub(crate) struct PackageSource {
    /// Path to the .apk to decode with apktool
    #[arg(long)]
    pub(crate) apk: Option<PathBuf>,
    /// Path to an already decoded AndroidManifest.xml
    #[arg(long)]
    pub(crate) manifest: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct DecodeArgs {
    /// Decode into this directory instead of a temporary one
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
    /// Keep decoded output after the run (default dir: ./apk_output)
    #[arg(long)]
    pub(crate) keep_output: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct FuzzArgs {
    #[command(flatten)]
    pub(crate) source: PackageSource,
    #[command(flatten)]
    pub(crate) decode: DecodeArgs,
    /// Newline-delimited wordlist appended to each deep link
    #[arg(short = 'w', long)]
    pub(crate) wordlist: Option<PathBuf>,
    /// Send this URL to every activity instead of using the wordlist
    #[arg(long, conflicts_with = "wordlist")]
    pub(crate) url: Option<String>,
    /// Print the declared activities and exit
    #[arg(long)]
    pub(crate) list: bool,
    /// With --url or --list, only consider exported activities
    #[arg(long)]
    pub(crate) exported_only: bool,
    /// Extra words generated by the mutator (radamsa)
    #[arg(long, default_value_t = 0)]
    pub(crate) mutations: usize,
    /// Per-command deadline in milliseconds
    #[arg(long)]
    pub(crate) timeout_ms: Option<u64>,
    /// Device serial (adb -s)
    #[arg(long)]
    pub(crate) device: Option<String>,
}

pub(crate) async fn run() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    if !cli.no_banner {
        println!("{}", paint(BANNER, Color::Cyan, colors_enabled()));
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Links {
            source,
            decode,
            json,
        } => links::cmd_links(source, decode, json, &config).await,
        Commands::Fuzz(args) => fuzz::cmd_fuzz(args, &config).await,
        Commands::Tips => {
            tips::cmd_tips();
            Ok(())
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let mut config = Config::load_from_path(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            Ok(config)
        }
        None => Config::load().with_context(|| "Failed to load configuration"),
    }
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let default = if verbose {
        "linkprobe=debug"
    } else {
        "linkprobe=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
