//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Browser-driven end-to-end suite for the foro web forum
#[derive(Debug, Parser)]
#[command(name = "foro", version, about)]
pub struct Cli {
    /// Path to a TOML suite config (defaults apply when omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Run the browser headless
    #[arg(long)]
    pub headless: bool,

    /// Forum root URL (overrides config)
    #[arg(long, env = "FORO_BASE_URL")]
    pub base_url: Option<String>,

    /// Directory holding register_cases.json / forum_cases.json
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory for diagnostic screenshots
    #[arg(long)]
    pub screenshot_dir: Option<PathBuf>,

    /// Fixture-cleanup store path
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Only run cases whose id contains this fragment
    #[arg(long)]
    pub filter: Option<String>,

    /// Stop at the first failing case
    #[arg(long)]
    pub fail_fast: bool,

    /// Username of the pre-provisioned forum account
    #[arg(long, default_value = "test01")]
    pub username: String,

    /// Password of the pre-provisioned forum account
    #[arg(long, default_value = "test01")]
    pub password: String,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Minimal output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Tracing directive derived from the verbosity flags
    #[must_use]
    pub fn log_directive(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}
