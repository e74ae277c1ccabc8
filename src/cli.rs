//! Command-line interface of the `auditor-bridge` binary.

use crate::bridge::{parse_live_flag, BridgeConfig, DEFAULT_PACKAGE};

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "auditor-bridge",
    version,
    about = "Run one scan request through the engine bridge",
    long_about = "Reads a scan request, resolves and runs the search engine, writes a text report \
                  under <base-dir>/reports and the result JSON to --output. The result is also \
                  printed to stdout. Exit codes: 0 success, 1 input error, 2 output error, 99 fatal."
)]
pub struct Cli {
    /// Path to the request JSON
    #[arg(long)]
    pub input: PathBuf,

    /// Path of the result JSON to write
    #[arg(long)]
    pub output: PathBuf,

    /// Base directory for reports/, logs/ and the default vendor tree
    #[arg(long, default_value = ".")]
    pub base_dir: PathBuf,

    /// Engine vendor directory (default: <base-dir>/vendor/<package>)
    #[arg(long)]
    pub vendor_dir: Option<PathBuf>,

    /// Engine package name used for package-style lookup
    #[arg(long, default_value = DEFAULT_PACKAGE)]
    pub package: String,

    /// Allow live network calls (also enabled by AUDITOR_LIVE=1)
    #[arg(long)]
    pub live: bool,

    /// Search provider endpoint
    #[arg(long, hide = true)]
    pub provider_url: Option<String>,

    /// Verbose diagnostics on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Builds the bridge configuration.
    ///
    /// `live_env` is the value of the live-network environment variable.
    pub fn to_config(&self, live_env: Option<&str>) -> BridgeConfig {
        let mut config = BridgeConfig::new()
            .with_base_dir(&self.base_dir)
            .with_package(&self.package)
            .with_live_network(self.live || parse_live_flag(live_env));

        if let Some(dir) = &self.vendor_dir {
            config = config.with_vendor_dir(dir);
        }
        if let Some(url) = &self.provider_url {
            config = config.with_provider_url(url);
        }
        config
    }

    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    pub fn log_directive(&self) -> &'static str {
        if self.verbose {
            "auditor_bridge=debug"
        } else {
            "warn"
        }
    }
}
