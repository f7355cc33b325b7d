//! Server configuration

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use proximity_core::params::{SearchParams, DEFAULT_LOOKBACK_SECS, DEFAULT_RADIUS_M, DEFAULT_TRAIL_SECS};
use proximity_core::store::LocationStoreKind;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "proximity-server", about = "HTTP service for recording positions and finding nearby entities")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "PROXIMITY_LISTEN_ADDR", default_value = "127.0.0.1:3000")]
    pub listen_addr: SocketAddr,

    /// Append samples to this journal file and replay it on startup.
    /// Samples are kept in memory only when unset.
    #[arg(long, env = "PROXIMITY_JOURNAL_PATH")]
    pub journal_path: Option<PathBuf>,

    /// Neighbour radius in meters (inclusive)
    #[arg(long, env = "PROXIMITY_RADIUS_M", default_value_t = DEFAULT_RADIUS_M)]
    pub radius_m: f64,

    /// Seconds of history scanned for neighbours, current second included
    #[arg(long, env = "PROXIMITY_LOOKBACK_SECS", default_value_t = DEFAULT_LOOKBACK_SECS)]
    pub lookback_secs: u32,

    /// Seconds of history returned in each trail, current second included
    #[arg(long, env = "PROXIMITY_TRAIL_SECS", default_value_t = DEFAULT_TRAIL_SECS)]
    pub trail_secs: u32,

    /// Drop samples older than this many seconds. Samples are kept forever when unset.
    #[arg(long, env = "PROXIMITY_RETENTION_SECS")]
    pub retention_secs: Option<u64>,

    /// How often the retention sweep runs
    #[arg(long, env = "PROXIMITY_PRUNE_INTERVAL_SECS", default_value_t = 60)]
    pub prune_interval_secs: u64,

    /// Fallback log level when RUST_LOG is not set
    #[arg(long, env = "PROXIMITY_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "PROXIMITY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Human)]
    pub log_format: LogFormat,

    /// Load ten minutes of demo positions for entities 1, 2 and 3 at startup
    #[arg(long, default_value_t = false)]
    pub seed_demo: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            journal_path: None,
            radius_m: DEFAULT_RADIUS_M,
            lookback_secs: DEFAULT_LOOKBACK_SECS,
            trail_secs: DEFAULT_TRAIL_SECS,
            retention_secs: None,
            prune_interval_secs: 60,
            log_level: "info".to_string(),
            log_format: LogFormat::Human,
            seed_demo: false,
        }
    }
}

impl ServerConfig {
    pub fn search_params(&self) -> SearchParams {
        SearchParams {
            radius_m: self.radius_m,
            lookback_secs: self.lookback_secs,
            trail_secs: self.trail_secs,
        }
    }

    pub fn store_kind(&self) -> LocationStoreKind {
        match &self.journal_path {
            Some(path) => LocationStoreKind::Journal { path: path.clone() },
            None => LocationStoreKind::InMemory,
        }
    }

    pub fn storage_type_str(&self) -> &'static str {
        if self.journal_path.is_some() {
            "journal"
        } else {
            "memory"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_match_default_impl() {
        let parsed = ServerConfig::try_parse_from(["proximity-server"]).expect("parse");
        let default = ServerConfig::default();
        assert_eq!(parsed.listen_addr, default.listen_addr);
        assert_eq!(parsed.search_params(), SearchParams::default());
        assert_eq!(parsed.retention_secs, None);
        assert_eq!(parsed.log_format, LogFormat::Human);
        assert!(!parsed.seed_demo);
    }

    #[test]
    fn journal_path_selects_journal_store() {
        let parsed = ServerConfig::try_parse_from([
            "proximity-server",
            "--journal-path",
            "/tmp/locations.jsonl",
            "--radius-m",
            "500",
            "--log-format",
            "json",
        ])
        .expect("parse");
        assert_eq!(
            parsed.store_kind(),
            LocationStoreKind::Journal {
                path: PathBuf::from("/tmp/locations.jsonl")
            }
        );
        assert_eq!(parsed.storage_type_str(), "journal");
        assert_eq!(parsed.search_params().radius_m, 500.0);
        assert_eq!(parsed.log_format, LogFormat::Json);
    }
}
