use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the arena library.
///
/// The simulation itself never fails; these cover loading configuration and
/// driving the upgrade choice from outside the loop.
#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no upgrade choice is pending")]
    NoUpgradePending,

    #[error("upgrade choice {index} is out of range ({offered} offered)")]
    InvalidUpgradeChoice { index: usize, offered: usize },
}
