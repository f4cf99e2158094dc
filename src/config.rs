//! Game configuration
//!
//! Read once at startup from `game.ron` next to the executable. Every field has
//! a default, so a missing file or a partial file are both valid.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE: &str = "game.ron";

/// Errors raised while reading or writing the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

/// What happens to a collected coin when the level is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CoinResetPolicy {
    /// The coin comes back on every reset
    Respawn,
    /// Once collected, the coin stays gone until the level is reloaded
    #[default]
    StaySpent,
}

/// How the level loader treats a minor version that differs from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MinorVersionPolicy {
    /// Accept any minor version, warn when it differs
    #[default]
    Lenient,
    /// Reject anything but the current minor version
    Strict,
    /// Accept older files, reject files written by a newer minor version
    AtMostCurrent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window_title: String,
    pub window_width: i32,
    pub window_height: i32,

    pub levels_dir: PathBuf,
    pub hub_level: PathBuf,
    pub dialogue_path: PathBuf,
    pub credits_path: PathBuf,

    /// Save data location. `None` resolves to the user config directory.
    pub save_path: Option<PathBuf>,

    pub coin_reset: CoinResetPolicy,
    pub minor_version: MinorVersionPolicy,

    pub physics_iterations: u32,
    /// Open the first level with the editor camera active
    pub start_in_editor: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_title: "Crossing The Line".to_string(),
            window_width: 1366,
            window_height: 720,
            levels_dir: PathBuf::from("levels"),
            hub_level: PathBuf::from("levels/C0L0.nklvl"),
            dialogue_path: PathBuf::from("dialogue.txt"),
            credits_path: PathBuf::from("credits.txt"),
            save_path: None,
            coin_reset: CoinResetPolicy::default(),
            minor_version: MinorVersionPolicy::default(),
            physics_iterations: 5,
            start_in_editor: false,
        }
    }
}

impl GameConfig {
    /// Load the config from `path`. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No config at '{}', using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: GameConfig = ron::from_str(&contents)?;
        log::debug!("Loaded config from '{}'", path.display());
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .indentor("  ".to_string());
        let contents = ron::ser::to_string_pretty(self, pretty)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Where the save data lives: the configured path, else
    /// `<config_dir>/crossing-the-line/nkdata.bin`, else the working directory.
    pub fn resolved_save_path(&self) -> PathBuf {
        if let Some(path) = &self.save_path {
            return path.clone();
        }

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(dir) = dirs::config_dir() {
            return dir.join("crossing-the-line").join("nkdata.bin");
        }

        PathBuf::from("nkdata.bin")
    }
}
