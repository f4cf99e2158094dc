//! Save data (progress and volume settings)
//!
//! Flat native-endian layout with no version tag:
//! `u8 current_group, u8 coins_collected, f32 master, f32 music, f32 sfx`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Size of the on-disk record
pub const NKDATA_SIZE: usize = 2 + 3 * 4;

#[derive(Error, Debug)]
pub enum SaveDataError {
    #[error("save data I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("save data truncated: {0} bytes, expected {NKDATA_SIZE}")]
    Truncated(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveData {
    pub path: PathBuf,
    pub current_group: u8,
    pub coins_collected: u8,
    pub master_volume: f32,
    pub music_volume: f32,
    pub sfx_volume: f32,
}

impl SaveData {
    /// Fresh progress at `path`, full volume.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            current_group: 0,
            coins_collected: 0,
            master_volume: 1.0,
            music_volume: 1.0,
            sfx_volume: 1.0,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SaveDataError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            log::error!("Failed to open save data at '{}': {}", path.display(), e);
            e
        })?;

        if bytes.len() < NKDATA_SIZE {
            return Err(SaveDataError::Truncated(bytes.len()));
        }

        let f32_at = |i: usize| f32::from_ne_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        let data = Self {
            path: path.to_path_buf(),
            current_group: bytes[0],
            coins_collected: bytes[1],
            master_volume: f32_at(2),
            music_volume: f32_at(6),
            sfx_volume: f32_at(10),
        };

        log::debug!(
            "Loaded save data: group {}, {} coins",
            data.current_group,
            data.coins_collected
        );
        Ok(data)
    }

    /// Load from `path`, falling back to defaults on any failure.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(data) => data,
            Err(e) => {
                log::info!("Starting with fresh save data ({})", e);
                Self::new(path)
            }
        }
    }

    pub fn to_bytes(&self) -> [u8; NKDATA_SIZE] {
        let mut out = [0u8; NKDATA_SIZE];
        out[0] = self.current_group;
        out[1] = self.coins_collected;
        out[2..6].copy_from_slice(&self.master_volume.to_ne_bytes());
        out[6..10].copy_from_slice(&self.music_volume.to_ne_bytes());
        out[10..14].copy_from_slice(&self.sfx_volume.to_ne_bytes());
        out
    }

    pub fn save(&self) -> Result<(), SaveDataError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, self.to_bytes()).map_err(|e| {
            log::error!("Failed to write save data at '{}': {}", self.path.display(), e);
            e
        })?;
        Ok(())
    }

    /// Update the volumes (clamped to [0, 1]) and persist.
    pub fn set_volume(&mut self, master: f32, music: f32, sfx: f32) -> Result<(), SaveDataError> {
        self.master_volume = master.clamp(0.0, 1.0);
        self.music_volume = music.clamp(0.0, 1.0);
        self.sfx_volume = sfx.clamp(0.0, 1.0);
        self.save()
    }

    pub fn volume(&self) -> (f32, f32, f32) {
        (self.master_volume, self.music_volume, self.sfx_volume)
    }

    /// Record progress and persist. `current_group` never moves backwards.
    pub fn set_level_data(&mut self, current_group: u8, coins_collected: u8) -> Result<(), SaveDataError> {
        if current_group > self.current_group {
            self.current_group = current_group;
        }
        self.coins_collected = coins_collected;
        self.save()
    }

    pub fn level_data(&self) -> (u8, u8) {
        (self.current_group, self.coins_collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_dir() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saves").join("nkdata.bin");
        (dir, path)
    }

    #[test]
    fn test_save_and_load() {
        let (_dir, path) = setup_test_dir();

        let mut data = SaveData::new(&path);
        data.set_level_data(2, 5).unwrap();
        data.set_volume(0.5, 0.3, 0.8).unwrap();

        let loaded = SaveData::load(&path).unwrap();
        assert_eq!(loaded, data);
        assert_eq!(std::fs::read(&path).unwrap().len(), NKDATA_SIZE);
    }

    #[test]
    fn test_current_group_is_monotonic() {
        let (_dir, path) = setup_test_dir();

        let mut data = SaveData::new(&path);
        data.set_level_data(3, 1).unwrap();
        data.set_level_data(1, 4).unwrap();
        assert_eq!(data.level_data(), (3, 4));
    }

    #[test]
    fn test_volume_is_clamped() {
        let (_dir, path) = setup_test_dir();

        let mut data = SaveData::new(&path);
        data.set_volume(1.4, -0.2, 0.6).unwrap();
        assert_eq!(data.volume(), (1.0, 0.0, 0.6));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let (_dir, path) = setup_test_dir();

        assert!(matches!(SaveData::load(&path), Err(SaveDataError::Io(_))));
        let data = SaveData::load_or_default(&path);
        assert_eq!(data.volume(), (1.0, 1.0, 1.0));
        assert_eq!(data.level_data(), (0, 0));
        assert_eq!(data.path, path);
    }

    #[test]
    fn test_short_file_rejected() {
        let (dir, _) = setup_test_dir();
        let path = dir.path().join("short.bin");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        assert!(matches!(SaveData::load(&path), Err(SaveDataError::Truncated(3))));
    }
}
