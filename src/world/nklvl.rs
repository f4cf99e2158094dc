//! NKLevelFile: the binary level format
//!
//! A flat, host-native-endian layout:
//!
//! ```text
//! u8 major, u8 minor
//! f32x3 start_position
//! f32x3 coin_position, bool has_coin
//! usize points_count   { f32x3 position; f32x3 scale; u16 type }
//! usize vehicles_count { f32x3 position; f32x3 direction; f32 acceleration; u8 vehicle_type }
//! usize tiles_count    { f32x3 position; u8 tile_type }
//! ```
//!
//! Decoding happens on an in-memory copy of the file and only returns a value
//! once every record has been read, so a failed load never leaves a half
//! populated level behind.

use std::fs;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;

use crate::config::MinorVersionPolicy;
use crate::math::Vec3;

pub const NKLVL_VERSION_MAJOR: u8 = 0;
pub const NKLVL_VERSION_MINOR: u8 = 2;

/// Capacity limits, checked on both decode and encode
pub mod limits {
    /// Maximum number of typed point markers
    pub const POINTS_MAX: usize = 16;
    /// Maximum number of vehicles
    pub const VEHICLES_MAX: usize = 12;
    /// Maximum number of tiles
    pub const TILES_MAX: usize = 256;
}

const USIZE_BYTES: usize = std::mem::size_of::<usize>();

/// Error type for level loading and saving
#[derive(Error, Debug)]
pub enum LevelError {
    #[error("level file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("level I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("level version {found_major}.{found_minor} does not match {expected_major}.{expected_minor}")]
    VersionMismatch {
        found_major: u8,
        found_minor: u8,
        expected_major: u8,
        expected_minor: u8,
    },

    #[error("too many {what}: {count} > {max}")]
    BoundsExceeded {
        what: &'static str,
        count: usize,
        max: usize,
    },

    #[error("invalid {what} tag: {value:#x}")]
    InvalidTag { what: &'static str, value: u16 },
}

// =============================================================================
// Record tags
// =============================================================================

/// Point marker kind. The values are the entity kind tags the format stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum PointType {
    End = 0x80,
    Death = 0x100,
    VehicleReset = 0x120,
    Chapter = 0x140,
}

impl PointType {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x80 => Some(PointType::End),
            0x100 => Some(PointType::Death),
            0x120 => Some(PointType::VehicleReset),
            0x140 => Some(PointType::Chapter),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PointType::End => "end",
            PointType::Death => "death",
            PointType::VehicleReset => "vehicle-reset",
            PointType::Chapter => "chapter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VehicleType {
    Car = 0,
    Truck = 1,
}

impl VehicleType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(VehicleType::Car),
            1 => Some(VehicleType::Truck),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TileType {
    Road = 0,
    Pavement = 1,
    Tunnel = 2,
}

impl TileType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TileType::Road),
            1 => Some(TileType::Pavement),
            2 => Some(TileType::Tunnel),
            _ => None,
        }
    }
}

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NkPoint {
    pub position: Vec3,
    pub scale: Vec3,
    pub point_type: PointType,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NkVehicle {
    pub position: Vec3,
    /// Only the sign of each component matters
    pub direction: Vec3,
    pub acceleration: f32,
    pub vehicle_type: VehicleType,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NkTile {
    pub position: Vec3,
    pub tile_type: TileType,
}

/// Decoded level descriptor. Pure data.
#[derive(Debug, Clone, PartialEq)]
pub struct NkLevelFile {
    /// Where the file was loaded from, and where `save` writes to
    pub path: PathBuf,

    pub major_version: u8,
    pub minor_version: u8,

    pub start_position: Vec3,

    pub coin_position: Vec3,
    pub has_coin: bool,

    pub points: Vec<NkPoint>,
    pub vehicles: Vec<NkVehicle>,
    pub tiles: Vec<NkTile>,
}

impl NkLevelFile {
    /// An empty level stamped with the current version.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            major_version: NKLVL_VERSION_MAJOR,
            minor_version: NKLVL_VERSION_MINOR,
            start_position: Vec3::ZERO,
            coin_position: Vec3::ZERO,
            has_coin: false,
            points: Vec::new(),
            vehicles: Vec::new(),
            tiles: Vec::new(),
        }
    }

    /// Load and decode the level at `path`.
    pub fn load<P: AsRef<Path>>(path: P, policy: MinorVersionPolicy) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let start = Instant::now();

        let bytes = fs::read(path).map_err(|e| {
            log::error!("Failed to read the level file at '{}': {}", path.display(), e);
            if e.kind() == io::ErrorKind::NotFound {
                LevelError::FileNotFound(path.to_path_buf())
            } else {
                LevelError::Io(e)
            }
        })?;

        let mut level = Self::parse(&bytes, policy)?;
        level.path = path.to_path_buf();

        log::debug!(
            "Decoded '{}' ({} bytes) in {:.2?}",
            path.display(),
            bytes.len(),
            start.elapsed()
        );
        Ok(level)
    }

    /// Decode a level from raw bytes. The returned value has an empty path.
    pub fn parse(bytes: &[u8], policy: MinorVersionPolicy) -> Result<Self, LevelError> {
        let mut r = ByteReader::new(bytes);

        let major_version = r.read_u8()?;
        let minor_version = r.read_u8()?;
        check_version(major_version, minor_version, policy)?;

        let start_position = r.read_vec3()?;
        let coin_position = r.read_vec3()?;
        let has_coin = r.read_bool()?;

        let count = r.read_count("points", limits::POINTS_MAX)?;
        let mut points = Vec::with_capacity(count);
        for _ in 0..count {
            let position = r.read_vec3()?;
            let scale = r.read_vec3()?;
            let tag = r.read_u16()?;
            let point_type = PointType::from_u16(tag)
                .ok_or(LevelError::InvalidTag { what: "point", value: tag })?;
            points.push(NkPoint { position, scale, point_type });
        }

        let count = r.read_count("vehicles", limits::VEHICLES_MAX)?;
        let mut vehicles = Vec::with_capacity(count);
        for _ in 0..count {
            let position = r.read_vec3()?;
            let direction = r.read_vec3()?;
            let acceleration = r.read_f32()?;
            let tag = r.read_u8()?;
            let vehicle_type = VehicleType::from_u8(tag)
                .ok_or(LevelError::InvalidTag { what: "vehicle", value: tag as u16 })?;
            vehicles.push(NkVehicle { position, direction, acceleration, vehicle_type });
        }

        let count = r.read_count("tiles", limits::TILES_MAX)?;
        let mut tiles = Vec::with_capacity(count);
        for _ in 0..count {
            let position = r.read_vec3()?;
            let tag = r.read_u8()?;
            let tile_type = TileType::from_u8(tag)
                .ok_or(LevelError::InvalidTag { what: "tile", value: tag as u16 })?;
            tiles.push(NkTile { position, tile_type });
        }

        if r.remaining() > 0 {
            log::warn!("{} trailing bytes after level data ignored", r.remaining());
        }

        Ok(Self {
            path: PathBuf::new(),
            major_version,
            minor_version,
            start_position,
            coin_position,
            has_coin,
            points,
            vehicles,
            tiles,
        })
    }

    /// Check every collection against its capacity.
    pub fn validate(&self) -> Result<(), LevelError> {
        check_bounds("points", self.points.len(), limits::POINTS_MAX)?;
        check_bounds("vehicles", self.vehicles.len(), limits::VEHICLES_MAX)?;
        check_bounds("tiles", self.tiles.len(), limits::TILES_MAX)?;
        Ok(())
    }

    /// Encode to bytes, stamping the current version regardless of the
    /// version this value was loaded with.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LevelError> {
        self.validate()?;

        let mut out = Vec::with_capacity(
            2 + 12 + 12 + 1
                + 3 * USIZE_BYTES
                + self.points.len() * 26
                + self.vehicles.len() * 29
                + self.tiles.len() * 13,
        );

        out.push(NKLVL_VERSION_MAJOR);
        out.push(NKLVL_VERSION_MINOR);
        write_vec3(&mut out, self.start_position);
        write_vec3(&mut out, self.coin_position);
        out.push(self.has_coin as u8);

        out.extend_from_slice(&self.points.len().to_ne_bytes());
        for p in &self.points {
            write_vec3(&mut out, p.position);
            write_vec3(&mut out, p.scale);
            out.extend_from_slice(&(p.point_type as u16).to_ne_bytes());
        }

        out.extend_from_slice(&self.vehicles.len().to_ne_bytes());
        for v in &self.vehicles {
            write_vec3(&mut out, v.position);
            write_vec3(&mut out, v.direction);
            out.extend_from_slice(&v.acceleration.to_ne_bytes());
            out.push(v.vehicle_type as u8);
        }

        out.extend_from_slice(&self.tiles.len().to_ne_bytes());
        for t in &self.tiles {
            write_vec3(&mut out, t.position);
            out.push(t.tile_type as u8);
        }

        Ok(out)
    }

    /// Write to `self.path`, overwriting in place.
    pub fn save(&self) -> Result<(), LevelError> {
        self.save_to(&self.path)
    }

    /// Write to an explicit path. The write is not atomic: a crash mid-write
    /// can leave a truncated file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), LevelError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        fs::write(path, bytes).map_err(|e| {
            log::error!("Failed to save the level file at '{}': {}", path.display(), e);
            LevelError::Io(e)
        })?;

        log::trace!("Saved level file at '{}'", path.display());
        Ok(())
    }
}

fn check_version(major: u8, minor: u8, policy: MinorVersionPolicy) -> Result<(), LevelError> {
    let mismatch = LevelError::VersionMismatch {
        found_major: major,
        found_minor: minor,
        expected_major: NKLVL_VERSION_MAJOR,
        expected_minor: NKLVL_VERSION_MINOR,
    };

    if major != NKLVL_VERSION_MAJOR {
        return Err(mismatch);
    }

    match policy {
        MinorVersionPolicy::Strict if minor != NKLVL_VERSION_MINOR => Err(mismatch),
        MinorVersionPolicy::AtMostCurrent if minor > NKLVL_VERSION_MINOR => Err(mismatch),
        _ => {
            if minor != NKLVL_VERSION_MINOR {
                log::warn!(
                    "Level minor version {} differs from current {}",
                    minor,
                    NKLVL_VERSION_MINOR
                );
            }
            Ok(())
        }
    }
}

fn check_bounds(what: &'static str, count: usize, max: usize) -> Result<(), LevelError> {
    if count > max {
        return Err(LevelError::BoundsExceeded { what, count, max });
    }
    Ok(())
}

fn write_vec3(out: &mut Vec<u8>, v: Vec3) {
    out.extend_from_slice(&v.x.to_ne_bytes());
    out.extend_from_slice(&v.y.to_ne_bytes());
    out.extend_from_slice(&v.z.to_ne_bytes());
}

/// Native-endian field reader. Short input surfaces as `UnexpectedEof`.
struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { cursor: Cursor::new(bytes) }
    }

    fn remaining(&self) -> usize {
        let len = self.cursor.get_ref().len() as u64;
        len.saturating_sub(self.cursor.position()) as usize
    }

    fn read_array<const N: usize>(&mut self) -> io::Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.cursor.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_u8(&mut self) -> io::Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    fn read_u16(&mut self) -> io::Result<u16> {
        Ok(u16::from_ne_bytes(self.read_array()?))
    }

    fn read_f32(&mut self) -> io::Result<f32> {
        Ok(f32::from_ne_bytes(self.read_array()?))
    }

    fn read_bool(&mut self) -> io::Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    fn read_vec3(&mut self) -> io::Result<Vec3> {
        Ok(Vec3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }

    fn read_count(&mut self, what: &'static str, max: usize) -> Result<usize, LevelError> {
        let count = usize::from_ne_bytes(self.read_array::<USIZE_BYTES>()?);
        check_bounds(what, count, max)?;
        Ok(count)
    }
}
