//! Level tooling for Crossing The Line
//!
//! Usage:
//!   cargo xtask dump-level levels/C1L0.nklvl           # Print a decoded level
//!   cargo xtask new-level levels/C1L3.nklvl --start 0,0,0
//!   cargo xtask upgrade-levels levels                  # Re-save every level

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossing_the_line::config::MinorVersionPolicy;
use crossing_the_line::game::level_manager::LEVEL_EXTENSION;
use crossing_the_line::math::Vec3;
use crossing_the_line::world::{NkLevelFile, NKLVL_VERSION_MAJOR, NKLVL_VERSION_MINOR};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Level tooling for Crossing The Line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the contents of a level file
    DumpLevel { path: PathBuf },
    /// Write an empty level at the current version
    NewLevel {
        path: PathBuf,
        /// Player start position as x,y,z
        #[arg(long, value_parser = parse_vec3)]
        start: Option<Vec3>,
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Load and re-save every level in a directory
    UpgradeLevels { dir: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::DumpLevel { path } => dump_level(&path),
        Commands::NewLevel { path, start, force } => new_level(&path, start.unwrap_or(Vec3::ZERO), force),
        Commands::UpgradeLevels { dir } => upgrade_levels(&dir),
    }
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<f32> = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("'{}': {}", p, e)))
        .collect::<Result<_, _>>()?;
    match parts[..] {
        [x, y, z] => Ok(Vec3::new(x, y, z)),
        _ => Err(format!("expected x,y,z, got '{}'", s)),
    }
}

fn fmt_vec3(v: Vec3) -> String {
    format!("({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)
}

fn dump_level(path: &Path) -> Result<()> {
    let level = NkLevelFile::load(path, MinorVersionPolicy::Lenient)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    println!("{}", path.display());
    println!("  version   {}.{}", level.major_version, level.minor_version);
    println!("  start     {}", fmt_vec3(level.start_position));
    if level.has_coin {
        println!("  coin      {}", fmt_vec3(level.coin_position));
    } else {
        println!("  coin      none");
    }

    println!("  points    {}", level.points.len());
    for point in &level.points {
        println!(
            "    {:<10} at {} scale {}",
            point.point_type.name(),
            fmt_vec3(point.position),
            fmt_vec3(point.scale)
        );
    }

    println!("  vehicles  {}", level.vehicles.len());
    for vehicle in &level.vehicles {
        println!(
            "    {:<10?} at {} dir {} accel {:.2}",
            vehicle.vehicle_type,
            fmt_vec3(vehicle.position),
            fmt_vec3(vehicle.direction),
            vehicle.acceleration
        );
    }

    println!("  tiles     {}", level.tiles.len());
    for tile in &level.tiles {
        println!("    {:<10?} at {}", tile.tile_type, fmt_vec3(tile.position));
    }
    Ok(())
}

fn new_level(path: &Path, start: Vec3, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (pass --force to replace it)", path.display());
    }
    if path.extension().and_then(|e| e.to_str()) != Some(LEVEL_EXTENSION) {
        println!("Warning: {} lacks the .{} extension and won't be discovered", path.display(), LEVEL_EXTENSION);
    }

    let mut level = NkLevelFile::new(path);
    level.start_position = start;
    level.save().with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Created {} (version {}.{})", path.display(), NKLVL_VERSION_MAJOR, NKLVL_VERSION_MINOR);
    Ok(())
}

fn upgrade_levels(dir: &Path) -> Result<()> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(LEVEL_EXTENSION))
        .collect();
    paths.sort();

    let mut failed = 0;
    for path in &paths {
        let result = NkLevelFile::load(path, MinorVersionPolicy::Lenient).and_then(|level| {
            // Saving stamps the current version
            let from = level.minor_version;
            level.save()?;
            Ok(from)
        });

        match result {
            Ok(from) if from != NKLVL_VERSION_MINOR => {
                println!("  {} {}.{} -> {}.{}", path.display(), NKLVL_VERSION_MAJOR, from, NKLVL_VERSION_MAJOR, NKLVL_VERSION_MINOR)
            }
            Ok(_) => println!("  {} up to date", path.display()),
            Err(e) => {
                eprintln!("  {} FAILED: {}", path.display(), e);
                failed += 1;
            }
        }
    }

    println!("Upgraded {} of {} levels", paths.len() - failed, paths.len());
    if failed > 0 {
        bail!("{} levels failed to upgrade", failed);
    }
    Ok(())
}
