use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Create MBTiles pyramids from GeoTIFF rasters", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an MBTiles file from a GeoTIFF
    Create(CreateArgs),

    /// Print one JSON build config per chunk, for parallel builds
    Config(ConfigArgs),

    /// Merge MBTiles files into one
    Merge(MergeArgs),

    /// Add or remove zoom levels of an MBTiles file
    Levels(LevelsArgs),
}

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Output *.mbtiles file
    pub target_file: Option<PathBuf>,

    /// Finest zoom level; the pyramid has this many levels plus one
    pub num_levels: Option<u8>,

    /// Input GeoTIFF
    pub source: Option<PathBuf>,

    /// Build config: JSON file, `-` for stdin, or inline JSON
    #[arg(long, short)]
    pub config: Option<String>,

    /// Resume building an existing file
    #[arg(long, short, default_value_t = false, conflicts_with = "memory")]
    pub resume: bool,

    /// Build in an in-memory database and write the file when done
    #[arg(long, short, default_value_t = false)]
    pub memory: bool,
}

#[derive(clap::Args, Debug)]
pub struct ConfigArgs {
    /// Input GeoTIFF
    pub source: PathBuf,

    /// Finest zoom level
    pub num_levels: u8,

    /// Base config the chunk configs extend
    #[arg(long, short)]
    pub config: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct MergeArgs {
    /// Output *.mbtiles file
    pub target_file: PathBuf,

    /// Input *.mbtiles files or directories containing them
    #[arg(required = true)]
    pub sources: Vec<PathBuf>,

    /// Delete each input after it is merged
    #[arg(long, short = 's', default_value_t = false)]
    pub delete: bool,
}

#[derive(clap::Args, Debug)]
pub struct LevelsArgs {
    /// *.mbtiles file to modify
    pub target_file: PathBuf,

    /// New finest zoom level
    pub num_levels: u8,

    /// Original GeoTIFF, needed only if base tiles are missing
    pub source: Option<PathBuf>,
}
