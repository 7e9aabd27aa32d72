use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use transect::{DecayScheme, ExtractionConfig, PartitionStrategy};

mod commands;

/// Survey transect resampling tool
#[derive(Parser)]
#[command(name = "transect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Candidate lookup strategy for interpolation queries.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    /// Fixed tile grid with boundary-candidate rescue
    Tiling,
    /// One balanced k-d tree over all survey points
    SpatialIndex,
}

/// Weight decay scheme for interpolation.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Decay {
    /// Use --decay-scale as-is
    Fixed,
    /// Start at 1.0 and relax automatically on underflow
    Adaptive,
}

/// Parameters shared by the resampling subcommands.
#[derive(Args)]
struct ExtractionArgs {
    /// Rotation of the cross-line walk direction, degrees in [0, 360)
    #[arg(short, long, env = "TRANSECT_ANGLE", default_value_t = 0.0)]
    angle: f64,

    /// Along-scan lattice spacing, in survey units
    #[arg(short, long, env = "TRANSECT_STEP", default_value_t = 500.0)]
    step: f64,

    /// Nearest neighbors per interpolation query (minimum 4)
    #[arg(short = 'k', long, default_value_t = 4)]
    neighbors: usize,

    /// Tile grid rows (tiling strategy only)
    #[arg(long, default_value_t = 30)]
    tile_rows: usize,

    /// Tile grid columns (tiling strategy only)
    #[arg(long, default_value_t = 30)]
    tile_cols: usize,

    /// Candidate lookup strategy
    #[arg(long, value_enum, default_value = "tiling")]
    strategy: Strategy,

    /// Weight decay scheme
    #[arg(long, value_enum, default_value = "adaptive")]
    decay: Decay,

    /// Decay scale for the fixed scheme
    #[arg(long, default_value_t = 0.1)]
    decay_scale: f64,

    /// Walk the full scan-line count even outside the survey bounds
    #[arg(long)]
    unbounded: bool,
}

impl ExtractionArgs {
    fn to_config(&self) -> ExtractionConfig {
        ExtractionConfig {
            angle: self.angle,
            step: self.step,
            tile_rows: self.tile_rows,
            tile_cols: self.tile_cols,
            neighbors: self.neighbors,
            strategy: match self.strategy {
                Strategy::Tiling => PartitionStrategy::Tiling,
                Strategy::SpatialIndex => PartitionStrategy::SpatialIndex,
            },
            decay: match self.decay {
                Decay::Fixed => DecayScheme::Fixed(self.decay_scale),
                Decay::Adaptive => DecayScheme::Adaptive,
            },
            clip_to_bounds: !self.unbounded,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Resample a survey onto a regular lattice
    Extract {
        /// Input survey file
        input: PathBuf,

        /// Output file for `x, y, z` lines (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        extraction: ExtractionArgs,

        /// Print the run summary as JSON (requires --output)
        #[arg(long, requires = "output")]
        json: bool,
    },

    /// Compute sliding-window roughness along extracted lattice columns
    Roughness {
        /// Input survey file
        input: PathBuf,

        /// Output file for `column, x, y, roughness` lines (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sliding window width, in samples
        #[arg(short, long, default_value_t = transect::ROUGHNESS_WINDOW)]
        window: usize,

        #[command(flatten)]
        extraction: ExtractionArgs,
    },

    /// Display survey statistics and derived geometry
    Info {
        /// Input survey file
        input: PathBuf,

        /// Output the statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            input,
            output,
            extraction,
            json,
        } => commands::extract::run(input, output, extraction.to_config(), json),
        Commands::Roughness {
            input,
            output,
            window,
            extraction,
        } => commands::roughness::run(input, output, window, extraction.to_config()),
        Commands::Info { input, json } => commands::info::run(input, json),
    }
}
