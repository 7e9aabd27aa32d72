//! # Transect - survey resampling library
//!
//! Resamples irregularly or grid-scanned geophysical survey measurements
//! (elevation/depth soundings organized as scan columns and rows) onto a
//! regularly-spaced lattice along a chosen direction and step length, using
//! inverse-distance weighted interpolation.
//!
//! ## How it works
//!
//! 1. **Read**: parse the survey text format into records, computing the
//!    bounding box and scan geometry on the way ([`Survey`]).
//! 2. **Partition**: assign every point into a fixed tile grid with
//!    boundary-candidate rescue ([`TilePartition`]), or build one balanced
//!    k-d tree over all points ([`SpatialIndex`]).
//! 3. **Walk**: derive step vectors from the survey geometry, walk the
//!    lattice, and interpolate every node from its k nearest points
//!    ([`GridExtractor`]).
//!
//! ## Quick Start
//!
//! ```no_run
//! use transect::{ExtractionConfig, GridExtractor, Survey};
//!
//! # fn main() -> transect::Result<()> {
//! let survey = Survey::from_path("pass7.txt")?;
//!
//! let config = ExtractionConfig {
//!     step: 250.0,
//!     ..ExtractionConfig::default()
//! };
//! let extraction = GridExtractor::new(&survey, config)?.extract()?;
//!
//! for p in extraction.points() {
//!     println!("{}, {}, {}", p.x, p.y, p.z);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Input Format
//!
//! Plain text, one record per line: `x y z column [row]`, whitespace
//! separated, with 1-based scan indices. Lines starting with `#` are
//! comments; the special comment `# Grid_size: COLSxROWS` declares the scan
//! dimensions. See [`Survey`] for details.

pub mod error;
pub mod extract;
pub mod index;
pub mod interpolate;
pub mod nearest;
pub mod output;
pub mod partition;
pub mod point;
pub mod survey;

// Re-export main types at crate root for convenience
pub use error::{ExtractError, Result};
pub use extract::{
    Extraction, ExtractionConfig, GridExtractor, PartitionStrategy, RoughnessReport,
    ROUGHNESS_WINDOW,
};
pub use index::SpatialIndex;
pub use interpolate::{DecayScheme, IdwInterpolator, MIN_NEIGHBORS};
pub use nearest::BoundedNearest;
pub use partition::{Tile, TilePartition, BOUNDARY_CANDIDATES};
pub use point::{Bounds, ExtractedPoint, Point3, RoughnessSample, SurveyRecord};
pub use survey::{Survey, SurveyGeometry};
