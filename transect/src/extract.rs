//! Lattice walk: resampling a survey onto a regular transect grid.
//!
//! The walk is driven entirely by the survey's derived geometry. The outer
//! loop advances along the scan direction in user-chosen steps; the inner
//! loop advances across scan lines by the survey's natural line spacing,
//! optionally rotated by a user angle. Every lattice node is interpolated
//! from its nearest survey points; nodes without coverage are dropped
//! silently rather than reported.

use log::{debug, info};

use crate::error::{ExtractError, Result};
use crate::index::SpatialIndex;
use crate::interpolate::{DecayScheme, IdwInterpolator, MIN_NEIGHBORS};
use crate::partition::TilePartition;
use crate::point::{Bounds, ExtractedPoint, Point3, RoughnessSample};
use crate::survey::{Survey, SurveyGeometry};

/// Default sliding-window width for the roughness pass.
pub const ROUGHNESS_WINDOW: usize = 5;

/// How lattice queries find their candidate points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionStrategy {
    /// Fixed tile grid with boundary-candidate rescue. The default; suits
    /// surveys whose density buckets evenly.
    Tiling,
    /// One balanced k-d tree over all points. Suits irregular densities.
    SpatialIndex,
}

/// Parameters of one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Rotation of the cross-line walk direction, counter-clockwise degrees
    /// in `[0, 360)` relative to the survey's natural row direction.
    pub angle: f64,
    /// Along-scan lattice spacing, in survey units. Must be positive.
    pub step: f64,
    /// Tile grid rows (tiling strategy only).
    pub tile_rows: usize,
    /// Tile grid columns (tiling strategy only).
    pub tile_cols: usize,
    /// Nearest neighbors per interpolation query, at least
    /// [`MIN_NEIGHBORS`].
    pub neighbors: usize,
    pub strategy: PartitionStrategy,
    pub decay: DecayScheme,
    /// Stop each cross-line walk once it leaves the survey bounding box.
    pub clip_to_bounds: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            angle: 0.0,
            step: 500.0,
            tile_rows: 30,
            tile_cols: 30,
            neighbors: MIN_NEIGHBORS,
            strategy: PartitionStrategy::Tiling,
            decay: DecayScheme::default(),
            clip_to_bounds: true,
        }
    }
}

impl ExtractionConfig {
    /// Check all parameters against their valid ranges.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ExtractError::InvalidConfig(msg));

        if !self.angle.is_finite() || !(0.0..360.0).contains(&self.angle) {
            return invalid(format!("angle {} is outside [0, 360)", self.angle));
        }
        if !self.step.is_finite() || self.step <= 0.0 {
            return invalid(format!("step {} must be positive", self.step));
        }
        if self.tile_rows == 0 || self.tile_cols == 0 {
            return invalid(format!(
                "tile grid {}x{} must have at least one row and column",
                self.tile_rows, self.tile_cols
            ));
        }
        if self.neighbors < MIN_NEIGHBORS {
            return invalid(format!(
                "neighbor count {} is below the minimum of {}",
                self.neighbors, MIN_NEIGHBORS
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
enum Sampler {
    Tiles(TilePartition),
    Index(SpatialIndex),
}

/// Resampling engine: survey geometry plus a query structure, built once and
/// read-only for the whole walk.
#[derive(Debug)]
pub struct GridExtractor {
    config: ExtractionConfig,
    geometry: SurveyGeometry,
    bounds: Bounds,
    row_count: usize,
    interpolator: IdwInterpolator,
    sampler: Sampler,
}

impl GridExtractor {
    /// Build the engine for one survey: derive the geometry, then assign
    /// every point into the tile partition (or the spatial index).
    ///
    /// # Errors
    ///
    /// - [`ExtractError::InvalidConfig`] for out-of-range parameters;
    /// - [`ExtractError::MissingAnchors`] when the survey cannot supply the
    ///   geometry anchors;
    /// - [`ExtractError::InsufficientCandidates`] when the whole survey holds
    ///   fewer points than one query needs.
    pub fn new(survey: &Survey, config: ExtractionConfig) -> Result<Self> {
        config.validate()?;
        let geometry = survey.geometry()?;

        if survey.len() < config.neighbors {
            return Err(ExtractError::InsufficientCandidates {
                available: survey.len(),
                required: config.neighbors,
            });
        }

        let interpolator = IdwInterpolator::new(config.neighbors, config.decay)?;
        let bounds = *survey.bounds();
        let row_count = survey
            .grid_rows()
            .map(|rows| rows as usize)
            .unwrap_or(geometry.scan_lines);

        let sampler = match config.strategy {
            PartitionStrategy::Tiling => {
                let mut partition = TilePartition::new(&bounds, config.tile_rows, config.tile_cols);
                for p in survey.points() {
                    partition.assign(p);
                }
                partition.finalize();
                Sampler::Tiles(partition)
            }
            PartitionStrategy::SpatialIndex => {
                Sampler::Index(SpatialIndex::build(survey.points().collect()))
            }
        };

        Ok(Self {
            config,
            geometry,
            bounds,
            row_count,
            interpolator,
            sampler,
        })
    }

    /// The survey geometry driving the walk.
    pub fn geometry(&self) -> &SurveyGeometry {
        &self.geometry
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Lattice columns the walk will visit.
    pub fn lattice_columns(&self) -> usize {
        (self.geometry.total_column_length / self.config.step).floor() as usize
    }

    /// Interpolate one lattice node. `None` means the node has no coverage
    /// (outside the partition extent, or a non-finite estimate).
    fn sample(&self, x: f64, y: f64) -> Result<Option<f64>> {
        let z = match &self.sampler {
            Sampler::Tiles(partition) => match partition.tile_for(x, y) {
                Some(tile) => self.interpolator.estimate(x, y, tile.points())?,
                None => return Ok(None),
            },
            Sampler::Index(index) => {
                let candidates: Vec<Point3> = index
                    .nearest(x, y, self.interpolator.neighbors())
                    .into_iter()
                    .map(|(_, p)| p)
                    .collect();
                self.interpolator.estimate(x, y, &candidates)?
            }
        };
        Ok(z.is_finite().then_some(z))
    }

    /// Walk the lattice and collect every covered node, grouped per lattice
    /// column.
    pub fn extract(&self) -> Result<Extraction> {
        let g = &self.geometry;

        // Along-scan step vector, rescaled to the requested step length.
        let factor = self.config.step / g.column_step;
        let col_vec = (g.column_delta.0 * factor, g.column_delta.1 * factor);

        // Cross-line step vector, rotated by the user angle.
        let (sin, cos) = self.config.angle.to_radians().sin_cos();
        let row_vec = (
            g.row_delta.0 * cos - g.row_delta.1 * sin,
            g.row_delta.0 * sin + g.row_delta.1 * cos,
        );

        let columns = self.lattice_columns();
        debug!(
            "walk: {} columns x {} rows, col vec ({}, {}), row vec ({}, {})",
            columns, self.row_count, col_vec.0, col_vec.1, row_vec.0, row_vec.1
        );

        let mut lines = Vec::with_capacity(columns);
        for i in 0..columns {
            let col_x = g.origin.x + i as f64 * col_vec.0;
            let col_y = g.origin.y + i as f64 * col_vec.1;

            let mut line = Vec::new();
            for j in 0..self.row_count {
                let x = col_x + j as f64 * row_vec.0;
                let y = col_y + j as f64 * row_vec.1;

                if self.config.clip_to_bounds && !self.bounds.contains_xy(x, y) {
                    break;
                }
                if let Some(z) = self.sample(x, y)? {
                    line.push(ExtractedPoint { x, y, z });
                }
            }
            lines.push(line);
        }

        let extraction = Extraction { lines };
        info!(
            "extracted {} points over {} lattice columns",
            extraction.len(),
            columns
        );
        Ok(extraction)
    }
}

/// The resampled output: one sequence of covered nodes per lattice column.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    lines: Vec<Vec<ExtractedPoint>>,
}

impl Extraction {
    /// Extracted nodes grouped per lattice column, in walk order.
    pub fn lines(&self) -> &[Vec<ExtractedPoint>] {
        &self.lines
    }

    /// All extracted nodes in walk order.
    pub fn points(&self) -> impl Iterator<Item = &ExtractedPoint> {
        self.lines.iter().flatten()
    }

    /// Total number of extracted nodes.
    pub fn len(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }

    /// Whether the walk produced no covered node at all.
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(Vec::is_empty)
    }

    /// Sliding-window roughness along each lattice column.
    ///
    /// For every window of `window` consecutive values on a column, emits the
    /// standard deviation of elevation at the window's midpoint node.
    /// Columns with no more values than the window width are skipped. The
    /// report also carries the overall minimum and maximum windows.
    pub fn roughness(&self, window: usize) -> RoughnessReport {
        let window = window.max(1);
        let mut samples = Vec::new();
        let mut min: Option<RoughnessSample> = None;
        let mut max: Option<RoughnessSample> = None;

        for (column, line) in self.lines.iter().enumerate() {
            if line.len() <= window {
                continue;
            }
            for (i, win) in line.windows(window).enumerate() {
                let mean = win.iter().map(|p| p.z).sum::<f64>() / window as f64;
                let variance =
                    win.iter().map(|p| (p.z - mean).powi(2)).sum::<f64>() / window as f64;

                let midpoint = &line[i + window / 2];
                let sample = RoughnessSample {
                    column,
                    x: midpoint.x,
                    y: midpoint.y,
                    roughness: variance.sqrt(),
                };
                samples.push(sample);

                if min.map_or(true, |m| sample.roughness < m.roughness) {
                    min = Some(sample);
                }
                if max.map_or(true, |m| sample.roughness > m.roughness) {
                    max = Some(sample);
                }
            }
        }

        if let (Some(lo), Some(hi)) = (min, max) {
            debug!(
                "roughness min {:.6} at ({}, {}), max {:.6} at ({}, {})",
                lo.roughness, lo.x, lo.y, hi.roughness, hi.x, hi.y
            );
        }

        RoughnessReport { samples, min, max }
    }
}

/// Roughness samples plus the extreme windows observed.
#[derive(Debug, Clone, Default)]
pub struct RoughnessReport {
    /// One sample per window position, in walk order.
    pub samples: Vec<RoughnessSample>,
    /// The smoothest window, if any window was emitted.
    pub min: Option<RoughnessSample>,
    /// The roughest window, if any window was emitted.
    pub max: Option<RoughnessSample>,
}
