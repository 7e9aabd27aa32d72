//! Inverse-distance weighted elevation estimation.
//!
//! The estimate at a query location is a weighted mean of the k nearest
//! candidate elevations, with influence decaying exponentially in distance:
//! `w_i = exp(-d_i * scale)`. For queries far from every candidate the
//! weights can all underflow to exactly zero in `f64`; the interpolator then
//! halves the decay scale and recomputes, which drives every weight back
//! toward 1 and makes the estimate converge to the plain mean of the
//! neighbors.

use crate::error::{ExtractError, Result};
use crate::nearest::BoundedNearest;
use crate::point::Point3;

/// Minimum neighbor count an interpolation query may use.
pub const MIN_NEIGHBORS: usize = 4;

/// Halvings of the decay scale before giving up on an underflowed query.
/// Finite survey coordinates recover within a dozen halvings; the cap only
/// exists so a pathological query cannot spin forever.
const MAX_SCALE_HALVINGS: usize = 64;

/// How the base decay scale is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecayScheme {
    /// Use the given scale as-is (classic surveys used 0.1, i.e. `exp(-d/10)`).
    Fixed(f64),
    /// Start from 1.0 and rely on underflow halving for distant queries.
    Adaptive,
}

impl DecayScheme {
    /// The scale the weight computation starts from.
    pub fn base_scale(self) -> f64 {
        match self {
            DecayScheme::Fixed(scale) => scale,
            DecayScheme::Adaptive => 1.0,
        }
    }
}

impl Default for DecayScheme {
    fn default() -> Self {
        DecayScheme::Adaptive
    }
}

/// Inverse-distance weighted interpolator over k nearest candidates.
#[derive(Debug, Clone, Copy)]
pub struct IdwInterpolator {
    neighbors: usize,
    decay: DecayScheme,
}

impl IdwInterpolator {
    /// Create an interpolator using `neighbors` nearest candidates per query.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidConfig`] if `neighbors` is below
    /// [`MIN_NEIGHBORS`] or a fixed decay scale is not positive.
    pub fn new(neighbors: usize, decay: DecayScheme) -> Result<Self> {
        if neighbors < MIN_NEIGHBORS {
            return Err(ExtractError::InvalidConfig(format!(
                "neighbor count {neighbors} is below the minimum of {MIN_NEIGHBORS}"
            )));
        }
        if let DecayScheme::Fixed(scale) = decay {
            if !(scale > 0.0) {
                return Err(ExtractError::InvalidConfig(format!(
                    "fixed decay scale must be positive, got {scale}"
                )));
            }
        }
        Ok(Self { neighbors, decay })
    }

    /// Neighbor count used per query.
    pub fn neighbors(&self) -> usize {
        self.neighbors
    }

    /// Estimate the elevation at `(x, y)` from a candidate point set.
    ///
    /// Pure: the result depends only on the query location, the candidates,
    /// and this interpolator's parameters (up to tie-breaking among equally
    /// distant candidates).
    ///
    /// # Errors
    ///
    /// - [`ExtractError::InsufficientCandidates`] if fewer than the required
    ///   neighbor count is available; supplying enough candidates is the
    ///   caller's contract.
    /// - [`ExtractError::InterpolationUnderflow`] if the weight sum stays
    ///   zero even after exhausting the scale halvings.
    pub fn estimate(&self, x: f64, y: f64, candidates: &[Point3]) -> Result<f64> {
        if candidates.len() < self.neighbors {
            return Err(ExtractError::InsufficientCandidates {
                available: candidates.len(),
                required: self.neighbors,
            });
        }

        let mut nearest = BoundedNearest::new(self.neighbors);
        for p in candidates {
            nearest.insert(p.distance_xy(x, y), p.z);
        }

        let mut scale = self.decay.base_scale();
        for _ in 0..MAX_SCALE_HALVINGS {
            let mut weight_sum = 0.0;
            let mut weighted_z = 0.0;
            for (d, z) in nearest.iter() {
                let w = (-d * scale).exp();
                weight_sum += w;
                weighted_z += z * w;
            }
            if weight_sum > 0.0 {
                return Ok(weighted_z / weight_sum);
            }
            scale /= 2.0;
        }

        Err(ExtractError::InterpolationUnderflow { scale })
    }
}

impl Default for IdwInterpolator {
    fn default() -> Self {
        Self {
            neighbors: MIN_NEIGHBORS,
            decay: DecayScheme::default(),
        }
    }
}
