//! Rectangular tile partition with boundary-candidate rescue.
//!
//! The survey extent is cut into a fixed `rows x cols` grid of equal tiles.
//! Every point is owned by exactly one tile (strict membership); every other
//! tile is offered the point as a boundary candidate ranked by distance to
//! the tile center, keeping the 10 best. Merging the candidates into the
//! owned sets pads sparsely-populated edge tiles so interpolation queries
//! near tile borders see their true nearest neighbors.

use log::debug;

use crate::nearest::BoundedNearest;
use crate::point::{Bounds, Point3};

/// Boundary candidates retained per tile until the merge.
pub const BOUNDARY_CANDIDATES: usize = 10;

/// One rectangular cell of the partition.
///
/// The rectangle is half-open, `[min_x, max_x) x [min_y, max_y)`, except on
/// the partition's last row/column where the max edge is inclusive so points
/// on the survey's maximum extent are owned directly.
#[derive(Debug, Clone)]
pub struct Tile {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
    include_max_x: bool,
    include_max_y: bool,
    center_x: f64,
    center_y: f64,
    points: Vec<Point3>,
    // Present until the merge consumes it.
    candidates: Option<BoundedNearest<Point3>>,
}

impl Tile {
    /// Create a tile over `[min_x, max_x) x [min_y, max_y)`.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::with_inclusive_edges(min_x, min_y, max_x, max_y, false, false)
    }

    /// Create a tile whose max-x/max-y edge may be inclusive.
    pub fn with_inclusive_edges(
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
        include_max_x: bool,
        include_max_y: bool,
    ) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
            include_max_x,
            include_max_y,
            center_x: (min_x + max_x) / 2.0,
            center_y: (min_y + max_y) / 2.0,
            points: Vec::new(),
            candidates: Some(BoundedNearest::new(BOUNDARY_CANDIDATES)),
        }
    }

    /// Strict membership test against the tile rectangle.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let in_x = x >= self.min_x && (x < self.max_x || (self.include_max_x && x == self.max_x));
        let in_y = y >= self.min_y && (y < self.max_y || (self.include_max_y && y == self.max_y));
        in_x && in_y
    }

    /// The tile's center, the reference for candidate ranking.
    pub fn center(&self) -> (f64, f64) {
        (self.center_x, self.center_y)
    }

    /// Take ownership of a member point.
    pub fn push(&mut self, p: Point3) {
        self.points.push(p);
    }

    /// Offer a non-member point as a boundary candidate.
    ///
    /// Candidates compete on distance to the tile center; only the
    /// [`BOUNDARY_CANDIDATES`] closest survive until the merge. Offers after
    /// the merge are dropped.
    pub fn offer(&mut self, p: Point3) {
        if let Some(candidates) = &mut self.candidates {
            candidates.insert(p.distance_xy(self.center_x, self.center_y), p);
        }
    }

    /// Move the surviving boundary candidates into the owned set.
    ///
    /// Consumes the candidate list; a tile can only be merged once.
    pub fn merge(&mut self) {
        if let Some(candidates) = self.candidates.take() {
            self.points.extend(candidates.drain().map(|(_, p)| p));
        }
    }

    /// Points owned by this tile (after the merge: members + rescued).
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Number of owned points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the tile owns no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Fixed `rows x cols` grid of [`Tile`]s over a survey extent.
#[derive(Debug, Clone)]
pub struct TilePartition {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
    rows: usize,
    cols: usize,
    tile_dx: f64,
    tile_dy: f64,
    // Row-major: tile (r, c) lives at r * cols + c.
    tiles: Vec<Tile>,
    finalized: bool,
}

impl TilePartition {
    /// Partition the horizontal extent of `bounds` into `rows x cols` tiles.
    pub fn new(bounds: &Bounds, rows: usize, cols: usize) -> Self {
        let (len_x, len_y) = bounds.size_xy();
        let tile_dx = len_x / cols as f64;
        let tile_dy = len_y / rows as f64;

        let mut tiles = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                let min_x = bounds.min_x + c as f64 * tile_dx;
                let min_y = bounds.min_y + r as f64 * tile_dy;
                tiles.push(Tile::with_inclusive_edges(
                    min_x,
                    min_y,
                    min_x + tile_dx,
                    min_y + tile_dy,
                    c == cols - 1,
                    r == rows - 1,
                ));
            }
        }

        Self {
            min_x: bounds.min_x,
            min_y: bounds.min_y,
            max_x: bounds.max_x,
            max_y: bounds.max_y,
            rows,
            cols,
            tile_dx,
            tile_dy,
            tiles,
            finalized: false,
        }
    }

    /// Route one point: owned by the tile containing it, offered to all
    /// others as a boundary candidate.
    ///
    /// This is O(tiles) per point, acceptable because partitions stay in the
    /// tens to low hundreds of tiles.
    pub fn assign(&mut self, p: Point3) {
        for tile in &mut self.tiles {
            if tile.contains(p.x, p.y) {
                tile.push(p);
            } else {
                tile.offer(p);
            }
        }
    }

    /// Merge every tile's boundary candidates into its owned set.
    ///
    /// Must run exactly once, after all points are assigned and before any
    /// query.
    pub fn finalize(&mut self) {
        debug_assert!(!self.finalized, "partition finalized twice");
        for tile in &mut self.tiles {
            tile.merge();
        }
        self.finalized = true;

        if log::log_enabled!(log::Level::Debug) {
            let occupied = self.tiles.iter().filter(|t| !t.is_empty()).count();
            debug!(
                "partition {}x{}: {} of {} tiles occupied",
                self.rows,
                self.cols,
                occupied,
                self.tiles.len()
            );
        }
    }

    /// The tile whose rectangle contains `(x, y)`, or `None` outside the
    /// partition extent.
    pub fn tile_for(&self, x: f64, y: f64) -> Option<&Tile> {
        if x < self.min_x || x > self.max_x || y < self.min_y || y > self.max_y {
            return None;
        }
        // Saturating float-to-int casts also absorb a degenerate zero-size
        // extent (0/0 -> NaN -> 0).
        let c = (((x - self.min_x) / self.tile_dx) as usize).min(self.cols - 1);
        let r = (((y - self.min_y) / self.tile_dy) as usize).min(self.rows - 1);
        self.tiles.get(r * self.cols + c)
    }

    /// All tiles in row-major order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Tile grid dimensions `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Bounds {
        let mut b = Bounds::empty();
        b.expand(Point3::new(min_x, min_y, 0.0));
        b.expand(Point3::new(max_x, max_y, 0.0));
        b
    }

    #[test]
    fn test_membership_half_open() {
        let t = Tile::new(0.0, 0.0, 10.0, 10.0);
        assert!(t.contains(1.0, 1.0));
        assert!(t.contains(0.0, 0.0));
        assert!(t.contains(9.0, 0.0));
        assert!(t.contains(0.0, 9.0));
        assert!(t.contains(9.0, 9.0));
        assert!(!t.contains(10.0, 10.0));
        assert!(!t.contains(-1.0, 0.0));
        assert!(!t.contains(0.0, 11.0));
    }

    #[test]
    fn test_membership_inclusive_edges() {
        let t = Tile::with_inclusive_edges(0.0, 0.0, 10.0, 10.0, true, true);
        assert!(t.contains(10.0, 10.0));
        assert!(t.contains(10.0, 0.0));
        assert!(!t.contains(10.1, 0.0));
    }

    #[test]
    fn test_offer_keeps_ten_closest_to_center() {
        let mut t = Tile::new(0.0, 0.0, 10.0, 10.0);
        // Offers at increasing distance from the center (5, 5).
        for i in 11..30 {
            t.offer(Point3::new(5.0, f64::from(i), 25.0));
        }
        t.merge();

        assert_eq!(t.len(), BOUNDARY_CANDIDATES);
        for (i, p) in t.points().iter().enumerate() {
            assert_eq!(p.x, 5.0);
            assert_eq!(p.y, 11.0 + i as f64);
            assert_eq!(p.z, 25.0);
        }
    }

    #[test]
    fn test_merge_accounting() {
        let mut t = Tile::new(0.0, 0.0, 10.0, 10.0);
        t.push(Point3::new(1.0, 2.0, 3.0));
        for i in 11..30 {
            t.offer(Point3::new(5.0, f64::from(i), 25.0));
        }
        t.merge();

        // Owned-before plus min(10, offered).
        assert_eq!(t.len(), 1 + BOUNDARY_CANDIDATES);

        // The candidate list is consumed; later offers vanish.
        t.offer(Point3::new(5.0, 10.5, 1.0));
        t.merge();
        assert_eq!(t.len(), 1 + BOUNDARY_CANDIDATES);
    }

    #[test]
    fn test_merge_fewer_candidates_than_capacity() {
        let mut t = Tile::new(0.0, 0.0, 10.0, 10.0);
        t.offer(Point3::new(20.0, 20.0, 1.0));
        t.offer(Point3::new(30.0, 30.0, 2.0));
        t.merge();
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_partition_tiles_cover_extent() {
        let p = TilePartition::new(&bounds(0.0, 0.0, 30.0, 30.0), 3, 3);
        assert_eq!(p.tiles().len(), 9);
        assert_eq!(p.shape(), (3, 3));

        // Every interior location is owned by exactly one tile.
        for &(x, y) in &[(0.0, 0.0), (14.9, 3.2), (29.99, 29.99), (10.0, 20.0)] {
            let owners = p.tiles().iter().filter(|t| t.contains(x, y)).count();
            assert_eq!(owners, 1, "location ({x}, {y})");
        }

        // The max corner lands in the last tile thanks to its inclusive edge.
        let owners = p.tiles().iter().filter(|t| t.contains(30.0, 30.0)).count();
        assert_eq!(owners, 1);
    }

    #[test]
    fn test_assign_owns_and_rescues() {
        let mut p = TilePartition::new(&bounds(0.0, 0.0, 20.0, 20.0), 2, 2);
        // One point per quadrant, plus the max corner.
        p.assign(Point3::new(5.0, 5.0, 1.0));
        p.assign(Point3::new(15.0, 5.0, 2.0));
        p.assign(Point3::new(5.0, 15.0, 3.0));
        p.assign(Point3::new(15.0, 15.0, 4.0));
        p.assign(Point3::new(20.0, 20.0, 5.0));
        p.finalize();

        // Before the merge each quadrant owned its own point (the corner
        // belongs to the last tile); after it, every tile also rescued the
        // others as boundary candidates.
        for tile in p.tiles() {
            assert_eq!(tile.len(), 5);
        }
    }

    #[test]
    fn test_tile_for_lookup() {
        let p = TilePartition::new(&bounds(0.0, 0.0, 30.0, 30.0), 3, 3);

        let t = p.tile_for(5.0, 5.0).unwrap();
        assert!(t.contains(5.0, 5.0));

        let t = p.tile_for(30.0, 30.0).unwrap();
        assert!(t.contains(30.0, 30.0));

        assert!(p.tile_for(-0.1, 5.0).is_none());
        assert!(p.tile_for(5.0, 30.1).is_none());
    }
}
