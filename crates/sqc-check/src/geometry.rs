//! # Spawn Footprint Geometry
//!
//! Rectangular footprints at the spawn position and the pairwise overlap
//! test used by the intersection check.
//!
//! ## Contract
//!
//! - A footprint is the axis-aligned rectangle of the declared
//!   `length × width`, centered at the init position, with length along the
//!   world x axis. The init heading is NOT applied. Two entities placed
//!   close together but rotated apart are reported as overlapping.
//! - Overlap is closed: rectangles that only touch along an edge or at a
//!   corner intersect.
//! - The prefilter only tests pairs whose center distance is at most twice
//!   the largest footprint radius. Two footprints whose centers are farther
//!   apart cannot share a point, so the prefilter never hides an overlap.
//! - Pairs whose centers coincide within the noise floor are skipped; they
//!   are reported by the duplicate-position check instead.

use serde::{Deserialize, Serialize};

use sqc_core::{BoundingBox, IntersectionOptions};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The ground polygon an entity occupies at spawn time.
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    pub entity: String,
    pub center: Point,
    /// Corners in order: front-left, front-right, rear-right, rear-left.
    pub corners: [Point; 4],
}

impl Footprint {
    /// Axis-aligned footprint of `bounding_box` centered at `(x, y)`.
    pub fn axis_aligned(entity: impl Into<String>, x: f64, y: f64, bounding_box: &BoundingBox) -> Self {
        let hl = bounding_box.length / 2.0;
        let hw = bounding_box.width / 2.0;
        Self {
            entity: entity.into(),
            center: Point::new(x, y),
            corners: [
                Point::new(x + hl, y + hw),
                Point::new(x + hl, y - hw),
                Point::new(x - hl, y - hw),
                Point::new(x - hl, y + hw),
            ],
        }
    }

    /// Radius of the smallest circle enclosing the footprint. For a
    /// rectangle this is half its diagonal, centered at the rectangle center.
    pub fn bounding_radius(&self) -> f64 {
        self.corners
            .iter()
            .map(|c| c.distance(&self.center))
            .fold(0.0, f64::max)
    }

    /// Whether the two polygons share at least one point.
    ///
    /// Separating-axis test over the edge normals of both polygons and the
    /// world axes. The world axes keep degenerate (zero-extent) footprints
    /// from reporting spurious overlaps.
    pub fn intersects(&self, other: &Footprint) -> bool {
        let mut axes: Vec<Point> = vec![Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
        axes.extend(edge_normals(&self.corners));
        axes.extend(edge_normals(&other.corners));

        !axes.iter().any(|axis| {
            let (a_min, a_max) = project(&self.corners, axis);
            let (b_min, b_max) = project(&other.corners, axis);
            a_max < b_min || b_max < a_min
        })
    }
}

fn edge_normals(corners: &[Point; 4]) -> impl Iterator<Item = Point> + '_ {
    (0..corners.len()).filter_map(move |i| {
        let a = corners[i];
        let b = corners[(i + 1) % corners.len()];
        let normal = Point::new(-(b.y - a.y), b.x - a.x);
        (normal.x != 0.0 || normal.y != 0.0).then_some(normal)
    })
}

fn project(corners: &[Point; 4], axis: &Point) -> (f64, f64) {
    corners
        .iter()
        .map(|c| c.x * axis.x + c.y * axis.y)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// Index pairs `(i, j)`, `i < j`, of intersecting footprints, in row-major
/// order.
pub fn intersecting_pairs(footprints: &[Footprint], options: &IntersectionOptions) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    if footprints.len() < 2 {
        return pairs;
    }

    let max_radius = footprints
        .iter()
        .map(Footprint::bounding_radius)
        .fold(0.0, f64::max);
    let reach = 2.0 * max_radius;

    let mut tested = 0usize;
    for i in 0..footprints.len() {
        for j in (i + 1)..footprints.len() {
            let a = &footprints[i];
            let b = &footprints[j];
            if options.prefilter {
                let distance = a.center.distance(&b.center);
                if distance > reach || distance <= options.noise_floor {
                    continue;
                }
            }
            tested += 1;
            if a.intersects(b) {
                pairs.push((i, j));
            }
        }
    }
    tracing::debug!(
        footprints = footprints.len(),
        tested,
        intersecting = pairs.len(),
        max_radius,
        "footprint intersection pass"
    );
    pairs
}
