//! Segment geometry for the track surface and the start line
//!
//! The drivable surface is a closed polyline stroked with round joins.
//! That region is exactly the set of points within `width / 2` of some
//! segment, so the containment test reduces to point-to-segment distance.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A line segment with a cached, padded bounding box for quick rejection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
    min: Vec2,
    max: Vec2,
}

impl Segment {
    /// Segment with its bounding box grown by `pad` on every side
    pub fn new(a: Vec2, b: Vec2, pad: f32) -> Self {
        Self {
            a,
            b,
            min: a.min(b) - Vec2::splat(pad),
            max: a.max(b) + Vec2::splat(pad),
        }
    }

    /// Whether `p` lies inside the padded bounding box
    #[inline]
    pub fn bounds_contain(&self, p: Vec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    #[inline]
    pub fn distance_to(&self, p: Vec2) -> f32 {
        distance_to_segment(p, self.a, self.b)
    }
}

/// Closest point on segment `ab` to `p`
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let line_vec = b - a;
    let len_sq = line_vec.length_squared();

    if len_sq < 1e-8 {
        return a; // Degenerate segment
    }

    let t = ((p - a).dot(line_vec) / len_sq).clamp(0.0, 1.0);
    a + line_vec * t
}

/// Euclidean distance from `p` to segment `ab` (round caps)
#[inline]
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    (p - closest_point_on_segment(p, a, b)).length()
}

/// Open segment-segment intersection test.
///
/// True iff `ab` and `cd` cross at parameters strictly inside (0, 1) on both.
/// Parallel and collinear segments never intersect.
pub fn segments_intersect(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    let det = (b.x - a.x) * (d.y - c.y) - (d.x - c.x) * (b.y - a.y);
    if det == 0.0 {
        return false;
    }
    let lambda = ((d.y - c.y) * (d.x - a.x) + (c.x - d.x) * (d.y - a.y)) / det;
    let gamma = ((a.y - b.y) * (d.x - a.x) + (b.x - a.x) * (d.y - a.y)) / det;
    0.0 < lambda && lambda < 1.0 && 0.0 < gamma && gamma < 1.0
}
