// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Segment and angle primitives
//!
//! Every function here is pure and total: degenerate input (zero-length
//! segments, coincident points) yields a well-defined value or `None`. The
//! editor calls them on every pointer move without any caching.

use crate::point::Point2D;

/// Tolerance on the `ua`/`ub` parameters of [`line_segment_intersection`]
pub const INTERSECTION_EPSILON: f64 = 0.001;

/// Euclidean distance between two points.
pub fn dist(a: &Point2D, b: &Point2D) -> f64 {
    a.distance_to(b)
}

/// Result of projecting a point onto a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// The projected point, always on the segment
    pub point: Point2D,
    /// Clamped segment parameter in `[0, 1]`
    pub t: f64,
}

/// Project `p` onto segment `p1`–`p2`.
///
/// The parameter is clamped to `[0, 1]`; a zero-length segment projects
/// everything onto `p1` with `t = 0`.
pub fn project_on_segment(p: &Point2D, p1: &Point2D, p2: &Point2D) -> Projection {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let l2 = dx * dx + dy * dy;
    if l2 == 0.0 {
        return Projection { point: *p1, t: 0.0 };
    }
    let t = clamp(((p.x - p1.x) * dx + (p.y - p1.y) * dy) / l2, 0.0, 1.0);
    Projection {
        point: p1.lerp(p2, t),
        t,
    }
}

/// Minimum distance from point `p` to segment `v`–`w`.
pub fn dist_to_segment(p: &Point2D, v: &Point2D, w: &Point2D) -> f64 {
    let projection = project_on_segment(p, v, w);
    dist(p, &projection.point)
}

/// Interior angle in degrees (`[0, 180]`) at `p2` on the path `p1 → p2 → p3`.
pub fn angle_between(p1: &Point2D, p2: &Point2D, p3: &Point2D) -> f64 {
    let a1 = (p1.y - p2.y).atan2(p1.x - p2.x);
    let a2 = (p3.y - p2.y).atan2(p3.x - p2.x);
    let mut angle = (a2 - a1).to_degrees();
    if angle < 0.0 {
        angle += 360.0;
    }
    if angle > 180.0 {
        angle = 360.0 - angle;
    }
    angle
}

/// Intersection point of segments `p1`–`p2` and `p3`–`p4`.
///
/// Returns `None` for parallel (or collinear) segments and when the crossing
/// lies outside either segment. Hits within [`INTERSECTION_EPSILON`] of a
/// segment end still count.
pub fn line_segment_intersection(
    p1: &Point2D,
    p2: &Point2D,
    p3: &Point2D,
    p4: &Point2D,
) -> Option<Point2D> {
    let denom = (p4.y - p3.y) * (p2.x - p1.x) - (p4.x - p3.x) * (p2.y - p1.y);
    if denom == 0.0 {
        return None;
    }
    let ua = ((p4.x - p3.x) * (p1.y - p3.y) - (p4.y - p3.y) * (p1.x - p3.x)) / denom;
    let ub = ((p2.x - p1.x) * (p1.y - p3.y) - (p2.y - p1.y) * (p1.x - p3.x)) / denom;

    let range = -INTERSECTION_EPSILON..=1.0 + INTERSECTION_EPSILON;
    if !range.contains(&ua) || !range.contains(&ub) {
        return None;
    }
    Some(p1.lerp(p2, ua))
}

/// Clamp `value` into `[lo, hi]`.
///
/// Unlike `f64::clamp` this never panics when `lo > hi`; `lo` wins.
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    lo.max(hi.min(value))
}
