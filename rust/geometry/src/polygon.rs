// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon helpers shared by room detection and rack placement
//!
//! Polygons are given either as a slice of points or as an index list into a
//! shared vertex array (the form produced by planar face traversal). In both
//! cases the ring is implicitly closed: the last vertex connects back to the
//! first, and callers must not repeat the first point.

use crate::point::Point2D;
use crate::primitives::clamp;

/// Compute the signed area of a ring (shoelace formula).
///
/// In Y-down document coordinates a positive value means the ring runs
/// clockwise on screen.
pub fn signed_area(ring: &[Point2D]) -> f64 {
    signed_area_indexed(ring, &(0..ring.len()).collect::<Vec<_>>())
}

/// [`signed_area`] for a ring given as indices into `vertices`.
pub fn signed_area_indexed(vertices: &[Point2D], ring: &[usize]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let a = vertices[ring[i]];
        let b = vertices[ring[(i + 1) % n]];
        area += a.x * b.y - b.x * a.y;
    }
    area / 2.0
}

/// Area centroid of a ring, or `None` when the ring has no area.
pub fn polygon_centroid(ring: &[Point2D]) -> Option<Point2D> {
    let n = ring.len();
    if n < 3 {
        return None;
    }
    let mut sa = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        let cross = a.x * b.y - b.x * a.y;
        sa += cross;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }
    sa /= 2.0;
    if sa == 0.0 {
        return None;
    }
    Some(Point2D::new(cx / (6.0 * sa), cy / (6.0 * sa)))
}

/// Ray-casting point-in-polygon test.
pub fn point_in_polygon(p: &Point2D, ring: &[Point2D]) -> bool {
    let n = ring.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        if crosses_ray(p, &ring[j], &ring[i]) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// [`point_in_polygon`] for a ring given as indices into `vertices`.
pub fn point_in_indexed_polygon(p: &Point2D, vertices: &[Point2D], ring: &[usize]) -> bool {
    let n = ring.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        if crosses_ray(p, &vertices[ring[j]], &vertices[ring[i]]) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Signed distance from `p` to the boundary of an indexed ring: positive
/// inside, negative outside.
pub fn signed_distance_to_ring(p: &Point2D, vertices: &[Point2D], ring: &[usize]) -> f64 {
    let n = ring.len();
    let mut inside = false;
    let mut min_d = f64::INFINITY;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let a = vertices[ring[j]];
        let b = vertices[ring[i]];
        if crosses_ray(p, &a, &b) {
            inside = !inside;
        }
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len_sq = dx * dx + dy * dy;
        let t = if len_sq == 0.0 {
            0.0
        } else {
            clamp(((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq, 0.0, 1.0)
        };
        let ex = p.x - a.x - t * dx;
        let ey = p.y - a.y - t * dy;
        min_d = min_d.min((ex * ex + ey * ey).sqrt());
        j = i;
    }
    if inside {
        min_d
    } else {
        -min_d
    }
}

/// Whether the horizontal ray from `p` towards +x crosses edge `a`–`b`.
fn crosses_ray(p: &Point2D, a: &Point2D, b: &Point2D) -> bool {
    (b.y > p.y) != (a.y > p.y) && p.x < (a.x - b.x) * (p.y - b.y) / (a.y - b.y) + b.x
}

/// 2D cross product of `o→a` and `o→b`.
pub fn cross(o: &Point2D, a: &Point2D, b: &Point2D) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// True if the open segments `a`–`b` and `c`–`d` properly cross.
///
/// Touching at an endpoint and collinear overlap do not count.
pub fn segments_cross(a: &Point2D, b: &Point2D, c: &Point2D, d: &Point2D) -> bool {
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}
