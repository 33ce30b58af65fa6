// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pole of inaccessibility (polylabel)
//!
//! Finds the interior point farthest from every edge of a polygon, so room
//! labels sit visibly inside even L- and U-shaped rooms, where the area
//! centroid can land on or outside a wall.
//!
//! The search is best-first over square cells covering the bounding box. Each
//! cell knows the signed distance of its centre to the boundary and an upper
//! bound (`distance + half * √2`) on what any point inside it can reach. Cells
//! that cannot beat the incumbent by more than `precision` are dropped.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f64::consts::SQRT_2;

use crate::point::{Bounds, Point2D};
use crate::polygon::signed_distance_to_ring;

/// Best label point found for a polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolylabelResult {
    pub point: Point2D,
    /// Distance from `point` to the nearest edge (negative if outside)
    pub distance: f64,
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    center: Point2D,
    half: f64,
    distance: f64,
    max: f64,
}

impl Cell {
    fn new(center: Point2D, half: f64, vertices: &[Point2D], ring: &[usize]) -> Self {
        let distance = signed_distance_to_ring(&center, vertices, ring);
        Self {
            center,
            half,
            distance,
            max: distance + half * SQRT_2,
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.max == other.max
    }
}

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap on the upper bound
        self.max.partial_cmp(&other.max).unwrap_or(Ordering::Equal)
    }
}

/// Pole of inaccessibility of a ring given as indices into `vertices`.
///
/// Candidate points for which `blocked` returns `true` are never chosen
/// (used to keep labels off racks). Returns `None` when the ring spans no
/// area (empty, or a zero-size bounding box).
pub fn polylabel<F>(
    vertices: &[Point2D],
    ring: &[usize],
    precision: f64,
    blocked: F,
) -> Option<PolylabelResult>
where
    F: Fn(&Point2D) -> bool,
{
    let bounds = Bounds::from_points(ring.iter().map(|&i| vertices[i]))?;
    let cell_size = bounds.width().max(bounds.height());
    if cell_size == 0.0 {
        return None;
    }

    let mut heap = BinaryHeap::new();
    let half = cell_size / 2.0;
    let mut x = bounds.min_x;
    while x < bounds.max_x {
        let mut y = bounds.min_y;
        while y < bounds.max_y {
            heap.push(Cell::new(
                Point2D::new(x + half, y + half),
                half,
                vertices,
                ring,
            ));
            y += cell_size;
        }
        x += cell_size;
    }

    let mut best = PolylabelResult {
        point: bounds.center(),
        distance: f64::NEG_INFINITY,
    };
    let seed = Cell::new(bounds.center(), 0.0, vertices, ring);
    if seed.distance > best.distance && !blocked(&seed.center) {
        best = PolylabelResult {
            point: seed.center,
            distance: seed.distance,
        };
    }

    while let Some(cell) = heap.pop() {
        if cell.distance > best.distance && !blocked(&cell.center) {
            best = PolylabelResult {
                point: cell.center,
                distance: cell.distance,
            };
        }
        // An unblocked cell this small is always pruned by the first test;
        // the second keeps blocked cells from splitting forever.
        if cell.max - best.distance <= precision || cell.half * SQRT_2 <= precision {
            continue;
        }
        let h = cell.half / 2.0;
        for (dx, dy) in [(-h, -h), (h, -h), (-h, h), (h, h)] {
            heap.push(Cell::new(
                cell.center.translated(dx, dy),
                h,
                vertices,
                ring,
            ));
        }
    }

    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn p(x: f64, y: f64) -> Point2D {
        Point2D::new(x, y)
    }

    #[test]
    fn rectangle_pole_is_its_center() {
        let vertices = vec![p(0.0, 0.0), p(400.0, 0.0), p(400.0, 300.0), p(0.0, 300.0)];
        let result = polylabel(&vertices, &[0, 1, 2, 3], 1.0, |_| false).unwrap();
        assert_abs_diff_eq!(result.point.x, 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.point.y, 150.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.distance, 150.0, epsilon = 1e-9);
    }

    #[test]
    fn l_shaped_pole_is_inside_and_clear_of_walls() {
        // 200-wide arms; the corner square reaches past 100 towards the
        // inner corner, optimum at t = 200 * (2 - √2) on the diagonal
        let vertices = vec![
            p(0.0, 0.0),
            p(600.0, 0.0),
            p(600.0, 200.0),
            p(200.0, 200.0),
            p(200.0, 600.0),
            p(0.0, 600.0),
        ];
        let ring: Vec<usize> = (0..vertices.len()).collect();
        let result = polylabel(&vertices, &ring, 1.0, |_| false).unwrap();
        let optimum = 200.0 * (2.0 - SQRT_2);
        assert!(result.distance > optimum - 1.0);
        assert!(result.distance <= optimum + 1e-9);
        assert!(result.point.x < 200.0 && result.point.y < 200.0);
    }

    #[test]
    fn blocked_region_is_avoided() {
        let vertices = vec![p(0.0, 0.0), p(400.0, 0.0), p(400.0, 300.0), p(0.0, 300.0)];
        // Block the middle third
        let result = polylabel(&vertices, &[0, 1, 2, 3], 1.0, |c| {
            c.x > 130.0 && c.x < 270.0
        })
        .unwrap();
        assert!(result.point.x <= 130.0 || result.point.x >= 270.0);
        assert!(result.distance > 0.0);
    }

    #[test]
    fn fully_blocked_polygon_still_terminates() {
        let vertices = vec![p(0.0, 0.0), p(40.0, 0.0), p(40.0, 30.0), p(0.0, 30.0)];
        let result = polylabel(&vertices, &[0, 1, 2, 3], 1.0, |_| true).unwrap();
        assert_eq!(result.distance, f64::NEG_INFINITY);
    }

    #[test]
    fn degenerate_ring_has_no_label() {
        let vertices = vec![p(5.0, 5.0), p(5.0, 5.0), p(5.0, 5.0)];
        assert!(polylabel(&vertices, &[0, 1, 2], 1.0, |_| false).is_none());
        assert!(polylabel(&vertices, &[], 1.0, |_| false).is_none());
    }
}
