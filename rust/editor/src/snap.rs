// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Snap queries used while drawing and editing walls.
//!
//! All searches are linear scans over the element list and return `None`
//! when nothing qualifies; the caller then keeps the raw cursor point.
//! Distances compare strictly (`<`) against the running best, so among
//! equally close candidates the first one found wins.

use dcim_floorplan_geometry::{dist, line_segment_intersection, project_on_segment, Point2D};

use crate::model::{EdgeSnap, MapElement, VertexHit};

/// Edge snaps whose projection parameter is this close to a segment end are
/// left to vertex snapping
const EDGE_END_MARGIN: f64 = 0.01;

/// Intersections closer than this to the last placed point are ignored
const MIN_INTERSECTION_DIST: f64 = 1.0;

fn walls(elements: &[MapElement]) -> impl Iterator<Item = (&MapElement, &[Point2D])> {
    elements
        .iter()
        .filter_map(|el| el.as_wall().map(|w| (el, w.points())))
}

/// Nearest wall vertex within `tolerance`.
///
/// Points already placed in the polyline being drawn are candidates too,
/// except the last one, so a loop can be closed onto its own start.
pub fn closest_vertex(
    point: &Point2D,
    tolerance: f64,
    elements: &[MapElement],
    active: &[Point2D],
) -> Option<Point2D> {
    let placed = &active[..active.len().saturating_sub(1)];
    let mut best = None;
    let mut min = tolerance;
    for p in walls(elements).flat_map(|(_, pts)| pts.iter()).chain(placed) {
        let d = dist(point, p);
        if d < min {
            min = d;
            best = Some(*p);
        }
    }
    best
}

/// Nearest point on any wall segment within `tolerance`, skipping
/// projections within 1% of a segment end.
pub fn closest_edge_snap(
    point: &Point2D,
    tolerance: f64,
    elements: &[MapElement],
) -> Option<EdgeSnap> {
    let mut best = None;
    let mut min = tolerance;
    for (el, pts) in walls(elements) {
        for (i, seg) in pts.windows(2).enumerate() {
            let (p1, p2) = (&seg[0], &seg[1]);
            if p1 == p2 {
                continue;
            }
            let proj = project_on_segment(point, p1, p2);
            let d = dist(point, &proj.point);
            if d >= min || proj.t < EDGE_END_MARGIN || proj.t > 1.0 - EDGE_END_MARGIN {
                continue;
            }
            min = d;
            best = Some(EdgeSnap {
                x: proj.point.x,
                y: proj.point.y,
                element_id: el.id.clone(),
                seg_index: i,
            });
        }
    }
    best
}

/// Closest crossing of the segment from the last placed point to `current`
/// with existing walls or earlier segments of the polyline being drawn.
///
/// Segments touching the last placed point are skipped, as are hits within
/// one unit of it.
pub fn check_intersections(
    current: &Point2D,
    active: &[Point2D],
    elements: &[MapElement],
) -> Option<Point2D> {
    let last = *active.last()?;
    let mut closest = None;
    let mut min = f64::INFINITY;

    let mut try_segment = |p1: &Point2D, p2: &Point2D| {
        if *p1 == last || *p2 == last {
            return;
        }
        if let Some(hit) = line_segment_intersection(&last, current, p1, p2) {
            let d = dist(&last, &hit);
            if d < min && d > MIN_INTERSECTION_DIST {
                min = d;
                closest = Some(hit);
            }
        }
    };

    for (_, pts) in walls(elements) {
        for seg in pts.windows(2) {
            try_segment(&seg[0], &seg[1]);
        }
    }
    if active.len() > 2 {
        for seg in active[..active.len() - 1].windows(2) {
            try_segment(&seg[0], &seg[1]);
        }
    }
    closest
}

/// First wall vertex strictly within `radius` of `point`, in document
/// order, skipping walls rejected by `skip`.
pub fn first_vertex_within(
    point: &Point2D,
    radius: f64,
    elements: &[MapElement],
    mut skip: impl FnMut(&MapElement) -> bool,
) -> Option<VertexHit> {
    for (el, pts) in walls(elements) {
        if skip(el) {
            continue;
        }
        if let Some((i, p)) = pts.iter().enumerate().find(|(_, p)| dist(point, p) < radius) {
            return Some(VertexHit {
                element_id: el.id.clone(),
                point_index: i,
                x: p.x,
                y: p.y,
            });
        }
    }
    None
}

/// First wall segment strictly within `radius` of `point`, as
/// `(element index, segment index)`.
pub fn first_segment_within(
    point: &Point2D,
    radius: f64,
    elements: &[MapElement],
) -> Option<(usize, usize)> {
    elements.iter().enumerate().find_map(|(ei, el)| {
        let pts = el.as_wall()?.points();
        pts.windows(2)
            .position(|seg| {
                dist(point, &project_on_segment(point, &seg[0], &seg[1]).point) < radius
            })
            .map(|si| (ei, si))
    })
}
