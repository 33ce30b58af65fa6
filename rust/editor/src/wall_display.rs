// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall display data: segment length labels, vertex angle labels, area and
//! centroid of closed walls.
//!
//! Label offsets are given in screen pixels and divided by the zoom, so the
//! labels keep a constant on-screen distance from the wall. Every change of
//! zoom therefore re-derives every wall.

use std::f64::consts::PI;

use dcim_floorplan_geometry::{angle_between, dist, polygon_centroid, signed_area, Point2D};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::model::{is_closed_polyline, AngleLabel, MapElement, WallSegment};

/// Default distance of segment labels from the wall, in pixels
pub const SEGMENT_LABEL_PX: f64 = 16.0;
/// Default distance of angle labels from the vertex, in pixels
pub const ANGLE_LABEL_PX: f64 = 18.0;

/// Vertices of different walls within this grid cell form a junction
const JUNCTION_EPS: f64 = 3.0;

/// Zoom-dependent label offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelScale {
    pub zoom: f64,
    pub segment_px: f64,
    pub angle_px: f64,
}

impl LabelScale {
    pub fn new(zoom: f64) -> Self {
        Self::with_offsets(zoom, SEGMENT_LABEL_PX, ANGLE_LABEL_PX)
    }

    pub fn with_offsets(zoom: f64, segment_px: f64, angle_px: f64) -> Self {
        Self {
            zoom,
            segment_px,
            angle_px,
        }
    }

    /// Segment label offset in document units
    pub fn segment_offset(&self) -> f64 {
        self.segment_px / self.zoom
    }

    /// Angle label offset in document units
    pub fn angle_offset(&self) -> f64 {
        self.angle_px / self.zoom
    }
}

impl Default for LabelScale {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Everything derived from a wall's points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WallDerived {
    pub area: Option<f64>,
    pub centroid: Option<Point2D>,
    pub segments: Vec<WallSegment>,
    pub angles: Vec<AngleLabel>,
}

/// Derive area, centroid and labels for a wall polyline.
///
/// Area and centroid are only set for closed walls (at least four points,
/// ends within 2 units) with a non-zero area; the centroid then orients the
/// labels so segment labels sit outside and angle labels inside the room.
pub fn derive(points: &[Point2D], scale: &LabelScale) -> WallDerived {
    let mut area = None;
    let mut centroid = None;
    if is_closed_polyline(points) {
        let ring = &points[..points.len() - 1];
        let sa = signed_area(ring);
        if sa != 0.0 {
            area = Some(sa.abs());
            centroid = polygon_centroid(ring);
        }
    }
    WallDerived {
        area,
        centroid,
        segments: compute_wall_segments(points, scale, centroid),
        angles: compute_wall_angles(points, scale, centroid, None),
    }
}

/// Midpoint, length, reading angle and label anchor of every segment.
///
/// The label sits on the left normal, or on the side away from `centroid`
/// when one is given.
pub fn compute_wall_segments(
    points: &[Point2D],
    scale: &LabelScale,
    centroid: Option<Point2D>,
) -> Vec<WallSegment> {
    let offset = scale.segment_offset();
    points
        .windows(2)
        .map(|pair| {
            let (p1, p2) = (pair[0], pair[1]);
            let dx = p2.x - p1.x;
            let dy = p2.y - p1.y;
            let len = dx.hypot(dy);
            let norm = if len == 0.0 { 1.0 } else { len };
            let mid = p1.midpoint(&p2);

            let mut angle = dy.atan2(dx).to_degrees();
            if angle > 90.0 {
                angle -= 180.0;
            }
            if angle < -90.0 {
                angle += 180.0;
            }

            let mut nx = -dy / norm;
            let mut ny = dx / norm;
            if let Some(c) = centroid {
                if nx * (c.x - mid.x) + ny * (c.y - mid.y) > 0.0 {
                    nx = -nx;
                    ny = -ny;
                }
            }

            WallSegment {
                x: mid.x,
                y: mid.y,
                length: len,
                angle,
                label_x: mid.x + nx * offset,
                label_y: mid.y + ny * offset,
            }
        })
        .collect()
}

/// Interior angle label at every interior vertex.
///
/// With `cursor` the in-progress draw point is appended as a trailing vertex
/// so the angle at the last placed point is previewed. A polyline whose
/// first and last points are identical also gets a label at the seam.
pub fn compute_wall_angles(
    points: &[Point2D],
    scale: &LabelScale,
    centroid: Option<Point2D>,
    cursor: Option<Point2D>,
) -> Vec<AngleLabel> {
    let mut full: Vec<Point2D> = points.iter().copied().chain(cursor).collect();
    let n = full.len();
    if n > 2 && full[0] == full[n - 1] {
        full.push(full[1]);
    }
    if full.len() < 3 {
        return Vec::new();
    }

    let offset = scale.angle_offset();
    full.windows(3)
        .map(|w| {
            let (p1, p2, p3) = (w[0], w[1], w[2]);
            let angle = angle_between(&p1, &p2, &p3);
            let (bx, by) = bisector(&p1, &p2, &p3, centroid);
            AngleLabel {
                x: p2.x,
                y: p2.y,
                angle,
                label_x: p2.x + bx * offset,
                label_y: p2.y + by * offset,
            }
        })
        .collect()
}

/// Unit bisector at `p2`, turned towards `centroid` if given. Straight
/// angles fall back to the perpendicular of the incoming arm; a zero-length
/// arm yields the zero vector.
fn bisector(p1: &Point2D, p2: &Point2D, p3: &Point2D, centroid: Option<Point2D>) -> (f64, f64) {
    let (u1x, u1y) = (p1.x - p2.x, p1.y - p2.y);
    let (u2x, u2y) = (p3.x - p2.x, p3.y - p2.y);
    let l1 = u1x.hypot(u1y);
    let l2 = u2x.hypot(u2y);
    if l1 <= 0.0 || l2 <= 0.0 {
        return (0.0, 0.0);
    }
    let (n1x, n1y) = (u1x / l1, u1y / l1);
    let (n2x, n2y) = (u2x / l2, u2y / l2);
    let (mut bx, mut by) = (n1x + n2x, n1y + n2y);
    let bl = bx.hypot(by);
    if bl < 0.001 {
        bx = -n1y;
        by = n1x;
    } else {
        bx /= bl;
        by /= bl;
    }
    if let Some(c) = centroid {
        if bx * (c.x - p2.x) + by * (c.y - p2.y) < 0.0 {
            bx = -bx;
            by = -by;
        }
    }
    (bx, by)
}

struct Arm {
    /// Index of the wall in the element list
    wall: usize,
    azimuth: f64,
}

struct Junction {
    point: Point2D,
    arms: Vec<Arm>,
}

/// Replace per-wall angle labels at vertices shared by several walls with
/// the angles between consecutive arms around the junction.
///
/// Vertices are bucketed on a 3-unit grid. At a junction of two or more
/// distinct walls, existing labels within 3 units are removed from those
/// walls; then every gap between azimuth-sorted arms gets a label, except
/// gaps under 2° and straight continuations (180° ± 1°). The label goes on
/// the wall owning the first arm of the gap.
pub fn compute_junction_angles(elements: &mut [MapElement], scale: &LabelScale) {
    let mut index: FxHashMap<(i64, i64), usize> = FxHashMap::default();
    let mut junctions: Vec<Junction> = Vec::new();

    for (wi, el) in elements.iter().enumerate() {
        let Some(wall) = el.as_wall() else { continue };
        let pts = wall.points();
        if pts.len() < 2 {
            continue;
        }
        for (i, p) in pts.iter().enumerate() {
            let slot = *index.entry(bucket(p)).or_insert_with(|| {
                junctions.push(Junction {
                    point: *p,
                    arms: Vec::new(),
                });
                junctions.len() - 1
            });
            let neighbours = [i.checked_sub(1), Some(i + 1).filter(|&j| j < pts.len())];
            for nb in neighbours.into_iter().flatten() {
                let q = pts[nb];
                junctions[slot].arms.push(Arm {
                    wall: wi,
                    azimuth: (q.y - p.y).atan2(q.x - p.x),
                });
            }
        }
    }

    let offset = scale.angle_offset();
    let mut injected = 0usize;
    for junction in &mut junctions {
        let mut walls: Vec<usize> = junction.arms.iter().map(|a| a.wall).collect();
        walls.sort_unstable();
        walls.dedup();
        if walls.len() < 2 {
            continue;
        }

        let jp = junction.point;
        for &wi in &walls {
            if let Some(wall) = elements[wi].as_wall_mut() {
                wall.angles_mut().retain(|a| {
                    !((a.x - jp.x).abs() < JUNCTION_EPS && (a.y - jp.y).abs() < JUNCTION_EPS)
                });
            }
        }

        let arms = &mut junction.arms;
        arms.sort_by(|a, b| a.azimuth.total_cmp(&b.azimuth));
        let n = arms.len();
        for i in 0..n {
            let a1 = &arms[i];
            let a2 = &arms[(i + 1) % n];
            let mut delta = a2.azimuth - a1.azimuth;
            if delta <= 0.0 {
                delta += 2.0 * PI;
            }
            let degrees = delta.to_degrees();
            if degrees < 2.0 || (degrees - 180.0).abs() < 1.0 {
                continue;
            }
            let mid = a1.azimuth + delta / 2.0;
            if let Some(wall) = elements[a1.wall].as_wall_mut() {
                wall.angles_mut().push(AngleLabel {
                    x: jp.x,
                    y: jp.y,
                    angle: (degrees * 10.0).round() / 10.0,
                    label_x: jp.x - mid.cos() * offset,
                    label_y: jp.y - mid.sin() * offset,
                });
                injected += 1;
            }
        }
    }
    trace!(junctions = junctions.len(), injected, "junction angles");
}

/// Grid cell of a vertex; halves round up like the browser does.
fn bucket(p: &Point2D) -> (i64, i64) {
    (
        (p.x / JUNCTION_EPS + 0.5).floor() as i64,
        (p.y / JUNCTION_EPS + 0.5).floor() as i64,
    )
}
