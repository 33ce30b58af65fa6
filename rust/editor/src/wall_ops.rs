// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structural wall edits: merge, split, vertex insertion and deletion.
//!
//! Every operation returns `true` when it changed the document and is a
//! no-op otherwise; none of them can leave a wall with fewer than two
//! points. Touched walls are re-derived before returning.

use dcim_floorplan_geometry::{dist, project_on_segment, Point2D};
use tracing::debug;

use crate::model::{ElementKind, MapElement, Wall, CLOSURE_TOLERANCE};
use crate::wall_display::LabelScale;

fn position(elements: &[MapElement], id: &str) -> Option<usize> {
    elements.iter().position(|e| e.id == id && e.is_wall())
}

fn wall_mut<'a>(elements: &'a mut [MapElement], id: &str) -> Option<&'a mut Wall> {
    elements.iter_mut().find(|e| e.id == id)?.as_wall_mut()
}

fn push_wall(elements: &mut Vec<MapElement>, points: Vec<Point2D>, scale: &LabelScale) -> String {
    let el = MapElement::new(ElementKind::Wall(Wall::new(points, scale)));
    let id = el.id.clone();
    elements.push(el);
    id
}

/// Join open wall `b` onto open wall `a` where endpoint `idx_a` of `a` meets
/// endpoint `idx_b` of `b`. The shared vertex appears once and `b` is
/// removed from `elements`.
///
/// No-op when either wall is closed (ends within 2 units) or has fewer than
/// two points, when an index is not an endpoint, or when `a` and `b` are the
/// same wall.
pub fn merge_walls(
    elements: &mut Vec<MapElement>,
    a_id: &str,
    idx_a: usize,
    b_id: &str,
    idx_b: usize,
    scale: &LabelScale,
) -> bool {
    if a_id == b_id {
        return false;
    }
    let (Some(ia), Some(ib)) = (position(elements, a_id), position(elements, b_id)) else {
        return false;
    };
    let (Some(wa), Some(wb)) = (elements[ia].as_wall(), elements[ib].as_wall()) else {
        return false;
    };
    let (pa, pb) = (wa.points(), wb.points());
    if pa.len() < 2 || pb.len() < 2 {
        return false;
    }
    let ends_touch = |pts: &[Point2D]| dist(&pts[0], &pts[pts.len() - 1]) < CLOSURE_TOLERANCE;
    if ends_touch(pa) || ends_touch(pb) {
        return false;
    }
    let (last_a, last_b) = (pa.len() - 1, pb.len() - 1);
    if !(idx_a == 0 || idx_a == last_a) || !(idx_b == 0 || idx_b == last_b) {
        return false;
    }

    let merged: Vec<Point2D> = if idx_a == last_a && idx_b == 0 {
        pa.iter().chain(&pb[1..]).copied().collect()
    } else if idx_a == 0 && idx_b == last_b {
        pb.iter().chain(&pa[1..]).copied().collect()
    } else if idx_a == 0 && idx_b == 0 {
        pa.iter().rev().chain(&pb[1..]).copied().collect()
    } else {
        pa.iter().chain(pb.iter().rev().skip(1)).copied().collect()
    };

    let count = merged.len();
    if let Some(wall) = elements[ia].as_wall_mut() {
        wall.edit_points(scale, |pts| *pts = merged);
    }
    elements.remove(ib);
    debug!(kept = a_id, absorbed = b_id, points = count, "merged walls");
    true
}

/// Double-click on vertex `index`: a closed wall opens at that vertex (the
/// ring is rotated so the vertex becomes both ends of the open polyline); an
/// open wall is split in two there. Endpoints of open walls are left alone.
pub fn split_at_vertex(
    elements: &mut Vec<MapElement>,
    id: &str,
    index: usize,
    scale: &LabelScale,
) -> bool {
    let Some(wall) = wall_mut(elements, id) else {
        return false;
    };
    let n = wall.points().len();
    if n < 2 || index >= n {
        return false;
    }

    if wall.is_closed() {
        wall.edit_points(scale, |pts| {
            pts.pop();
            let k = index % pts.len();
            pts.rotate_left(k);
        });
        debug!(wall = id, index, "opened closed wall");
        return true;
    }

    if index == 0 || index == n - 1 {
        return false;
    }
    let tail = wall.edit_points(scale, |pts| {
        let tail = pts[index..].to_vec();
        pts.truncate(index + 1);
        tail
    });
    let new_id = push_wall(elements, tail, scale);
    debug!(wall = id, index, new_wall = %new_id, "split wall at vertex");
    true
}

/// Insert `point` between vertices `seg_index` and `seg_index + 1`.
pub fn insert_vertex(
    elements: &mut [MapElement],
    id: &str,
    seg_index: usize,
    point: Point2D,
    scale: &LabelScale,
) -> bool {
    let Some(wall) = wall_mut(elements, id) else {
        return false;
    };
    if seg_index + 1 >= wall.points().len() {
        return false;
    }
    wall.edit_points(scale, |pts| pts.insert(seg_index + 1, point));
    true
}

/// Double-click on a segment: insert the projection of `point` onto it.
pub fn insert_projected_vertex(
    elements: &mut [MapElement],
    id: &str,
    seg_index: usize,
    point: &Point2D,
    scale: &LabelScale,
) -> bool {
    let Some((a, b)) = elements
        .iter()
        .find(|e| e.id == id)
        .and_then(|e| e.as_wall())
        .and_then(|w| w.segment(seg_index))
    else {
        return false;
    };
    let projected = project_on_segment(point, &a, &b).point;
    insert_vertex(elements, id, seg_index, projected, scale)
}

/// Remove vertex `index` from a wall with more than two points.
///
/// Deleting the seam vertex of a closed loop removes both copies and closes
/// the ring again on the next vertex.
pub fn delete_vertex(
    elements: &mut [MapElement],
    id: &str,
    index: usize,
    scale: &LabelScale,
) -> bool {
    let Some(wall) = wall_mut(elements, id) else {
        return false;
    };
    let n = wall.points().len();
    if n <= 2 || index >= n {
        return false;
    }
    let seam = index == 0 || index == n - 1;
    if seam && wall.ends_meet() && n > 4 {
        wall.edit_points(scale, |pts| {
            pts.pop();
            pts.remove(0);
            pts.push(pts[0]);
        });
    } else {
        wall.edit_points(scale, |pts| {
            pts.remove(index);
        });
    }
    true
}

/// Delete segment `seg_index` of a wall.
///
/// A single-segment wall is removed entirely, an end segment trims the wall
/// and a middle segment splits it into two walls.
pub fn delete_segment(
    elements: &mut Vec<MapElement>,
    id: &str,
    seg_index: usize,
    scale: &LabelScale,
) -> bool {
    let Some(pos) = position(elements, id) else {
        return false;
    };
    let n = elements[pos].as_wall().map_or(0, |w| w.points().len());
    if seg_index + 1 >= n.max(2) {
        return false;
    }
    if n <= 2 {
        elements.remove(pos);
        debug!(wall = id, "deleted single-segment wall");
        return true;
    }

    let Some(wall) = elements[pos].as_wall_mut() else {
        return false;
    };
    if seg_index == 0 {
        wall.edit_points(scale, |pts| {
            pts.remove(0);
        });
    } else if seg_index == n - 2 {
        wall.edit_points(scale, |pts| {
            pts.pop();
        });
    } else {
        let tail = wall.edit_points(scale, |pts| pts.split_off(seg_index + 1));
        let new_id = push_wall(elements, tail, scale);
        debug!(wall = id, seg_index, new_wall = %new_id, "split wall by deleting a segment");
    }
    true
}
