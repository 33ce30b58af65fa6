// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rooms: enclosed faces with an area and a stable label anchor.
//!
//! Rooms have no id. After every recompute, user-given names are carried
//! over from the previous room set by nearest label point, see
//! [`restore_room_names`].

use dcim_floorplan_geometry::obb::in_any;
use dcim_floorplan_geometry::{
    polygon_centroid, polylabel, signed_distance_to_ring, OrientedRect, Point2D,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::faces::{Face, RoomFaces};

/// Default polylabel precision in document units
pub const DEFAULT_LABEL_PRECISION: f64 = 1.0;

/// Default ratio of `sqrt(area)` within which a room keeps its name
pub const DEFAULT_NAME_MATCH_FACTOR: f64 = 0.8;

/// An enclosed room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Unsigned area in document units²
    pub area: f64,
    /// Label anchor (pole of inaccessibility unless the centroid is preferred)
    pub cx: f64,
    pub cy: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Room {
    pub fn label_point(&self) -> Point2D {
        Point2D::new(self.cx, self.cy)
    }
}

/// How room labels are placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelOptions {
    /// Polylabel precision
    pub precision: f64,
    /// Use the area centroid instead when its clearance is at least this
    /// fraction of the polylabel clearance
    pub centroid_preference: Option<f64>,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            precision: DEFAULT_LABEL_PRECISION,
            centroid_preference: None,
        }
    }
}

/// Turn detected faces into rooms, placing each label away from walls and
/// outside every rack footprint in `obstacles`.
pub fn compute_rooms(
    faces: &RoomFaces,
    obstacles: &[OrientedRect],
    options: &LabelOptions,
) -> Vec<Room> {
    let rooms: Vec<Room> = faces
        .faces
        .iter()
        .map(|face| {
            let label = label_point(&faces.vertices, face, obstacles, options);
            Room {
                area: face.area.abs(),
                cx: label.x,
                cy: label.y,
                name: None,
            }
        })
        .collect();
    debug!(rooms = rooms.len(), obstacles = obstacles.len(), "computed rooms");
    rooms
}

fn label_point(
    vertices: &[Point2D],
    face: &Face,
    obstacles: &[OrientedRect],
    options: &LabelOptions,
) -> Point2D {
    let polygon: Vec<Point2D> = face.ring.iter().map(|&i| vertices[i]).collect();
    let centroid = polygon_centroid(&polygon);

    let Some(best) = polylabel(vertices, &face.ring, options.precision, |p| {
        in_any(p, obstacles)
    }) else {
        return centroid.unwrap_or_else(|| polygon.first().copied().unwrap_or_default());
    };

    if let (Some(ratio), Some(c)) = (options.centroid_preference, centroid) {
        let clearance = signed_distance_to_ring(&c, vertices, &face.ring);
        if clearance >= best.distance * ratio && !in_any(&c, obstacles) {
            return c;
        }
    }
    best.point
}

/// Copy names from `previous` rooms onto `rooms`.
///
/// Each new room takes the name of the nearest named old room whose label
/// point lies strictly within `sqrt(old.area) * factor`. Rooms without such
/// a match keep `name = None`.
pub fn restore_room_names(rooms: &mut [Room], previous: &[Room], factor: f64) {
    let named: Vec<&Room> = previous.iter().filter(|r| r.name.is_some()).collect();
    if named.is_empty() {
        return;
    }
    for room in rooms.iter_mut() {
        let mut best_dist = f64::INFINITY;
        let mut best_name = None;
        for old in &named {
            let d = room.label_point().distance_to(&old.label_point());
            let threshold = old.area.sqrt() * factor;
            if d < best_dist && d < threshold {
                best_dist = d;
                best_name = old.name.as_ref();
            }
        }
        if let Some(name) = best_name {
            trace!(name = %name, shift = best_dist, "room name carried over");
            room.name = Some(name.clone());
        }
    }
}
