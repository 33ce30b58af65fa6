// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rack placement rules.
//!
//! Until walls enclose at least one room a rack may go anywhere. After that
//! it must sit entirely inside one room: all four rotated corners in the
//! same face, and no rack edge crossing a wall. The crossing test catches
//! concave rooms where every corner is inside while the body straddles an
//! inner wall.

use dcim_floorplan_geometry::{segments_cross, OrientedRect};
use dcim_floorplan_topology::RoomFaces;
use tracing::trace;

use crate::model::MapElement;

/// Whether `rack` may be placed given the current room faces and walls.
pub fn is_rack_placement_valid(
    rack: &OrientedRect,
    faces: &RoomFaces,
    elements: &[MapElement],
) -> bool {
    if faces.is_empty() {
        return true;
    }

    let corners = rack.corners();
    let Some(room) = faces.face_containing(&corners[0]) else {
        trace!(x = rack.x, y = rack.y, "rack corner outside every room");
        return false;
    };
    if !corners[1..].iter().all(|c| faces.contains(room, c)) {
        trace!(x = rack.x, y = rack.y, room, "rack spans several rooms");
        return false;
    }

    let edges = rack.edges();
    let crosses_wall = elements
        .iter()
        .filter_map(|el| el.as_wall())
        .flat_map(|w| w.points().windows(2))
        .any(|seg| edges.iter().any(|(a, b)| segments_cross(a, b, &seg[0], &seg[1])));
    if crosses_wall {
        trace!(x = rack.x, y = rack.y, "rack crosses a wall");
    }
    !crosses_wall
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementKind, Wall};
    use crate::wall_display::LabelScale;
    use dcim_floorplan_geometry::Point2D;
    use dcim_floorplan_topology::{compute_room_faces, DEFAULT_MERGE_EPS};

    fn walls_of(rings: &[&[(f64, f64)]]) -> Vec<MapElement> {
        rings
            .iter()
            .map(|ring| {
                let mut pts: Vec<Point2D> = ring.iter().map(|&(x, y)| Point2D::new(x, y)).collect();
                pts.push(pts[0]);
                MapElement::new(ElementKind::Wall(Wall::new(pts, &LabelScale::default())))
            })
            .collect()
    }

    fn faces_of(elements: &[MapElement]) -> RoomFaces {
        compute_room_faces(
            elements.iter().filter_map(|e| e.as_wall()).map(|w| w.points()),
            DEFAULT_MERGE_EPS,
        )
    }

    #[test]
    fn anything_goes_without_rooms() {
        let rack = OrientedRect::new(-500.0, -500.0, 60.0, 100.0, 33.0);
        assert!(is_rack_placement_valid(&rack, &RoomFaces::default(), &[]));
    }

    #[test]
    fn rack_inside_room_is_valid() {
        let elements = walls_of(&[&[(0.0, 0.0), (400.0, 0.0), (400.0, 300.0), (0.0, 300.0)]]);
        let faces = faces_of(&elements);
        let rack = OrientedRect::new(100.0, 100.0, 60.0, 100.0, 0.0);
        assert!(is_rack_placement_valid(&rack, &faces, &elements));
        let rack = OrientedRect::new(100.0, 100.0, 60.0, 100.0, 45.0);
        assert!(is_rack_placement_valid(&rack, &faces, &elements));
    }

    #[test]
    fn rack_poking_out_is_invalid() {
        let elements = walls_of(&[&[(0.0, 0.0), (400.0, 0.0), (400.0, 300.0), (0.0, 300.0)]]);
        let faces = faces_of(&elements);
        let rack = OrientedRect::new(370.0, 100.0, 60.0, 100.0, 0.0);
        assert!(!is_rack_placement_valid(&rack, &faces, &elements));
        let rack = OrientedRect::new(500.0, 100.0, 60.0, 100.0, 0.0);
        assert!(!is_rack_placement_valid(&rack, &faces, &elements));
    }

    #[test]
    fn rack_across_two_rooms_is_invalid() {
        let elements = walls_of(&[
            &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)],
            &[(100.0, 0.0), (200.0, 0.0), (200.0, 100.0), (100.0, 100.0)],
        ]);
        let faces = faces_of(&elements);
        let rack = OrientedRect::new(80.0, 20.0, 40.0, 40.0, 0.0);
        assert!(!is_rack_placement_valid(&rack, &faces, &elements));
        let rack = OrientedRect::new(120.0, 20.0, 40.0, 40.0, 0.0);
        assert!(is_rack_placement_valid(&rack, &faces, &elements));
    }

    #[test]
    fn u_shaped_room_rejects_rack_over_the_recess() {
        // Arms at x 0..100 and 200..300 reach up to y = 0; the recess between
        // them is open above y = 200
        let elements = walls_of(&[&[
            (0.0, 0.0),
            (100.0, 0.0),
            (100.0, 200.0),
            (200.0, 200.0),
            (200.0, 0.0),
            (300.0, 0.0),
            (300.0, 300.0),
            (0.0, 300.0),
        ]]);
        let faces = faces_of(&elements);
        assert_eq!(faces.len(), 1);

        // Corners sit in both arms, the body crosses the recess
        let across = OrientedRect::new(50.0, 150.0, 200.0, 30.0, 0.0);
        assert!(!is_rack_placement_valid(&across, &faces, &elements));

        let in_arm = OrientedRect::new(20.0, 150.0, 60.0, 30.0, 0.0);
        assert!(is_rack_placement_valid(&in_arm, &faces, &elements));
    }
}
