// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # DCIM Floor Plan Topology
//!
//! Room detection over the wall network of a floor plan.
//!
//! Wall polylines are merged into a planar graph ([`WallGraph`]): endpoints
//! within a small tolerance share one vertex and overlapping spans share one
//! edge. A half-edge traversal of that graph yields the enclosed faces
//! ([`RoomFaces`]), which become [`Room`]s with an area and a label anchor
//! chosen by polylabel.
//!
//! ## Quick Start
//!
//! ```rust
//! use dcim_floorplan_geometry::Point2D;
//! use dcim_floorplan_topology::{compute_room_faces, compute_rooms, LabelOptions};
//!
//! let wall = [
//!     Point2D::new(0.0, 0.0),
//!     Point2D::new(400.0, 0.0),
//!     Point2D::new(400.0, 300.0),
//!     Point2D::new(0.0, 300.0),
//!     Point2D::new(0.0, 0.0),
//! ];
//! let faces = compute_room_faces([&wall[..]], 3.0);
//! let rooms = compute_rooms(&faces, &[], &LabelOptions::default());
//! assert_eq!(rooms.len(), 1);
//! ```
//!
//! Everything here is rebuilt from scratch on each call and never fails:
//! malformed graphs produce fewer rooms, not errors.

pub mod faces;
pub mod rooms;
pub mod wall_graph;

pub use faces::{compute_room_faces, detect_faces, Face, RoomFaces};
pub use rooms::{
    compute_rooms, restore_room_names, LabelOptions, Room, DEFAULT_LABEL_PRECISION,
    DEFAULT_NAME_MATCH_FACTOR,
};
pub use wall_graph::{Adjacency, WallGraph, DEFAULT_MERGE_EPS};
