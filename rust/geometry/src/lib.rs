// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # DCIM Floor Plan Geometry
//!
//! 2D geometry for datacenter floor plans, in document coordinates
//! (1 unit = 1 cm, Y grows downwards).
//!
//! - [`primitives`]: distances, segment projection, angles, segment intersection
//! - [`polygon`]: shoelace area/centroid, point-in-polygon, proper crossings
//! - [`polylabel`]: pole of inaccessibility for room label placement
//! - [`obb`]: rack footprints (rotated corners, SAT overlap, bounds)
//!
//! All functions are total. Degenerate input produces `None` or a
//! well-defined value, never a panic.

pub mod obb;
pub mod point;
pub mod polygon;
pub mod polylabel;
pub mod primitives;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2};

pub use obb::{OrientedRect, Rect};
pub use point::{Bounds, Point2D};
pub use polygon::{
    point_in_indexed_polygon, point_in_polygon, polygon_centroid, segments_cross, signed_area,
    signed_area_indexed, signed_distance_to_ring,
};
pub use polylabel::{polylabel, PolylabelResult};
pub use primitives::{
    angle_between, clamp, dist, dist_to_segment, line_segment_intersection, project_on_segment,
    Projection, INTERSECTION_EPSILON,
};
