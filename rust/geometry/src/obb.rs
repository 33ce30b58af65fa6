// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rack footprints: axis-aligned and oriented rectangles
//!
//! A rack is stored as its unrotated top-left corner plus size, and a
//! rotation in degrees about its own centre. [`OrientedRect`] turns that into
//! world-space corners; [`Rect`] is the axis-aligned box used for magnetic
//! edge snapping.

use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};

use crate::point::{Bounds, Point2D};

/// Axis-aligned rectangle (top-left corner + size).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True when the interiors intersect. Rectangles that only share an
    /// edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Rectangle rotated by `rotation` degrees about its centre.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct OrientedRect {
    /// Top-left corner before rotation
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees, clockwise on screen (Y-down)
    pub rotation: f64,
}

impl OrientedRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64, rotation: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation,
        }
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    fn rotation2(&self) -> Rotation2<f64> {
        Rotation2::new(self.rotation.to_radians())
    }

    /// World-space corners in TL, TR, BR, BL order.
    pub fn corners(&self) -> [Point2D; 4] {
        let center = self.center();
        let rot = self.rotation2();
        let hw = self.width / 2.0;
        let hh = self.height / 2.0;
        [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)]
            .map(|(lx, ly)| center.offset(rot * Vector2::new(lx, ly)))
    }

    /// Whether `p` lies inside or on the boundary.
    pub fn contains(&self, p: &Point2D) -> bool {
        let local = self.rotation2().inverse() * self.center().to(p);
        local.x.abs() <= self.width / 2.0 && local.y.abs() <= self.height / 2.0
    }

    /// Local X and Y axes in world space
    fn axes(&self) -> [Vector2<f64>; 2] {
        let rot = self.rotation2();
        [rot * Vector2::x(), rot * Vector2::y()]
    }

    /// Separating-axis overlap test. Flush placement (zero-area contact) is
    /// not an overlap.
    pub fn overlaps(&self, other: &OrientedRect) -> bool {
        let ca = self.corners();
        let cb = other.corners();
        self.axes()
            .into_iter()
            .chain(other.axes())
            .all(|axis| {
                let (a_min, a_max) = project(&ca, &axis);
                let (b_min, b_max) = project(&cb, &axis);
                a_max > b_min && b_max > a_min
            })
    }

    /// Axis-aligned bounds of the rotated footprint. Unrotated rectangles
    /// return their own extent exactly.
    pub fn axis_aligned_bounds(&self) -> Rect {
        if self.rotation.rem_euclid(360.0) == 0.0 {
            return Rect::new(self.x, self.y, self.width, self.height);
        }
        match Bounds::from_points(self.corners()) {
            Some(b) => Rect::new(b.min_x, b.min_y, b.width(), b.height()),
            None => Rect::new(self.x, self.y, self.width, self.height),
        }
    }

    /// The four edges as `(start, end)` pairs following [`Self::corners`].
    pub fn edges(&self) -> [(Point2D, Point2D); 4] {
        let c = self.corners();
        [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
    }
}

fn project(corners: &[Point2D; 4], axis: &Vector2<f64>) -> (f64, f64) {
    corners.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
        let d = c.x * axis.x + c.y * axis.y;
        (lo.min(d), hi.max(d))
    })
}

/// True when `p` lies in any of `rects`.
pub fn in_any(p: &Point2D, rects: &[OrientedRect]) -> bool {
    rects.iter().any(|r| r.contains(p))
}
