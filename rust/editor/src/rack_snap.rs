// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Magnetic rack-to-rack snapping.
//!
//! X and Y are snapped independently. On each axis a proposed rack can sit
//! flush against another rack (left to right, right to left) or align with
//! it (left to left, right to right; likewise top and bottom). The nearest
//! candidate within the snap radius wins per axis.

use dcim_floorplan_geometry::Rect;
use serde::Serialize;

use crate::model::MapElement;

/// Outcome of [`rack_snap_result`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RackSnap {
    pub x: f64,
    pub y: f64,
    /// At least one axis moved
    pub snapped: bool,
    /// The final rectangle overlaps another rack
    pub blocked: bool,
}

/// Best offset on one axis.
struct AxisSnap {
    best: f64,
    offset: Option<f64>,
}

impl AxisSnap {
    fn new(radius: f64) -> Self {
        Self {
            best: radius,
            offset: None,
        }
    }

    /// Consider moving `from` onto `to`.
    fn offer(&mut self, from: f64, to: f64) {
        let d = (from - to).abs();
        if d < self.best {
            self.best = d;
            self.offset = Some(to - from);
        }
    }
}

/// Snap `proposed` against `others` within `radius` and report whether the
/// snapped rectangle overlaps any of them. Flush contact is not an overlap.
///
/// `others` must not contain the rack being placed. A zero radius only runs
/// the overlap check.
pub fn rack_snap_result(proposed: &Rect, others: &[Rect], radius: f64) -> RackSnap {
    let mut sx = AxisSnap::new(radius);
    let mut sy = AxisSnap::new(radius);

    for other in others {
        sx.offer(proposed.x, other.right());
        sx.offer(proposed.right(), other.x);
        sx.offer(proposed.x, other.x);
        sx.offer(proposed.right(), other.right());

        sy.offer(proposed.y, other.bottom());
        sy.offer(proposed.bottom(), other.y);
        sy.offer(proposed.y, other.y);
        sy.offer(proposed.bottom(), other.bottom());
    }

    let snapped_rect = Rect::new(
        proposed.x + sx.offset.unwrap_or(0.0),
        proposed.y + sy.offset.unwrap_or(0.0),
        proposed.width,
        proposed.height,
    );
    RackSnap {
        x: snapped_rect.x,
        y: snapped_rect.y,
        snapped: sx.offset.is_some() || sy.offset.is_some(),
        blocked: others.iter().any(|o| snapped_rect.overlaps(o)),
    }
}

/// Axis-aligned bounds of every rack footprint except `exclude`.
pub fn rack_rects(elements: &[MapElement], exclude: Option<&str>) -> Vec<Rect> {
    elements
        .iter()
        .filter(|el| exclude != Some(el.id.as_str()))
        .filter_map(|el| el.as_rack())
        .map(|r| r.footprint().axis_aligned_bounds())
        .collect()
}
