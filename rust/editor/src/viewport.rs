// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! View transform, background grid and repaint throttling.
//!
//! Document points map to the screen as `screen = doc * zoom + pan`.

use std::fmt::Write as _;

use dcim_floorplan_geometry::{clamp, Bounds, Point2D};
use serde::Serialize;

/// Minor grid lines are 10 document units apart
const MINOR_GRID_STEP: f64 = 10.0;
/// Major grid lines are 100 document units apart
const MAJOR_GRID_STEP: f64 = 100.0;
/// Below this on-screen spacing no grid paths are produced
const MIN_GRID_PX: f64 = 2.0;

/// Zoom and pan of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    /// Viewport size in pixels
    pub width: f64,
    pub height: f64,
}

/// Adaptive background grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPattern {
    /// Step in document units
    pub step: f64,
    /// Step in pixels
    pub size: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Screen-space SVG path data for the minor and major grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GridPaths {
    pub minor: String,
    pub major: String,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            width,
            height,
        }
    }

    /// Center of the viewport in pixels
    pub fn center(&self) -> Point2D {
        Point2D::new(self.width / 2.0, self.height / 2.0)
    }

    /// Map a screen point to document space, optionally rounding to a grid.
    pub fn screen_to_doc(&self, screen: &Point2D, grid: Option<f64>) -> Point2D {
        let p = Point2D::new(
            (screen.x - self.pan_x) / self.zoom,
            (screen.y - self.pan_y) / self.zoom,
        );
        match grid {
            Some(step) => Point2D::new(grid_snap(p.x, step), grid_snap(p.y, step)),
            None => p,
        }
    }

    pub fn doc_to_screen(&self, doc: &Point2D) -> Point2D {
        Point2D::new(doc.x * self.zoom + self.pan_x, doc.y * self.zoom + self.pan_y)
    }

    /// Scale the zoom by `factor` around `pivot` (screen space, defaults to
    /// the viewport center), keeping the pivot fixed on screen.
    pub fn apply_zoom(
        &mut self,
        factor: f64,
        pivot: Option<Point2D>,
        min_zoom: f64,
        max_zoom: f64,
    ) {
        let c = pivot.unwrap_or_else(|| self.center());
        let new_zoom = clamp(self.zoom * factor, min_zoom, max_zoom);
        let ratio = new_zoom / self.zoom;
        self.pan_x = c.x - (c.x - self.pan_x) * ratio;
        self.pan_y = c.y - (c.y - self.pan_y) * ratio;
        self.zoom = new_zoom;
    }

    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }

    /// Zoom and pan so that `points` fill the viewport with `padding` pixels
    /// around them. Returns `false` and resets the view when there is
    /// nothing to fit.
    pub fn fit<I>(&mut self, points: I, padding: f64, min_zoom: f64, max_zoom: f64) -> bool
    where
        I: IntoIterator<Item = Point2D>,
    {
        let Some(bounds) = Bounds::from_points(points) else {
            self.reset();
            return false;
        };
        let cw = nonzero_or_one(bounds.width());
        let ch = nonzero_or_one(bounds.height());
        let zoom = clamp(
            ((self.width - padding * 2.0) / cw).min((self.height - padding * 2.0) / ch),
            min_zoom,
            max_zoom,
        );
        self.zoom = zoom;
        self.pan_x = (self.width - cw * zoom) / 2.0 - bounds.min_x * zoom;
        self.pan_y = (self.height - ch * zoom) / 2.0 - bounds.min_y * zoom;
        true
    }

    /// Grid step scaled by powers of ten into `[min_px, max_px]` on screen.
    pub fn grid_pattern(&self, base_step: f64, min_px: f64, max_px: f64) -> GridPattern {
        let mut step = base_step;
        while step * self.zoom < min_px {
            step *= 10.0;
        }
        while step * self.zoom > max_px {
            step /= 10.0;
        }
        let size = step * self.zoom;
        GridPattern {
            step,
            size,
            offset_x: wrap(self.pan_x, size),
            offset_y: wrap(self.pan_y, size),
        }
    }

    /// Line paths for a 10-unit minor and 100-unit major grid. Both are
    /// empty when minor lines would be under 2 pixels apart.
    pub fn grid_paths(&self) -> GridPaths {
        let minor = MINOR_GRID_STEP * self.zoom;
        if minor < MIN_GRID_PX {
            return GridPaths::default();
        }
        GridPaths {
            minor: self.lines(minor),
            major: self.lines(MAJOR_GRID_STEP * self.zoom),
        }
    }

    fn lines(&self, spacing: f64) -> String {
        let (w, h) = (self.width, self.height);
        let mut d = String::new();
        let mut x = wrap(self.pan_x, spacing);
        while x <= w + spacing {
            let _ = write!(d, "M{x},0 L{x},{h} ");
            x += spacing;
        }
        let mut y = wrap(self.pan_y, spacing);
        while y <= h + spacing {
            let _ = write!(d, "M0,{y} L{w},{y} ");
            y += spacing;
        }
        d
    }
}

/// Round `v` to the nearest multiple of `step`.
pub fn grid_snap(v: f64, step: f64) -> f64 {
    (v / step).round() * step
}

/// `v` modulo `size`, always in `[0, size)`.
fn wrap(v: f64, size: f64) -> f64 {
    ((v % size) + size) % size
}

fn nonzero_or_one(v: f64) -> f64 {
    if v == 0.0 {
        1.0
    } else {
        v
    }
}

/// At most one repaint pending at a time.
///
/// Repaint requests between two animation frames coalesce; the host runs
/// the repaint when [`FrameGuard::take`] reports one was pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameGuard {
    pending: bool,
}

impl FrameGuard {
    /// Request a repaint. Returns `true` if a new frame must be scheduled.
    pub fn request(&mut self) -> bool {
        !std::mem::replace(&mut self.pending, true)
    }

    /// Consume the pending request, if any.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}
