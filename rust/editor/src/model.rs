// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor plan elements
//!
//! A document is a list of [`MapElement`]s. Each element has a stable id and
//! one of four kinds; JSON is internally tagged by `"type"`:
//!
//! ```json
//! {"id": "a1", "type": "wall", "points": [{"x": 0, "y": 0}, {"x": 100, "y": 0}]}
//! {"id": "r1", "type": "rack", "x": 20, "y": 20, "width": 60, "height": 100, "rackName": "Rack-1"}
//! ```
//!
//! Wall display data (`area`, `centroidX/Y`, `segments`, `angles`) is written
//! out for the view layer but never read back: it is private to [`Wall`] and
//! recomputed by every edit that goes through [`Wall::edit_points`].

use dcim_floorplan_geometry::{dist, OrientedRect, Point2D};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::wall_display::{self, LabelScale};

/// First and last point of a closed wall lie within this distance
pub const CLOSURE_TOLERANCE: f64 = 2.0;

/// Label data for one wall segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallSegment {
    /// Segment midpoint
    pub x: f64,
    pub y: f64,
    pub length: f64,
    /// Degrees in `[-90, 90]` so the text never reads upside down
    pub angle: f64,
    pub label_x: f64,
    pub label_y: f64,
}

/// Label data for the angle at one vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AngleLabel {
    /// The vertex
    pub x: f64,
    pub y: f64,
    /// Degrees in `[0, 180]`
    pub angle: f64,
    pub label_x: f64,
    pub label_y: f64,
}

/// A wall polyline with its cached display data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wall {
    points: Vec<Point2D>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    area: Option<f64>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    centroid_x: Option<f64>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    centroid_y: Option<f64>,
    #[serde(skip_deserializing)]
    segments: Vec<WallSegment>,
    #[serde(skip_deserializing)]
    angles: Vec<AngleLabel>,
}

impl Wall {
    /// New wall with display data derived at `scale`.
    pub fn new(points: Vec<Point2D>, scale: &LabelScale) -> Self {
        let mut wall = Wall {
            points,
            ..Wall::default()
        };
        wall.rederive(scale);
        wall
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    /// Mutate the points, then recompute every derived field before
    /// returning.
    pub fn edit_points<R>(
        &mut self,
        scale: &LabelScale,
        f: impl FnOnce(&mut Vec<Point2D>) -> R,
    ) -> R {
        let result = f(&mut self.points);
        self.rederive(scale);
        result
    }

    /// Recompute area, centroid, segment and angle labels from the points.
    pub fn rederive(&mut self, scale: &LabelScale) {
        let derived = wall_display::derive(&self.points, scale);
        self.area = derived.area;
        self.centroid_x = derived.centroid.map(|c| c.x);
        self.centroid_y = derived.centroid.map(|c| c.y);
        self.segments = derived.segments;
        self.angles = derived.angles;
    }

    /// At least four points with the ends within [`CLOSURE_TOLERANCE`].
    pub fn is_closed(&self) -> bool {
        is_closed_polyline(&self.points)
    }

    /// More than two points with the ends strictly within
    /// [`CLOSURE_TOLERANCE`]; the test used while dragging vertices.
    pub fn ends_meet(&self) -> bool {
        let n = self.points.len();
        n > 2 && dist(&self.points[0], &self.points[n - 1]) < CLOSURE_TOLERANCE
    }

    /// Absolute shoelace area, closed walls only
    pub fn area(&self) -> Option<f64> {
        self.area
    }

    pub fn centroid(&self) -> Option<Point2D> {
        match (self.centroid_x, self.centroid_y) {
            (Some(x), Some(y)) => Some(Point2D::new(x, y)),
            _ => None,
        }
    }

    pub fn segments(&self) -> &[WallSegment] {
        &self.segments
    }

    pub fn angles(&self) -> &[AngleLabel] {
        &self.angles
    }

    pub(crate) fn angles_mut(&mut self) -> &mut Vec<AngleLabel> {
        &mut self.angles
    }

    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Endpoints of segment `index`
    pub fn segment(&self, index: usize) -> Option<(Point2D, Point2D)> {
        Some((*self.points.get(index)?, *self.points.get(index + 1)?))
    }
}

/// Closed-loop test shared by walls and raw point lists.
pub fn is_closed_polyline(points: &[Point2D]) -> bool {
    let n = points.len();
    n >= 4 && dist(&points[0], &points[n - 1]) <= CLOSURE_TOLERANCE
}

/// A rack footprint, rotated about its centre.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rack {
    /// Top-left corner before rotation
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees, clockwise on screen
    #[serde(default)]
    pub rotation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rack_name: Option<String>,
}

impl Rack {
    pub fn footprint(&self) -> OrientedRect {
        OrientedRect::new(self.x, self.y, self.width, self.height, self.rotation)
    }

    pub fn center(&self) -> Point2D {
        self.footprint().center()
    }

    /// Unrotated hit test, matching how the body is grabbed.
    pub fn contains_unrotated(&self, p: &Point2D) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// A door, defined by the two ends of its drag gesture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub x: f64,
    pub y: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Door {
    pub fn length(&self) -> f64 {
        (self.x2 - self.x).hypot(self.y2 - self.y)
    }
}

/// A free text label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLabel {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub text: String,
}

/// Element payload, tagged by `"type"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Wall(Wall),
    Rack(Rack),
    Door(Door),
    Text(TextLabel),
}

impl ElementKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementKind::Wall(_) => "wall",
            ElementKind::Rack(_) => "rack",
            ElementKind::Door(_) => "door",
            ElementKind::Text(_) => "text",
        }
    }
}

/// One element of a floor plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapElement {
    pub id: String,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl MapElement {
    /// New element with a fresh id.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: new_element_id(),
            kind,
        }
    }

    pub fn with_id(id: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    pub fn as_wall(&self) -> Option<&Wall> {
        match &self.kind {
            ElementKind::Wall(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_wall_mut(&mut self) -> Option<&mut Wall> {
        match &mut self.kind {
            ElementKind::Wall(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_rack(&self) -> Option<&Rack> {
        match &self.kind {
            ElementKind::Rack(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_rack_mut(&mut self) -> Option<&mut Rack> {
        match &mut self.kind {
            ElementKind::Rack(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_wall(&self) -> bool {
        matches!(self.kind, ElementKind::Wall(_))
    }

    pub fn is_rack(&self) -> bool {
        matches!(self.kind, ElementKind::Rack(_))
    }

    /// Points spanned by the element, for fitting the view.
    pub fn extent_points(&self) -> Vec<Point2D> {
        match &self.kind {
            ElementKind::Wall(w) => w.points().to_vec(),
            ElementKind::Rack(r) => vec![
                Point2D::new(r.x, r.y),
                Point2D::new(r.x + r.width, r.y + r.height),
            ],
            ElementKind::Door(d) => vec![Point2D::new(d.x, d.y), Point2D::new(d.x2, d.y2)],
            ElementKind::Text(t) => vec![Point2D::new(t.x, t.y)],
        }
    }

    /// Shift by `(dx, dy)`; walls are re-derived at `scale`.
    pub fn translate(&mut self, dx: f64, dy: f64, scale: &LabelScale) {
        match &mut self.kind {
            ElementKind::Wall(w) => w.edit_points(scale, |pts| {
                for p in pts.iter_mut() {
                    *p = p.translated(dx, dy);
                }
            }),
            ElementKind::Rack(r) => {
                r.x += dx;
                r.y += dy;
            }
            ElementKind::Door(d) => {
                d.x += dx;
                d.y += dy;
                d.x2 += dx;
                d.y2 += dy;
            }
            ElementKind::Text(t) => {
                t.x += dx;
                t.y += dy;
            }
        }
    }
}

/// Fresh, never reused element id.
pub fn new_element_id() -> String {
    Uuid::new_v4().to_string()
}

/// A vertex of a wall.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexRef {
    pub element_id: String,
    pub point_index: usize,
}

/// A wall vertex together with its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexHit {
    pub element_id: String,
    pub point_index: usize,
    pub x: f64,
    pub y: f64,
}

impl VertexHit {
    pub fn point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    pub fn vertex(&self) -> VertexRef {
        VertexRef {
            element_id: self.element_id.clone(),
            point_index: self.point_index,
        }
    }
}

/// A segment of a wall.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentRef {
    pub element_id: String,
    pub seg_index: usize,
}

/// A point on a wall segment, away from its ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSnap {
    pub x: f64,
    pub y: f64,
    pub element_id: String,
    pub seg_index: usize,
}

impl EdgeSnap {
    pub fn point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2D {
        Point2D::new(x, y)
    }

    #[test]
    fn wall_json_uses_type_tag_and_skips_derived_input() {
        let json = r#"{
            "id": "w1",
            "type": "wall",
            "x": 0,
            "y": 0,
            "points": [{"x": 0, "y": 0}, {"x": 100, "y": 0}],
            "area": 999,
            "segments": [{"x": 1, "y": 1, "length": 5, "angle": 0, "labelX": 0, "labelY": 0}]
        }"#;
        let el: MapElement = serde_json::from_str(json).unwrap();
        let wall = el.as_wall().unwrap();
        assert_eq!(wall.points(), &[p(0.0, 0.0), p(100.0, 0.0)]);
        assert_eq!(wall.area(), None);
        assert!(wall.segments().is_empty());
    }

    #[test]
    fn rack_json_round_trip_keeps_camel_case_name() {
        let json = r#"{"id":"r1","type":"rack","x":20,"y":30,
            "width":60,"height":100,"rackName":"Rack-1"}"#;
        let el: MapElement = serde_json::from_str(json).unwrap();
        let rack = el.as_rack().unwrap();
        assert_eq!(rack.rotation, 0.0);
        assert_eq!(rack.rack_name.as_deref(), Some("Rack-1"));

        let out = serde_json::to_value(&el).unwrap();
        assert_eq!(out["type"], "rack");
        assert_eq!(out["rackName"], "Rack-1");
        assert_eq!(out["width"], 60.0);
    }

    #[test]
    fn derived_wall_data_is_serialized() {
        let scale = LabelScale::new(1.0);
        let wall = Wall::new(
            vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0), p(0.0, 0.0)],
            &scale,
        );
        let out = serde_json::to_value(MapElement::with_id("w", ElementKind::Wall(wall))).unwrap();
        assert_eq!(out["area"], 100.0);
        assert_eq!(out["centroidX"], 5.0);
        assert_eq!(out["segments"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let json = r#"{"id":"x","type":"window","x":0,"y":0}"#;
        assert!(serde_json::from_str::<MapElement>(json).is_err());
    }

    #[test]
    fn closure_needs_four_points() {
        assert!(is_closed_polyline(&[p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(1.0, 1.0)]));
        assert!(!is_closed_polyline(&[p(0.0, 0.0), p(10.0, 0.0), p(0.0, 0.0)]));
        assert!(!is_closed_polyline(&[p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(3.0, 0.0)]));
    }

    #[test]
    fn translate_moves_every_kind() {
        let scale = LabelScale::new(1.0);
        let mut door = MapElement::new(ElementKind::Door(Door {
            x: 0.0,
            y: 0.0,
            x2: 10.0,
            y2: 0.0,
        }));
        door.translate(5.0, 5.0, &scale);
        assert_eq!(door.extent_points(), vec![p(5.0, 5.0), p(15.0, 5.0)]);

        let mut wall = MapElement::new(ElementKind::Wall(Wall::new(
            vec![p(0.0, 0.0), p(10.0, 0.0)],
            &scale,
        )));
        wall.translate(1.0, 2.0, &scale);
        let w = wall.as_wall().unwrap();
        assert_eq!(w.points()[1], p(11.0, 2.0));
        assert_eq!(w.segments()[0].x, 6.0);
    }

    #[test]
    fn element_ids_are_unique() {
        let a = MapElement::new(ElementKind::Text(TextLabel::default()));
        let b = MapElement::new(ElementKind::Text(TextLabel::default()));
        assert_ne!(a.id, b.id);
    }
}
