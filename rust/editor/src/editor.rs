// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interactive floor plan editor.
//!
//! [`Editor`] owns the element list and turns pointer and keyboard input
//! into edits. Tool mode decides how a press is read; a drag in progress is
//! tracked separately in [`DragState`], and the wall tool keeps an open
//! polyline under construction in [`DrawPreview`].
//!
//! Every structural edit re-derives wall display data, junction angles and
//! rooms before the call returns, so nothing read from the editor is ever
//! stale. Edits that change the saved document push
//! [`EditorEvent::ElementsChanged`] for the host's autosave.

use dcim_floorplan_geometry::{dist, dist_to_segment, OrientedRect, Point2D, Rect};
use dcim_floorplan_topology::{
    compute_room_faces, compute_rooms, restore_room_names, Room, RoomFaces,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::EditorConfig;
use crate::document::{self, UnplacedRack};
use crate::error::{Error, Result};
use crate::input::{Key, KeyInput, Modifiers, PointerButton, PointerInput};
use crate::model::{
    AngleLabel, Door, EdgeSnap, ElementKind, MapElement, Rack, SegmentRef, TextLabel, VertexHit,
    VertexRef, Wall, WallSegment,
};
use crate::placement::is_rack_placement_valid;
use crate::rack_snap::{rack_rects, rack_snap_result};
use crate::snap::{
    check_intersections, closest_edge_snap, closest_vertex, first_segment_within,
    first_vertex_within,
};
use crate::viewport::{grid_snap, FrameGuard, GridPaths, GridPattern, Viewport};
use crate::wall_display::{
    compute_junction_angles, compute_wall_angles, compute_wall_segments, LabelScale,
};
use crate::wall_ops;

/// A crossing found while drawing lies on an existing wall within this
/// distance
const CROSSING_TOLERANCE: f64 = 0.5;

/// Rotation handle drags snap to this step with Shift
const ROTATION_STEP: f64 = 15.0;

/// Tool modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Select,
    Move,
    Wall,
    Door,
    Rack,
    Text,
}

/// What is currently selected.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Selection {
    #[default]
    None,
    Element { id: String },
    Segment(SegmentRef),
}

/// Notifications for the host, drained with [`Editor::take_events`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum EditorEvent {
    /// The saved document changed
    ElementsChanged,
    #[serde(rename_all = "camelCase")]
    RackCreated { element_id: String, rack_name: String },
    #[serde(rename_all = "camelCase")]
    RackRenamed {
        element_id: String,
        old: Option<String>,
        new: String,
    },
}

/// Rack type chosen for the rack tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RackTemplate {
    /// Model name, used as the prefix of generated rack names
    pub model: String,
    pub width: f64,
    pub height: f64,
}

/// In-progress wall drawing and snap indicators.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawPreview {
    pub active_points: Vec<Point2D>,
    pub active_segments: Vec<WallSegment>,
    pub preview_angles: Vec<AngleLabel>,
    pub cursor: Option<Point2D>,
    pub current_segment_length: f64,
    pub intersection: Option<Point2D>,
    pub vertex_snap: Option<Point2D>,
    pub edge_snap: Option<EdgeSnap>,
}

impl DrawPreview {
    pub fn is_drawing(&self) -> bool {
        !self.active_points.is_empty()
    }

    fn clear_indicators(&mut self) {
        self.intersection = None;
        self.vertex_snap = None;
        self.edge_snap = None;
    }
}

/// Drag in progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Pan {
        start: Point2D,
        start_pan: (f64, f64),
    },
    /// A wall vertex plus the co-located vertices that follow it
    Vertex { vertex: VertexRef, peers: Vec<VertexRef> },
    /// One wall translated as a whole
    Wall { id: String, last: Point2D },
    /// One rack, kept at its last valid position
    Rack { id: String, last: Point2D },
    /// Every element translated together
    AllElements { last: Point2D },
    Rotate {
        id: String,
        center: Point2D,
        start_angle: f64,
        start_rotation: f64,
    },
    /// A door or rack being created
    Create(MapElement),
}

/// The floor plan editor.
#[derive(Debug, Clone)]
pub struct Editor {
    config: EditorConfig,
    elements: Vec<MapElement>,
    rooms: Vec<Room>,
    faces: RoomFaces,
    viewport: Viewport,
    frame: FrameGuard,
    tool: Tool,
    drag: DragState,
    selection: Selection,
    hovered_vertex: Option<VertexHit>,
    snap_target: Option<VertexHit>,
    preview: DrawPreview,
    rack_template: Option<RackTemplate>,
    rack_snap_active: bool,
    rack_creation_blocked: bool,
    events: Vec<EditorEvent>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let viewport = Viewport::new(config.viewport_width, config.viewport_height);
        Self {
            config,
            elements: Vec::new(),
            rooms: Vec::new(),
            faces: RoomFaces::default(),
            viewport,
            frame: FrameGuard::default(),
            tool: Tool::default(),
            drag: DragState::Idle,
            selection: Selection::None,
            hovered_vertex: None,
            snap_target: None,
            preview: DrawPreview::default(),
            rack_template: None,
            rack_snap_active: false,
            rack_creation_blocked: false,
            events: Vec::new(),
        }
    }

    /// Editor over `elements`, fully derived.
    pub fn with_elements(config: EditorConfig, elements: Vec<MapElement>) -> Self {
        let mut editor = Self::new(config);
        editor.set_elements(elements);
        editor
    }

    /// Replace the document. Room names do not carry over.
    pub fn set_elements(&mut self, elements: Vec<MapElement>) {
        self.elements = elements;
        self.rooms.clear();
        self.selection = Selection::None;
        self.hovered_vertex = None;
        self.drag = DragState::Idle;
        self.cancel_drawing();
        self.rederive_all();
    }

    /// Load a JSON document, see [`document::parse_elements`].
    pub fn load_document(&mut self, json: &str) -> Result<()> {
        let elements = document::parse_elements(json)?;
        self.set_elements(elements);
        Ok(())
    }

    pub fn save_document(&self) -> Result<String> {
        document::to_json(&self.elements)
    }

    /// Add inventory racks missing from the document.
    pub fn inject_unplaced_racks(&mut self, racks: &[UnplacedRack]) -> usize {
        let added = document::inject_unplaced_racks(
            &mut self.elements,
            racks,
            self.config.unplaced_rack_origin,
            self.config.unplaced_rack_gap,
            self.config.min_rack_size,
        );
        if added > 0 {
            self.rederive_all();
        }
        added
    }

    // --- Accessors ---

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn elements(&self) -> &[MapElement] {
        &self.elements
    }

    pub fn element(&self, id: &str) -> Option<&MapElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room_faces(&self) -> &RoomFaces {
        &self.faces
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn hovered_vertex(&self) -> Option<&VertexHit> {
        self.hovered_vertex.as_ref()
    }

    /// Vertex of another wall the dragged vertex is snapped onto
    pub fn snap_target(&self) -> Option<&VertexHit> {
        self.snap_target.as_ref()
    }

    pub fn preview(&self) -> &DrawPreview {
        &self.preview
    }

    /// Door or rack under creation
    pub fn creating(&self) -> Option<&MapElement> {
        match &self.drag {
            DragState::Create(el) => Some(el),
            _ => None,
        }
    }

    pub fn rack_snap_active(&self) -> bool {
        self.rack_snap_active
    }

    pub fn rack_creation_blocked(&self) -> bool {
        self.rack_creation_blocked
    }

    pub fn grid_pattern(&self) -> GridPattern {
        self.viewport.grid_pattern(
            self.config.grid_base_step,
            self.config.grid_min_px,
            self.config.grid_max_px,
        )
    }

    pub fn grid_paths(&self) -> GridPaths {
        self.viewport.grid_paths()
    }

    /// Label offsets at the current zoom
    pub fn label_scale(&self) -> LabelScale {
        LabelScale::with_offsets(
            self.viewport.zoom,
            self.config.segment_label_offset,
            self.config.angle_label_offset,
        )
    }

    /// Drain pending host notifications.
    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    /// Run the pending grid repaint, if any. Returns whether the host should
    /// redraw the grid from [`Self::grid_paths`].
    pub fn animation_frame(&mut self) -> bool {
        self.frame.take()
    }

    pub fn repaint_pending(&self) -> bool {
        self.frame.is_pending()
    }

    // --- Host commands ---

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
        self.selection = Selection::None;
        self.cancel_drawing();
    }

    pub fn set_rack_template(&mut self, template: Option<RackTemplate>) {
        self.rack_template = template;
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport.width = width;
        self.viewport.height = height;
        self.frame.request();
    }

    /// Select an element by id, as when the host reports a click on it.
    pub fn select_element(&mut self, id: &str) -> Result<()> {
        self.find(id)?;
        self.selection = Selection::Element { id: id.to_string() };
        Ok(())
    }

    pub fn select_segment(&mut self, id: &str, seg_index: usize) -> Result<()> {
        let wall = self.wall(id)?;
        if seg_index >= wall.segment_count() {
            return Err(Error::ElementNotFound(format!("{id} segment {seg_index}")));
        }
        self.selection = Selection::Segment(SegmentRef {
            element_id: id.to_string(),
            seg_index,
        });
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }

    /// Rename a rack. Returns `false` when the trimmed name is empty or
    /// unchanged.
    pub fn rename_rack(&mut self, id: &str, name: &str) -> Result<bool> {
        let name = name.trim();
        let rack = self.rack_mut(id)?;
        if name.is_empty() || rack.rack_name.as_deref() == Some(name) {
            return Ok(false);
        }
        let old = rack.rack_name.replace(name.to_string());
        debug!(rack = id, ?old, new = name, "renamed rack");
        self.events.push(EditorEvent::RackRenamed {
            element_id: id.to_string(),
            old,
            new: name.to_string(),
        });
        self.events.push(EditorEvent::ElementsChanged);
        Ok(true)
    }

    /// Name room `index`; a blank name clears it.
    pub fn set_room_name(&mut self, index: usize, name: &str) -> Result<()> {
        let room = self.rooms.get_mut(index).ok_or(Error::RoomNotFound(index))?;
        let name = name.trim();
        room.name = (!name.is_empty()).then(|| name.to_string());
        Ok(())
    }

    pub fn set_text(&mut self, id: &str, text: &str) -> Result<()> {
        let el = self.find_mut(id)?;
        let ElementKind::Text(label) = &mut el.kind else {
            return Err(Error::WrongElementKind {
                id: id.to_string(),
                expected: "text",
            });
        };
        label.text = text.to_string();
        self.events.push(EditorEvent::ElementsChanged);
        Ok(())
    }

    /// Start a rotation-handle drag on a rack.
    pub fn begin_rotation(&mut self, id: &str, input: &PointerInput) -> Result<()> {
        let point = self.doc_point(input);
        let rack = self.rack_mut(id)?;
        let center = rack.center();
        let start_rotation = rack.rotation;
        self.drag = DragState::Rotate {
            id: id.to_string(),
            center,
            start_angle: (point.y - center.y).atan2(point.x - center.x),
            start_rotation,
        };
        Ok(())
    }

    // --- Zoom and view ---

    /// Zoom by `factor` around `pivot` (screen space; the viewport center
    /// when `None`).
    pub fn apply_zoom(&mut self, factor: f64, pivot: Option<Point2D>) {
        self.viewport
            .apply_zoom(factor, pivot, self.config.min_zoom, self.config.max_zoom);
        trace!(zoom = self.viewport.zoom, "zoom");
        self.rederive_all();
    }

    /// One wheel notch at `pivot`; negative `delta_y` zooms in.
    pub fn wheel(&mut self, delta_y: f64, pivot: Point2D) {
        let step = self.config.wheel_zoom_factor;
        let factor = if delta_y < 0.0 { step } else { 1.0 / step };
        self.apply_zoom(factor, Some(pivot));
    }

    pub fn zoom_in(&mut self) {
        self.apply_zoom(self.config.button_zoom_factor, None);
    }

    pub fn zoom_out(&mut self) {
        self.apply_zoom(1.0 / self.config.button_zoom_factor, None);
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset();
        self.rederive_all();
    }

    /// Fit all content into the viewport.
    pub fn fit_to_view(&mut self) {
        let points: Vec<Point2D> = self.elements.iter().flat_map(|e| e.extent_points()).collect();
        self.viewport.fit(
            points,
            self.config.fit_padding,
            self.config.min_zoom,
            self.config.max_zoom,
        );
        self.rederive_all();
    }

    // --- Pointer input ---

    pub fn pointer_down(&mut self, input: &PointerInput) {
        let doc = self.doc_point(input);
        let background = self.element_at(&doc).is_none();
        let select_background =
            input.button == PointerButton::Left && self.tool == Tool::Select && background;
        if input.button == PointerButton::Middle || select_background {
            self.drag = DragState::Pan {
                start: input.screen(),
                start_pan: (self.viewport.pan_x, self.viewport.pan_y),
            };
            return;
        }
        if input.button != PointerButton::Left {
            return;
        }

        match self.tool {
            Tool::Select => {
                if let Some(id) = self.element_at(&doc) {
                    self.selection = Selection::Element { id };
                }
            }
            Tool::Move => self.move_tool_press(doc, input.modifiers),
            Tool::Wall => self.wall_tool_press(doc, input.modifiers),
            Tool::Door => {
                self.drag = DragState::Create(MapElement::new(ElementKind::Door(Door {
                    x: doc.x,
                    y: doc.y,
                    x2: doc.x,
                    y2: doc.y,
                })));
            }
            Tool::Rack => {
                let (width, height) = self.rack_size();
                let rack = Rack {
                    x: doc.x - width / 2.0,
                    y: doc.y - height / 2.0,
                    width,
                    height,
                    rotation: 0.0,
                    rack_name: None,
                };
                self.drag = DragState::Create(MapElement::new(ElementKind::Rack(rack)));
                self.update_rack_creation(doc, input.modifiers);
            }
            Tool::Text => {
                let el = MapElement::new(ElementKind::Text(TextLabel {
                    x: doc.x,
                    y: doc.y,
                    text: self.config.default_text.clone(),
                }));
                self.selection = Selection::Element { id: el.id.clone() };
                self.elements.push(el);
                self.events.push(EditorEvent::ElementsChanged);
            }
        }
    }

    fn move_tool_press(&mut self, point: Point2D, mods: Modifiers) {
        let radius = self.config.vertex_hit_radius;
        if let Some(hit) = first_vertex_within(&point, radius, &self.elements, |_| false) {
            let peers = self.junction_peers(&hit);
            trace!(
                wall = %hit.element_id,
                index = hit.point_index,
                peers = peers.len(),
                "grab vertex"
            );
            self.drag = DragState::Vertex {
                vertex: hit.vertex(),
                peers,
            };
            return;
        }

        let rack_hit = self
            .elements
            .iter()
            .find(|e| e.as_rack().is_some_and(|r| r.contains_unrotated(&point)))
            .map(|e| e.id.clone());
        if let Some(id) = rack_hit {
            self.selection = Selection::Element { id: id.clone() };
            self.rack_snap_active = false;
            self.drag = DragState::Rack { id, last: point };
            return;
        }

        let seg_radius = self.config.segment_hit_radius;
        if let Some((ei, seg_index)) = first_segment_within(&point, seg_radius, &self.elements) {
            let id = self.elements[ei].id.clone();
            self.selection = Selection::Segment(SegmentRef {
                element_id: id.clone(),
                seg_index,
            });
            self.drag = if mods.ctrl {
                DragState::Wall { id, last: point }
            } else {
                DragState::AllElements { last: point }
            };
            return;
        }

        self.selection = Selection::None;
    }

    /// Vertices of any wall within the junction tolerance of `hit`, other
    /// than `hit` itself.
    fn junction_peers(&self, hit: &VertexHit) -> Vec<VertexRef> {
        let at = hit.point();
        let tol = self.config.junction_peer_tolerance;
        self.elements
            .iter()
            .filter_map(|el| el.as_wall().map(|w| (el, w)))
            .flat_map(|(el, w)| {
                w.points().iter().enumerate().filter_map(move |(j, p)| {
                    let same = el.id == hit.element_id && j == hit.point_index;
                    (!same && dist(&at, p) < tol).then(|| VertexRef {
                        element_id: el.id.clone(),
                        point_index: j,
                    })
                })
            })
            .collect()
    }

    fn wall_tool_press(&mut self, mut point: Point2D, mods: Modifiers) {
        let Some(&last) = self.preview.active_points.last() else {
            let snapped = self.snap_new_point(point);
            self.preview.active_points = vec![snapped];
            self.preview.active_segments.clear();
            self.preview.cursor = Some(snapped);
            trace!(x = snapped.x, y = snapped.y, "start wall");
            return;
        };

        if mods.shift {
            point = orthogonal(point, last);
        }

        let start = self.preview.active_points[0];
        if self.preview.active_points.len() > 2
            && dist(&point, &start) < self.config.loop_close_radius
        {
            let mut ring = std::mem::take(&mut self.preview.active_points);
            ring.push(start);
            self.finish_polyline_with(ring);
            return;
        }

        let crossing = check_intersections(&point, &self.preview.active_points, &self.elements);
        let point = match crossing {
            Some(hit) => {
                let near = closest_vertex(
                    &hit,
                    self.config.vertex_snap_tolerance,
                    &self.elements,
                    &self.preview.active_points,
                )
                .filter(|v| dist(v, &hit) < self.config.intersection_vertex_radius);
                match near {
                    Some(v) => v,
                    None => {
                        let edge = closest_edge_snap(&hit, CROSSING_TOLERANCE, &self.elements);
                        if let Some(edge) = edge {
                            self.split_wall_at(&edge);
                        }
                        hit
                    }
                }
            }
            None => self.snap_new_point(point),
        };

        self.preview.active_points.push(point);
        self.preview.active_segments =
            compute_wall_segments(&self.preview.active_points, &self.label_scale(), None);
    }

    /// Vertex snap, else edge snap (splitting the target wall there), else
    /// the point itself.
    fn snap_new_point(&mut self, point: Point2D) -> Point2D {
        if let Some(v) = closest_vertex(
            &point,
            self.config.vertex_snap_tolerance,
            &self.elements,
            &self.preview.active_points,
        ) {
            return v;
        }
        let tolerance = self.config.edge_snap_tolerance;
        if let Some(edge) = closest_edge_snap(&point, tolerance, &self.elements) {
            self.split_wall_at(&edge);
            return edge.point();
        }
        point
    }

    /// Give the wall under `edge` a vertex at the snapped point.
    fn split_wall_at(&mut self, edge: &EdgeSnap) {
        let scale = self.label_scale();
        let inserted = wall_ops::insert_vertex(
            &mut self.elements,
            &edge.element_id,
            edge.seg_index,
            edge.point(),
            &scale,
        );
        if inserted {
            trace!(wall = %edge.element_id, seg = edge.seg_index, "split wall at snap point");
            self.refresh_rooms();
        }
    }

    pub fn pointer_move(&mut self, input: &PointerInput) {
        if let DragState::Pan { start, start_pan } = self.drag {
            self.viewport.pan_x = start_pan.0 + (input.x - start.x);
            self.viewport.pan_y = start_pan.1 + (input.y - start.y);
            self.frame.request();
            return;
        }

        let point = self.doc_point(input);
        let mods = input.modifiers;

        if let DragState::Rotate {
            id,
            center,
            start_angle,
            start_rotation,
        } = &self.drag
        {
            let angle = (point.y - center.y).atan2(point.x - center.x);
            let mut rotation = start_rotation + (angle - start_angle).to_degrees();
            if mods.shift {
                rotation = (rotation / ROTATION_STEP).round() * ROTATION_STEP;
            }
            let id = id.clone();
            if let Ok(rack) = self.rack_mut(&id) {
                rack.rotation = rotation;
            }
            return;
        }

        if !matches!(self.drag, DragState::Vertex { .. }) {
            self.snap_target = None;
        }

        if self.tool == Tool::Move && self.drag == DragState::Idle {
            let radius = self.config.vertex_hit_radius;
            self.hovered_vertex = first_vertex_within(&point, radius, &self.elements, |_| false);
        }

        match std::mem::take(&mut self.drag) {
            DragState::AllElements { last } => {
                let scale = self.label_scale();
                for el in &mut self.elements {
                    el.translate(point.x - last.x, point.y - last.y, &scale);
                }
                self.drag = DragState::AllElements { last: point };
            }
            DragState::Wall { id, last } => {
                let scale = self.label_scale();
                if let Some(el) = self.elements.iter_mut().find(|e| e.id == id) {
                    el.translate(point.x - last.x, point.y - last.y, &scale);
                }
                self.drag = DragState::Wall { id, last: point };
            }
            DragState::Rack { id, last } => {
                self.move_rack(&id, point.x - last.x, point.y - last.y, mods);
                self.drag = DragState::Rack { id, last: point };
            }
            DragState::Vertex { vertex, peers } => {
                self.drag_vertex(&vertex, &peers, point, mods);
                self.drag = DragState::Vertex { vertex, peers };
            }
            DragState::Create(mut el) => {
                if let ElementKind::Door(door) = &mut el.kind {
                    door.x2 = point.x;
                    door.y2 = point.y;
                }
                self.drag = DragState::Create(el);
                if self.creating().is_some_and(MapElement::is_rack) {
                    self.update_rack_creation(point, mods);
                }
            }
            other => {
                self.drag = other;
                if self.tool == Tool::Wall {
                    self.wall_tool_preview(point, mods);
                }
            }
        }
    }

    /// Translate a rack by `(dx, dy)` from where it is, applying grid snap
    /// (Alt) and magnetic snap (Shift). Overlapping or out-of-room results
    /// leave the rack at its last valid position.
    fn move_rack(&mut self, id: &str, dx: f64, dy: f64, mods: Modifiers) {
        let Some(rack) = self.element(id).and_then(|e| e.as_rack()).cloned() else {
            return;
        };
        let mut x = rack.x + dx;
        let mut y = rack.y + dy;
        if mods.alt {
            x = grid_snap(x, self.config.grid_snap_step);
            y = grid_snap(y, self.config.grid_snap_step);
        }
        let radius = if mods.shift {
            self.config.rack_snap_px / self.viewport.zoom
        } else {
            0.0
        };
        let others = rack_rects(&self.elements, Some(id));
        let result = rack_snap_result(&Rect::new(x, y, rack.width, rack.height), &others, radius);
        if result.blocked {
            trace!(rack = id, "rack move blocked by another rack");
            return;
        }
        let footprint =
            OrientedRect::new(result.x, result.y, rack.width, rack.height, rack.rotation);
        if !is_rack_placement_valid(&footprint, &self.faces, &self.elements) {
            trace!(rack = id, "rack move outside a single room");
            return;
        }
        if let Ok(r) = self.rack_mut(id) {
            r.x = result.x;
            r.y = result.y;
        }
        self.rack_snap_active = result.snapped;
    }

    fn drag_vertex(
        &mut self,
        vertex: &VertexRef,
        peers: &[VertexRef],
        mut point: Point2D,
        mods: Modifiers,
    ) {
        let Some(wall) = self.element(&vertex.element_id).and_then(|e| e.as_wall()) else {
            return;
        };

        if mods.shift {
            if let Some(reference) = orthogonal_reference(wall, vertex.point_index, &point) {
                point = orthogonal(point, reference);
            }
        }

        let radius = self.config.vertex_drag_snap_px / self.viewport.zoom;
        self.snap_target = first_vertex_within(&point, radius, &self.elements, |other| {
            other.id == vertex.element_id || peers.iter().any(|p| p.element_id == other.id)
        });
        if let Some(target) = &self.snap_target {
            point = target.point();
        }

        let scale = self.label_scale();
        for v in std::iter::once(vertex).chain(peers) {
            let wall = self
                .elements
                .iter_mut()
                .find(|e| e.id == v.element_id)
                .and_then(|e| e.as_wall_mut());
            if let Some(w) = wall {
                move_vertex_keeping_closure(w, v.point_index, point, &scale);
            }
        }
    }

    fn wall_tool_preview(&mut self, mut point: Point2D, mods: Modifiers) {
        let Some(&last) = self.preview.active_points.last() else {
            self.preview.clear_indicators();
            match closest_vertex(&point, self.config.vertex_snap_tolerance, &self.elements, &[]) {
                Some(v) => self.preview.vertex_snap = Some(v),
                None => {
                    let tolerance = self.config.edge_snap_tolerance;
                    self.preview.edge_snap = closest_edge_snap(&point, tolerance, &self.elements)
                }
            }
            return;
        };

        if mods.shift {
            point = orthogonal(point, last);
        }
        self.preview.clear_indicators();

        let active = &self.preview.active_points;
        let intersection = check_intersections(&point, active, &self.elements);
        let vertex =
            closest_vertex(&point, self.config.vertex_snap_tolerance, &self.elements, active);

        if let Some(hit) = intersection {
            self.preview.intersection = Some(hit);
            point = hit;
            let radius = self.config.intersection_vertex_radius;
            if let Some(v) = vertex.filter(|v| dist(v, &hit) < radius) {
                self.preview.vertex_snap = Some(v);
                point = v;
            }
        } else if let Some(v) = vertex {
            self.preview.vertex_snap = Some(v);
            point = v;
        } else if let Some(edge) =
            closest_edge_snap(&point, self.config.edge_snap_tolerance, &self.elements)
        {
            point = edge.point();
            self.preview.edge_snap = Some(edge);
        }

        self.preview.cursor = Some(point);
        let scale = self.label_scale();
        self.preview.preview_angles =
            compute_wall_angles(&self.preview.active_points, &scale, None, Some(point));
        self.preview.current_segment_length = dist(&last, &point);
    }

    /// Position the rack under creation at `point` and evaluate whether it
    /// may be dropped there.
    fn update_rack_creation(&mut self, point: Point2D, mods: Modifiers) {
        let Some(rack) = self.creating().and_then(|e| e.as_rack()).cloned() else {
            return;
        };
        let (w, h) = (rack.width, rack.height);
        let step = self.config.grid_snap_step;
        let (x, y) = if mods.alt {
            (grid_snap(point.x - w / 2.0, step), grid_snap(point.y - h / 2.0, step))
        } else {
            (point.x - w / 2.0, point.y - h / 2.0)
        };
        let radius = if mods.shift {
            self.config.rack_snap_px / self.viewport.zoom
        } else {
            0.0
        };
        let others = rack_rects(&self.elements, None);
        let result = rack_snap_result(&Rect::new(x, y, w, h), &others, radius);
        let footprint = OrientedRect::new(result.x, result.y, w, h, rack.rotation);
        let valid = is_rack_placement_valid(&footprint, &self.faces, &self.elements);

        if let DragState::Create(el) = &mut self.drag {
            if let Some(r) = el.as_rack_mut() {
                r.x = result.x;
                r.y = result.y;
            }
        }
        self.rack_snap_active = result.snapped;
        self.rack_creation_blocked = result.blocked || !valid;
    }

    pub fn pointer_up(&mut self, _input: &PointerInput) {
        match std::mem::take(&mut self.drag) {
            DragState::Idle => {
                if self.tool == Tool::Move {
                    self.snap_target = None;
                    self.rack_snap_active = false;
                    self.rederive_all();
                }
            }
            DragState::Pan { .. } => {}
            DragState::Rotate { id, .. } => {
                debug!(rack = %id, "rotated rack");
                self.rederive_all();
                self.events.push(EditorEvent::ElementsChanged);
            }
            DragState::Vertex { vertex, .. } => {
                if let Some(target) = self.snap_target.take() {
                    let scale = self.label_scale();
                    wall_ops::merge_walls(
                        &mut self.elements,
                        &vertex.element_id,
                        vertex.point_index,
                        &target.element_id,
                        target.point_index,
                        &scale,
                    );
                }
                self.finish_move_drag();
            }
            DragState::Wall { .. } | DragState::Rack { .. } | DragState::AllElements { .. } => {
                self.finish_move_drag();
            }
            DragState::Create(el) => self.finish_creation(el),
        }
    }

    fn finish_move_drag(&mut self) {
        self.snap_target = None;
        self.rack_snap_active = false;
        self.rederive_all();
        self.events.push(EditorEvent::ElementsChanged);
    }

    fn finish_creation(&mut self, mut el: MapElement) {
        let blocked = std::mem::take(&mut self.rack_creation_blocked);
        self.rack_snap_active = false;
        if el.is_rack() {
            if blocked {
                debug!("rack creation aborted at a blocked position");
                return;
            }
            let prefix = self
                .rack_template
                .as_ref()
                .map_or(self.config.rack_name_prefix.as_str(), |t| t.model.as_str());
            let name = document::generate_rack_name(&self.elements, prefix);
            if let Some(rack) = el.as_rack_mut() {
                rack.rack_name = Some(name.clone());
            }
            debug!(rack = %el.id, name = %name, "created rack");
            self.events.push(EditorEvent::RackCreated {
                element_id: el.id.clone(),
                rack_name: name,
            });
            self.elements.push(el);
            self.refresh_rooms();
        } else {
            if let ElementKind::Door(door) = &el.kind {
                if door.length() == 0.0 {
                    trace!("dropping zero-length door");
                    return;
                }
            }
            self.elements.push(el);
        }
        self.events.push(EditorEvent::ElementsChanged);
    }

    pub fn double_click(&mut self, input: &PointerInput) {
        if self.tool != Tool::Move {
            return;
        }
        let point = self.doc_point(input);
        let radius = self.config.double_click_vertex_px / self.viewport.zoom;
        let scale = self.label_scale();

        let candidates: Vec<(String, usize)> = self
            .elements
            .iter()
            .filter_map(|el| {
                let pts = el.as_wall()?.points();
                if pts.len() < 2 {
                    return None;
                }
                let i = pts.iter().position(|p| dist(&point, p) < radius)?;
                Some((el.id.clone(), i))
            })
            .collect();
        for (id, index) in candidates {
            if wall_ops::split_at_vertex(&mut self.elements, &id, index, &scale) {
                self.structure_changed();
                return;
            }
        }

        let seg_radius = self.config.segment_hit_radius;
        if let Some((ei, seg)) = first_segment_within(&point, seg_radius, &self.elements) {
            let id = self.elements[ei].id.clone();
            if wall_ops::insert_projected_vertex(&mut self.elements, &id, seg, &point, &scale) {
                self.structure_changed();
            }
        }
    }

    // --- Keyboard ---

    pub fn key_down(&mut self, input: impl Into<KeyInput>) {
        let input = input.into();
        match input.key {
            Key::Escape => {
                if self.tool == Tool::Wall && self.preview.is_drawing() {
                    self.finish_polyline();
                } else {
                    self.cancel_drawing();
                    self.selection = Selection::None;
                }
            }
            Key::Delete | Key::Backspace => self.delete_pressed(),
            Key::Enter => {
                if self.tool == Tool::Wall && self.preview.is_drawing() {
                    self.finish_polyline();
                }
            }
            Key::Char('r' | 'R') if !input.modifiers.ctrl => self.rotate_selected_rack(),
            Key::Char(_) => {}
        }
    }

    fn delete_pressed(&mut self) {
        let scale = self.label_scale();
        if self.tool == Tool::Move {
            if let Some(hover) = self.hovered_vertex.take() {
                let id = &hover.element_id;
                if wall_ops::delete_vertex(&mut self.elements, id, hover.point_index, &scale) {
                    self.structure_changed();
                }
                return;
            }
            if let Selection::Segment(seg) = std::mem::take(&mut self.selection) {
                let id = &seg.element_id;
                if wall_ops::delete_segment(&mut self.elements, id, seg.seg_index, &scale) {
                    self.structure_changed();
                }
                return;
            }
        }
        if !matches!(self.tool, Tool::Select | Tool::Move) {
            return;
        }
        if let Selection::Element { id } = std::mem::take(&mut self.selection) {
            let before = self.elements.len();
            self.elements.retain(|e| e.id != id);
            if self.elements.len() != before {
                debug!(element = %id, "deleted element");
                self.structure_changed();
            }
        }
    }

    fn rotate_selected_rack(&mut self) {
        if self.tool != Tool::Move {
            return;
        }
        let Selection::Element { id } = &self.selection else {
            return;
        };
        let id = id.clone();
        if let Ok(rack) = self.rack_mut(&id) {
            rack.rotation = (rack.rotation + 90.0) % 360.0;
            self.refresh_rooms();
            self.events.push(EditorEvent::ElementsChanged);
        }
    }

    // --- Wall drawing ---

    /// Finish the polyline under construction. With fewer than two points
    /// this just cancels the drawing.
    pub fn finish_polyline(&mut self) {
        let points = std::mem::take(&mut self.preview.active_points);
        self.finish_polyline_with(points);
    }

    fn finish_polyline_with(&mut self, points: Vec<Point2D>) {
        if points.len() > 1 {
            let count = points.len();
            let el = MapElement::new(ElementKind::Wall(Wall::new(points, &self.label_scale())));
            debug!(wall = %el.id, points = count, "finished wall");
            self.elements.push(el);
            self.structure_changed();
        }
        self.cancel_drawing();
    }

    /// Drop any drawing or creation in progress.
    pub fn cancel_drawing(&mut self) {
        if matches!(self.drag, DragState::Create(_) | DragState::Rotate { .. }) {
            self.drag = DragState::Idle;
        }
        self.preview = DrawPreview::default();
        self.hovered_vertex = None;
        self.rack_creation_blocked = false;
        self.rack_snap_active = false;
    }

    // --- Derivation ---

    /// Re-derive every wall at the current zoom, then junction angles and
    /// rooms, and schedule a grid repaint.
    pub fn rederive_all(&mut self) {
        let scale = self.label_scale();
        for wall in self.elements.iter_mut().filter_map(|e| e.as_wall_mut()) {
            wall.rederive(&scale);
        }
        compute_junction_angles(&mut self.elements, &scale);
        self.refresh_rooms();
        self.frame.request();
    }

    /// Recompute room faces and rooms, carrying names over.
    fn refresh_rooms(&mut self) {
        let rooms_cfg = &self.config.rooms;
        self.faces = compute_room_faces(
            self.elements.iter().filter_map(|e| e.as_wall()).map(|w| w.points()),
            rooms_cfg.merge_eps,
        );
        let obstacles: Vec<OrientedRect> = self
            .elements
            .iter()
            .filter_map(|e| e.as_rack())
            .map(|r| r.footprint())
            .collect();
        let mut rooms = compute_rooms(&self.faces, &obstacles, &rooms_cfg.label_options());
        restore_room_names(&mut rooms, &self.rooms, rooms_cfg.name_match_factor);
        self.rooms = rooms;
    }

    fn structure_changed(&mut self) {
        self.rederive_all();
        self.events.push(EditorEvent::ElementsChanged);
    }

    // --- Helpers ---

    fn doc_point(&self, input: &PointerInput) -> Point2D {
        let grid = input.modifiers.alt.then_some(self.config.grid_snap_step);
        self.viewport.screen_to_doc(&input.screen(), grid)
    }

    fn rack_size(&self) -> (f64, f64) {
        match &self.rack_template {
            Some(t) => (
                t.width.max(self.config.min_rack_size),
                t.height.max(self.config.min_rack_size),
            ),
            None => (self.config.default_rack_width, self.config.default_rack_height),
        }
    }

    /// Topmost element under `point`.
    fn element_at(&self, point: &Point2D) -> Option<String> {
        let seg_radius = self.config.segment_hit_radius;
        self.elements
            .iter()
            .rev()
            .find(|el| match &el.kind {
                ElementKind::Rack(r) => r.footprint().contains(point),
                ElementKind::Door(d) => {
                    let (a, b) = (Point2D::new(d.x, d.y), Point2D::new(d.x2, d.y2));
                    dist_to_segment(point, &a, &b) < seg_radius
                }
                ElementKind::Text(t) => {
                    dist(point, &Point2D::new(t.x, t.y)) < self.config.vertex_hit_radius
                }
                ElementKind::Wall(w) => w
                    .points()
                    .windows(2)
                    .any(|s| dist_to_segment(point, &s[0], &s[1]) < seg_radius),
            })
            .map(|el| el.id.clone())
    }

    fn find(&self, id: &str) -> Result<&MapElement> {
        self.element(id).ok_or_else(|| Error::ElementNotFound(id.to_string()))
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut MapElement> {
        self.elements
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| Error::ElementNotFound(id.to_string()))
    }

    fn wall(&self, id: &str) -> Result<&Wall> {
        self.find(id)?.as_wall().ok_or_else(|| Error::WrongElementKind {
            id: id.to_string(),
            expected: "wall",
        })
    }

    fn rack_mut(&mut self, id: &str) -> Result<&mut Rack> {
        self.find_mut(id)?.as_rack_mut().ok_or_else(|| Error::WrongElementKind {
            id: id.to_string(),
            expected: "rack",
        })
    }
}

/// Lock `point` horizontally or vertically to `reference`, whichever axis
/// it is already closer to.
fn orthogonal(point: Point2D, reference: Point2D) -> Point2D {
    let dx = (point.x - reference.x).abs();
    let dy = (point.y - reference.y).abs();
    if dx > dy {
        Point2D::new(point.x, reference.y)
    } else {
        Point2D::new(reference.x, point.y)
    }
}

/// Neighbour of vertex `index` closest to `point`; on a closed wall the
/// neighbours of the seam wrap around.
fn orthogonal_reference(wall: &Wall, index: usize, point: &Point2D) -> Option<Point2D> {
    let pts = wall.points();
    let n = pts.len();
    let closed = wall.ends_meet();
    let prev = if index > 0 {
        Some(index - 1)
    } else {
        closed.then_some(n - 2)
    };
    let next = if index + 1 < n { Some(index + 1) } else { closed.then_some(1) };
    let pick = match (prev, next) {
        (Some(p), Some(q)) => {
            if dist(point, &pts[p]) < dist(point, &pts[q]) {
                p
            } else {
                q
            }
        }
        (p, q) => p.or(q)?,
    };
    pts.get(pick).copied()
}

/// Set vertex `index` to `point`; on a closed wall moving either seam
/// vertex moves the other with it.
fn move_vertex_keeping_closure(wall: &mut Wall, index: usize, point: Point2D, scale: &LabelScale) {
    let closed = wall.ends_meet();
    wall.edit_points(scale, |pts| {
        let n = pts.len();
        if index >= n {
            return;
        }
        pts[index] = point;
        if closed {
            if index == 0 {
                pts[n - 1] = point;
            } else if index == n - 1 {
                pts[0] = point;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const SQUARE: &[(f64, f64)] = &[
        (0.0, 0.0),
        (100.0, 0.0),
        (100.0, 100.0),
        (0.0, 100.0),
        (0.0, 0.0),
    ];

    fn p(x: f64, y: f64) -> Point2D {
        Point2D::new(x, y)
    }

    fn editor_with_walls(walls: &[&[(f64, f64)]]) -> Editor {
        let scale = LabelScale::default();
        let elements = walls
            .iter()
            .enumerate()
            .map(|(i, pts)| {
                let points = pts.iter().map(|&(x, y)| p(x, y)).collect();
                MapElement::with_id(format!("w{i}"), ElementKind::Wall(Wall::new(points, &scale)))
            })
            .collect();
        Editor::with_elements(EditorConfig::default(), elements)
    }

    fn click(editor: &mut Editor, x: f64, y: f64) {
        editor.pointer_down(&PointerInput::at(x, y));
        editor.pointer_up(&PointerInput::at(x, y));
    }

    #[test]
    fn orthogonal_locks_dominant_axis() {
        assert_eq!(orthogonal(p(100.0, 7.0), p(0.0, 0.0)), p(100.0, 0.0));
        assert_eq!(orthogonal(p(3.0, 50.0), p(0.0, 0.0)), p(0.0, 50.0));
    }

    #[test]
    fn orthogonal_reference_wraps_on_closed_walls() {
        let scale = LabelScale::default();
        let wall = Wall::new(
            vec![p(0.0, 0.0), p(100.0, 0.0), p(100.0, 100.0), p(0.0, 100.0), p(0.0, 0.0)],
            &scale,
        );
        // Neighbours of the seam are (0, 100) and (100, 0)
        assert_eq!(orthogonal_reference(&wall, 0, &p(10.0, 90.0)), Some(p(0.0, 100.0)));
        assert_eq!(orthogonal_reference(&wall, 4, &p(90.0, 10.0)), Some(p(100.0, 0.0)));

        let open = Wall::new(vec![p(0.0, 0.0), p(100.0, 0.0)], &scale);
        assert_eq!(orthogonal_reference(&open, 0, &p(0.0, 0.0)), Some(p(100.0, 0.0)));
    }

    #[test]
    fn wall_tool_draws_polyline_and_escape_finishes() {
        let mut editor = Editor::default();
        editor.set_tool(Tool::Wall);
        click(&mut editor, 0.0, 0.0);
        click(&mut editor, 200.0, 0.0);
        click(&mut editor, 200.0, 100.0);
        assert_eq!(editor.preview().active_points.len(), 3);
        assert_eq!(editor.preview().active_segments.len(), 2);
        editor.key_down(Key::Escape);

        assert!(!editor.preview().is_drawing());
        assert_eq!(editor.elements().len(), 1);
        assert_eq!(editor.elements()[0].as_wall().unwrap().points().len(), 3);
        assert!(editor.take_events().contains(&EditorEvent::ElementsChanged));
    }

    #[test]
    fn escape_after_single_point_creates_nothing() {
        let mut editor = Editor::default();
        editor.set_tool(Tool::Wall);
        click(&mut editor, 0.0, 0.0);
        editor.key_down(Key::Escape);
        assert!(editor.elements().is_empty());
        assert!(!editor.preview().is_drawing());
        assert!(editor.take_events().is_empty());
    }

    #[test]
    fn two_point_polyline_does_not_close_on_start() {
        let mut editor = Editor::default();
        editor.set_tool(Tool::Wall);
        click(&mut editor, 0.0, 0.0);
        click(&mut editor, 100.0, 0.0);
        click(&mut editor, 2.0, 2.0);

        // Snapped onto the start vertex but still drawing
        assert!(editor.elements().is_empty());
        let drawn = vec![p(0.0, 0.0), p(100.0, 0.0), p(0.0, 0.0)];
        assert_eq!(editor.preview().active_points, drawn);

        editor.key_down(Key::Escape);
        assert_eq!(editor.elements().len(), 1);
        assert!(!editor.elements()[0].as_wall().unwrap().is_closed());
        assert!(editor.rooms().is_empty());
    }

    #[test]
    fn shift_click_draws_orthogonal_segment() {
        let mut editor = Editor::default();
        editor.set_tool(Tool::Wall);
        click(&mut editor, 0.0, 0.0);
        editor.pointer_down(&PointerInput::at(300.0, 12.0).with_shift());
        assert_eq!(editor.preview().active_points[1], p(300.0, 0.0));
    }

    #[test]
    fn preview_tracks_cursor_length_and_angle() {
        let mut editor = Editor::default();
        editor.set_tool(Tool::Wall);
        click(&mut editor, 0.0, 0.0);
        click(&mut editor, 100.0, 0.0);
        editor.pointer_move(&PointerInput::at(100.0, 60.0));
        let preview = editor.preview();
        assert_eq!(preview.cursor, Some(p(100.0, 60.0)));
        assert_abs_diff_eq!(preview.current_segment_length, 60.0);
        assert_eq!(preview.preview_angles.len(), 1);
        assert_abs_diff_eq!(preview.preview_angles[0].angle, 90.0);
    }

    #[test]
    fn preview_snaps_to_crossing() {
        let mut editor = editor_with_walls(&[&[(50.0, -100.0), (50.0, 100.0)]]);
        editor.set_tool(Tool::Wall);
        click(&mut editor, 0.0, 0.0);
        editor.pointer_move(&PointerInput::at(100.0, 0.0));
        assert_eq!(editor.preview().intersection, Some(p(50.0, 0.0)));
        assert_eq!(editor.preview().cursor, Some(p(50.0, 0.0)));
    }

    #[test]
    fn first_click_on_wall_edge_splits_that_wall() {
        let mut editor = editor_with_walls(&[&[(0.0, 0.0), (200.0, 0.0)]]);
        editor.set_tool(Tool::Wall);
        click(&mut editor, 80.0, 6.0);
        assert_eq!(editor.preview().active_points, vec![p(80.0, 0.0)]);
        let wall = editor.element("w0").unwrap().as_wall().unwrap();
        assert_eq!(wall.points(), &[p(0.0, 0.0), p(80.0, 0.0), p(200.0, 0.0)]);
    }

    #[test]
    fn clicking_across_a_wall_stops_at_the_crossing() {
        let mut editor = editor_with_walls(&[&[(50.0, -100.0), (50.0, 100.0)]]);
        editor.set_tool(Tool::Wall);
        click(&mut editor, 0.0, 0.0);
        click(&mut editor, 100.0, 0.0);
        assert_eq!(editor.preview().active_points[1], p(50.0, 0.0));
        let crossed = editor.element("w0").unwrap().as_wall().unwrap();
        assert_eq!(crossed.points().len(), 3);
    }

    #[test]
    fn move_tool_drags_vertex_with_junction_peer() {
        let mut editor = editor_with_walls(&[
            &[(0.0, 0.0), (100.0, 0.0)],
            &[(100.0, 0.0), (100.0, 100.0)],
        ]);
        editor.set_tool(Tool::Move);
        editor.pointer_down(&PointerInput::at(101.0, 1.0));
        editor.pointer_move(&PointerInput::at(150.0, 20.0));
        editor.pointer_up(&PointerInput::at(150.0, 20.0));

        let a = editor.element("w0").unwrap().as_wall().unwrap();
        let b = editor.element("w1").unwrap().as_wall().unwrap();
        assert_eq!(a.points()[1], p(150.0, 20.0));
        assert_eq!(b.points()[0], p(150.0, 20.0));
    }

    #[test]
    fn dragging_vertex_onto_other_wall_end_merges() {
        let mut editor = editor_with_walls(&[
            &[(0.0, 0.0), (100.0, 0.0)],
            &[(200.0, 0.0), (200.0, 100.0)],
        ]);
        editor.set_tool(Tool::Move);
        editor.pointer_down(&PointerInput::at(100.0, 0.0));
        editor.pointer_move(&PointerInput::at(195.0, 4.0));
        assert_eq!(editor.snap_target().map(|t| t.element_id.as_str()), Some("w1"));
        editor.pointer_up(&PointerInput::at(195.0, 4.0));

        assert_eq!(editor.elements().len(), 1);
        let merged = editor.elements()[0].as_wall().unwrap();
        assert_eq!(merged.points(), &[p(0.0, 0.0), p(200.0, 0.0), p(200.0, 100.0)]);
    }

    #[test]
    fn dragging_seam_vertex_keeps_loop_closed() {
        let mut editor = editor_with_walls(&[SQUARE]);
        editor.set_tool(Tool::Move);
        editor.pointer_down(&PointerInput::at(0.0, 0.0));
        editor.pointer_move(&PointerInput::at(-20.0, -10.0));
        editor.pointer_up(&PointerInput::at(-20.0, -10.0));
        let wall = editor.element("w0").unwrap().as_wall().unwrap();
        assert_eq!(wall.points()[0], p(-20.0, -10.0));
        assert_eq!(wall.points()[4], p(-20.0, -10.0));
        assert_eq!(editor.rooms().len(), 1);
    }

    #[test]
    fn wall_body_drag_moves_everything_and_ctrl_moves_one() {
        let mut editor = editor_with_walls(&[
            &[(0.0, 0.0), (100.0, 0.0)],
            &[(0.0, 200.0), (100.0, 200.0)],
        ]);
        editor.set_tool(Tool::Move);
        editor.pointer_down(&PointerInput::at(50.0, 3.0));
        editor.pointer_move(&PointerInput::at(60.0, 13.0));
        editor.pointer_up(&PointerInput::at(60.0, 13.0));
        assert_eq!(editor.element("w1").unwrap().as_wall().unwrap().points()[0], p(10.0, 210.0));

        editor.pointer_down(&PointerInput::at(60.0, 13.0).with_ctrl());
        editor.pointer_move(&PointerInput::at(60.0, 33.0).with_ctrl());
        editor.pointer_up(&PointerInput::at(60.0, 33.0));
        assert_eq!(editor.element("w0").unwrap().as_wall().unwrap().points()[0], p(10.0, 30.0));
        assert_eq!(editor.element("w1").unwrap().as_wall().unwrap().points()[0], p(10.0, 210.0));
    }

    #[test]
    fn hover_and_delete_vertex() {
        let mut editor = editor_with_walls(&[&[(0.0, 0.0), (100.0, 0.0), (200.0, 50.0)]]);
        editor.set_tool(Tool::Move);
        editor.pointer_move(&PointerInput::at(99.0, 2.0));
        assert_eq!(editor.hovered_vertex().map(|h| h.point_index), Some(1));
        editor.key_down(Key::Delete);
        let wall = editor.element("w0").unwrap().as_wall().unwrap();
        assert_eq!(wall.points(), &[p(0.0, 0.0), p(200.0, 50.0)]);
        assert!(editor.hovered_vertex().is_none());
    }

    #[test]
    fn selected_middle_segment_delete_splits_wall() {
        let mut editor =
            editor_with_walls(&[&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (200.0, 100.0)]]);
        editor.set_tool(Tool::Move);
        click(&mut editor, 100.0, 50.0);
        assert_eq!(
            editor.selection(),
            &Selection::Segment(SegmentRef {
                element_id: "w0".into(),
                seg_index: 1
            })
        );
        editor.key_down(Key::Backspace);
        assert_eq!(editor.elements().len(), 2);
        assert_eq!(editor.selection(), &Selection::None);
    }

    #[test]
    fn double_click_inserts_vertex_on_segment() {
        let mut editor = editor_with_walls(&[&[(0.0, 0.0), (100.0, 0.0)]]);
        editor.set_tool(Tool::Move);
        editor.double_click(&PointerInput::at(40.0, 5.0));
        let wall = editor.element("w0").unwrap().as_wall().unwrap();
        assert_eq!(wall.points(), &[p(0.0, 0.0), p(40.0, 0.0), p(100.0, 0.0)]);
    }

    #[test]
    fn double_click_interior_vertex_splits_wall() {
        let mut editor = editor_with_walls(&[&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)]]);
        editor.set_tool(Tool::Move);
        editor.double_click(&PointerInput::at(102.0, 1.0));
        assert_eq!(editor.elements().len(), 2);
        assert_eq!(
            editor.elements()[1].as_wall().unwrap().points(),
            &[p(100.0, 0.0), p(100.0, 100.0)]
        );
    }

    #[test]
    fn double_click_outside_move_tool_is_ignored() {
        let mut editor = editor_with_walls(&[&[(0.0, 0.0), (100.0, 0.0)]]);
        editor.double_click(&PointerInput::at(40.0, 5.0));
        assert_eq!(editor.elements()[0].as_wall().unwrap().points().len(), 2);
    }

    #[test]
    fn door_drag_creates_door_and_zero_length_is_dropped() {
        let mut editor = Editor::default();
        editor.set_tool(Tool::Door);
        editor.pointer_down(&PointerInput::at(10.0, 10.0));
        editor.pointer_up(&PointerInput::at(10.0, 10.0));
        assert!(editor.elements().is_empty());

        editor.pointer_down(&PointerInput::at(10.0, 10.0));
        editor.pointer_move(&PointerInput::at(90.0, 10.0));
        assert!(editor.creating().is_some());
        editor.pointer_up(&PointerInput::at(90.0, 10.0));
        assert_eq!(editor.elements().len(), 1);
        let ElementKind::Door(door) = &editor.elements()[0].kind else {
            panic!("expected a door");
        };
        assert_eq!((door.x2, door.y2), (90.0, 10.0));
    }

    #[test]
    fn text_tool_places_default_label() {
        let mut editor = Editor::default();
        editor.set_tool(Tool::Text);
        editor.pointer_down(&PointerInput::at(30.0, 40.0));
        let id = editor.elements()[0].id.clone();
        editor.set_text(&id, "Cold aisle").unwrap();
        let ElementKind::Text(label) = &editor.elements()[0].kind else {
            panic!("expected text");
        };
        assert_eq!(label.text, "Cold aisle");
        assert_eq!((label.x, label.y), (30.0, 40.0));
    }

    #[test]
    fn rack_tool_creates_named_racks() {
        let mut editor = Editor::default();
        editor.set_tool(Tool::Rack);
        click(&mut editor, 100.0, 100.0);
        click(&mut editor, 300.0, 100.0);
        let names: Vec<_> = editor
            .elements()
            .iter()
            .filter_map(|e| e.as_rack()?.rack_name.clone())
            .collect();
        assert_eq!(names, vec!["Rack-1", "Rack-2"]);
        let first = editor.elements()[0].as_rack().unwrap();
        assert_eq!(
            (first.x, first.y, first.width, first.height),
            (70.0, 50.0, 60.0, 100.0)
        );
        let events = editor.take_events();
        assert!(events.iter().any(|e| matches!(
            e,
            EditorEvent::RackCreated { rack_name, .. } if rack_name == "Rack-2"
        )));
    }

    #[test]
    fn rack_creation_on_top_of_another_is_aborted() {
        let mut editor = Editor::default();
        editor.set_tool(Tool::Rack);
        click(&mut editor, 100.0, 100.0);
        editor.pointer_down(&PointerInput::at(110.0, 110.0));
        assert!(editor.rack_creation_blocked());
        editor.pointer_up(&PointerInput::at(110.0, 110.0));
        assert_eq!(editor.elements().len(), 1);
    }

    #[test]
    fn rack_template_sets_size_and_prefix() {
        let mut editor = Editor::default();
        editor.set_rack_template(Some(RackTemplate {
            model: "APC-42U".into(),
            width: 4.0,
            height: 120.0,
        }));
        editor.set_tool(Tool::Rack);
        click(&mut editor, 100.0, 100.0);
        let rack = editor.elements()[0].as_rack().unwrap();
        assert_eq!((rack.width, rack.height), (10.0, 120.0));
        assert_eq!(rack.rack_name.as_deref(), Some("APC-42U-1"));
    }

    #[test]
    fn r_rotates_selected_rack_in_move_tool() {
        let mut editor = Editor::default();
        editor.set_tool(Tool::Rack);
        click(&mut editor, 100.0, 100.0);
        editor.set_tool(Tool::Move);
        click(&mut editor, 100.0, 100.0);
        editor.key_down(KeyInput::new(Key::Char('r')).with_ctrl());
        assert_eq!(editor.elements()[0].as_rack().unwrap().rotation, 0.0);
        for _ in 0..4 {
            editor.key_down(Key::Char('r'));
        }
        assert_eq!(editor.elements()[0].as_rack().unwrap().rotation, 0.0);
        editor.key_down(Key::Char('R'));
        assert_eq!(editor.elements()[0].as_rack().unwrap().rotation, 90.0);
    }

    #[test]
    fn rotation_handle_follows_pointer_and_snaps_with_shift() {
        let mut editor = Editor::default();
        editor.set_tool(Tool::Rack);
        click(&mut editor, 100.0, 100.0);
        let id = editor.elements()[0].id.clone();
        // Handle grabbed straight above the centre
        editor.begin_rotation(&id, &PointerInput::at(100.0, 0.0)).unwrap();
        editor.pointer_move(&PointerInput::at(200.0, 100.0));
        assert_abs_diff_eq!(editor.elements()[0].as_rack().unwrap().rotation, 90.0, epsilon = 1e-9);
        editor.pointer_move(&PointerInput::at(200.0, 90.0).with_shift());
        assert_abs_diff_eq!(editor.elements()[0].as_rack().unwrap().rotation, 90.0, epsilon = 1e-9);
        editor.pointer_up(&PointerInput::at(200.0, 90.0));
        assert_eq!(editor.drag_state(), &DragState::Idle);
    }

    #[test]
    fn rack_move_snaps_with_shift() {
        let mut editor = Editor::default();
        editor.set_tool(Tool::Rack);
        click(&mut editor, 130.0, 50.0);
        click(&mut editor, 230.0, 50.0);
        editor.set_tool(Tool::Move);
        // Second rack spans x 200..260; drag it left by 37 to x = 163
        editor.pointer_down(&PointerInput::at(230.0, 50.0));
        editor.pointer_move(&PointerInput::at(193.0, 50.0).with_shift());
        let rack = editor.elements()[1].as_rack().unwrap();
        assert_abs_diff_eq!(rack.x, 160.0);
        assert!(editor.rack_snap_active());
        editor.pointer_up(&PointerInput::at(193.0, 50.0));
    }

    #[test]
    fn rack_move_into_another_rack_is_rejected() {
        let mut editor = Editor::default();
        editor.set_tool(Tool::Rack);
        click(&mut editor, 130.0, 50.0);
        click(&mut editor, 230.0, 50.0);
        editor.set_tool(Tool::Move);
        editor.pointer_down(&PointerInput::at(230.0, 50.0));
        editor.pointer_move(&PointerInput::at(150.0, 50.0));
        assert_eq!(editor.elements()[1].as_rack().unwrap().x, 200.0);
    }

    #[test]
    fn wheel_zoom_rederives_labels() {
        let mut editor = editor_with_walls(&[&[(0.0, 0.0), (100.0, 0.0)]]);
        let before = editor.elements()[0].as_wall().unwrap().segments()[0].label_y;
        editor.wheel(-1.0, p(0.0, 0.0));
        assert_abs_diff_eq!(editor.zoom(), 1.1);
        let after = editor.elements()[0].as_wall().unwrap().segments()[0].label_y;
        assert_abs_diff_eq!(after, before / 1.1, epsilon = 1e-12);
        assert!(editor.animation_frame());
        assert!(!editor.animation_frame());
    }

    #[test]
    fn select_tool_pans_on_background() {
        let mut editor = Editor::default();
        editor.pointer_down(&PointerInput::at(100.0, 100.0));
        editor.pointer_move(&PointerInput::at(130.0, 80.0));
        editor.pointer_up(&PointerInput::at(130.0, 80.0));
        assert_eq!((editor.viewport().pan_x, editor.viewport().pan_y), (30.0, -20.0));
    }

    #[test]
    fn select_and_delete_element() {
        let mut editor = editor_with_walls(&[&[(0.0, 0.0), (100.0, 0.0)]]);
        editor.pointer_down(&PointerInput::at(50.0, 2.0));
        assert_eq!(editor.selection(), &Selection::Element { id: "w0".into() });
        editor.key_down(Key::Delete);
        assert!(editor.elements().is_empty());
    }

    #[test]
    fn rename_rack_trims_and_reports() {
        let mut editor = Editor::default();
        editor.set_tool(Tool::Rack);
        click(&mut editor, 100.0, 100.0);
        editor.take_events();
        let id = editor.elements()[0].id.clone();
        assert!(!editor.rename_rack(&id, "   ").unwrap());
        assert!(!editor.rename_rack(&id, "Rack-1").unwrap());
        assert!(editor.rename_rack(&id, "  A01 ").unwrap());
        assert_eq!(
            editor.take_events()[0],
            EditorEvent::RackRenamed {
                element_id: id.clone(),
                old: Some("Rack-1".into()),
                new: "A01".into()
            }
        );
        assert!(matches!(editor.rename_rack("nope", "x"), Err(Error::ElementNotFound(_))));
    }

    #[test]
    fn room_names_set_and_cleared() {
        let mut editor = editor_with_walls(&[SQUARE]);
        editor.set_room_name(0, "  Hall A ").unwrap();
        assert_eq!(editor.rooms()[0].name.as_deref(), Some("Hall A"));
        editor.set_room_name(0, "").unwrap();
        assert_eq!(editor.rooms()[0].name, None);
        assert!(matches!(editor.set_room_name(5, "x"), Err(Error::RoomNotFound(5))));
    }
}
