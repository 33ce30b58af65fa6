// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # DCIM Floor Plan Editor
//!
//! Core of an interactive 2D floor plan editor for data halls: walls drawn
//! as polylines, racks placed inside rooms, doors and text labels.
//!
//! The [`Editor`] consumes pointer and keyboard input in screen pixels and
//! keeps a document of [`MapElement`]s together with everything derived
//! from it: per-segment length labels, interior and junction angles, and
//! the rooms enclosed by the wall network. Rendering is left to the host.
//!
//! ## Quick Start
//!
//! ```rust
//! use dcim_floorplan_editor::{Editor, EditorConfig, EditorEvent, PointerInput, Tool};
//!
//! let mut editor = Editor::new(EditorConfig::default());
//! editor.set_tool(Tool::Wall);
//! for (x, y) in [(0.0, 0.0), (400.0, 0.0), (400.0, 300.0), (0.0, 300.0), (2.0, 3.0)] {
//!     editor.pointer_down(&PointerInput::at(x, y));
//!     editor.pointer_up(&PointerInput::at(x, y));
//! }
//! // The last click landed on the start point and closed the loop
//! assert_eq!(editor.rooms().len(), 1);
//! assert!(editor.take_events().contains(&EditorEvent::ElementsChanged));
//! ```
//!
//! ## Modules
//!
//! - [`model`]: element types and their JSON shape
//! - [`wall_display`]: segment, angle and junction labels
//! - [`snap`]: vertex, edge and crossing snaps while drawing
//! - [`rack_snap`] and [`placement`]: rack snapping and placement rules
//! - [`wall_ops`]: merge, split and delete on wall polylines
//! - [`viewport`]: zoom, pan and the background grid

pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod input;
pub mod model;
pub mod placement;
pub mod rack_snap;
pub mod snap;
pub mod viewport;
pub mod wall_display;
pub mod wall_ops;

pub use config::{EditorConfig, RoomDetectionConfig};
pub use document::{generate_rack_name, parse_elements, to_json, UnplacedRack};
pub use editor::{DragState, DrawPreview, Editor, EditorEvent, RackTemplate, Selection, Tool};
pub use error::{Error, Result};
pub use input::{Key, KeyInput, Modifiers, PointerButton, PointerInput};
pub use model::{
    AngleLabel, Door, EdgeSnap, ElementKind, MapElement, Rack, SegmentRef, TextLabel, VertexHit,
    VertexRef, Wall, WallSegment,
};
pub use placement::is_rack_placement_valid;
pub use rack_snap::{rack_rects, rack_snap_result, RackSnap};
pub use viewport::{FrameGuard, GridPaths, GridPattern, Viewport};
pub use wall_display::LabelScale;

pub use dcim_floorplan_geometry::Point2D;
pub use dcim_floorplan_topology::Room;
