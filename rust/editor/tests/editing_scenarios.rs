// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end editing sessions driven through pointer and key input.

use approx::assert_abs_diff_eq;
use dcim_floorplan_editor::{
    Editor, EditorConfig, EditorEvent, ElementKind, Key, PointerInput, Tool, UnplacedRack,
};

const U_SHAPE: &str = r#"[
    {"id": "u", "type": "wall", "points": [
        {"x": 0, "y": 0}, {"x": 100, "y": 0}, {"x": 100, "y": 200}, {"x": 200, "y": 200},
        {"x": 200, "y": 0}, {"x": 300, "y": 0}, {"x": 300, "y": 300}, {"x": 0, "y": 300},
        {"x": 0, "y": 0}
    ]}
]"#;

fn click(editor: &mut Editor, x: f64, y: f64) {
    editor.pointer_down(&PointerInput::at(x, y));
    editor.pointer_up(&PointerInput::at(x, y));
}

fn drag(editor: &mut Editor, from: (f64, f64), to: (f64, f64)) {
    editor.pointer_down(&PointerInput::at(from.0, from.1));
    editor.pointer_move(&PointerInput::at(to.0, to.1));
    editor.pointer_up(&PointerInput::at(to.0, to.1));
}

/// Draw a 400 x 300 room with the wall tool, closing on the start point.
fn draw_hall() -> Editor {
    let mut editor = Editor::new(EditorConfig::default());
    editor.set_tool(Tool::Wall);
    for (x, y) in [(0.0, 0.0), (400.0, 0.0), (400.0, 300.0), (0.0, 300.0), (2.0, 3.0)] {
        click(&mut editor, x, y);
    }
    editor
}

#[test]
fn closing_a_polyline_creates_a_room() {
    let mut editor = draw_hall();
    assert_eq!(editor.elements().len(), 1);
    let wall = editor.elements()[0].as_wall().unwrap();
    assert!(wall.is_closed());
    assert_eq!(wall.points().len(), 5);
    assert_abs_diff_eq!(wall.area().unwrap(), 120_000.0, epsilon = 1e-6);
    assert_eq!(wall.angles().len(), 4);

    assert_eq!(editor.rooms().len(), 1);
    assert_abs_diff_eq!(editor.rooms()[0].cx, 200.0, epsilon = 1.0);
    assert_abs_diff_eq!(editor.rooms()[0].cy, 150.0, epsilon = 1.0);
    assert!(editor.take_events().contains(&EditorEvent::ElementsChanged));
    assert!(!editor.preview().is_drawing());
}

#[test]
fn room_name_survives_vertex_drag() {
    let mut editor = draw_hall();
    editor.set_room_name(0, "Hall A").unwrap();

    editor.set_tool(Tool::Move);
    drag(&mut editor, (400.0, 300.0), (420.0, 300.0));

    let wall = editor.elements()[0].as_wall().unwrap();
    assert_eq!(wall.points()[2].x, 420.0);
    assert_eq!(editor.rooms().len(), 1);
    assert_eq!(editor.rooms()[0].name.as_deref(), Some("Hall A"));
}

#[test]
fn wall_across_a_room_splits_it_in_two() {
    let mut editor = draw_hall();
    editor.set_room_name(0, "Hall A").unwrap();

    // Starts just off the top wall and crosses the bottom wall
    click(&mut editor, 200.0, -5.0);
    click(&mut editor, 200.0, 305.0);
    assert_eq!(editor.preview().active_points.len(), 2);
    assert_eq!(editor.preview().active_points[1].y, 300.0);
    editor.key_down(Key::Enter);

    assert_eq!(editor.elements().len(), 2);
    let hall = editor.elements()[0].as_wall().unwrap();
    assert_eq!(hall.points().len(), 7);

    let rooms = editor.rooms();
    assert_eq!(rooms.len(), 2);
    for room in rooms {
        assert_abs_diff_eq!(room.area, 60_000.0, epsilon = 1e-6);
    }
    // Both halves lie within reach of the old label point
    assert!(rooms.iter().all(|r| r.name.as_deref() == Some("Hall A")));
}

#[test]
fn racks_are_kept_inside_the_u_shape() {
    let mut editor = Editor::new(EditorConfig::default());
    editor.load_document(U_SHAPE).unwrap();
    assert_eq!(editor.rooms().len(), 1);

    editor.set_tool(Tool::Rack);
    // Centred over the notch between the arms
    editor.pointer_down(&PointerInput::at(150.0, 165.0));
    assert!(editor.rack_creation_blocked());
    editor.pointer_up(&PointerInput::at(150.0, 165.0));
    assert_eq!(editor.elements().len(), 1);

    click(&mut editor, 50.0, 150.0);
    assert_eq!(editor.elements().len(), 2);
    let rack = editor.elements()[1].as_rack().unwrap();
    assert_eq!((rack.x, rack.y), (20.0, 100.0));

    // Dragging it over the notch leaves it where it was
    editor.set_tool(Tool::Move);
    drag(&mut editor, (50.0, 150.0), (150.0, 150.0));
    assert_eq!(editor.elements()[1].as_rack().unwrap().x, 20.0);

    // A small move inside the arm is fine
    drag(&mut editor, (50.0, 150.0), (50.0, 180.0));
    assert_eq!(editor.elements()[1].as_rack().unwrap().y, 130.0);
}

#[test]
fn document_round_trip_keeps_elements_and_writes_derived_data() {
    let json = r#"[
        {"id": "w", "type": "wall", "points": [{"x": 0, "y": 0}, {"x": 500, "y": 0}]},
        {"id": "r", "type": "rack", "x": 10, "y": 10, "width": 60, "height": 100,
         "rackName": "A01"},
        {"id": "d", "type": "door", "x": 100, "y": 0, "x2": 180, "y2": 0},
        {"id": "t", "type": "text", "x": 250, "y": 40, "text": "Cold aisle"}
    ]"#;
    let mut editor = Editor::new(EditorConfig::default());
    editor.load_document(json).unwrap();
    assert_eq!(editor.elements()[0].as_wall().unwrap().segments().len(), 1);

    let saved = editor.save_document().unwrap();
    assert!(saved.contains("\"segments\""));
    assert!(saved.contains("\"rackName\": \"A01\""));

    let mut reloaded = Editor::new(EditorConfig::default());
    reloaded.load_document(&saved).unwrap();
    assert_eq!(reloaded.elements(), editor.elements());
    let ElementKind::Text(label) = &reloaded.elements()[3].kind else {
        panic!("expected text");
    };
    assert_eq!(label.text, "Cold aisle");
}

#[test]
fn fit_to_view_rescales_label_offsets() {
    let mut editor = draw_hall();
    editor.fit_to_view();
    let zoom = editor.zoom();
    assert_abs_diff_eq!(zoom, 680.0 / 300.0, epsilon = 1e-12);

    let wall = editor.elements()[0].as_wall().unwrap();
    let top = &wall.segments()[0];
    assert_abs_diff_eq!(top.length, 400.0);
    assert_abs_diff_eq!(top.label_y.abs(), 16.0 / zoom, epsilon = 1e-9);

    editor.reset_zoom();
    let top = &editor.elements()[0].as_wall().unwrap().segments()[0];
    assert_abs_diff_eq!(top.label_y.abs(), 16.0, epsilon = 1e-9);
}

#[test]
fn unplaced_inventory_racks_are_injected_once() {
    let mut editor = Editor::new(EditorConfig::default());
    let inventory = [UnplacedRack {
        name: "B07".into(),
        width: 60.0,
        height: 100.0,
    }];
    assert_eq!(editor.inject_unplaced_racks(&inventory), 1);
    assert_eq!(editor.inject_unplaced_racks(&inventory), 0);
    assert_eq!(editor.elements()[0].as_rack().unwrap().rack_name.as_deref(), Some("B07"));
}
