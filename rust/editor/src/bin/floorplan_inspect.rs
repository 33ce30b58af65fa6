// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: load a floor plan document, derive walls and rooms, and print
//! a JSON summary.
//!
//! Usage:
//!   floorplan-inspect <document.json> [--config <config.json>] [--zoom <z>]
//!
//! Logs go to stderr; set `RUST_LOG=dcim_floorplan_editor=debug` for detail.

use dcim_floorplan_editor::{Editor, EditorConfig, ElementKind, Error, Result};
use serde_json::json;
use std::env;
use std::fs;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    let document_path = &args[1];
    let mut config_path: Option<String> = None;
    let mut zoom: Option<f64> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                config_path = Some(option_value(args, i, "--config")?.to_string());
            }
            "--zoom" => {
                i += 1;
                let value = option_value(args, i, "--zoom")?;
                zoom = Some(
                    value
                        .parse()
                        .map_err(|_| Error::InvalidConfig(format!("invalid zoom value: {value}")))?,
                );
            }
            other => {
                print_usage();
                return Err(Error::InvalidConfig(format!("unknown option: {other}")));
            }
        }
        i += 1;
    }

    let config = match &config_path {
        Some(path) => EditorConfig::from_path(path)?,
        None => EditorConfig::default(),
    };
    tracing::info!(document = %document_path, config = ?config_path, "inspecting floor plan");

    let json = fs::read_to_string(document_path)?;
    let mut editor = Editor::new(config);
    editor.load_document(&json)?;
    if let Some(z) = zoom {
        editor.apply_zoom(z, None);
    }

    let mut walls = 0;
    let mut closed_walls = 0;
    let mut racks = 0;
    let mut doors = 0;
    let mut texts = 0;
    for el in editor.elements() {
        match &el.kind {
            ElementKind::Wall(w) => {
                walls += 1;
                if w.is_closed() {
                    closed_walls += 1;
                }
            }
            ElementKind::Rack(_) => racks += 1,
            ElementKind::Door(_) => doors += 1,
            ElementKind::Text(_) => texts += 1,
        }
    }

    let rooms: Vec<_> = editor
        .rooms()
        .iter()
        .map(|r| {
            json!({
                "name": r.name,
                "area": r.area,
                "labelX": r.cx,
                "labelY": r.cy,
            })
        })
        .collect();

    let summary = json!({
        "zoom": editor.zoom(),
        "elements": {
            "walls": walls,
            "closedWalls": closed_walls,
            "racks": racks,
            "doors": doors,
            "texts": texts,
        },
        "rooms": rooms,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn option_value<'a>(args: &'a [String], i: usize, name: &str) -> Result<&'a str> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| Error::InvalidConfig(format!("{name} needs a value")))
}

fn print_usage() {
    eprintln!("Usage: floorplan-inspect <document.json> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>   Editor configuration (JSON)");
    eprintln!("  --zoom <z>        Zoom used for label offsets (default 1)");
    eprintln!("  -h, --help        Show this help");
}
