// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor plan documents: a JSON array of elements.
//!
//! Loading is lenient per element: entries that do not parse, or walls with
//! fewer than two points, are dropped with a warning instead of failing the
//! whole document. Only a document that is not a JSON array is an error.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{ElementKind, MapElement, Rack};

/// Parse a document. Wall display data is not derived here.
pub fn parse_elements(json: &str) -> Result<Vec<MapElement>> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let total = raw.len();
    let mut elements = Vec::with_capacity(total);
    let mut ids: FxHashSet<String> = FxHashSet::default();

    for (index, value) in raw.into_iter().enumerate() {
        let mut el = match serde_json::from_value::<MapElement>(value) {
            Ok(el) => el,
            Err(err) => {
                warn!(index, error = %err, "dropping unreadable element");
                continue;
            }
        };
        if let Some(wall) = el.as_wall() {
            if wall.points().len() < 2 {
                warn!(index, id = %el.id, "dropping wall with fewer than two points");
                continue;
            }
        }
        if !ids.insert(el.id.clone()) {
            let fresh = crate::model::new_element_id();
            warn!(index, id = %el.id, new_id = %fresh, "duplicate element id replaced");
            el.id = fresh.clone();
            ids.insert(fresh);
        }
        elements.push(el);
    }
    debug!(total, kept = elements.len(), "parsed floor plan document");
    Ok(elements)
}

/// Serialize elements, including derived wall data, as a JSON array.
pub fn to_json(elements: &[MapElement]) -> Result<String> {
    Ok(serde_json::to_string_pretty(elements)?)
}

/// `"{prefix}-{n}"` with the smallest `n >= 1` not used by any rack.
pub fn generate_rack_name(elements: &[MapElement], prefix: &str) -> String {
    let used: FxHashSet<&str> = elements
        .iter()
        .filter_map(|e| e.as_rack()?.rack_name.as_deref())
        .collect();
    (1..)
        .map(|n| format!("{prefix}-{n}"))
        .find(|name| !used.contains(name.as_str()))
        .unwrap_or_else(|| format!("{prefix}-1"))
}

/// A rack known to the inventory, with its model footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnplacedRack {
    pub name: String,
    pub width: f64,
    pub height: f64,
}

/// Append inventory racks that no rack element names yet, in a row starting
/// at `origin` with `gap` units between them. Returns how many were added.
pub fn inject_unplaced_racks(
    elements: &mut Vec<MapElement>,
    racks: &[UnplacedRack],
    origin: (f64, f64),
    gap: f64,
    min_size: f64,
) -> usize {
    let placed: FxHashSet<String> = elements
        .iter()
        .filter_map(|e| e.as_rack()?.rack_name.clone())
        .collect();
    let (mut x, y) = origin;
    let mut added = 0;
    for rack in racks.iter().filter(|r| !placed.contains(&r.name)) {
        let width = rack.width.max(min_size);
        let height = rack.height.max(min_size);
        elements.push(MapElement::new(ElementKind::Rack(Rack {
            x,
            y,
            width,
            height,
            rotation: 0.0,
            rack_name: Some(rack.name.clone()),
        })));
        x += width + gap;
        added += 1;
    }
    if added > 0 {
        debug!(added, "injected unplaced racks");
    }
    added
}
