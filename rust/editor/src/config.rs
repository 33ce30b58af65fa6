// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Editor configuration.
//!
//! Every field has a default, so a JSON override only needs the values it
//! changes. Distances are in document units (cm) unless noted as screen
//! pixels; pixel values are divided by the current zoom where used.

use std::path::Path;

use dcim_floorplan_topology::{
    LabelOptions, DEFAULT_LABEL_PRECISION, DEFAULT_MERGE_EPS, DEFAULT_NAME_MATCH_FACTOR,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Room detection and label placement settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomDetectionConfig {
    /// Wall endpoints closer than this on both axes share one graph vertex
    pub merge_eps: f64,
    /// Polylabel precision
    pub label_precision: f64,
    /// Prefer the area centroid when its clearance is at least this fraction
    /// of the polylabel clearance
    pub centroid_preference: Option<f64>,
    /// Room names survive when the label moves less than
    /// `sqrt(old area) * name_match_factor`
    pub name_match_factor: f64,
}

impl Default for RoomDetectionConfig {
    fn default() -> Self {
        Self {
            merge_eps: DEFAULT_MERGE_EPS,
            label_precision: DEFAULT_LABEL_PRECISION,
            centroid_preference: None,
            name_match_factor: DEFAULT_NAME_MATCH_FACTOR,
        }
    }
}

impl RoomDetectionConfig {
    pub fn label_options(&self) -> LabelOptions {
        LabelOptions {
            precision: self.label_precision,
            centroid_preference: self.centroid_preference,
        }
    }
}

/// Tuning constants of the interactive editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Wall drawing: snap to an existing vertex within this distance
    pub vertex_snap_tolerance: f64,
    /// Wall drawing: snap onto a wall segment within this distance
    pub edge_snap_tolerance: f64,
    /// Wall drawing: a click this close to the start closes the loop
    pub loop_close_radius: f64,
    /// While drawing, a vertex this close to an intersection wins over it
    pub intersection_vertex_radius: f64,
    /// Move tool: pointer distance that grabs or hovers a vertex
    pub vertex_hit_radius: f64,
    /// Move tool: pointer distance that grabs a wall body
    pub segment_hit_radius: f64,
    /// Vertices of other walls this close move with the grabbed one
    pub junction_peer_tolerance: f64,
    /// Vertex drag snaps onto other walls' vertices (screen pixels)
    pub vertex_drag_snap_px: f64,
    /// Magnetic rack-to-rack snap radius (screen pixels), active with Shift
    pub rack_snap_px: f64,
    /// Double-click vertex tolerance (screen pixels)
    pub double_click_vertex_px: f64,
    /// Alt snaps the cursor to a grid of this step
    pub grid_snap_step: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom change per wheel notch
    pub wheel_zoom_factor: f64,
    /// Zoom change of the zoom-in / zoom-out buttons
    pub button_zoom_factor: f64,
    /// Screen margin kept around content by fit-to-view (pixels)
    pub fit_padding: f64,
    /// Smallest background grid step
    pub grid_base_step: f64,
    /// The grid step is scaled by 10 until its on-screen size is in
    /// `[grid_min_px, grid_max_px]`
    pub grid_min_px: f64,
    pub grid_max_px: f64,
    /// Distance of segment length labels from the wall (screen pixels)
    pub segment_label_offset: f64,
    /// Distance of angle labels from the vertex (screen pixels)
    pub angle_label_offset: f64,
    pub default_rack_width: f64,
    pub default_rack_height: f64,
    /// Racks are never smaller than this on either side
    pub min_rack_size: f64,
    /// Prefix of generated rack names (`{prefix}-{n}`)
    pub rack_name_prefix: String,
    /// First position of racks injected into a document without a place
    pub unplaced_rack_origin: (f64, f64),
    /// Horizontal gap between injected racks
    pub unplaced_rack_gap: f64,
    /// Initial text of labels placed with the text tool
    pub default_text: String,
    /// Viewport size in pixels until the host reports one
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub rooms: RoomDetectionConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            vertex_snap_tolerance: 20.0,
            edge_snap_tolerance: 15.0,
            loop_close_radius: 15.0,
            intersection_vertex_radius: 10.0,
            vertex_hit_radius: 10.0,
            segment_hit_radius: 10.0,
            junction_peer_tolerance: 2.0,
            vertex_drag_snap_px: 15.0,
            rack_snap_px: 20.0,
            double_click_vertex_px: 10.0,
            grid_snap_step: 10.0,
            min_zoom: 0.1,
            max_zoom: 20.0,
            wheel_zoom_factor: 1.1,
            button_zoom_factor: 1.25,
            fit_padding: 60.0,
            grid_base_step: 10.0,
            grid_min_px: 15.0,
            grid_max_px: 150.0,
            segment_label_offset: 16.0,
            angle_label_offset: 18.0,
            default_rack_width: 60.0,
            default_rack_height: 100.0,
            min_rack_size: 10.0,
            rack_name_prefix: "Rack".to_string(),
            unplaced_rack_origin: (20.0, 20.0),
            unplaced_rack_gap: 10.0,
            default_text: "Label".to_string(),
            viewport_width: 1200.0,
            viewport_height: 800.0,
            rooms: RoomDetectionConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a (partial) JSON override and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check that tolerances are positive and bounds are ordered.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("vertex_snap_tolerance", self.vertex_snap_tolerance),
            ("edge_snap_tolerance", self.edge_snap_tolerance),
            ("loop_close_radius", self.loop_close_radius),
            ("intersection_vertex_radius", self.intersection_vertex_radius),
            ("vertex_hit_radius", self.vertex_hit_radius),
            ("segment_hit_radius", self.segment_hit_radius),
            ("junction_peer_tolerance", self.junction_peer_tolerance),
            ("vertex_drag_snap_px", self.vertex_drag_snap_px),
            ("rack_snap_px", self.rack_snap_px),
            ("double_click_vertex_px", self.double_click_vertex_px),
            ("grid_snap_step", self.grid_snap_step),
            ("min_zoom", self.min_zoom),
            ("grid_base_step", self.grid_base_step),
            ("grid_min_px", self.grid_min_px),
            ("min_rack_size", self.min_rack_size),
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("rooms.merge_eps", self.rooms.merge_eps),
            ("rooms.label_precision", self.rooms.label_precision),
            ("rooms.name_match_factor", self.rooms.name_match_factor),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.min_zoom >= self.max_zoom {
            return Err(Error::InvalidConfig(format!(
                "min_zoom ({}) must be below max_zoom ({})",
                self.min_zoom, self.max_zoom
            )));
        }
        // Needs a full decade between the bounds or the adaptive step oscillates
        if self.grid_max_px < self.grid_min_px * 10.0 {
            return Err(Error::InvalidConfig(format!(
                "grid_max_px ({}) must be at least 10 x grid_min_px ({})",
                self.grid_max_px, self.grid_min_px
            )));
        }
        for (name, factor) in [
            ("wheel_zoom_factor", self.wheel_zoom_factor),
            ("button_zoom_factor", self.button_zoom_factor),
        ] {
            if factor.is_nan() || factor <= 1.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be greater than 1, got {factor}"
                )));
            }
        }
        if self.default_rack_width < self.min_rack_size
            || self.default_rack_height < self.min_rack_size
        {
            return Err(Error::InvalidConfig(format!(
                "default rack size {}x{} is below the minimum {}",
                self.default_rack_width, self.default_rack_height, self.min_rack_size
            )));
        }
        if let Some(ratio) = self.rooms.centroid_preference {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(Error::InvalidConfig(format!(
                    "rooms.centroid_preference must be within [0, 1], got {ratio}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EditorConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let json = r#"{"vertex_snap_tolerance": 25, "rooms": {"merge_eps": 5}}"#;
        let config = EditorConfig::from_json_str(json).unwrap();
        assert_eq!(config.vertex_snap_tolerance, 25.0);
        assert_eq!(config.edge_snap_tolerance, 15.0);
        assert_eq!(config.rooms.merge_eps, 5.0);
        assert_eq!(config.rooms.name_match_factor, 0.8);
        assert_eq!(config.rooms.centroid_preference, None);
    }

    #[test]
    fn inverted_zoom_bounds_are_rejected() {
        let err = EditorConfig::from_json_str(r#"{"min_zoom": 5, "max_zoom": 2}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn non_positive_tolerance_is_rejected() {
        let err = EditorConfig::from_json_str(r#"{"edge_snap_tolerance": 0}"#).unwrap_err();
        assert!(err.to_string().contains("edge_snap_tolerance"));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = EditorConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn out_of_range_centroid_preference_is_rejected() {
        let err =
            EditorConfig::from_json_str(r#"{"rooms": {"centroid_preference": 1.5}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
