//! Overlay paint style.
//!
//! Styles serialize to JSON so hosts can persist them alongside their own
//! settings; malformed input falls back to the default style.

use egui::Color32;
use serde::{Deserialize, Serialize};

/// Shape drawn at the open ends of a stroked path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// Shape drawn where two stroked segments meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Fill and stroke attributes applied when an overlay is painted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    pub fill_color: Color32,
    pub stroke_color: Color32,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    /// Stroke width in screen points
    pub line_width: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            fill_color: Color32::TRANSPARENT,
            stroke_color: Color32::from_rgb(60, 100, 180),
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            line_width: 2.0,
        }
    }
}

impl OverlayStyle {
    /// Creates a style with the default stroke width.
    pub fn new(
        fill_color: Color32,
        stroke_color: Color32,
        line_cap: LineCap,
        line_join: LineJoin,
    ) -> Self {
        Self {
            fill_color,
            stroke_color,
            line_cap,
            line_join,
            ..Default::default()
        }
    }

    /// Parses a style from JSON, falling back to the default on failure.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(style) => style,
            Err(e) => {
                log::warn!("Failed to parse overlay style: {}", e);
                Self::default()
            }
        }
    }

    /// Serializes the style to JSON.
    pub fn to_json(&self) -> Option<String> {
        match serde_json::to_string(self) {
            Ok(s) => Some(s),
            Err(e) => {
                log::warn!("Failed to serialize overlay style: {}", e);
                None
            }
        }
    }

    /// Returns true if painting would leave no visible mark.
    pub fn is_invisible(&self) -> bool {
        self.fill_color.a() == 0 && (self.stroke_color.a() == 0 || self.line_width <= 0.0)
    }
}
