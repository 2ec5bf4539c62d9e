//! # Engine Settings
//!
//! All tunable constants of the connector engine in one serializable struct.
//! Settings can be loaded from TOML or RON through the [`Config`] trait;
//! fields missing from a file keep their defaults.
//!
//! ## Categories
//!
//! - **Change detection**: per-element tolerance used between frames
//! - **Caps**: clearance, look-at extrapolation, near-vertical correction
//! - **Polyline**: vertex color, bend point grid

use serde::{Serialize, Deserialize};

use crate::foundation::math::Axis;

// Re-export for callers that only import the core module
pub use crate::config::{Config, ConfigError, ConfigFormat};

/// Default per-element tolerance of the frame change detector
pub const DEFAULT_CHANGE_TOLERANCE: f32 = 0.09;

/// # Engine Settings
///
/// Numeric knobs consumed by the frame scheduler and the connector geometry
/// builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Maximum absolute difference for two sampled values to count as equal
    pub change_tolerance: f32,
    /// Gap kept between a cap and the surface it sits on
    pub cap_clearance: f32,
    /// How far along the connector direction the cap look-at target is placed
    pub look_at_extrapolation: f32,
    /// Multiplier applied to the look-at target of a near-vertical connector
    pub degenerate_perturbation: f32,
    /// Horizontal axis inspected by the near-vertical correction
    pub degenerate_axis: Axis,
    /// Fixed rotation about the cap's local Y axis applied after the look-at
    pub cap_face_rotation_degrees: f32,
    /// RGB color written for every polyline vertex
    pub line_color: [f32; 3],
    /// Grid resolution bend point positions are rounded to
    pub bend_point_grid: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            change_tolerance: DEFAULT_CHANGE_TOLERANCE,
            cap_clearance: 0.05,
            look_at_extrapolation: 200.0,
            degenerate_perturbation: 1.5,
            degenerate_axis: Axis::X,
            cap_face_rotation_degrees: 90.0,
            line_color: [1.0, 1.0, 0.0],
            bend_point_grid: 0.01,
        }
    }
}

impl Config for EngineSettings {}

impl EngineSettings {
    /// Set the change detection tolerance
    #[must_use]
    pub fn with_change_tolerance(mut self, tolerance: f32) -> Self {
        self.change_tolerance = tolerance;
        self
    }

    /// Set the cap clearance
    #[must_use]
    pub fn with_cap_clearance(mut self, clearance: f32) -> Self {
        self.cap_clearance = clearance;
        self
    }

    /// Set the polyline vertex color
    #[must_use]
    pub fn with_line_color(mut self, color: [f32; 3]) -> Self {
        self.line_color = color;
        self
    }

    /// Set the bend point grid resolution
    #[must_use]
    pub fn with_bend_point_grid(mut self, resolution: f32) -> Self {
        self.bend_point_grid = resolution;
        self
    }

    /// Check value ranges, reporting the first bad value
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| -> Result<(), ConfigError> { Err(ConfigError::Invalid(message)) };
        if !(self.change_tolerance >= 0.0) {
            return invalid(format!("change_tolerance must be >= 0, got {}", self.change_tolerance));
        }
        if !(self.cap_clearance >= 0.0) {
            return invalid(format!("cap_clearance must be >= 0, got {}", self.cap_clearance));
        }
        if !(self.look_at_extrapolation > 1.0) {
            return invalid(format!(
                "look_at_extrapolation must be > 1, got {}",
                self.look_at_extrapolation
            ));
        }
        if !(self.bend_point_grid >= 0.0) {
            return invalid(format!("bend_point_grid must be >= 0, got {}", self.bend_point_grid));
        }
        if self.degenerate_axis == Axis::Y {
            return invalid("degenerate_axis must be horizontal (X or Z)".to_string());
        }
        Ok(())
    }
}
