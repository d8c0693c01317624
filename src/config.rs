use serde::Deserialize;

use crate::error::GraphError;

/// Tunables for the engine; every field has a default so partial JSON overrides work.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub physics: PhysicsConfig,
    pub labels: LabelMetrics,
    pub interaction: InteractionConfig,
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, GraphError> {
        serde_json::from_str(raw).map_err(|source| GraphError::InvalidInput {
            what: "engine config",
            source,
        })
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub tether_strength: f32,
    /// Multiplier on the owner's half-width; above 1 keeps dots just outside the rim.
    pub tether_distance_factor: f32,
    pub ptm_radius: f32,
    pub collision_strength: f32,
    pub velocity_decay: f32,
    pub alpha_decay: f32,
    pub alpha_min: f32,
    pub drag_alpha_target: f32,
    pub max_speed: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            tether_strength: 0.9,
            tether_distance_factor: 1.1,
            ptm_radius: 6.0,
            collision_strength: 0.7,
            velocity_decay: 0.4,
            alpha_decay: 0.0228,
            alpha_min: 0.001,
            drag_alpha_target: 0.3,
            max_speed: 40.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct LabelMetrics {
    pub char_width: f32,
    pub horizontal_padding: f32,
    pub half_height: f32,
    pub circle_radius: f32,
    pub summary_radius: f32,
    pub outline_half_thickness: f32,
    pub arrow_clearance: f32,
}

impl LabelMetrics {
    pub fn label_width(&self, label: &str) -> f32 {
        (label.chars().count() as f32 * self.char_width) + (self.horizontal_padding * 2.0)
    }
}

impl Default for LabelMetrics {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            horizontal_padding: 6.0,
            half_height: 10.0,
            circle_radius: 8.0,
            summary_radius: 9.0,
            outline_half_thickness: 1.5,
            arrow_clearance: 5.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub double_click_window_secs: f64,
    pub ptm_reveal_delay_secs: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            double_click_window_secs: 0.25,
            ptm_reveal_delay_secs: 1.5,
        }
    }
}
