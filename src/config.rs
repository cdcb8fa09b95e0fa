use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 15.0,
            bottom: 15.0,
            left: 20.0,
            right: 15.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    pub link_distance: f32,
    pub many_body_strength: f32,
    /// Repulsion cutoff expressed in node radii.
    pub many_body_cutoff_radii: f32,
    pub theta: f32,
    pub collide_strength: f32,
    pub baseline_strength: f32,
    pub velocity_decay: f32,
    pub reheat_alpha: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            link_distance: 30.0,
            many_body_strength: -50.0,
            many_body_cutoff_radii: 50.0,
            theta: 0.9,
            collide_strength: 1.0,
            baseline_strength: 0.01,
            velocity_decay: 0.4,
            reheat_alpha: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub node_radius: f32,
    pub margin: Margin,
    pub transition_secs: f64,
    pub click_rearm_delay_secs: f64,
    pub linear_settle_delay_secs: f64,
    /// Extra room below the linear baseline, in node radii.
    pub linear_bound_slack_radii: f32,
    pub forces: ForceConfig,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            node_radius: 5.0,
            margin: Margin::default(),
            transition_secs: 0.75,
            click_rearm_delay_secs: 0.2,
            linear_settle_delay_secs: 1.0,
            linear_bound_slack_radii: 4.0,
            forces: ForceConfig::default(),
        }
    }
}

impl ViewConfig {
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read view config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid view config JSON in {}", path.display()))
    }

    pub fn many_body_cutoff(&self) -> f32 {
        self.node_radius * self.forces.many_body_cutoff_radii
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: ViewConfig =
            serde_json::from_str(r#"{"node_radius": 8.0, "forces": {"link_distance": 45.0}}"#)
                .expect("config parses");

        assert_eq!(config.node_radius, 8.0);
        assert_eq!(config.forces.link_distance, 45.0);
        assert_eq!(config.forces.many_body_strength, -50.0);
        assert_eq!(config.margin, Margin::default());
        assert_eq!(config.many_body_cutoff(), 400.0);
    }
}
