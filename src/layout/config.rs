use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunable constants of the force simulation.
///
/// The defaults reproduce the empirically tuned look of the explorer; none of
/// them is a physical constant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Rest length of every link spring.
    pub link_distance: f32,
    /// Fraction of the deviation from `link_distance` corrected per tick.
    pub link_strength: f32,
    /// Many-body strength; negative values repel.
    pub charge_strength: f32,
    /// Distances below this are clamped before inverse-square terms.
    pub charge_distance_min: f32,
    /// Pairs further apart than this do not interact.
    pub charge_distance_max: f32,
    /// Barnes–Hut opening angle.
    pub theta: f32,
    /// Share of the centroid offset removed per tick.
    pub center_strength: f32,
    /// Per-node collision radius; centers are kept `2 * collision_radius` apart.
    pub collision_radius: f32,
    pub collision_strength: f32,
    /// Pull of each node's z towards its importance-derived depth.
    pub z_strength: f32,
    /// Total z span mapped from importance `[0, 1]`.
    pub z_range: f32,
    /// Initial x/y coordinates are drawn from `[-initial_spread, initial_spread]`.
    pub initial_spread: f32,
    pub alpha_decay: f32,
    pub alpha_min: f32,
    /// Alpha restored by a reheat.
    pub alpha_reheat: f32,
    /// Share of velocity lost per tick.
    pub velocity_decay: f32,
    /// Pause between autonomous ticks; zero ticks as fast as possible.
    pub tick_interval_ms: u64,
    /// Seed for the initial placement; `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            link_distance: 60.0,
            link_strength: 0.3,
            charge_strength: -120.0,
            charge_distance_min: 1.0,
            charge_distance_max: 300.0,
            theta: 0.9,
            center_strength: 1.0,
            collision_radius: 15.0,
            collision_strength: 1.0,
            z_strength: 0.1,
            z_range: 100.0,
            initial_spread: 100.0,
            alpha_decay: 0.02,
            alpha_min: 0.001,
            alpha_reheat: 0.3,
            velocity_decay: 0.3,
            tick_interval_ms: 16,
            seed: None,
        }
    }
}

impl LayoutConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Depth target for a node of the given importance: `[0, 1]` maps linearly
    /// onto `[-z_range / 2, z_range / 2]`.
    pub fn z_target(&self, importance: f32) -> f32 {
        (importance - 0.5) * self.z_range
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("link_distance", self.link_distance),
            ("link_strength", self.link_strength),
            ("charge_strength", self.charge_strength),
            ("charge_distance_min", self.charge_distance_min),
            ("charge_distance_max", self.charge_distance_max),
            ("theta", self.theta),
            ("center_strength", self.center_strength),
            ("collision_radius", self.collision_radius),
            ("collision_strength", self.collision_strength),
            ("z_strength", self.z_strength),
            ("z_range", self.z_range),
            ("initial_spread", self.initial_spread),
            ("alpha_decay", self.alpha_decay),
            ("alpha_min", self.alpha_min),
            ("alpha_reheat", self.alpha_reheat),
            ("velocity_decay", self.velocity_decay),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(invalid(field, format!("{value} is not finite")));
            }
        }

        if self.link_distance <= 0.0 {
            return Err(invalid("link_distance", "must be positive"));
        }
        if self.charge_distance_min <= 0.0 || self.charge_distance_max <= self.charge_distance_min
        {
            return Err(invalid(
                "charge_distance_max",
                "must exceed charge_distance_min, which must be positive",
            ));
        }
        if self.collision_radius < 0.0 {
            return Err(invalid("collision_radius", "must not be negative"));
        }
        if !(0.0..1.0).contains(&self.alpha_decay) || self.alpha_decay == 0.0 {
            return Err(invalid("alpha_decay", "must lie in (0, 1)"));
        }
        if !(0.0..1.0).contains(&self.velocity_decay) {
            return Err(invalid("velocity_decay", "must lie in [0, 1)"));
        }
        if self.alpha_min <= 0.0 || self.alpha_min >= self.alpha_reheat || self.alpha_reheat > 1.0 {
            return Err(invalid(
                "alpha_reheat",
                "must satisfy 0 < alpha_min < alpha_reheat <= 1",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidLayout {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        LayoutConfig::default().validate().expect("defaults validate");
    }

    #[test]
    fn z_target_maps_importance_onto_depth() {
        let config = LayoutConfig::default();
        assert_eq!(config.z_target(1.0), 50.0);
        assert_eq!(config.z_target(0.0), -50.0);
        assert_eq!(config.z_target(0.5), 0.0);
    }

    #[test]
    fn rejects_reheat_below_threshold() {
        let config = LayoutConfig {
            alpha_reheat: 0.0005,
            ..LayoutConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidLayout {
                field: "alpha_reheat",
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_finite_values() {
        let config = LayoutConfig {
            link_strength: f32::INFINITY,
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_decay_outside_unit_interval() {
        let config = LayoutConfig {
            alpha_decay: 1.5,
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
