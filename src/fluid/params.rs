use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::defaults;
use crate::error::{SimError, SimResult};

/// Which neighbours feed the density normalization of a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionSource {
    /// Only neighbours flagged as boundary particles (boundariness < 1)
    BoundaryNeighbors,
    /// Only interior neighbours (boundariness >= 1), the shipped tuning
    #[default]
    InteriorNeighbors,
}

/// Solver tuning, in world units (mm, g, s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluidParams {
    /// Fixed step used by the water facade
    pub time_step: f32,
    /// Interaction radius; positions are normalized by it internally
    pub search_radius: f32,
    /// Velocity multiplier applied on every prediction, at most 1
    pub damping: f32,
    pub gravity: Vec2,
    /// Mass used when a particle is added with an invalid mass
    pub mass: f32,
    pub ideal_density: f32,
    pub pressure_balance_coefficient: f32,
    pub pressure_repulsive_coefficient: f32,
    pub correction_source: CorrectionSource,
}

impl Default for FluidParams {
    fn default() -> Self {
        Self {
            time_step: defaults::TIME_STEP,
            search_radius: defaults::SEARCH_RADIUS,
            damping: defaults::DAMPING,
            gravity: Vec2::from(defaults::GRAVITY),
            mass: defaults::MASS,
            ideal_density: defaults::IDEAL_DENSITY,
            pressure_balance_coefficient: defaults::PRESSURE_BALANCE_COEFFICIENT,
            pressure_repulsive_coefficient: defaults::PRESSURE_REPULSIVE_COEFFICIENT,
            correction_source: CorrectionSource::default(),
        }
    }
}

impl FluidParams {
    pub fn validate(&self) -> SimResult<()> {
        let positive = [
            ("time_step", self.time_step),
            ("search_radius", self.search_radius),
            ("mass", self.mass),
            ("ideal_density", self.ideal_density),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::InvalidParameter {
                    name,
                    message: format!("must be positive and finite, got {}", value),
                });
            }
        }
        if !(self.damping.is_finite() && (0.0..=1.0).contains(&self.damping)) {
            return Err(SimError::InvalidParameter {
                name: "damping",
                message: format!("must lie in [0, 1], got {}", self.damping),
            });
        }
        if !self.gravity.is_finite()
            || !self.pressure_balance_coefficient.is_finite()
            || !self.pressure_repulsive_coefficient.is_finite()
        {
            return Err(SimError::InvalidParameter {
                name: "gravity/pressure",
                message: "must be finite".to_string(),
            });
        }
        Ok(())
    }
}
