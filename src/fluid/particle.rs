use std::fmt;
use std::sync::Arc;

use glam::Vec2;

use crate::constants::fluid::BOUNDARY_THRESHOLD;

/// Capabilities a particle's owner exposes to the solver.
///
/// All vectors are in world units. Implementations must be cheap: they are
/// called for every owned particle on every step.
pub trait ParticleOwner: Send + Sync {
    /// Limits the particle's velocity (world units per second).
    fn constrain_velocity(&self, velocity: Vec2) -> Vec2 {
        velocity
    }

    /// Acceleration the owner wants to apply at `position`.
    fn desired_move(&self, _position: Vec2) -> Vec2 {
        Vec2::ZERO
    }

    /// Particles of dead owners are discarded at the end of the step.
    fn is_alive(&self) -> bool {
        true
    }
}

pub type OwnerHandle = Arc<dyn ParticleOwner>;

/// Stable particle identifier, unique for the lifetime of a solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub u32);

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Solver-internal particle state. Positions are normalized by the search
/// radius.
#[derive(Clone)]
pub(crate) struct Particle {
    pub id: ParticleId,
    pub new_position: Vec2,
    pub old_position: Vec2,
    pub mass: f32,
    pub ideal_density: f32,

    pub density_plain: f32,
    pub inv_density_plain: f32,
    pub boundariness: f32,

    pub density_balance: f32,
    pub density_repulsive: f32,
    pub inv_density_balance: f32,
    pub inv_density_repulsive: f32,

    pub balance_numerator: f32,
    pub balance_denominator: f32,
    pub repulsive_numerator: f32,
    pub repulsive_denominator: f32,
    pub balance_corrected: f32,
    pub repulsive_corrected: f32,

    pub pressure_balance: f32,
    pub pressure_repulsive: f32,

    pub owner: Option<OwnerHandle>,
}

impl Particle {
    pub fn new(id: ParticleId, position: Vec2, mass: f32, ideal_density: f32, owner: Option<OwnerHandle>) -> Self {
        Self {
            id,
            new_position: position,
            old_position: position,
            mass,
            ideal_density,
            density_plain: 0.0,
            inv_density_plain: 0.0,
            boundariness: 0.0,
            density_balance: ideal_density,
            density_repulsive: ideal_density,
            inv_density_balance: 1.0 / ideal_density,
            inv_density_repulsive: 1.0 / ideal_density,
            balance_numerator: 0.0,
            balance_denominator: 0.0,
            repulsive_numerator: 0.0,
            repulsive_denominator: 0.0,
            balance_corrected: ideal_density,
            repulsive_corrected: ideal_density,
            pressure_balance: 0.0,
            pressure_repulsive: 0.0,
            owner,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.owner.as_ref().map_or(true, |o| o.is_alive())
    }
}

impl fmt::Debug for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Particle")
            .field("id", &self.id)
            .field("new_position", &self.new_position)
            .field("old_position", &self.old_position)
            .field("mass", &self.mass)
            .field("boundariness", &self.boundariness)
            .field("owned", &self.owner.is_some())
            .finish()
    }
}

/// Read-only snapshot of one particle, in world units.
#[derive(Clone, Copy)]
pub struct ParticleView<'a> {
    pub id: ParticleId,
    pub position: Vec2,
    pub mass: f32,
    pub density_plain: f32,
    /// Corrected balance density
    pub density_balance: f32,
    /// Corrected repulsive density
    pub density_repulsive: f32,
    pub boundariness: f32,
    pub owner: Option<&'a OwnerHandle>,
}

impl<'a> ParticleView<'a> {
    pub(crate) fn new(p: &'a Particle, search_radius: f32) -> Self {
        Self {
            id: p.id,
            position: p.new_position * search_radius,
            mass: p.mass,
            density_plain: p.density_plain,
            density_balance: p.balance_corrected,
            density_repulsive: p.repulsive_corrected,
            boundariness: p.boundariness,
            owner: p.owner.as_ref(),
        }
    }

    pub fn is_boundary(&self) -> bool {
        self.boundariness < BOUNDARY_THRESHOLD
    }
}

impl fmt::Debug for ParticleView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleView")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("boundariness", &self.boundariness)
            .finish()
    }
}
