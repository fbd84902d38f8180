//! Water body: a fluid solver advanced at a fixed step, with an optional
//! position constraint and owner-driven particle removal.

use glam::Vec2;

use crate::constraint::PositionConstraint;
use crate::error::SimResult;
use crate::fluid::{FluidParams, FluidSolver, OwnerHandle, ParticleId, ParticleView};

pub struct Water {
    solver: FluidSolver,
    constraint: Option<Box<dyn PositionConstraint>>,
    steps: u64,
}

impl Water {
    pub fn new(params: FluidParams) -> SimResult<Self> {
        Ok(Self {
            solver: FluidSolver::new(params)?,
            constraint: None,
            steps: 0,
        })
    }

    /// Advances one fixed step, projects every particle through the
    /// constraint, then drops the particles of dead owners.
    pub fn update(&mut self) {
        let dt = self.solver.params().time_step;
        self.solver.update(dt);

        if let Some(constraint) = self.constraint.as_deref() {
            self.solver.constraint(|p| constraint.apply(p));
        }

        self.solver.discard_dead_owners();
        self.steps += 1;
    }

    pub fn set_constraint(&mut self, constraint: Box<dyn PositionConstraint>) {
        self.constraint = Some(constraint);
    }

    pub fn clear_constraint(&mut self) {
        self.constraint = None;
    }

    pub fn has_constraint(&self) -> bool {
        self.constraint.is_some()
    }

    pub fn add_particle(&mut self, position: Vec2, mass: f32, owner: Option<OwnerHandle>) -> ParticleId {
        self.solver.add_particle(position, mass, owner)
    }

    pub fn discard<F>(&mut self, predicate: F) -> usize
    where
        F: FnMut(&ParticleView<'_>) -> bool,
    {
        self.solver.discard(predicate)
    }

    pub fn foreach<F>(&self, f: F)
    where
        F: FnMut(ParticleView<'_>),
    {
        self.solver.foreach(f)
    }

    pub fn pick(&self, point: Vec2, range: f32) -> Option<ParticleId> {
        self.solver.pick(point, range)
    }

    /// Damping above 1 would add energy on every step.
    pub fn set_damping(&mut self, damping: f32) {
        let clamped = if damping.is_finite() { damping.clamp(0.0, 1.0) } else { 1.0 };
        if clamped != damping {
            log::warn!("[Water] damping {} clamped to {}", damping, clamped);
        }
        self.solver.set_damping(clamped);
    }

    pub fn damping(&self) -> f32 {
        self.solver.damping()
    }

    pub fn set_ideal_density(&mut self, density: f32) {
        if density.is_finite() && density > 0.0 {
            self.solver.set_ideal_density(density);
        } else {
            log::warn!("[Water] ignoring ideal density {}", density);
        }
    }

    pub fn ideal_density(&self) -> f32 {
        self.solver.ideal_density()
    }

    pub fn len(&self) -> usize {
        self.solver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solver.is_empty()
    }

    /// Steps taken since creation
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn max_displacement(&self) -> f32 {
        self.solver.max_displacement()
    }

    pub fn solver(&self) -> &FluidSolver {
        &self.solver
    }
}
