/// Particle fluid solver
///
/// Double-density relaxation over a uniform grid hash. Particles may carry
/// an owner that steers them, clamps their velocity and decides when they
/// are removed.

mod params;
mod particle;
mod solver;

pub use params::{CorrectionSource, FluidParams};
pub use particle::{OwnerHandle, ParticleId, ParticleOwner, ParticleView};
pub use solver::FluidSolver;

#[cfg(test)]
mod tests;
