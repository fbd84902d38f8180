//! Double-density relaxation solver.
//!
//! Every step runs, in order: verlet prediction, pair rebuild, plain density,
//! boundary designation, balance/repulsive density, one-sided normalization
//! and pairwise relaxation. Internally all positions are divided by the
//! search radius so the kernels work on a unit interaction radius.

use glam::Vec2;
use rayon::prelude::*;

use super::params::{CorrectionSource, FluidParams};
use super::particle::{OwnerHandle, Particle, ParticleId, ParticleView};
use crate::constants::fluid::{kernel_constant, BOUNDARY_THRESHOLD, EPSILON};
use crate::error::SimResult;
use crate::spatial_hash::{GridHash, Pair};

#[inline]
fn kernel2(x: f32) -> f32 {
    let r = 1.0 - x;
    r * r
}

#[inline]
fn kernel3(x: f32) -> f32 {
    let r = 1.0 - x;
    r * r * r
}

pub struct FluidSolver {
    params: FluidParams,
    /// Gravity in normalized units
    gravity: Vec2,
    particles: Vec<Particle>,
    pairs: Vec<Pair>,
    positions: Vec<Vec2>,
    grid: GridHash,
    next_id: u32,
    max_displacement: f32,
}

impl FluidSolver {
    pub fn new(params: FluidParams) -> SimResult<Self> {
        params.validate()?;
        log::debug!(
            "[FluidSolver] radius {} damping {} ideal density {} k_b {} k_r {} ({:?})",
            params.search_radius,
            params.damping,
            params.ideal_density,
            params.pressure_balance_coefficient,
            params.pressure_repulsive_coefficient,
            params.correction_source,
        );
        Ok(Self {
            gravity: params.gravity / params.search_radius,
            params,
            particles: Vec::new(),
            pairs: Vec::new(),
            positions: Vec::new(),
            grid: GridHash::new(),
            next_id: 0,
            max_displacement: 0.0,
        })
    }

    pub fn params(&self) -> &FluidParams {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Adds a resting particle at `position` (world units).
    pub fn add_particle(&mut self, position: Vec2, mass: f32, owner: Option<OwnerHandle>) -> ParticleId {
        let mass = if mass.is_finite() && mass > 0.0 {
            mass
        } else {
            log::warn!("[FluidSolver] invalid particle mass {}, using {}", mass, self.params.mass);
            self.params.mass
        };

        let id = ParticleId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.particles.push(Particle::new(
            id,
            position / self.params.search_radius,
            mass,
            self.params.ideal_density,
            owner,
        ));
        id
    }

    /// Advances the simulation by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            log::warn!("[FluidSolver] ignoring update with dt = {}", dt);
            return;
        }

        self.predict(dt);
        self.update_pairs();
        self.compute_plain_density();
        self.designate_boundary();
        self.compute_density();
        self.normalize_density();
        self.compute_pressure();
        self.relax(dt);

        log::trace!(
            "[FluidSolver] step: {} particles, {} pairs, max displacement {}",
            self.particles.len(),
            self.pairs.len(),
            self.max_displacement
        );
    }

    /// Largest distance a particle was predicted to move during the last
    /// step, in world units.
    pub fn max_displacement(&self) -> f32 {
        self.max_displacement
    }

    fn predict(&mut self, dt: f32) {
        let radius = self.params.search_radius;
        let dt2 = dt * dt;
        let mut max_sq: f32 = 0.0;

        for p in &mut self.particles {
            let mut step = p.new_position - p.old_position;
            p.old_position = p.new_position;

            step += self.gravity * (p.mass * p.inv_density_balance * dt2);

            if let Some(owner) = &p.owner {
                let desired = owner.desired_move(p.new_position * radius);
                step += desired * (dt2 / radius);

                let velocity = owner.constrain_velocity(step * (radius / dt));
                step = velocity * (dt / radius);
            }

            max_sq = max_sq.max(step.length_squared());
            p.new_position += step * self.params.damping;
        }

        self.max_displacement = max_sq.sqrt() * radius;
    }

    fn update_pairs(&mut self) {
        self.positions.clear();
        self.positions.extend(self.particles.iter().map(|p| p.new_position));
        self.grid.rebuild(&self.positions);
        self.pairs.clear();
        self.grid.collect_pairs(&self.positions, &mut self.pairs);
    }

    fn compute_plain_density(&mut self) {
        let k = kernel_constant();
        for p in &mut self.particles {
            p.density_plain = k;
        }
        for pair in &self.pairs {
            let w = k * kernel3(pair.length_squared);
            self.particles[pair.i].density_plain += w;
            self.particles[pair.j].density_plain += w;
        }
    }

    fn designate_boundary(&mut self) {
        let k = kernel_constant();
        for p in &mut self.particles {
            p.inv_density_plain = 1.0 / p.density_plain;
            p.boundariness = k * p.inv_density_plain;
        }
        for pair in &self.pairs {
            let w = k * kernel3(pair.length_squared);
            let (mi, inv_i) = (self.particles[pair.i].mass, self.particles[pair.i].inv_density_plain);
            let (mj, inv_j) = (self.particles[pair.j].mass, self.particles[pair.j].inv_density_plain);
            self.particles[pair.i].boundariness += mj * w * inv_j;
            self.particles[pair.j].boundariness += mi * w * inv_i;
        }
    }

    fn compute_density(&mut self) {
        for p in &mut self.particles {
            p.density_balance = p.mass;
            p.density_repulsive = p.mass;
        }
        for pair in &self.pairs {
            let k2 = kernel2(pair.length);
            let k3 = kernel3(pair.length);
            let (mi, mj) = (self.particles[pair.i].mass, self.particles[pair.j].mass);

            let pi = &mut self.particles[pair.i];
            pi.density_balance += mj * k2;
            pi.density_repulsive += mj * k3;

            let pj = &mut self.particles[pair.j];
            pj.density_balance += mi * k2;
            pj.density_repulsive += mi * k3;
        }
    }

    fn normalize_density(&mut self) {
        for p in &mut self.particles {
            p.inv_density_balance = 1.0 / p.density_balance;
            p.inv_density_repulsive = 1.0 / p.density_repulsive;
            p.balance_numerator = p.mass;
            p.balance_denominator = p.mass * p.inv_density_balance;
            p.repulsive_numerator = p.mass;
            p.repulsive_denominator = p.mass * p.inv_density_repulsive;
        }

        let source = self.params.correction_source;
        let feeds = |boundariness: f32| match source {
            CorrectionSource::BoundaryNeighbors => boundariness < BOUNDARY_THRESHOLD,
            CorrectionSource::InteriorNeighbors => BOUNDARY_THRESHOLD <= boundariness,
        };

        for pair in &self.pairs {
            let k2 = kernel2(pair.length);
            let k3 = kernel3(pair.length);
            let pi = &self.particles[pair.i];
            let pj = &self.particles[pair.j];
            let (i_feeds, j_feeds) = (feeds(pi.boundariness), feeds(pj.boundariness));
            let (mi, inv_bi, inv_ri) = (pi.mass, pi.inv_density_balance, pi.inv_density_repulsive);
            let (mj, inv_bj, inv_rj) = (pj.mass, pj.inv_density_balance, pj.inv_density_repulsive);

            if j_feeds {
                let b = mj * k2;
                let r = mj * k3;
                let pi = &mut self.particles[pair.i];
                pi.balance_numerator += b;
                pi.balance_denominator += b * inv_bj;
                pi.repulsive_numerator += r;
                pi.repulsive_denominator += r * inv_rj;
            }
            if i_feeds {
                let b = mi * k2;
                let r = mi * k3;
                let pj = &mut self.particles[pair.j];
                pj.balance_numerator += b;
                pj.balance_denominator += b * inv_bi;
                pj.repulsive_numerator += r;
                pj.repulsive_denominator += r * inv_ri;
            }
        }
    }

    fn compute_pressure(&mut self) {
        let kb = self.params.pressure_balance_coefficient;
        let kr = self.params.pressure_repulsive_coefficient;

        for p in &mut self.particles {
            p.balance_corrected = if EPSILON <= p.balance_denominator {
                p.balance_numerator / p.balance_denominator
            } else {
                p.density_balance
            };
            p.repulsive_corrected = if EPSILON <= p.repulsive_denominator {
                p.repulsive_numerator / p.repulsive_denominator
            } else {
                p.density_repulsive
            };

            p.pressure_balance = kb * (p.balance_corrected - p.ideal_density);
            p.pressure_repulsive = kr * p.repulsive_corrected;
        }
    }

    /// Pushes every pair apart (or together) along its axis. Each pair moves
    /// its two particles by equal and opposite amounts.
    fn relax(&mut self, dt: f32) {
        let half_dt2 = dt * dt * 0.5;

        for pair in &self.pairs {
            if pair.length <= EPSILON {
                continue;
            }
            let normal = pair.delta / pair.length;
            let lr = 1.0 - pair.length;
            let lr2 = lr * lr;

            let pi = &self.particles[pair.i];
            let pj = &self.particles[pair.j];
            let di = pi.pressure_balance * lr + pi.pressure_repulsive * lr2;
            let dj = pj.pressure_balance * lr + pj.pressure_repulsive * lr2;
            let correction = normal * (half_dt2 * (di + dj));

            self.particles[pair.j].new_position += correction;
            self.particles[pair.i].new_position -= correction;
        }
    }

    /// Rewrites every particle position through `projection`, which takes
    /// and returns world units. Particles are processed in parallel.
    pub fn constraint<F>(&mut self, projection: F)
    where
        F: Fn(Vec2) -> Vec2 + Sync,
    {
        let radius = self.params.search_radius;
        self.particles.par_iter_mut().for_each(|p| {
            p.new_position = projection(p.new_position * radius) / radius;
        });
    }

    /// Removes every particle for which `predicate` returns true.
    pub fn discard<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&ParticleView<'_>) -> bool,
    {
        let radius = self.params.search_radius;
        let before = self.particles.len();
        self.particles.retain(|p| !predicate(&ParticleView::new(p, radius)));
        before - self.particles.len()
    }

    /// Removes the particles whose owner reports itself dead.
    pub fn discard_dead_owners(&mut self) -> usize {
        let before = self.particles.len();
        self.particles.retain(Particle::is_alive);
        let removed = before - self.particles.len();
        if removed > 0 {
            log::debug!("[FluidSolver] discarded {} particles of dead owners", removed);
        }
        removed
    }

    pub fn foreach<F>(&self, mut f: F)
    where
        F: FnMut(ParticleView<'_>),
    {
        for view in self.iter() {
            f(view);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = ParticleView<'_>> + '_ {
        let radius = self.params.search_radius;
        self.particles.iter().map(move |p| ParticleView::new(p, radius))
    }

    /// Nearest particle within `range` of `point` (world units).
    pub fn pick(&self, point: Vec2, range: f32) -> Option<ParticleId> {
        let radius = self.params.search_radius;
        self.particles
            .iter()
            .map(|p| (p.id, (p.new_position * radius).distance_squared(point)))
            .filter(|&(_, d)| d <= range * range)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Sets the rest density of the solver and of every existing particle.
    pub fn set_ideal_density(&mut self, density: f32) {
        self.params.ideal_density = density;
        for p in &mut self.particles {
            p.ideal_density = density;
        }
    }

    pub fn ideal_density(&self) -> f32 {
        self.params.ideal_density
    }

    pub fn set_damping(&mut self, damping: f32) {
        self.params.damping = damping;
    }

    pub fn damping(&self) -> f32 {
        self.params.damping
    }
}
