// Cavern Water Constants - SINGLE SOURCE OF TRUTH
//
// Every tuning value and magic number used by the solver, the spatial hash
// and the point-location index lives here.

/// Spatial hash constants
pub mod hash {
    /// Bucket count of the particle hash table (prime)
    pub const TABLE_SIZE: usize = 4997;

    /// Large primes mixed into the cell hash
    pub const PRIME_X: i32 = 73_856_093;
    pub const PRIME_Y: i32 = 19_349_663;

    /// Marks the end of a bucket chain
    pub const CHAIN_END: u32 = u32::MAX;
}

/// Fluid solver constants
pub mod fluid {
    /// Denominators below this fall back to the uncorrected density
    pub const EPSILON: f32 = 1.0e-6;

    /// Boundariness below this marks a particle as boundary
    pub const BOUNDARY_THRESHOLD: f32 = 1.0;

    /// Normalized interaction radius
    pub const INTERACTION_RADIUS: f32 = 1.0;

    /// 315 / (64 * pi)
    #[inline]
    pub fn kernel_constant() -> f32 {
        315.0 / (64.0 * std::f32::consts::PI)
    }
}

/// Default tuning, matching the shipped water parameters
pub mod defaults {
    /// Fixed step (100 steps per second)
    pub const TIME_STEP: f32 = 0.01;
    /// Search radius in world units (mm)
    pub const SEARCH_RADIUS: f32 = 50.0;
    pub const DAMPING: f32 = 0.99;
    /// mm/s^2
    pub const GRAVITY: [f32; 2] = [0.0, 0.0];
    pub const MASS: f32 = 1.0;
    pub const IDEAL_DENSITY: f32 = 7.0;
    pub const PRESSURE_BALANCE_COEFFICIENT: f32 = 0.0;
    pub const PRESSURE_REPULSIVE_COEFFICIENT: f32 = 5.0;

    /// Point-location bounding box
    pub const MAP_MIN: [f32; 2] = [0.0, 0.0];
    pub const MAP_MAX: [f32; 2] = [1024.0, 1024.0];

    /// Box particles are clamped into before point location
    pub const CLAMP_MIN: [f32; 2] = [1.0, 1.0];
    pub const CLAMP_MAX: [f32; 2] = [511.0, 511.0];

    /// Seed of the segment insertion shuffle
    pub const SHUFFLE_SEED: u64 = 0;
}
