/// Uniform grid hash over normalized particle positions
///
/// Positions are expected in units of the interaction radius, so every
/// neighbour of a particle lies in the 3x3 block of unit cells around it.
/// The table is rebuilt from scratch every step; there is no incremental
/// maintenance.

use glam::Vec2;

use crate::constants::fluid::INTERACTION_RADIUS;
use crate::constants::hash::{CHAIN_END, PRIME_X, PRIME_Y, TABLE_SIZE};

/// Two particles closer than the interaction radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pair {
    /// Lower particle index
    pub i: usize,
    /// Higher particle index
    pub j: usize,
    /// `position[j] - position[i]`
    pub delta: Vec2,
    pub length_squared: f32,
    pub length: f32,
}

/// Fixed-size bucket table with intrusive chains.
#[derive(Debug, Clone)]
pub struct GridHash {
    heads: Vec<u32>,
    next: Vec<u32>,
}

impl Default for GridHash {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn cell_of(p: Vec2) -> (i32, i32) {
    (p.x.floor() as i32, p.y.floor() as i32)
}

#[inline]
fn bucket(cx: i32, cy: i32) -> usize {
    let h = cx.wrapping_mul(PRIME_X) ^ cy.wrapping_mul(PRIME_Y);
    // negative hashes wrap through the unsigned range
    (h as i64 as u64 % TABLE_SIZE as u64) as usize
}

impl GridHash {
    pub fn new() -> Self {
        Self {
            heads: vec![CHAIN_END; TABLE_SIZE],
            next: Vec::new(),
        }
    }

    /// Rebuilds the table for `positions`. Each particle is prepended to
    /// its bucket's chain.
    pub fn rebuild(&mut self, positions: &[Vec2]) {
        self.heads.fill(CHAIN_END);
        self.next.clear();
        self.next.resize(positions.len(), CHAIN_END);

        for (index, &p) in positions.iter().enumerate() {
            let (cx, cy) = cell_of(p);
            let b = bucket(cx, cy);
            self.next[index] = self.heads[b];
            self.heads[b] = index as u32;
        }
    }

    /// Appends every pair `i < j` with squared distance below 1 to `pairs`.
    ///
    /// `positions` must be the slice the table was last rebuilt with. Hash
    /// collisions can map two cells of a 3x3 block to the same bucket; each
    /// bucket is walked once per particle so no pair is reported twice.
    pub fn collect_pairs(&self, positions: &[Vec2], pairs: &mut Vec<Pair>) {
        let mut visited = [usize::MAX; 9];

        for (i, &pi) in positions.iter().enumerate() {
            let (cx, cy) = cell_of(pi);
            let mut count = 0;

            for dy in -1..=1 {
                for dx in -1..=1 {
                    let b = bucket(cx.wrapping_add(dx), cy.wrapping_add(dy));
                    if visited[..count].contains(&b) {
                        continue;
                    }
                    visited[count] = b;
                    count += 1;

                    let mut j = self.heads[b];
                    while j != CHAIN_END {
                        let ju = j as usize;
                        if i < ju {
                            let delta = positions[ju] - pi;
                            let length_squared = delta.length_squared();
                            if length_squared < INTERACTION_RADIUS * INTERACTION_RADIUS {
                                pairs.push(Pair {
                                    i,
                                    j: ju,
                                    delta,
                                    length_squared,
                                    length: length_squared.sqrt(),
                                });
                            }
                        }
                        j = self.next[ju];
                    }
                }
            }
        }
    }
}
