//! Simulation configuration
//!
//! Loaded from TOML. Every field has a default, so a file only needs the
//! values it changes:
//!
//! ```toml
//! [fluid]
//! damping = 0.95
//! gravity = [0.0, 9800.0]
//!
//! [terrain]
//! shuffle_seed = 7
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::fluid::FluidParams;
use crate::terrain::TerrainConfig;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub fluid: FluidParams,
    pub terrain: TerrainConfig,
}

impl SimConfig {
    pub fn from_toml_str(raw: &str) -> SimResult<Self> {
        let config: SimConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        log::info!("[SimConfig] loaded {}", path.display());
        Ok(config)
    }

    pub fn to_toml_string(&self) -> SimResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> SimResult<()> {
        self.fluid.validate()?;
        self.terrain.map_bounds().validate()?;
        self.terrain.clamp_bounds().validate()?;
        Ok(())
    }
}
