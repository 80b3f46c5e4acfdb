//! TOML configuration for the sandbox binary.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use tactics_sandbox_core::{GridSize, TerrainWeights};
use tactics_sandbox_world::WorldConfig;

/// Player range limits as written in the configuration file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PlayerConfig {
    pub(crate) move_range: u32,
    pub(crate) attack_range: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        let defaults = WorldConfig::default();
        Self {
            move_range: defaults.move_range,
            attack_range: defaults.attack_range,
        }
    }
}

/// Top-level configuration; every field falls back to its default when omitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SandboxConfig {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) seed: u64,
    pub(crate) weights: TerrainWeights,
    pub(crate) player: PlayerConfig,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        let defaults = WorldConfig::default();
        Self {
            width: defaults.size.width(),
            height: defaults.size.height(),
            seed: defaults.seed,
            weights: defaults.weights,
            player: PlayerConfig::default(),
        }
    }
}

impl SandboxConfig {
    /// Reads and parses the configuration file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub(crate) fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Replaces configured values with the ones given on the command line.
    pub(crate) fn override_with(
        &mut self,
        seed: Option<u64>,
        width: Option<u32>,
        height: Option<u32>,
    ) {
        if let Some(seed) = seed {
            self.seed = seed;
        }
        if let Some(width) = width {
            self.width = width;
        }
        if let Some(height) = height {
            self.height = height;
        }
    }

    pub(crate) fn world_config(&self) -> WorldConfig {
        WorldConfig {
            size: GridSize::new(self.width, self.height),
            weights: self.weights,
            move_range: self.player.move_range,
            attack_range: self.player.attack_range,
            seed: self.seed,
        }
    }
}
