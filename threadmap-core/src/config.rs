//! Mapper configuration
//!
//! Supports loading parameters from threadmap.toml files. Every section and
//! field is optional; missing values fall back to the defaults below.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MapError, MapResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapperConfig {
    #[serde(default)]
    pub seeding: SeedingConfig,
    #[serde(default)]
    pub threading: ThreadingConfig,
    #[serde(default)]
    pub extension: ExtensionConfig,
    #[serde(default)]
    pub strand: StrandConfig,
    #[serde(default)]
    pub pairing: PairingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedingConfig {
    /// Seed length; 0 picks the first seed length stored in the index
    #[serde(default)]
    pub seed_length: usize,

    /// Spacing between seeds; 0 spreads seeds evenly over the read
    #[serde(default)]
    pub stride: usize,

    /// Seeds with more exact occurrences than this are dropped
    #[serde(default = "default_hit_max")]
    pub hit_max: usize,

    /// Seeds whose approximate occurrence estimate exceeds this are dropped
    /// before their positions are fetched. Units are defined by the index.
    #[serde(default)]
    pub hit_size_threshold: u64,

    /// Number of seed-extend attempts per strand
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Seed length decrease applied when an attempt finds nothing
    #[serde(default = "default_sensitivity_step")]
    pub sensitivity_step: usize,

    /// Seed length never shrinks below this
    #[serde(default = "default_min_seed_length")]
    pub min_seed_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadingConfig {
    /// Tolerance on the expected in-node offset when extending a thread
    #[serde(default = "default_position_wobble")]
    pub position_wobble: u32,

    /// Threads closer than this many node ids are merged
    #[serde(default = "default_max_thread_gap")]
    pub max_thread_gap: u32,

    /// Number of thread-length groups used for extraction; 0 uses all
    #[serde(default)]
    pub best_clusters: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// Base node-id extension around a candidate region
    #[serde(default = "default_thread_extension")]
    pub thread_extension: u32,

    /// Multiple of `thread_extension` used to widen a soft-clipped side
    #[serde(default = "default_softclip_extension_multiplier")]
    pub softclip_extension_multiplier: u32,

    /// Soft clips longer than this trigger one widened re-alignment
    #[serde(default)]
    pub softclip_threshold: usize,

    /// Context steps per growth round in simple alignment
    #[serde(default = "default_context_step")]
    pub context_step: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrandConfig {
    /// Skip the reverse strand when the forward one is already good enough
    #[serde(default)]
    pub prefer_forward: bool,

    /// Forward score per read base regarded as good enough
    #[serde(default = "default_target_score_per_bp")]
    pub target_score_per_bp: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingConfig {
    /// Node-id window searched around a mapped mate during rescue
    #[serde(default = "default_pair_window")]
    pub pair_window: u32,
}

fn default_hit_max() -> usize { 100 }
fn default_max_attempts() -> u32 { 3 }
fn default_sensitivity_step() -> usize { 3 }
fn default_min_seed_length() -> usize { 1 }
fn default_position_wobble() -> u32 { 2 }
fn default_max_thread_gap() -> u32 { 30 }
fn default_thread_extension() -> u32 { 1 }
fn default_softclip_extension_multiplier() -> u32 { 10 }
fn default_context_step() -> usize { 1 }
fn default_target_score_per_bp() -> f64 { 1.5 }
fn default_pair_window() -> u32 { 100 }

impl Default for SeedingConfig {
    fn default() -> Self {
        Self {
            seed_length: 0,
            stride: 0,
            hit_max: default_hit_max(),
            hit_size_threshold: 0,
            max_attempts: default_max_attempts(),
            sensitivity_step: default_sensitivity_step(),
            min_seed_length: default_min_seed_length(),
        }
    }
}

impl Default for ThreadingConfig {
    fn default() -> Self {
        Self {
            position_wobble: default_position_wobble(),
            max_thread_gap: default_max_thread_gap(),
            best_clusters: 0,
        }
    }
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            thread_extension: default_thread_extension(),
            softclip_extension_multiplier: default_softclip_extension_multiplier(),
            softclip_threshold: 0,
            context_step: default_context_step(),
        }
    }
}

impl Default for StrandConfig {
    fn default() -> Self {
        Self {
            prefer_forward: false,
            target_score_per_bp: default_target_score_per_bp(),
        }
    }
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            pair_window: default_pair_window(),
        }
    }
}

impl ExtensionConfig {
    /// Node-id distance a soft-clipped side is widened by.
    pub fn softclip_extension(&self) -> i64 {
        i64::from(self.thread_extension) * i64::from(self.softclip_extension_multiplier)
    }
}

impl MapperConfig {
    /// Load configuration from file, threadmap.toml in the working directory,
    /// or defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from("threadmap.toml");
                if default_path.exists() {
                    log::info!("Loading configuration from: threadmap.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::info!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: MapperConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).context("Failed to serialize default configuration")
    }

    /// Reject parameter combinations the mapper cannot run with.
    pub fn validate(&self) -> MapResult<()> {
        if self.seeding.max_attempts == 0 {
            return Err(MapError::invalid_config("max_attempts must be at least 1"));
        }
        if self.seeding.sensitivity_step == 0 {
            return Err(MapError::invalid_config("sensitivity_step must be at least 1"));
        }
        if self.seeding.min_seed_length == 0 {
            return Err(MapError::invalid_config("min_seed_length must be at least 1"));
        }
        if !self.strand.target_score_per_bp.is_finite() {
            return Err(MapError::invalid_config("target_score_per_bp must be finite"));
        }
        Ok(())
    }
}
