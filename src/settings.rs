//! Simulation settings
//!
//! Loaded from JSON (every field optional, missing fields fall back to defaults).

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::LostError;

/// Which spatial index the world rebuilds every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Kd-tree built by inserting bodies in encounter order
    Insertion,
    /// Partition tree rebuilt from scratch around random pivots
    #[default]
    Median,
}

impl IndexKind {
    pub const ALL: [IndexKind; 2] = [IndexKind::Insertion, IndexKind::Median];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Insertion => "insertion",
            IndexKind::Median => "median",
        }
    }
}

impl FromStr for IndexKind {
    type Err = LostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "insertion" | "kd" | "kdtree" => Ok(IndexKind::Insertion),
            "median" | "quad" | "quadtree" => Ok(IndexKind::Median),
            _ => Err(LostError::UnknownIndexKind(s.to_string())),
        }
    }
}

/// Tunable parameters of a [`crate::sim::World`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Broad-phase structure used by the world
    pub index: IndexKind,

    // === Physics ===
    /// Linear speed clamp applied after integration (units per tick)
    pub max_speed: f64,
    /// Radius of the default circular level boundary
    pub level_radius: f64,
    /// Scale on the half-penetration push applied to overlapping circles
    pub overlap_softening: f64,

    // === Diagnostics ===
    /// Log frame statistics every N ticks (0 disables)
    pub stats_interval: u64,
    /// Events kept between drains; the oldest are dropped beyond this
    pub event_capacity: usize,

    /// Seed for pivot selection and death-effect scatter
    pub seed: u64,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            index: IndexKind::default(),

            max_speed: PHYSICS_MAX_SPEED,
            level_radius: LEVEL_RADIUS,
            overlap_softening: OVERLAP_SOFTENING,

            stats_interval: STATS_INTERVAL,
            event_capacity: EVENT_CAPACITY,

            seed: 0x10_57,
        }
    }
}

impl SimSettings {
    /// Default settings using the given index
    pub fn with_index(index: IndexKind) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Parse and validate settings from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, LostError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, LostError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LostError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from a file, falling back to defaults when it is missing or bad
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings ({e})");
                Self::default()
            }
        }
    }

    /// Write settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LostError> {
        fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Check every field is in range
    pub fn validate(&self) -> Result<(), LostError> {
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            return Err(LostError::InvalidSettings {
                field: "max_speed",
                reason: format!("must be finite and positive, got {}", self.max_speed),
            });
        }
        if !(self.level_radius.is_finite() && self.level_radius > 0.0) {
            return Err(LostError::InvalidSettings {
                field: "level_radius",
                reason: format!("must be finite and positive, got {}", self.level_radius),
            });
        }
        if !(0.0..=2.0).contains(&self.overlap_softening) {
            return Err(LostError::InvalidSettings {
                field: "overlap_softening",
                reason: format!("must be within [0, 2], got {}", self.overlap_softening),
            });
        }
        Ok(())
    }
}
