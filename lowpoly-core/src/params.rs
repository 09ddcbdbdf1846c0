//! Generation parameters and validation.

use serde::{Deserialize, Serialize};

use crate::{ColorSpace, LowPolyError, Result};

/// Seed point sampling strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplerKind {
    /// Jittered grid
    #[default]
    Grid,
    /// Poisson-disc dart throwing
    Poisson,
    /// Rejection sampling weighted by edge strength
    EdgeAware,
}

impl std::str::FromStr for SamplerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grid" => Ok(SamplerKind::Grid),
            "poisson" => Ok(SamplerKind::Poisson),
            "edge-aware" | "edge_aware" | "edges" => Ok(SamplerKind::EdgeAware),
            _ => Err(format!(
                "unknown sampler '{}' (expected grid, poisson, or edge-aware)",
                s
            )),
        }
    }
}

impl std::fmt::Display for SamplerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SamplerKind::Grid => "grid",
            SamplerKind::Poisson => "poisson",
            SamplerKind::EdgeAware => "edge-aware",
        };
        f.write_str(name)
    }
}

/// Largest accepted target point count
pub const MAX_POINTS: usize = 1 << 24;

fn default_points() -> usize { 1000 }
fn default_max_size() -> u32 { 1024 }
fn default_edge_weight() -> f64 { 0.8 }

/// Parameters for one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationParams {
    #[serde(default)]
    pub sampler: SamplerKind,
    /// Target seed point count (before border points), at most [`MAX_POINTS`]
    #[serde(default = "default_points")]
    pub points: usize,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub color_space: ColorSpace,
    /// Larger image side after normalization
    #[serde(default = "default_max_size")]
    pub max_size: u32,
    /// Edge bias for the edge-aware sampler, in `[0, 1]`
    #[serde(default = "default_edge_weight")]
    pub edge_weight: f64,
    /// Compute per-triangle neighbor lists
    #[serde(default)]
    pub neighbors: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            sampler: SamplerKind::default(),
            points: default_points(),
            seed: 0,
            color_space: ColorSpace::default(),
            max_size: default_max_size(),
            edge_weight: default_edge_weight(),
            neighbors: false,
        }
    }
}

impl GenerationParams {
    /// Reject parameter sets that cannot produce a result
    pub fn validate(&self) -> Result<()> {
        if self.points == 0 {
            return Err(LowPolyError::InvalidInput(
                "target point count must be positive".into(),
            ));
        }
        if self.points > MAX_POINTS {
            return Err(LowPolyError::InvalidInput(format!(
                "target point count {} exceeds the maximum of {}",
                self.points, MAX_POINTS
            )));
        }
        if self.max_size == 0 {
            return Err(LowPolyError::InvalidInput("max_size must be positive".into()));
        }
        if !self.edge_weight.is_finite() || !(0.0..=1.0).contains(&self.edge_weight) {
            return Err(LowPolyError::InvalidInput(format!(
                "edge_weight must be within [0, 1], got {}",
                self.edge_weight
            )));
        }
        Ok(())
    }
}
