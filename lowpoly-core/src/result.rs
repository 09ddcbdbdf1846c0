//! Output record of a generation run.

use serde::{Deserialize, Serialize};

use crate::{GenerationParams, Point, Rgb};

/// Format tag written into every result
pub const FORMAT_VERSION: &str = "1.0";

/// One colored output triangle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    /// Dense 1-based ID, in filter-survival order
    pub id: u32,
    pub vertices: [Point; 3],
    pub centroid: Point,
    pub area_px: f64,
    pub avg_color: Rgb,
    /// IDs of edge-adjacent triangles; empty unless neighbors were requested
    pub neighbors: Vec<u32>,
}

/// Metadata of the (normalized) source image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMeta {
    pub width: u32,
    pub height: u32,
    /// Caller-supplied source identifier, stored verbatim
    pub source: String,
}

/// Result of low-poly generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowPolyResult {
    pub version: String,
    pub image: ImageMeta,
    pub params: GenerationParams,
    pub triangles: Vec<Triangle>,
}

impl LowPolyResult {
    /// Package the pipeline output; triangles must already be in ID order
    pub fn assemble(
        width: u32,
        height: u32,
        source: impl Into<String>,
        params: GenerationParams,
        triangles: Vec<Triangle>,
    ) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            image: ImageMeta { width, height, source: source.into() },
            params,
            triangles,
        }
    }

    /// Look up a triangle by its ID
    pub fn triangle(&self, id: u32) -> Option<&Triangle> {
        // IDs are dense from 1, so the ID doubles as a 1-based index
        let t = self.triangles.get((id as usize).checked_sub(1)?)?;
        (t.id == id).then_some(t)
    }

    /// Sum of all triangle areas in square pixels
    pub fn total_area(&self) -> f64 {
        self.triangles.iter().fold(0.0, |acc, t| acc + t.area_px)
    }
}
