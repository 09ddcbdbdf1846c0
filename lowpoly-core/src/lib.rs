//! Core low-poly triangulation library.
//!
//! Turns a raster image into a planar triangulation whose faces carry the
//! locally averaged image color. The pipeline runs in fixed order:
//! normalize, sample points, add border points, triangulate, filter and
//! color faces, resolve adjacency, assemble the result.

mod border;
mod color;
mod edges;
mod enrich;
mod params;
mod pipeline;
mod pixels;
mod point;
mod result;
mod sampler;
mod triangulate;

pub use border::augment_border;
pub use color::ColorSpace;
pub use edges::EdgeMap;
pub use enrich::{
    filter_and_enrich, resolve_adjacency, triangle_area, Enriched, FilterStats, MIN_TRIANGLE_AREA,
};
pub use params::{GenerationParams, SamplerKind, MAX_POINTS};
pub use pipeline::{generate, seeded_rng, LowPolyGenerator};
pub use pixels::{decode, fit_dimensions, from_raw, normalize, PixelBuffer};
pub use point::Point;
pub use result::{ImageMeta, LowPolyResult, Triangle, FORMAT_VERSION};
pub use sampler::{EdgeAwareSampler, GridSampler, PointSampler, PoissonSampler};
pub use triangulate::{DelaunayTriangulator, Triangulation, Triangulator};

/// RGB color tuple
pub type Rgb = [u8; 3];

/// Error type for low-poly generation
#[derive(Debug, thiserror::Error)]
pub enum LowPolyError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Triangulation failed: {0}")]
    Triangulation(String),
}

pub type Result<T> = std::result::Result<T, LowPolyError>;
