//! End-to-end generation pipeline.

use std::time::Instant;

use image::imageops::FilterType;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    augment_border, filter_and_enrich, normalize, resolve_adjacency, DelaunayTriangulator,
    EdgeAwareSampler, EdgeMap, GenerationParams, GridSampler, LowPolyError, LowPolyResult,
    PixelBuffer, PointSampler, PoissonSampler, Result, SamplerKind, Triangulator,
};

/// Deterministic RNG used for all sampling
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Low-poly generator over an injected triangulation provider
pub struct LowPolyGenerator<T: Triangulator> {
    triangulator: T,
    filter: FilterType,
}

impl Default for LowPolyGenerator<DelaunayTriangulator> {
    fn default() -> Self {
        Self::new(DelaunayTriangulator)
    }
}

impl<T: Triangulator> LowPolyGenerator<T> {
    pub fn new(triangulator: T) -> Self {
        Self { triangulator, filter: FilterType::Lanczos3 }
    }

    /// Resampling filter used when the image is scaled down
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Run the whole pipeline on `image`.
    ///
    /// Parameters are validated before the image is looked at. Any failure
    /// aborts the run; there is no partial result.
    pub fn generate(
        &mut self,
        image: PixelBuffer,
        source: &str,
        params: &GenerationParams,
    ) -> Result<LowPolyResult> {
        params.validate()?;
        let start = Instant::now();

        let image = normalize(image, params.max_size, self.filter)?;
        let (width, height) = image.dimensions();

        let mut rng = seeded_rng(params.seed);
        let mut points = match params.sampler {
            SamplerKind::Grid => GridSampler.sample(width, height, params.points, &mut rng),
            SamplerKind::Poisson => {
                PoissonSampler::default().sample(width, height, params.points, &mut rng)
            }
            SamplerKind::EdgeAware => {
                let edges = EdgeMap::from_image(&image);
                EdgeAwareSampler::new(&edges, params.edge_weight)
                    .sample(width, height, params.points, &mut rng)
            }
        };
        let sampled = points.len();

        augment_border(&mut points, width, height);
        log::debug!(
            "{}: sampled {} points with {}, {} after border augmentation",
            source,
            sampled,
            params.sampler,
            points.len()
        );

        let triangulation = self.triangulator.triangulate(&points, params.neighbors)?;
        triangulation.check_indices(points.len())?;
        let mut enriched = filter_and_enrich(&image, &points, &triangulation, params.color_space);

        if params.neighbors {
            let neighbors = triangulation.neighbors.as_deref().ok_or_else(|| {
                LowPolyError::Triangulation("triangulator did not report face adjacency".into())
            })?;
            resolve_adjacency(&mut enriched.triangles, &enriched.source_faces, neighbors);
        }

        let stats = enriched.stats;
        log::info!(
            "{}: {}x{} -> {} triangles from {} faces ({} out of bounds, {} degenerate) in {:.1} ms",
            source,
            width,
            height,
            stats.kept,
            stats.faces,
            stats.out_of_bounds,
            stats.degenerate,
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(LowPolyResult::assemble(
            width,
            height,
            source,
            params.clone(),
            enriched.triangles,
        ))
    }
}

/// Generate with the default Delaunay triangulator
pub fn generate(
    image: PixelBuffer,
    source: &str,
    params: &GenerationParams,
) -> Result<LowPolyResult> {
    LowPolyGenerator::default().generate(image, source, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Point, Triangulation, MAX_POINTS};

    /// Splits the image along its main diagonal, ignoring sampled points
    struct DiagonalSplit {
        report_neighbors: bool,
        calls: usize,
    }

    impl Triangulator for DiagonalSplit {
        fn triangulate(&mut self, points: &[Point], with_neighbors: bool) -> Result<Triangulation> {
            self.calls += 1;
            let w = points.iter().map(|p| p.x).fold(0.0, f64::max);
            let h = points.iter().map(|p| p.y).fold(0.0, f64::max);
            let find = |x: f64, y: f64| {
                points
                    .iter()
                    .rposition(|p| p.x == x && p.y == y)
                    .ok_or_else(|| LowPolyError::Triangulation("corner missing".into()))
            };
            let (tl, tr, bl, br) = (find(0.0, 0.0)?, find(w, 0.0)?, find(0.0, h)?, find(w, h)?);
            Ok(Triangulation {
                triangles: vec![[tl, tr, bl], [tr, br, bl]],
                neighbors: (with_neighbors && self.report_neighbors)
                    .then(|| vec![vec![1], vec![0]]),
            })
        }
    }

    /// Reports a face pointing past the end of the input
    struct OutOfRange;

    impl Triangulator for OutOfRange {
        fn triangulate(&mut self, points: &[Point], _: bool) -> Result<Triangulation> {
            Ok(Triangulation { triangles: vec![[0, 1, points.len()]], neighbors: None })
        }
    }

    fn two_tone(w: u32, h: u32) -> PixelBuffer {
        let mut image = image::RgbaImage::new(w, h);
        for (x, y, px) in image.enumerate_pixels_mut() {
            *px = if x + y < w.min(h) / 2 {
                image::Rgba([255, 255, 255, 255])
            } else {
                image::Rgba([0, 0, 0, 255])
            };
        }
        image
    }

    #[test]
    fn test_invalid_params_fail_before_image_access() {
        // A zero-sized image would fail normalization; the count check must come first
        let image = image::RgbaImage::new(0, 0);
        let params = GenerationParams { points: 0, ..Default::default() };
        let err = generate(image, "empty", &params).unwrap_err();
        match err {
            LowPolyError::InvalidInput(msg) => assert!(msg.contains("point count"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_oversized_point_count_rejected() {
        for points in [MAX_POINTS + 1, usize::MAX] {
            for sampler in [SamplerKind::Grid, SamplerKind::Poisson, SamplerKind::EdgeAware] {
                let params = GenerationParams { sampler, points, ..Default::default() };
                let err = generate(two_tone(8, 8), "huge", &params).unwrap_err();
                assert!(matches!(err, LowPolyError::InvalidInput(_)), "{:?}", err);
            }
        }
    }

    #[test]
    fn test_out_of_range_face_is_a_triangulation_failure() {
        let mut generator = LowPolyGenerator::new(OutOfRange);
        let params = GenerationParams { points: 4, ..Default::default() };
        let err = generator.generate(two_tone(10, 10), "fake", &params).unwrap_err();
        assert!(matches!(err, LowPolyError::Triangulation(_)), "{:?}", err);
    }

    #[test]
    fn test_zero_sized_image_rejected() {
        let image = image::RgbaImage::new(0, 10);
        let err = generate(image, "empty", &GenerationParams::default()).unwrap_err();
        assert!(matches!(err, LowPolyError::InvalidInput(_)));
    }

    #[test]
    fn test_injected_triangulator_is_used() {
        let mut generator =
            LowPolyGenerator::new(DiagonalSplit { report_neighbors: true, calls: 0 });
        let params = GenerationParams { points: 9, neighbors: true, ..Default::default() };
        let result = generator.generate(two_tone(20, 20), "fake", &params).unwrap();

        assert_eq!(generator.triangulator.calls, 1);
        assert_eq!(result.triangles.len(), 2);
        assert_eq!(result.triangles[0].area_px, 200.0);
        assert_eq!(result.triangles[0].neighbors, vec![2]);
        assert_eq!(result.triangles[1].neighbors, vec![1]);
        assert_eq!(result.image.source, "fake");
    }

    #[test]
    fn test_missing_adjacency_is_a_triangulation_failure() {
        let mut generator =
            LowPolyGenerator::new(DiagonalSplit { report_neighbors: false, calls: 0 });
        let params = GenerationParams { points: 4, neighbors: true, ..Default::default() };
        let err = generator.generate(two_tone(10, 10), "fake", &params).unwrap_err();
        assert!(matches!(err, LowPolyError::Triangulation(_)));
    }

    #[test]
    fn test_image_is_normalized() {
        let params = GenerationParams { points: 20, max_size: 32, ..Default::default() };
        let result = generate(two_tone(128, 64), "wide", &params).unwrap();
        assert_eq!((result.image.width, result.image.height), (32, 16));
        assert!(result
            .triangles
            .iter()
            .all(|t| t.vertices.iter().all(|p| p.in_bounds(32.0, 16.0))));
    }
}
