//! Seed point sampling strategies.
//!
//! All samplers draw from an injected RNG so a fixed seed reproduces the
//! same point set. Returned counts may differ from the requested target:
//! the grid rounds up to whole rows, Poisson-disc is governed by its
//! separation radius, and edge-aware sampling gives up after a draw budget.

use std::f64::consts::{PI, SQRT_2, TAU};

use rand::{Rng, RngCore};

use crate::{EdgeMap, Point};

/// Candidate attempts per active point before it is retired
pub const POISSON_ATTEMPTS: usize = 30;

/// Edge-aware sampling stops after `target * EDGE_DRAW_FACTOR` draws
pub const EDGE_DRAW_FACTOR: usize = 10;

/// Trait for seed point sampling strategies
pub trait PointSampler {
    /// Sample points inside `[0, width] x [0, height]`
    fn sample(&self, width: u32, height: u32, target: usize, rng: &mut dyn RngCore) -> Vec<Point>;
}

/// Jittered grid: one point per cell, displaced by up to half a cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridSampler;

impl GridSampler {
    /// `(rows, cols)` for a target count on a `width x height` image
    pub fn layout(width: u32, height: u32, target: usize) -> (usize, usize) {
        let aspect = width as f64 / height as f64;
        let cols = ((target as f64 * aspect).sqrt().round() as usize).max(1);
        let rows = target.div_ceil(cols).max(1);
        (rows, cols)
    }
}

impl PointSampler for GridSampler {
    fn sample(&self, width: u32, height: u32, target: usize, rng: &mut dyn RngCore) -> Vec<Point> {
        let (w, h) = (width as f64, height as f64);
        let (rows, cols) = Self::layout(width, height, target);
        let cell_w = w / cols as f64;
        let cell_h = h / rows as f64;

        let mut points = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let cx = (col as f64 + 0.5) * cell_w;
                let cy = (row as f64 + 0.5) * cell_h;
                let jx = (rng.gen::<f64>() - 0.5) * cell_w;
                let jy = (rng.gen::<f64>() - 0.5) * cell_h;
                points.push(Point::new(cx + jx, cy + jy).clamped(w, h));
            }
        }
        points
    }
}

/// Poisson-disc (dart throwing with an active list).
#[derive(Debug, Clone, Copy)]
pub struct PoissonSampler {
    pub attempts: usize,
}

impl Default for PoissonSampler {
    fn default() -> Self {
        Self { attempts: POISSON_ATTEMPTS }
    }
}

impl PoissonSampler {
    /// Minimum separation for a target count on a `width x height` image
    pub fn radius(width: u32, height: u32, target: usize) -> f64 {
        let area = width as f64 * height as f64;
        (area / (target as f64 * PI)).sqrt() * 1.5
    }
}

/// Background grid with at most one point per cell (cell diagonal = radius)
struct DiscGrid {
    cells: Vec<Option<usize>>,
    cols: usize,
    rows: usize,
    cell: f64,
}

impl DiscGrid {
    fn new(width: f64, height: f64, radius: f64) -> Self {
        let cell = radius / SQRT_2;
        let cols = ((width / cell).ceil() as usize).max(1);
        let rows = ((height / cell).ceil() as usize).max(1);
        Self { cells: vec![None; cols * rows], cols, rows, cell }
    }

    #[inline]
    fn cell_of(&self, p: &Point) -> (usize, usize) {
        let gc = ((p.x / self.cell) as usize).min(self.cols - 1);
        let gr = ((p.y / self.cell) as usize).min(self.rows - 1);
        (gc, gr)
    }

    fn insert(&mut self, p: &Point, idx: usize) {
        let (gc, gr) = self.cell_of(p);
        self.cells[gr * self.cols + gc] = Some(idx);
    }

    /// No existing point within `radius` of `p` (5×5 cell neighborhood)
    fn is_free(&self, p: &Point, points: &[Point], radius: f64) -> bool {
        let (gc, gr) = self.cell_of(p);
        let r_sq = radius * radius;
        for row in gr.saturating_sub(2)..(gr + 3).min(self.rows) {
            for col in gc.saturating_sub(2)..(gc + 3).min(self.cols) {
                if let Some(idx) = self.cells[row * self.cols + col] {
                    if points[idx].dist_sq(p) < r_sq {
                        return false;
                    }
                }
            }
        }
        true
    }
}

impl PointSampler for PoissonSampler {
    fn sample(&self, width: u32, height: u32, target: usize, rng: &mut dyn RngCore) -> Vec<Point> {
        let (w, h) = (width as f64, height as f64);
        let radius = Self::radius(width, height, target);
        let mut grid = DiscGrid::new(w, h, radius);

        let first = Point::new(rng.gen::<f64>() * w, rng.gen::<f64>() * h);
        let mut points = vec![first];
        let mut active = vec![0usize];
        grid.insert(&first, 0);

        while !active.is_empty() {
            let slot = rng.gen_range(0..active.len());
            let base = points[active[slot]];

            let mut accepted = false;
            for _ in 0..self.attempts {
                let angle = rng.gen::<f64>() * TAU;
                let dist = radius * (1.0 + rng.gen::<f64>());
                let candidate =
                    Point::new(base.x + angle.cos() * dist, base.y + angle.sin() * dist);
                if candidate.x < 0.0 || candidate.x >= w || candidate.y < 0.0 || candidate.y >= h {
                    continue;
                }
                if grid.is_free(&candidate, &points, radius) {
                    let idx = points.len();
                    points.push(candidate);
                    grid.insert(&candidate, idx);
                    active.push(idx);
                    accepted = true;
                    break;
                }
            }

            if !accepted {
                active.swap_remove(slot);
            }
        }

        log::debug!(
            "Poisson-disc: radius={:.2} produced {} points (target {})",
            radius,
            points.len(),
            target
        );
        points
    }
}

/// Rejection sampling biased toward strong edges.
///
/// A uniformly drawn pixel is kept with probability
/// `(1 - edge_weight) + edge_weight * edge / 255`.
#[derive(Debug, Clone, Copy)]
pub struct EdgeAwareSampler<'a> {
    pub edges: &'a EdgeMap,
    pub edge_weight: f64,
}

impl<'a> EdgeAwareSampler<'a> {
    pub fn new(edges: &'a EdgeMap, edge_weight: f64) -> Self {
        Self { edges, edge_weight }
    }

    /// Acceptance probability at pixel `(x, y)`
    #[inline]
    pub fn acceptance(&self, x: u32, y: u32) -> f64 {
        (1.0 - self.edge_weight) + self.edge_weight * self.edges.normalized(x, y) as f64
    }
}

impl PointSampler for EdgeAwareSampler<'_> {
    fn sample(&self, width: u32, height: u32, target: usize, rng: &mut dyn RngCore) -> Vec<Point> {
        let max_x = width.min(self.edges.width).saturating_sub(1);
        let max_y = height.min(self.edges.height).saturating_sub(1);
        let max_draws = target.saturating_mul(EDGE_DRAW_FACTOR);

        let mut points = Vec::with_capacity(target);
        let mut draws = 0usize;
        while points.len() < target && draws < max_draws {
            draws += 1;
            let x = ((rng.gen::<f64>() * width as f64) as u32).min(max_x);
            let y = ((rng.gen::<f64>() * height as f64) as u32).min(max_y);
            if rng.gen::<f64>() < self.acceptance(x, y) {
                points.push(Point::new(x as f64, y as f64));
            }
        }

        log::debug!(
            "Edge-aware: accepted {} of {} draws (target {})",
            points.len(),
            draws,
            target
        );
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeded_rng;

    fn in_bounds(points: &[Point], w: u32, h: u32) -> bool {
        points.iter().all(|p| p.in_bounds(w as f64, h as f64))
    }

    #[test]
    fn test_grid_layout() {
        // Square image: cols = round(sqrt(100)) = 10, rows = 10
        assert_eq!(GridSampler::layout(200, 200, 100), (10, 10));
        // Wide image: cols = round(sqrt(50 * 2)) = 10, rows = ceil(50/10) = 5
        assert_eq!(GridSampler::layout(400, 200, 50), (5, 10));
        // Rounds up to whole rows: cols = round(sqrt(7)) = 3, rows = 3
        assert_eq!(GridSampler::layout(10, 10, 7), (3, 3));
        // Tall sliver still gets a column
        assert_eq!(GridSampler::layout(1, 1000, 1), (1, 1));
    }

    #[test]
    fn test_grid_points_stay_in_their_cells() {
        let mut rng = seeded_rng(3);
        let points = GridSampler.sample(120, 80, 24, &mut rng);
        let (rows, cols) = GridSampler::layout(120, 80, 24);
        assert_eq!(points.len(), rows * cols);
        assert!(in_bounds(&points, 120, 80));

        let cell_w = 120.0 / cols as f64;
        let cell_h = 80.0 / rows as f64;
        for (i, p) in points.iter().enumerate() {
            let (row, col) = (i / cols, i % cols);
            assert!(p.x >= col as f64 * cell_w - 1e-9 && p.x <= (col + 1) as f64 * cell_w + 1e-9);
            assert!(p.y >= row as f64 * cell_h - 1e-9 && p.y <= (row + 1) as f64 * cell_h + 1e-9);
        }
    }

    #[test]
    fn test_grid_is_deterministic() {
        let a = GridSampler.sample(64, 48, 30, &mut seeded_rng(11));
        let b = GridSampler.sample(64, 48, 30, &mut seeded_rng(11));
        let c = GridSampler.sample(64, 48, 30, &mut seeded_rng(12));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_poisson_min_separation() {
        let mut rng = seeded_rng(7);
        let points = PoissonSampler::default().sample(100, 100, 50, &mut rng);
        let radius = PoissonSampler::radius(100, 100, 50);
        assert!(points.len() > 1);
        assert!(in_bounds(&points, 100, 100));
        for i in 0..points.len() {
            for j in i + 1..points.len() {
                assert!(
                    points[i].dist(&points[j]) >= radius - 1e-9,
                    "points {} and {} closer than {:.3}",
                    i,
                    j,
                    radius
                );
            }
        }
    }

    #[test]
    fn test_poisson_is_deterministic() {
        let a = PoissonSampler::default().sample(100, 100, 50, &mut seeded_rng(7));
        let b = PoissonSampler::default().sample(100, 100, 50, &mut seeded_rng(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_edge_aware_flat_map_uses_base_probability() {
        let image = image::RgbaImage::from_pixel(50, 50, image::Rgba([0, 0, 0, 255]));
        let edges = EdgeMap::from_image(&image);

        // Zero weight: every draw is accepted
        let sampler = EdgeAwareSampler::new(&edges, 0.0);
        assert_eq!(sampler.acceptance(10, 10), 1.0);
        let points = sampler.sample(50, 50, 40, &mut seeded_rng(1));
        assert_eq!(points.len(), 40);
        assert!(in_bounds(&points, 50, 50));

        // Full weight on a flat map: nothing is ever accepted, and the loop stops
        let sampler = EdgeAwareSampler::new(&edges, 1.0);
        assert_eq!(sampler.acceptance(10, 10), 0.0);
        assert!(sampler.sample(50, 50, 40, &mut seeded_rng(1)).is_empty());

        // Partial weight degenerates to (1 - weight) everywhere
        let sampler = EdgeAwareSampler::new(&edges, 0.75);
        assert!((sampler.acceptance(25, 3) - 0.25).abs() < 1e-12);
        let points = sampler.sample(50, 50, 40, &mut seeded_rng(1));
        assert!(points.len() <= 40);
    }

    #[test]
    fn test_edge_aware_prefers_edges() {
        // Vertical step at x = 25
        let mut image = image::RgbaImage::new(50, 50);
        for (x, _, px) in image.enumerate_pixels_mut() {
            let v = if x < 25 { 0 } else { 255 };
            *px = image::Rgba([v, v, v, 255]);
        }
        let edges = EdgeMap::from_image(&image);
        let sampler = EdgeAwareSampler::new(&edges, 1.0);
        let points = sampler.sample(50, 50, 20, &mut seeded_rng(5));
        assert!(!points.is_empty());
        assert!(points.iter().all(|p| p.x == 24.0 || p.x == 25.0));
    }
}
