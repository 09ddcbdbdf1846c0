//! Face filtering, triangle coloring and adjacency remapping.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::color::{ChannelField, ColorAccum};
use crate::{ColorSpace, PixelBuffer, Point, Rgb, Triangle, Triangulation};

/// Faces smaller than this (in square pixels) are dropped
pub const MIN_TRIANGLE_AREA: f64 = 1.0;

/// Slack for pixels lying exactly on a triangle edge
const BARYCENTRIC_EPS: f64 = 1e-9;

/// What the filter did with the triangulator's faces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub faces: usize,
    pub out_of_bounds: usize,
    pub degenerate: usize,
    pub kept: usize,
}

/// Surviving triangles plus the face each one came from
#[derive(Debug, Clone, Default)]
pub struct Enriched {
    pub triangles: Vec<Triangle>,
    /// Triangulator face index per triangle, parallel to `triangles`
    pub source_faces: Vec<usize>,
    pub stats: FilterStats,
}

/// A face that passed the bounds and area checks
struct RawTriangle {
    face: usize,
    vertices: [Point; 3],
    area: f64,
}

/// Shoelace area, absolute value
pub fn triangle_area(v: &[Point; 3]) -> f64 {
    ((v[1].x - v[0].x) * (v[2].y - v[0].y) - (v[2].x - v[0].x) * (v[1].y - v[0].y)).abs() / 2.0
}

/// Barycentric weights of `(px, py)`, or `None` for a zero-area triangle
fn barycentric(v: &[Point; 3], px: f64, py: f64) -> Option<[f64; 3]> {
    let [p0, p1, p2] = v;
    let det = (p1.y - p2.y) * (p0.x - p2.x) + (p2.x - p1.x) * (p0.y - p2.y);
    if det == 0.0 {
        return None;
    }
    let a = ((p1.y - p2.y) * (px - p2.x) + (p2.x - p1.x) * (py - p2.y)) / det;
    let b = ((p2.y - p0.y) * (px - p2.x) + (p0.x - p2.x) * (py - p2.y)) / det;
    Some([a, b, 1.0 - a - b])
}

#[inline]
fn contains(v: &[Point; 3], px: f64, py: f64) -> bool {
    barycentric(v, px, py).is_some_and(|w| w.iter().all(|&c| c >= -BARYCENTRIC_EPS))
}

/// Mean color of the pixels whose integer coordinates fall inside `v`.
///
/// Falls back to the pixel nearest the bounding-box center when no
/// coordinate qualifies.
fn average_color(field: &ChannelField<'_>, width: u32, height: u32, v: &[Point; 3]) -> Rgb {
    let min_x = v[0].x.min(v[1].x).min(v[2].x);
    let max_x = v[0].x.max(v[1].x).max(v[2].x);
    let min_y = v[0].y.min(v[1].y).min(v[2].y);
    let max_y = v[0].y.max(v[1].y).max(v[2].y);

    let x0 = min_x.floor().max(0.0) as u32;
    let x1 = (max_x.ceil().max(0.0) as u32).min(width - 1);
    let y0 = min_y.floor().max(0.0) as u32;
    let y1 = (max_y.ceil().max(0.0) as u32).min(height - 1);

    let mut acc = ColorAccum::default();
    for y in y0..=y1 {
        for x in x0..=x1 {
            if contains(v, x as f64, y as f64) {
                acc.add(field.channels(x, y));
            }
        }
    }

    let mean = acc.mean().unwrap_or_else(|| {
        let cx = ((min_x + max_x) / 2.0).round().clamp(0.0, (width - 1) as f64) as u32;
        let cy = ((min_y + max_y) / 2.0).round().clamp(0.0, (height - 1) as f64) as u32;
        field.channels(cx, cy)
    });
    field.to_rgb(mean)
}

/// Drop out-of-bounds and sliver faces, then color the survivors.
///
/// Survivors are numbered from 1 in triangulator order. Neighbor lists are
/// left empty; see [`resolve_adjacency`].
pub fn filter_and_enrich(
    image: &PixelBuffer,
    points: &[Point],
    triangulation: &Triangulation,
    color_space: ColorSpace,
) -> Enriched {
    let (width, height) = image.dimensions();
    let (w, h) = (width as f64, height as f64);

    let mut stats = FilterStats { faces: triangulation.len(), ..Default::default() };
    let mut raw = Vec::with_capacity(triangulation.len());
    for (face, indices) in triangulation.triangles.iter().enumerate() {
        let vertices = indices.map(|i| points[i]);
        if !vertices.iter().all(|p| p.in_bounds(w, h)) {
            stats.out_of_bounds += 1;
            continue;
        }
        let area = triangle_area(&vertices);
        if area < MIN_TRIANGLE_AREA {
            stats.degenerate += 1;
            continue;
        }
        raw.push(RawTriangle { face, vertices, area });
    }
    stats.kept = raw.len();

    let field = ChannelField::new(image, color_space);

    #[cfg(feature = "parallel")]
    let colors: Vec<Rgb> = raw
        .par_iter()
        .map(|t| average_color(&field, width, height, &t.vertices))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let colors: Vec<Rgb> = raw
        .iter()
        .map(|t| average_color(&field, width, height, &t.vertices))
        .collect();

    let source_faces = raw.iter().map(|t| t.face).collect();
    let triangles = raw
        .into_iter()
        .zip(colors)
        .enumerate()
        .map(|(i, (t, avg_color))| {
            let [a, b, c] = t.vertices;
            Triangle {
                id: i as u32 + 1,
                vertices: t.vertices,
                centroid: Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0),
                area_px: t.area,
                avg_color,
                neighbors: Vec::new(),
            }
        })
        .collect();

    Enriched { triangles, source_faces, stats }
}

/// Fill neighbor lists with output IDs.
///
/// `neighbors[f]` lists the faces adjacent to face `f`. Faces with no
/// surviving triangle are skipped, and each list is deduplicated in first-seen
/// order without the triangle's own ID.
pub fn resolve_adjacency(
    triangles: &mut [Triangle],
    source_faces: &[usize],
    neighbors: &[Vec<usize>],
) {
    let face_count = source_faces
        .iter()
        .map(|&f| f + 1)
        .max()
        .unwrap_or(0)
        .max(neighbors.len());

    let mut id_of_face: Vec<Option<u32>> = vec![None; face_count];
    for (triangle, &face) in triangles.iter().zip(source_faces) {
        id_of_face[face] = Some(triangle.id);
    }

    for (triangle, &face) in triangles.iter_mut().zip(source_faces) {
        let adjacent = neighbors.get(face).map(Vec::as_slice).unwrap_or(&[]);
        let mut ids = Vec::with_capacity(adjacent.len());
        for &other in adjacent {
            if let Some(&Some(id)) = id_of_face.get(other) {
                if id != triangle.id && !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        triangle.neighbors = ids;
    }
}
