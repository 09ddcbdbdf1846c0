//! Planar triangulation provider and its default Delaunay implementation.

use spade::{DelaunayTriangulation, Point2, Triangulation as _};

use crate::{LowPolyError, Point, Result};

/// Faces of a planar triangulation over an input point slice
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triangulation {
    /// Each face as three indices into the input points
    pub triangles: Vec<[usize; 3]>,
    /// Faces sharing an edge with each face, indexed like `triangles`
    pub neighbors: Option<Vec<Vec<usize>>>,
}

impl Triangulation {
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Fail if any face refers past the end of a `point_count`-long input
    pub fn check_indices(&self, point_count: usize) -> Result<()> {
        for (face, indices) in self.triangles.iter().enumerate() {
            if let Some(&bad) = indices.iter().find(|&&i| i >= point_count) {
                return Err(LowPolyError::Triangulation(format!(
                    "face {} references point {} but only {} points exist",
                    face, bad, point_count
                )));
            }
        }
        Ok(())
    }
}

/// Trait for triangulation providers
pub trait Triangulator {
    /// Triangulate `points`, optionally reporting face adjacency
    fn triangulate(&mut self, points: &[Point], with_neighbors: bool) -> Result<Triangulation>;
}

/// Delaunay triangulation backed by `spade`.
///
/// Coincident input points collapse onto one vertex, which is reported
/// under the first input index that produced it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelaunayTriangulator;

impl DelaunayTriangulator {
    pub fn new() -> Self {
        Self
    }
}

impl Triangulator for DelaunayTriangulator {
    fn triangulate(&mut self, points: &[Point], with_neighbors: bool) -> Result<Triangulation> {
        let mut delaunay: DelaunayTriangulation<Point2<f64>> = DelaunayTriangulation::new();

        // spade vertex index -> first input index at that position
        let mut input_of_vertex: Vec<usize> = Vec::with_capacity(points.len());
        for (i, p) in points.iter().enumerate() {
            let handle = delaunay.insert(Point2::new(p.x, p.y)).map_err(|e| {
                LowPolyError::Triangulation(format!(
                    "failed to insert point {} at ({}, {}): {:?}",
                    i, p.x, p.y, e
                ))
            })?;
            if handle.index() == input_of_vertex.len() {
                input_of_vertex.push(i);
            }
        }

        if delaunay.num_vertices() < 3 {
            return Err(LowPolyError::Triangulation(format!(
                "need at least 3 distinct points, got {}",
                delaunay.num_vertices()
            )));
        }

        // spade face index -> output face index
        let mut face_slot: Vec<Option<usize>> = vec![None; delaunay.num_all_faces()];
        let mut triangles = Vec::with_capacity(delaunay.num_inner_faces());
        for face in delaunay.inner_faces() {
            face_slot[face.fix().index()] = Some(triangles.len());
            let [a, b, c] = face.vertices().map(|v| input_of_vertex[v.fix().index()]);
            triangles.push([a, b, c]);
        }

        if triangles.is_empty() {
            return Err(LowPolyError::Triangulation(
                "all points are collinear".to_string(),
            ));
        }

        let neighbors = with_neighbors.then(|| {
            delaunay
                .inner_faces()
                .map(|face| {
                    face.adjacent_edges()
                        .iter()
                        .filter_map(|edge| edge.rev().face().as_inner())
                        .filter_map(|other| face_slot[other.fix().index()])
                        .collect::<Vec<usize>>()
                })
                .collect()
        });

        Ok(Triangulation { triangles, neighbors })
    }
}
