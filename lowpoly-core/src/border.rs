//! Border points so the triangulation spans the whole image rectangle.

use crate::Point;

/// Evenly spaced interior points per edge for `sampled` points
pub fn points_per_edge(sampled: usize) -> usize {
    ((sampled as f64).sqrt() / 2.0).ceil().max(1.0) as usize - 1
}

/// Append the four corners and evenly spaced points along each edge.
///
/// The per-edge count is derived from the number of points already present.
/// Points are appended as-is, without deduplicating against sampled points
/// that happen to sit on or near the border.
pub fn augment_border(points: &mut Vec<Point>, width: u32, height: u32) {
    let (w, h) = (width as f64, height as f64);
    let per_edge = points_per_edge(points.len());

    points.reserve(4 + 4 * per_edge);
    points.extend([
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(0.0, h),
        Point::new(w, h),
    ]);

    let steps = (per_edge + 1) as f64;
    for i in 1..=per_edge {
        let x = w * i as f64 / steps;
        let y = h * i as f64 / steps;
        points.push(Point::new(x, 0.0));
        points.push(Point::new(x, h));
        points.push(Point::new(0.0, y));
        points.push(Point::new(w, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_per_edge() {
        assert_eq!(points_per_edge(0), 0);
        assert_eq!(points_per_edge(1), 0);
        assert_eq!(points_per_edge(4), 0);
        // ceil(sqrt(5) / 2) - 1 = ceil(1.118) - 1 = 1
        assert_eq!(points_per_edge(5), 1);
        assert_eq!(points_per_edge(100), 4);
        assert_eq!(points_per_edge(101), 5);
    }

    #[test]
    fn test_corners_always_added() {
        let mut points = Vec::new();
        augment_border(&mut points, 20, 10);
        assert_eq!(
            points,
            vec![
                Point::new(0.0, 0.0),
                Point::new(20.0, 0.0),
                Point::new(0.0, 10.0),
                Point::new(20.0, 10.0),
            ]
        );
    }

    #[test]
    fn test_edge_points_evenly_spaced() {
        let mut points = vec![Point::new(5.0, 5.0); 100];
        augment_border(&mut points, 50, 25);
        // 100 sampled + 4 corners + 4 edges * 4 points
        assert_eq!(points.len(), 100 + 4 + 16);

        let top: Vec<f64> = points[100..]
            .iter()
            .filter(|p| p.y == 0.0 && p.x > 0.0 && p.x < 50.0)
            .map(|p| p.x)
            .collect();
        assert_eq!(top, vec![10.0, 20.0, 30.0, 40.0]);

        let right: Vec<f64> = points[100..]
            .iter()
            .filter(|p| p.x == 50.0 && p.y > 0.0 && p.y < 25.0)
            .map(|p| p.y)
            .collect();
        assert_eq!(right, vec![5.0, 10.0, 15.0, 20.0]);

        assert!(points.iter().all(|p| p.in_bounds(50.0, 25.0)));
    }

    #[test]
    fn test_sampled_points_untouched() {
        let sampled = vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0)];
        let mut points = sampled.clone();
        augment_border(&mut points, 8, 8);
        assert_eq!(&points[..2], &sampled[..]);
        // Duplicate of the (0, 0) corner is kept
        assert_eq!(points.iter().filter(|p| **p == Point::new(0.0, 0.0)).count(), 2);
    }
}
