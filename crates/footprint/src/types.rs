use geo_types::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};

/// A pixel position carried in floating point, x to the right and y down.
pub type Point = Coord<f64>;

/// Opaque pixels that touch transparency, in row-major scan order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub points: Vec<Point>,
    /// Dimensions of the grid the outline was scanned from
    pub image_width: u32,
    pub image_height: u32,
}

impl Outline {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Axis-aligned bounds of the outline points, `None` when empty.
    pub fn bounding_box(&self) -> Option<(Point, Point)> {
        bounds(&self.points)
    }
}

/// Result of a hull construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Hull {
    /// Closed ring: the first point is repeated as the last one.
    Ring(Vec<Point>),
    /// Too few distinct points, or all of them on one line. Not a polygon.
    Degenerate(Vec<Point>),
}

impl Hull {
    pub fn points(&self) -> &[Point] {
        match self {
            Hull::Ring(points) | Hull::Degenerate(points) => points,
        }
    }

    pub fn is_ring(&self) -> bool {
        matches!(self, Hull::Ring(_))
    }

    /// Turn the hull into a vertex list.
    ///
    /// With `trim_closing_point` a ring loses its leading point, which is the
    /// duplicate of its last one. Degenerate sets are returned untouched.
    pub fn into_polygon(self, trim_closing_point: bool) -> Vec<Point> {
        match self {
            Hull::Ring(mut points) if trim_closing_point && !points.is_empty() => {
                points.remove(0);
                points
            }
            Hull::Ring(points) | Hull::Degenerate(points) => points,
        }
    }
}

/// Final footprint of one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    /// Polygon vertices; the loop closes implicitly unless the closing point was kept
    pub vertices: Vec<Point>,
    /// Set when the outline was too small or flat to form a polygon
    pub degenerate: bool,
    /// Number of outline pixels the hull was built from
    pub outline_points: usize,
    pub image_width: u32,
    pub image_height: u32,
}

impl Footprint {
    /// Convert to a geo-types polygon for geometric operations
    pub fn to_geo_polygon(&self) -> Polygon<f64> {
        // LineString::from closes nothing on its own; Polygon::new closes the exterior
        Polygon::new(LineString::from(self.vertices.clone()), vec![])
    }

    /// Enclosed area in square pixels
    pub fn area(&self) -> f64 {
        use geo::Area;
        if self.degenerate {
            return 0.0;
        }
        self.to_geo_polygon().unsigned_area()
    }

    /// Length of the closed loop through all vertices
    pub fn perimeter(&self) -> f64 {
        if self.vertices.len() < 2 {
            return 0.0;
        }
        let closing = [self.vertices[self.vertices.len() - 1], self.vertices[0]];
        self.vertices
            .windows(2)
            .chain(std::iter::once(&closing[..]))
            .map(|pair| {
                let dx = pair[1].x - pair[0].x;
                let dy = pair[1].y - pair[0].y;
                (dx * dx + dy * dy).sqrt()
            })
            .sum()
    }

    pub fn bounding_box(&self) -> Option<(Point, Point)> {
        bounds(&self.vertices)
    }

    /// Vertices truncated toward zero, the way they are serialized.
    pub fn integer_vertices(&self) -> Vec<[i64; 2]> {
        self.vertices
            .iter()
            .map(|p| [p.x as i64, p.y as i64])
            .collect()
    }

    /// Flat `x1,y1,x2,y2,...` list of the truncated vertices.
    pub fn to_flat_string(&self) -> String {
        self.integer_vertices()
            .iter()
            .flat_map(|[x, y]| [x.to_string(), y.to_string()])
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

fn bounds(points: &[Point]) -> Option<(Point, Point)> {
    let first = *points.first()?;
    Some(points.iter().fold((first, first), |(min, max), p| {
        (
            Coord { x: min.x.min(p.x), y: min.y.min(p.y) },
            Coord { x: max.x.max(p.x), y: max.y.max(p.y) },
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Point {
        Coord { x, y }
    }

    fn square_footprint() -> Footprint {
        Footprint {
            vertices: vec![c(0.0, 2.0), c(2.0, 2.0), c(2.0, 0.0), c(0.0, 0.0)],
            degenerate: false,
            outline_points: 8,
            image_width: 3,
            image_height: 3,
        }
    }

    #[test]
    fn test_trim_drops_leading_duplicate() {
        let ring = Hull::Ring(vec![c(0.0, 0.0), c(0.0, 1.0), c(1.0, 1.0), c(0.0, 0.0)]);
        let polygon = ring.into_polygon(true);
        assert_eq!(polygon, vec![c(0.0, 1.0), c(1.0, 1.0), c(0.0, 0.0)]);
    }

    #[test]
    fn test_trim_leaves_degenerate_alone() {
        let points = vec![c(3.0, 4.0), c(5.0, 6.0)];
        let hull = Hull::Degenerate(points.clone());
        assert_eq!(hull.into_polygon(true), points);
    }

    #[test]
    fn test_footprint_metrics() {
        let footprint = square_footprint();
        assert_eq!(footprint.area(), 4.0);
        assert_eq!(footprint.perimeter(), 8.0);
        assert_eq!(footprint.bounding_box(), Some((c(0.0, 0.0), c(2.0, 2.0))));
    }

    #[test]
    fn test_flat_string_truncates_toward_zero() {
        let footprint = Footprint {
            vertices: vec![c(1.9, 2.1), c(-0.5, 7.99), c(3.0, -2.7)],
            degenerate: false,
            outline_points: 3,
            image_width: 8,
            image_height: 8,
        };
        assert_eq!(footprint.to_flat_string(), "1,2,0,7,3,-2");
    }

    #[test]
    fn test_empty_footprint_is_empty_string() {
        let footprint = Footprint {
            vertices: vec![],
            degenerate: true,
            outline_points: 0,
            image_width: 4,
            image_height: 4,
        };
        assert_eq!(footprint.to_flat_string(), "");
        assert_eq!(footprint.area(), 0.0);
        assert_eq!(footprint.perimeter(), 0.0);
        assert_eq!(footprint.bounding_box(), None);
    }
}
