use std::cmp::Ordering;

use geo::{ConvexHull, Kernel, Orientation, kernels::RobustKernel};
use geo_types::{Coord, MultiPoint};
use tracing::{debug, trace, warn};

use super::{
    neighbors::{CellLayout, NeighborGrid},
    segments::RingEdges,
};
use crate::{
    error::{FootprintError, Result},
    traits::HullBuilder,
    types::{Hull, Point},
};

/// Rungs walked below the one spanning the whole cloud, at most
const LADDER_DEPTH: i32 = 48;

/// Largest offset whose squared products stay finite
const MODERATE_OFFSET: f64 = 1e150;

/// Concave hull built by walking k-nearest neighbours.
///
/// The walk starts at the lowest point (smallest y, then smallest x) heading
/// west and repeatedly turns to the candidate reached by the smallest
/// clockwise sweep from the edge it arrived on, skipping candidates whose edge
/// would cross the ring built so far. Candidates are every unvisited point
/// within the segment radius, and never fewer than the `min_neighbors`
/// nearest ones.
///
/// Segment radii come from the ladder `2^(j/2)`. `max_segment_length` is
/// snapped down onto it, a ring is walked at every rung from the closest pair
/// of points up to that one, and the largest ring is kept. A shorter segment
/// length walks a subset of those rungs, so it never yields a larger area,
/// and a length spanning the cloud gives the convex hull.
///
/// Rings come back closed (first point repeated last) and wound clockwise in
/// the raw coordinate frame, so their shoelace area is negative.
#[derive(Debug, Clone)]
pub struct KnnConcaveHull {
    /// Longest edge accepted without first looking for a closer vertex
    pub max_segment_length: f64,
    /// Smallest candidate count considered at each vertex
    pub min_neighbors: usize,
}

impl Default for KnnConcaveHull {
    fn default() -> Self {
        Self {
            max_segment_length: 1.0,
            min_neighbors: 3,
        }
    }
}

impl KnnConcaveHull {
    pub fn new(max_segment_length: f64) -> Self {
        Self {
            max_segment_length,
            ..Self::default()
        }
    }

    fn validate(&self, points: &[Point]) -> Result<()> {
        if !(self.max_segment_length.is_finite() && self.max_segment_length > 0.0) {
            return Err(FootprintError::InvalidParameter {
                name: "max_segment_length",
                value: self.max_segment_length,
            });
        }
        if let Some(p) = points.iter().find(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(FootprintError::InvalidPoint { x: p.x, y: p.y });
        }
        Ok(())
    }

    /// Walk at one radius, restarting with more neighbours until the ring is
    /// simple and encloses every point.
    fn ring_at(&self, points: &[Point], layout: CellLayout, radius_sq: f64) -> Vec<Point> {
        let mut k = self.min_neighbors.max(3).min(points.len());
        loop {
            if let Some(ring) = walk(points, layout, k, radius_sq) {
                return ring;
            }
            if k >= points.len() {
                break;
            }
            k = (k + (k / 2).max(1)).min(points.len());
            trace!("Restarting hull walk with k = {}", k);
        }

        warn!(
            "Hull walk failed for all k over {} points, using the convex hull",
            points.len()
        );
        convex_ring(points)
    }
}

impl HullBuilder for KnnConcaveHull {
    fn build_hull(&self, points: &[Point]) -> Result<Hull> {
        self.validate(points)?;
        if points.len() < 3 {
            return Ok(Hull::Degenerate(points.to_vec()));
        }

        let unique = distinct(points);
        if unique.len() < 3 || is_collinear(&unique) {
            return Ok(Hull::Degenerate(unique));
        }
        if unique.len() == 3 {
            return Ok(Hull::Ring(close_clockwise(unique)));
        }

        let layout = CellLayout::new(&unique);
        // Rungs below the closest pair all see the same neighbourhoods, and
        // the top one already reaches every point
        let bottom = (closest_pair_sq(&unique, layout).log2().ceil() as i32).saturating_sub(1);
        let top = diagonal_sq(&unique).log2().ceil() as i32;
        let lowest = bottom.max(top.saturating_sub(LADDER_DEPTH));
        let highest = ladder_step(self.max_segment_length).min(top).max(lowest);

        let mut best = Vec::new();
        let mut best_area = f64::NEG_INFINITY;
        for step in lowest..=highest {
            let radius_sq = 2f64.powi(step);
            let ring = self.ring_at(&unique, layout, radius_sq);
            let area = ring_area(&ring);
            debug!(
                "Hull at radius {:.3}: {} vertices, area {:.1}",
                radius_sq.sqrt(),
                ring.len() - 1,
                area
            );
            if area > best_area {
                best = ring;
                best_area = area;
            }
        }

        Ok(Hull::Ring(best))
    }
}

/// One pass around the cloud with a fixed neighbour count.
fn walk(points: &[Point], layout: CellLayout, k: usize, radius_sq: f64) -> Option<Vec<Point>> {
    let start = lowest_index(points)?;
    let mut index = NeighborGrid::with_layout(points, layout);
    let mut edges = RingEdges::new(points, layout);
    index.remove(start);

    let mut ring = vec![start];
    // Arriving at the start while heading west
    let mut back = Coord { x: 1.0, y: 0.0 };

    loop {
        if ring.len() == 3 {
            index.insert(start);
        }
        let current = ring[ring.len() - 1];
        let next = next_vertex(points, &index, &edges, &ring, back, k, radius_sq)?;
        edges.push(current, next);
        if next == start {
            ring.push(start);
            break;
        }
        index.remove(next);
        ring.push(next);
        back = direction(points[next], points[current]);
    }

    let mut on_ring = vec![false; points.len()];
    for &i in &ring {
        on_ring[i] = true;
    }
    points
        .iter()
        .zip(&on_ring)
        .all(|(&p, &on)| on || edges.contains(p))
        .then(|| ring.iter().map(|&i| points[i]).collect())
}

fn next_vertex(
    points: &[Point],
    index: &NeighborGrid<'_>,
    edges: &RingEdges<'_>,
    ring: &[usize],
    back: Point,
    k: usize,
    radius_sq: f64,
) -> Option<usize> {
    let current = points[ring[ring.len() - 1]];
    let mut wanted = k;
    loop {
        let candidates = index.nearest(current, wanted, radius_sq);
        if candidates.is_empty() {
            return None;
        }
        let exhausted = candidates.len() >= index.len();

        let mut turns: Vec<Turn> = candidates
            .into_iter()
            .map(|i| Turn::new(back, current, i, points[i]))
            .collect();
        turns.sort_by(turn_order);
        if let Some(found) = turns
            .into_iter()
            .map(|turn| turn.index)
            .find(|&candidate| !blocked(points, edges, ring, candidate, back))
        {
            return Some(found);
        }
        if exhausted {
            return None;
        }
        wanted = wanted.saturating_mul(2);
    }
}

/// A candidate vertex as seen from the current one.
#[derive(Debug, Clone, Copy)]
struct Turn {
    index: usize,
    origin: Point,
    target: Point,
    direction: Point,
    key: f64,
    distance_sq: f64,
}

impl Turn {
    fn new(back: Point, origin: Point, index: usize, target: Point) -> Self {
        let direction = direction(origin, target);
        let offset = target - origin;
        Self {
            index,
            origin,
            target,
            direction,
            key: turn_key(back, direction),
            distance_sq: dot(offset, offset),
        }
    }

    /// Whether products of this offset stay in range for an exact test.
    fn is_moderate(&self) -> bool {
        let offset = self.target - self.origin;
        offset.x.abs().max(offset.y.abs()) <= MODERATE_OFFSET
    }
}

/// Clockwise sweep order starting just past the back vector.
///
/// Turns are ranked by a pseudo-angle, so the order is total for any
/// coordinates. Directions the pseudo-angle cannot separate are ranked by an
/// exact orientation test, then by distance and index. A candidate straight
/// along the back vector sorts last.
fn turn_order(a: &Turn, b: &Turn) -> Ordering {
    a.key
        .total_cmp(&b.key)
        .then_with(|| match side(a, b) {
            Orientation::Clockwise => Ordering::Less,
            Orientation::CounterClockwise => Ordering::Greater,
            Orientation::Collinear => Ordering::Equal,
        })
        .then_with(|| a.distance_sq.total_cmp(&b.distance_sq))
        .then(a.index.cmp(&b.index))
}

/// Side of `b` relative to the ray through `a`.
///
/// Runs on the points themselves unless an offset is too large for exact
/// products. Scaled directions can round distinct rays together.
fn side(a: &Turn, b: &Turn) -> Orientation {
    if a.is_moderate() && b.is_moderate() {
        RobustKernel::orient2d(a.origin, a.target, b.target)
    } else {
        let origin = Coord { x: 0.0, y: 0.0 };
        RobustKernel::orient2d(origin, a.direction, b.direction)
    }
}

/// Clockwise angle from `back` to `v` as a diamond pseudo-angle in `(0, 4]`.
fn turn_key(back: Point, v: Point) -> f64 {
    let (sin, cos) = (-cross(back, v), dot(back, v));
    let key = if sin >= 0.0 {
        if cos >= 0.0 {
            sin / (cos + sin)
        } else {
            1.0 - cos / (sin - cos)
        }
    } else if cos < 0.0 {
        2.0 - sin / (-cos - sin)
    } else {
        3.0 + cos / (cos - sin)
    };
    // Straight along `back`
    if key > 0.0 { key } else { 4.0 }
}

/// Direction from `from` to `to`, scaled so its larger component is 1.
fn direction(from: Point, to: Point) -> Point {
    let offset = to - from;
    let offset = if offset.x.is_finite() && offset.y.is_finite() {
        offset
    } else {
        // Halving both ends keeps the difference in range
        to * 0.5 - from * 0.5
    };
    let scale = offset.x.abs().max(offset.y.abs());
    if scale > 0.0 { offset / scale } else { offset }
}

fn is_straight(a: Point, b: Point, c: Point) -> bool {
    RobustKernel::orient2d(a, b, c) == Orientation::Collinear
}

/// Whether the edge from the ring's last vertex to `candidate` would double
/// back, overlap the first edge or cross the ring.
fn blocked(points: &[Point], edges: &RingEdges<'_>, ring: &[usize], candidate: usize, back: Point) -> bool {
    let current = points[ring[ring.len() - 1]];
    let target = points[candidate];

    // Doubling back over the edge we arrived on
    if ring.len() >= 2
        && is_straight(points[ring[ring.len() - 2]], current, target)
        && dot(back, direction(current, target)) > 0.0
    {
        return true;
    }

    let closing = candidate == ring[0];
    if closing {
        let (first, second) = (points[ring[0]], points[ring[1]]);
        if is_straight(first, second, current)
            && dot(direction(first, second), direction(first, current)) > 0.0
        {
            return true;
        }
    }

    // The last edge shares `current`, and the first one shares the start when closing
    let last = ring.len().checked_sub(2);
    edges.crosses(current, target, |id| Some(id) == last || (closing && id == 0))
}

fn convex_ring(points: &[Point]) -> Vec<Point> {
    let hull = MultiPoint::from(points.to_vec()).convex_hull();
    let mut vertices = hull.exterior().0.clone();
    vertices.pop();
    close_clockwise(vertices)
}

/// Rotate an open vertex cycle to start at its lowest point, wind it
/// clockwise and repeat the start at the end.
fn close_clockwise(mut vertices: Vec<Point>) -> Vec<Point> {
    if shoelace(&vertices) > 0.0 {
        vertices.reverse();
    }
    if let Some(start) = lowest_index(&vertices) {
        vertices.rotate_left(start);
    }
    if let Some(&first) = vertices.first() {
        vertices.push(first);
    }
    vertices
}

/// Snap a segment length down onto the `2^(j/2)` ladder, returning `j`.
fn ladder_step(length: f64) -> i32 {
    let length_sq = length * length;
    let mut step = length_sq.log2().floor() as i32;
    // log2 may land just below an exact power of two
    if 2f64.powi(step.saturating_add(1)) <= length_sq {
        step = step.saturating_add(1);
    }
    step
}

fn distinct(points: &[Point]) -> Vec<Point> {
    let mut unique = points.to_vec();
    unique.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    unique.dedup();
    unique
}

fn is_collinear(points: &[Point]) -> bool {
    match points {
        [a, b, rest @ ..] => rest.iter().all(|&p| is_straight(*a, *b, p)),
        _ => true,
    }
}

fn lowest_index(points: &[Point]) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)))
        .map(|(i, _)| i)
}

fn closest_pair_sq(points: &[Point], layout: CellLayout) -> f64 {
    let index = NeighborGrid::with_layout(points, layout);
    points
        .iter()
        .filter_map(|&p| {
            index
                .nearest(p, 2, 0.0)
                .into_iter()
                .map(|i| points[i])
                .find(|&q| q != p)
                .map(|q| dot(q - p, q - p))
        })
        .fold(f64::INFINITY, f64::min)
}

fn diagonal_sq(points: &[Point]) -> f64 {
    let (min, max) = points.iter().fold(
        (
            Coord { x: f64::INFINITY, y: f64::INFINITY },
            Coord { x: f64::NEG_INFINITY, y: f64::NEG_INFINITY },
        ),
        |(min, max), p| {
            (
                Coord { x: min.x.min(p.x), y: min.y.min(p.y) },
                Coord { x: max.x.max(p.x), y: max.y.max(p.y) },
            )
        },
    );
    let span = max - min;
    dot(span, span)
}

/// Twice the signed area of the cycle through `vertices`.
fn shoelace(vertices: &[Point]) -> f64 {
    vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(&a, &b)| cross(a, b))
        .sum()
}

fn ring_area(ring: &[Point]) -> f64 {
    shoelace(ring).abs() / 2.0
}

fn cross(a: Point, b: Point) -> f64 {
    a.x * b.y - a.y * b.x
}

fn dot(a: Point, b: Point) -> f64 {
    a.x * b.x + a.y * b.y
}
