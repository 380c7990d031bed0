use geo::{Intersects, Kernel, Orientation, kernels::RobustKernel};
use geo_types::Line;

use super::neighbors::CellLayout;
use crate::types::Point;

/// Edges of a ring under construction, bucketed by the cells they pass
/// through.
///
/// Edge ids are insertion positions, so edge `i` runs from ring vertex `i` to
/// vertex `i + 1`.
#[derive(Debug, Clone)]
pub(crate) struct RingEdges<'a> {
    points: &'a [Point],
    layout: CellLayout,
    cells: Vec<Vec<usize>>,
    edges: Vec<(usize, usize)>,
}

impl<'a> RingEdges<'a> {
    pub(crate) fn new(points: &'a [Point], layout: CellLayout) -> Self {
        Self {
            points,
            layout,
            cells: vec![Vec::new(); layout.len()],
            edges: Vec::new(),
        }
    }

    /// Add the edge between two point indices and return its id.
    pub(crate) fn push(&mut self, from: usize, to: usize) -> usize {
        let id = self.edges.len();
        for cell in self.layout.cells_along(self.points[from], self.points[to]) {
            self.cells[cell].push(id);
        }
        self.edges.push((from, to));
        id
    }

    fn line(&self, id: usize) -> Line<f64> {
        let (from, to) = self.edges[id];
        Line::new(self.points[from], self.points[to])
    }

    /// Whether `from`-`to` touches any stored edge other than the skipped ones.
    pub(crate) fn crosses(&self, from: Point, to: Point, skip: impl Fn(usize) -> bool) -> bool {
        let mut nearby: Vec<usize> = self
            .layout
            .cells_along(from, to)
            .into_iter()
            .flat_map(|cell| self.cells[cell].iter().copied())
            .collect();
        nearby.sort_unstable();
        nearby.dedup();

        let segment = Line::new(from, to);
        nearby
            .into_iter()
            .filter(|&id| !skip(id))
            .any(|id| segment.intersects(&self.line(id)))
    }

    /// Whether `p` lies inside the closed ring or on one of its edges.
    ///
    /// Only edges bucketed in `p`'s row can cross the horizontal through `p`,
    /// so the winding number is counted over those.
    pub(crate) fn contains(&self, p: Point) -> bool {
        let cols = self.layout.cols();
        let row = self.layout.row(p.y);
        let mut nearby: Vec<usize> = (0..cols)
            .flat_map(|col| self.cells[row * cols + col].iter().copied())
            .collect();
        nearby.sort_unstable();
        nearby.dedup();

        let mut winding = 0i32;
        for id in nearby {
            let Line { start: a, end: b } = self.line(id);
            let side = RobustKernel::orient2d(a, b, p);
            if side == Orientation::Collinear
                && a.x.min(b.x) <= p.x
                && p.x <= a.x.max(b.x)
                && a.y.min(b.y) <= p.y
                && p.y <= a.y.max(b.y)
            {
                return true;
            }
            if a.y <= p.y {
                if b.y > p.y && side == Orientation::CounterClockwise {
                    winding += 1;
                }
            } else if b.y <= p.y && side == Orientation::Clockwise {
                winding -= 1;
            }
        }
        winding != 0
    }
}
