use crate::types::Point;

/// Cell geometry shared by the point and segment grids.
///
/// Cells are sized for roughly one point each on evenly spread data, but
/// never so small that a side of the grid holds more than `ceil(2 * sqrt(n))`
/// cells. Very elongated clouds therefore get coarse cells instead of a huge
/// allocation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CellLayout {
    origin: Point,
    cell_size: f64,
    cols: usize,
    rows: usize,
    /// Distance covering rounding between coordinates and cell boundaries
    slack: f64,
}

impl CellLayout {
    pub(crate) fn new(points: &[Point]) -> Self {
        let (min, max) = points.iter().fold(
            (
                Point { x: f64::INFINITY, y: f64::INFINITY },
                Point { x: f64::NEG_INFINITY, y: f64::NEG_INFINITY },
            ),
            |(min, max), p| {
                (
                    Point { x: min.x.min(p.x), y: min.y.min(p.y) },
                    Point { x: max.x.max(p.x), y: max.y.max(p.y) },
                )
            },
        );
        let (origin, span_x, span_y) = if points.is_empty() {
            (Point { x: 0.0, y: 0.0 }, 0.0, 0.0)
        } else {
            (min, max.x - min.x, max.y - min.y)
        };

        let count = points.len().max(1) as f64;
        let per_side = (2.0 * count.sqrt()).ceil();
        let dense = (span_x.max(1.0) * span_y.max(1.0) / count).sqrt();
        let bounded = span_x.max(span_y) / per_side;
        let cell_size = dense.max(bounded).max(1.0);

        let cells_for = |span: f64| (span / cell_size).floor().min(per_side) as usize + 1;
        let slack = 0.5 * cell_size
            + 8.0 * f64::EPSILON * (origin.x.abs().max(origin.y.abs()) + span_x.max(span_y));

        Self {
            origin,
            cell_size,
            cols: cells_for(span_x),
            rows: cells_for(span_y),
            slack,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.cols * self.rows
    }

    pub(crate) fn cols(&self) -> usize {
        self.cols
    }

    pub(crate) fn column(&self, x: f64) -> usize {
        // `max` drops NaN, so unreachable coordinates land in the first cell
        let cx = ((x - self.origin.x) / self.cell_size).floor().max(0.0) as usize;
        cx.min(self.cols - 1)
    }

    pub(crate) fn row(&self, y: f64) -> usize {
        let cy = ((y - self.origin.y) / self.cell_size).floor().max(0.0) as usize;
        cy.min(self.rows - 1)
    }

    pub(crate) fn cell_of(&self, p: &Point) -> (usize, usize) {
        (self.column(p.x), self.row(p.y))
    }

    /// Cells that may hold a part of the segment `a`-`b`.
    ///
    /// Always a superset of the cells the segment passes through: each row
    /// between the endpoints gets the columns the segment spans inside that
    /// row's band, widened by `slack`.
    pub(crate) fn cells_along(&self, a: Point, b: Point) -> Vec<usize> {
        let (ax, ay) = self.cell_of(&a);
        let (bx, by) = self.cell_of(&b);
        let (first_col, last_col) = (ax.min(bx), ax.max(bx));
        let (first_row, last_row) = (ay.min(by), ay.max(by));

        let mut cells = Vec::new();
        for row in first_row..=last_row {
            let (mut from, mut to) = (first_col, last_col);
            if last_row > first_row {
                let band = self.origin.y + row as f64 * self.cell_size;
                let y0 = (band - self.slack).max(a.y.min(b.y));
                let y1 = (band + self.cell_size + self.slack).min(a.y.max(b.y));
                let x_at = |y: f64| a.x + (b.x - a.x) * ((y - a.y) / (b.y - a.y));
                let (x0, x1) = (x_at(y0), x_at(y1));
                if x0.is_finite() && x1.is_finite() {
                    let lo = self.column(x0.min(x1) - self.slack).max(first_col);
                    let hi = self.column(x0.max(x1) + self.slack).min(last_col);
                    if lo <= hi {
                        (from, to) = (lo, hi);
                    }
                }
            }
            cells.extend((from..=to).map(|col| row * self.cols + col));
        }
        cells
    }
}

/// Uniform bucket grid over a fixed point set with removable entries.
///
/// A k-nearest query touches O(k) cells on evenly spread data such as image
/// outlines.
#[derive(Debug, Clone)]
pub(crate) struct NeighborGrid<'a> {
    points: &'a [Point],
    layout: CellLayout,
    cells: Vec<Vec<usize>>,
    active: Vec<bool>,
    active_count: usize,
}

impl<'a> NeighborGrid<'a> {
    #[cfg(test)]
    pub(crate) fn new(points: &'a [Point]) -> Self {
        Self::with_layout(points, CellLayout::new(points))
    }

    /// Index every point; all of them start active.
    pub(crate) fn with_layout(points: &'a [Point], layout: CellLayout) -> Self {
        let mut cells = vec![Vec::new(); layout.len()];
        for (index, point) in points.iter().enumerate() {
            let (cx, cy) = layout.cell_of(point);
            cells[cy * layout.cols + cx].push(index);
        }
        Self {
            points,
            layout,
            cells,
            active: vec![true; points.len()],
            active_count: points.len(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.active_count
    }

    pub(crate) fn remove(&mut self, index: usize) {
        if std::mem::replace(&mut self.active[index], false) {
            self.active_count -= 1;
        }
    }

    pub(crate) fn insert(&mut self, index: usize) {
        if !std::mem::replace(&mut self.active[index], true) {
            self.active_count += 1;
        }
    }

    /// Active points around `center`, nearest first.
    ///
    /// Returns every active point within `sqrt(radius_sq)` of `center`, and at
    /// least the `k` nearest ones when fewer than `k` lie inside that radius.
    /// Equal distances are ordered by index.
    pub(crate) fn nearest(&self, center: Point, k: usize, radius_sq: f64) -> Vec<usize> {
        let mut found: Vec<(f64, usize)> = Vec::new();
        if self.active_count == 0 {
            return Vec::new();
        }

        let (cx, cy) = self.layout.cell_of(&center);
        let max_ring = self.layout.cols.max(self.layout.rows);
        for ring in 0..=max_ring {
            self.collect_ring(center, cx, cy, ring, &mut found);
            if found.len() == self.active_count {
                break;
            }

            // Anything not collected yet lies further than `reach`
            let reach = ring as f64 * self.layout.cell_size;
            let reach_sq = reach * reach;
            if radius_sq < reach_sq && found.len() >= k {
                found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                if k == 0 || found[k - 1].0 < reach_sq {
                    break;
                }
            }
        }

        found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        found
            .into_iter()
            .enumerate()
            .take_while(|(rank, (dist_sq, _))| *rank < k || *dist_sq <= radius_sq)
            .map(|(_, (_, index))| index)
            .collect()
    }

    fn collect_ring(&self, center: Point, cx: usize, cy: usize, ring: usize, found: &mut Vec<(f64, usize)>) {
        let ring = ring as isize;
        let (cx, cy) = (cx as isize, cy as isize);
        for y in (cy - ring)..=(cy + ring) {
            if y < 0 || y as usize >= self.layout.rows {
                continue;
            }
            let on_edge_row = y == cy - ring || y == cy + ring;
            let step = if on_edge_row { 1 } else { (2 * ring).max(1) as usize };
            for x in ((cx - ring)..=(cx + ring)).step_by(step) {
                if x < 0 || x as usize >= self.layout.cols {
                    continue;
                }
                for &index in &self.cells[y as usize * self.layout.cols + x as usize] {
                    if self.active[index] {
                        let p = self.points[index];
                        let (dx, dy) = (p.x - center.x, p.y - center.y);
                        found.push((dx * dx + dy * dy, index));
                    }
                }
            }
        }
    }
}
