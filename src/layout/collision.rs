use crate::config::CollisionIndexKind;

use super::{BoundingBox, CanvasSize};

/// Flat AABB test against every placed box.
pub fn collides(candidate: &BoundingBox, placed: &[BoundingBox]) -> bool {
    placed.iter().any(|other| candidate.intersects(other))
}

/// Boxes committed during one pass, in placement order.
pub trait CollisionIndex {
    fn collides(&self, candidate: &BoundingBox) -> bool;
    fn insert(&mut self, rect: BoundingBox);
    fn boxes(&self) -> &[BoundingBox];

    fn len(&self) -> usize {
        self.boxes().len()
    }

    fn is_empty(&self) -> bool {
        self.boxes().is_empty()
    }
}

pub fn new_index(kind: CollisionIndexKind, canvas: CanvasSize) -> Box<dyn CollisionIndex> {
    match kind {
        CollisionIndexKind::Linear => Box::new(LinearIndex::default()),
        CollisionIndexKind::Grid { cell_size } => Box::new(GridIndex::new(canvas, cell_size)),
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinearIndex {
    boxes: Vec<BoundingBox>,
}

impl CollisionIndex for LinearIndex {
    fn collides(&self, candidate: &BoundingBox) -> bool {
        collides(candidate, &self.boxes)
    }

    fn insert(&mut self, rect: BoundingBox) {
        self.boxes.push(rect);
    }

    fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }
}

/// Upper bound on grid cells; finer requests are coarsened to fit.
pub const MAX_GRID_CELLS: usize = 1 << 20;

/// Uniform grid over the canvas. Each cell lists the boxes touching it, so a
/// query only tests boxes sharing a cell with the candidate. Boxes reaching
/// outside the canvas are clamped into the border cells.
#[derive(Debug, Clone)]
pub struct GridIndex {
    cell_size: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<usize>>,
    boxes: Vec<BoundingBox>,
}

impl GridIndex {
    pub fn new(canvas: CanvasSize, cell_size: f32) -> Self {
        let mut cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            64.0
        };
        let extent = |value: f32| if value.is_finite() { value.max(1.0) } else { 1.0 };
        let width = extent(canvas.width);
        let height = extent(canvas.height);
        let (cols, rows, cell_count) = loop {
            let cols = ((width / cell_size).ceil() as usize).max(1);
            let rows = ((height / cell_size).ceil() as usize).max(1);
            match cols.checked_mul(rows) {
                Some(count) if count <= MAX_GRID_CELLS => break (cols, rows, count),
                _ => cell_size *= 2.0,
            }
        };
        Self {
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cell_count],
            boxes: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn cell_span(&self, start: f32, end: f32, count: usize) -> (usize, usize) {
        let to_cell = |value: f32| -> usize {
            let idx = (value / self.cell_size).floor();
            if idx <= 0.0 {
                0
            } else {
                (idx as usize).min(count - 1)
            }
        };
        (to_cell(start), to_cell(end))
    }

    fn covered_cells(&self, rect: &BoundingBox) -> impl Iterator<Item = usize> + '_ {
        let (c0, c1) = self.cell_span(rect.x, rect.right(), self.cols);
        let (r0, r1) = self.cell_span(rect.y, rect.bottom(), self.rows);
        let cols = self.cols;
        (r0..=r1).flat_map(move |row| (c0..=c1).map(move |col| row * cols + col))
    }
}

impl CollisionIndex for GridIndex {
    fn collides(&self, candidate: &BoundingBox) -> bool {
        self.covered_cells(candidate).any(|cell| {
            self.cells[cell]
                .iter()
                .any(|&idx| candidate.intersects(&self.boxes[idx]))
        })
    }

    fn insert(&mut self, rect: BoundingBox) {
        let idx = self.boxes.len();
        let cells: Vec<usize> = self.covered_cells(&rect).collect();
        for cell in cells {
            self.cells[cell].push(idx);
        }
        self.boxes.push(rect);
    }

    fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }
}
