use bacteria_core::Point;

/// Position of a unit record inside the world arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Slot(pub(crate) usize);

/// Dense board of arena slots, one entry per cell.
#[derive(Clone, Debug)]
pub(crate) struct OccupancyGrid {
    width: i32,
    height: i32,
    cells: Vec<Option<Slot>>,
}

impl OccupancyGrid {
    pub(crate) fn new(width: i32, height: i32) -> Self {
        let columns = usize::try_from(width).unwrap_or(0);
        let rows = usize::try_from(height).unwrap_or(0);
        Self {
            width,
            height,
            cells: vec![None; columns * rows],
        }
    }

    pub(crate) const fn width(&self) -> i32 {
        self.width
    }

    pub(crate) const fn height(&self) -> i32 {
        self.height
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn occupant(&self, point: Point) -> Option<Slot> {
        self.index(point)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    pub(crate) fn is_free(&self, point: Point) -> bool {
        self.occupant(point).is_none()
    }

    pub(crate) fn occupy(&mut self, slot: Slot, point: Point) {
        if let Some(index) = self.index(point) {
            if let Some(cell) = self.cells.get_mut(index) {
                *cell = Some(slot);
            }
        }
    }

    pub(crate) fn vacate(&mut self, point: Point) {
        if let Some(index) = self.index(point) {
            if let Some(cell) = self.cells.get_mut(index) {
                *cell = None;
            }
        }
    }

    pub(crate) fn contains(&self, point: Point) -> bool {
        self.index(point).is_some()
    }

    pub(crate) fn cells(&self) -> &[Option<Slot>] {
        &self.cells
    }

    pub(crate) fn index(&self, point: Point) -> Option<usize> {
        if point.x < 0 || point.y < 0 || point.x >= self.width || point.y >= self.height {
            return None;
        }
        let row = usize::try_from(point.y).ok()?;
        let column = usize::try_from(point.x).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }

    pub(crate) fn point_of(&self, index: usize) -> Option<Point> {
        let width = usize::try_from(self.width).ok()?;
        if width == 0 || index >= self.cells.len() {
            return None;
        }
        let x = i32::try_from(index % width).ok()?;
        let y = i32::try_from(index / width).ok()?;
        Some(Point::new(x, y))
    }
}
