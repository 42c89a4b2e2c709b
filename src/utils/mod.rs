use std::iter::FusedIterator;

#[cfg(test)]
mod tests;

// ----------------------------------------------
// Point
// ----------------------------------------------

// 2D point in screen space (pixels).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x: x, y: y }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0, y: 0 }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{},{}]", self.x, self.y)
    }
}

// ----------------------------------------------
// Size
// ----------------------------------------------

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Size {
    pub width:  i32,
    pub height: i32,
}

impl Size {
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width: width, height: height }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { width: 0, height: 0 }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ----------------------------------------------
// Cell
// ----------------------------------------------

// X,Y position in the map grid of cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x: x, y: y }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    #[inline]
    pub const fn invalid() -> Self {
        Self { x: -1, y: -1 }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.x >= 0 && self.y >= 0
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{},{}]", self.x, self.y)
    }
}

// ----------------------------------------------
// CellRange
// ----------------------------------------------

// Inclusive rectangular range of grid cells, e.g.: [start..=end].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellRange {
    pub start: Cell,
    pub end: Cell,
}

impl CellRange {
    #[inline]
    pub const fn new(start: Cell, end: Cell) -> Self {
        Self {
            start: start,
            end: end,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.start.is_valid() && self.end.is_valid() &&
        self.start.x <= self.end.x && self.start.y <= self.end.y
    }

    #[inline]
    pub fn iter(&self) -> CellRangeIter {
        CellRangeIter {
            range: *self,
            current: self.start,
            done: !self.is_valid(),
        }
    }
}

impl IntoIterator for &CellRange {
    type Item = Cell;
    type IntoIter = CellRangeIter;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Row-major iteration over every cell in the range.
pub struct CellRangeIter {
    range: CellRange,
    current: Cell,
    done: bool,
}

impl Iterator for CellRangeIter {
    type Item = Cell;

    fn next(&mut self) -> Option<Cell> {
        if self.done {
            return None;
        }

        let cell = self.current;

        if self.current.x < self.range.end.x {
            self.current.x += 1;
        } else if self.current.y < self.range.end.y {
            self.current.x = self.range.start.x;
            self.current.y += 1;
        } else {
            self.done = true;
        }

        Some(cell)
    }
}

impl FusedIterator for CellRangeIter {}

// ----------------------------------------------
// Rect
// ----------------------------------------------

// Screen space rectangle defined by min and max extents.
// `mins` is the top-left corner and `maxs` is the bottom-right.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub mins: Point,
    pub maxs: Point,
}

impl Rect {
    #[inline]
    pub const fn new(pos: Point, size: Size) -> Self {
        Self {
            mins: pos,
            maxs: Point::new(pos.x + size.width, pos.y + size.height),
        }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self {
            mins: Point::zero(),
            maxs: Point::zero(),
        }
    }

    #[inline]
    pub fn x(&self) -> i32 {
        self.mins.x
    }

    #[inline]
    pub fn y(&self) -> i32 {
        self.mins.y
    }

    #[inline]
    pub fn position(&self) -> Point {
        self.mins
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.maxs.x - self.mins.x
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.maxs.y - self.mins.y
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn is_valid(&self) -> bool {
        self.width() > 0 && self.height() > 0
    }

    // Moves the rect without changing its dimensions.
    pub fn set_position(&mut self, pos: Point) {
        let size = self.size();
        self.mins = pos;
        self.maxs = Point::new(pos.x + size.width, pos.y + size.height);
    }

    // Resizes the rect keeping its top-left corner fixed.
    pub fn set_size(&mut self, size: Size) {
        self.maxs = Point::new(self.mins.x + size.width, self.mins.y + size.height);
    }

    // Returns `true` if the point is inside this rect (inclusive of mins, exclusive of maxs).
    #[inline]
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.mins.x &&
        point.x <  self.maxs.x &&
        point.y >= self.mins.y &&
        point.y <  self.maxs.y
    }
}
