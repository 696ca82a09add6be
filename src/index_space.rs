use core::ops::Range;

/// Represents a rectangular region in a discrete `(row, column)` index
/// space. Rows run along the vertical (z) axis and columns along the
/// horizontal (x) axis. The index type is signed 64-bit integer, so ghost
/// regions below zero are addressable directly.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexSpace {
    dk: Range<i64>,
    di: Range<i64>,
}

impl IndexSpace {
    pub fn new(dk: Range<i64>, di: Range<i64>) -> Self {
        assert!(
            dk.start <= dk.end && di.start <= di.end,
            "index space has negative volume"
        );
        Self { dk, di }
    }

    /// Return the number of indexes on each axis, `(rows, columns)`.
    ///
    pub fn dim(&self) -> (usize, usize) {
        (
            (self.dk.end - self.dk.start) as usize,
            (self.di.end - self.di.start) as usize,
        )
    }

    /// Return the number of elements in this index space.
    ///
    pub fn len(&self) -> usize {
        let (l, m) = self.dim();
        l * m
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the minimum index (inclusive).
    ///
    pub fn start(&self) -> (i64, i64) {
        (self.dk.start, self.di.start)
    }

    /// Return the maximum index (exclusive).
    ///
    pub fn end(&self) -> (i64, i64) {
        (self.dk.end, self.di.end)
    }

    /// Determine whether this index space contains the given index.
    ///
    pub fn contains(&self, index: (i64, i64)) -> bool {
        self.dk.contains(&index.0) && self.di.contains(&index.1)
    }

    /// Expand this index space by the given number of elements on each axis.
    ///
    pub fn extend_all(&self, delta: i64) -> Self {
        Self::new(
            self.dk.start - delta..self.dk.end + delta,
            self.di.start - delta..self.di.end + delta,
        )
    }

    /// Return the linear offset for the given index, in a row-major memory
    /// buffer aligned with the start of this index space. Panics if the
    /// index is out of range; an out-of-range access is a defect in the
    /// caller's bounds arithmetic.
    ///
    pub fn row_major_offset(&self, index: (i64, i64)) -> usize {
        if !self.contains(index) {
            panic!(
                "index ({} {}) out of range on index space ({}..{} {}..{})",
                index.0, index.1, self.dk.start, self.dk.end, self.di.start, self.di.end
            );
        }
        let k = (index.0 - self.dk.start) as usize;
        let i = (index.1 - self.di.start) as usize;
        let m = (self.di.end - self.di.start) as usize;
        k * m + i
    }

    /// Return an iterator which traverses the index space in row-major order
    /// (C-like; the column index increases fastest).
    ///
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.dk
            .clone()
            .flat_map(move |k| self.di.clone().map(move |i| (k, i)))
    }
}

impl From<(Range<i64>, Range<i64>)> for IndexSpace {
    fn from(range: (Range<i64>, Range<i64>)) -> Self {
        Self::new(range.0, range.1)
    }
}
