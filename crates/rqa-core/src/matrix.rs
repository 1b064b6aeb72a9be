//! Fully materialized recurrence matrix.

/// Square boolean matrix stored row-major, one byte per cell.
///
/// Only produced when the caller asks for matrix retention or a recurrence
/// plot; line statistics never need it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceMatrix {
    size: usize,
    cells: Vec<u8>,
}

impl RecurrenceMatrix {
    /// All-zero matrix of side `size`.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![0; size * size],
        }
    }

    /// Side length.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether column `x` recurs with row `y`.
    #[inline]
    pub fn is_recurrence(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.size + x] != 0
    }

    /// Set or clear cell `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        self.cells[y * self.size + x] = u8::from(value);
    }

    /// Row `y` as 0/1 bytes.
    pub fn row(&self, y: usize) -> &[u8] {
        &self.cells[y * self.size..(y + 1) * self.size]
    }

    /// Rows from the last to the first, the orientation of a plotted image
    /// whose origin sits bottom left.
    pub fn rows_reversed(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.cells.chunks(self.size.max(1)).rev()
    }

    /// Recurrent cells per column.
    pub fn column_counts(&self) -> Vec<u64> {
        let mut counts = vec![0u64; self.size];
        for row in self.cells.chunks(self.size.max(1)) {
            for (count, &cell) in counts.iter_mut().zip(row) {
                *count += u64::from(cell);
            }
        }
        counts
    }

    /// Total recurrent cells.
    pub fn recurrence_count(&self) -> u64 {
        self.cells.iter().map(|&c| u64::from(c)).sum()
    }
}
