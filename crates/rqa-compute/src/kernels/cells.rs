//! Read access to the cells of one tile.

use super::matrix::TileMatrix;
use super::membership::{RecurrenceTest, TileVectors};

/// Cells of a `dim_x`×`dim_y` tile, addressed by local column `x` and row `y`.
pub trait CellSource: Sync {
    fn dim_x(&self) -> usize;

    fn dim_y(&self) -> usize;

    fn is_set(&self, x: usize, y: usize) -> bool;
}

impl<C: CellSource + ?Sized> CellSource for &C {
    fn dim_x(&self) -> usize {
        (**self).dim_x()
    }

    fn dim_y(&self) -> usize {
        (**self).dim_y()
    }

    fn is_set(&self, x: usize, y: usize) -> bool {
        (**self).is_set(x, y)
    }
}

/// Membership evaluated on demand; nothing is stored.
#[derive(Debug, Clone, Copy)]
pub struct InlineCells<'a> {
    vectors: TileVectors<'a>,
    test: &'a RecurrenceTest<'a>,
    start_x: usize,
    start_y: usize,
}

impl<'a> InlineCells<'a> {
    pub fn new(
        vectors: TileVectors<'a>,
        test: &'a RecurrenceTest<'a>,
        start_x: usize,
        start_y: usize,
    ) -> Self {
        Self {
            vectors,
            test,
            start_x,
            start_y,
        }
    }
}

impl CellSource for InlineCells<'_> {
    fn dim_x(&self) -> usize {
        self.vectors.dim_x()
    }

    fn dim_y(&self) -> usize {
        self.vectors.dim_y()
    }

    #[inline]
    fn is_set(&self, x: usize, y: usize) -> bool {
        self.test.is_recurrence(
            self.vectors.column(x),
            self.vectors.row(y),
            self.start_x + x,
            self.start_y + y,
        )
    }
}

/// Inline membership that also stores every recurrence into a matrix, so a
/// sweep builds the tile as it goes.
#[derive(Debug, Clone, Copy)]
pub struct RecordingCells<'a> {
    inline: InlineCells<'a>,
    matrix: &'a TileMatrix,
}

impl<'a> RecordingCells<'a> {
    pub fn new(inline: InlineCells<'a>, matrix: &'a TileMatrix) -> Self {
        Self { inline, matrix }
    }
}

impl CellSource for RecordingCells<'_> {
    fn dim_x(&self) -> usize {
        self.inline.dim_x()
    }

    fn dim_y(&self) -> usize {
        self.inline.dim_y()
    }

    #[inline]
    fn is_set(&self, x: usize, y: usize) -> bool {
        let set = self.inline.is_set(x, y);
        if set {
            self.matrix.set(x, y);
        }
        set
    }
}

/// The transpose of another source: column `x` reads row `x` of the inner one.
#[derive(Debug, Clone, Copy)]
pub struct Transposed<C>(pub C);

impl<C: CellSource> CellSource for Transposed<C> {
    fn dim_x(&self) -> usize {
        self.0.dim_y()
    }

    fn dim_y(&self) -> usize {
        self.0.dim_x()
    }

    #[inline]
    fn is_set(&self, x: usize, y: usize) -> bool {
        self.0.is_set(y, x)
    }
}
