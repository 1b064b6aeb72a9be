//! Tile matrix storage and the construction kernels.

use rayon::prelude::*;
use rqa_core::MatrixEncoding;
use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use super::cells::CellSource;
use crate::error::{ComputeError, ComputeResult};
use crate::substrate::{ComputeSubstrate, DeviceBuffer, KernelLaunch};

const BITS_PER_WORD: usize = 32;

/// Bytes a `dim_x`×`dim_y` tile needs in `encoding`.
pub fn matrix_bytes(encoding: MatrixEncoding, dim_x: usize, dim_y: usize) -> u64 {
    match encoding {
        MatrixEncoding::Bit => {
            (dim_x * dim_y.div_ceil(BITS_PER_WORD) * std::mem::size_of::<u32>()) as u64
        }
        MatrixEncoding::Byte => (dim_x * dim_y) as u64,
    }
}

enum Storage {
    /// Column-major, 32 rows per word.
    Packed(DeviceBuffer<AtomicU32>),
    /// Row-major, one byte per cell.
    Unpacked(DeviceBuffer<AtomicU8>),
}

/// Recurrence cells of one tile.
///
/// Cells start cleared and are only ever set, so parallel units may write
/// concurrently; packed words are updated with an atomic OR.
pub struct TileMatrix {
    dim_x: usize,
    dim_y: usize,
    words_per_column: usize,
    storage: Storage,
}

impl TileMatrix {
    /// Allocate a cleared tile on `substrate`.
    pub fn allocate<S: ComputeSubstrate>(
        substrate: &S,
        encoding: MatrixEncoding,
        dim_x: usize,
        dim_y: usize,
    ) -> ComputeResult<Self> {
        let words_per_column = dim_y.div_ceil(BITS_PER_WORD);
        let storage = match encoding {
            MatrixEncoding::Bit => {
                Storage::Packed(substrate.allocate("tile_matrix", dim_x * words_per_column)?)
            }
            MatrixEncoding::Byte => Storage::Unpacked(substrate.allocate("tile_matrix", dim_x * dim_y)?),
        };
        Ok(Self {
            dim_x,
            dim_y,
            words_per_column,
            storage,
        })
    }

    pub fn is_packed(&self) -> bool {
        matches!(self.storage, Storage::Packed(_))
    }

    pub fn encoding(&self) -> MatrixEncoding {
        match self.storage {
            Storage::Packed(_) => MatrixEncoding::Bit,
            Storage::Unpacked(_) => MatrixEncoding::Byte,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        match &self.storage {
            Storage::Packed(words) => words.size_bytes(),
            Storage::Unpacked(cells) => cells.size_bytes(),
        }
    }

    /// Mark `(x, y)` as a recurrence.
    #[inline]
    pub fn set(&self, x: usize, y: usize) {
        match &self.storage {
            Storage::Packed(words) => {
                let word = x * self.words_per_column + y / BITS_PER_WORD;
                words[word].fetch_or(1 << (y % BITS_PER_WORD), Ordering::Relaxed);
            }
            Storage::Unpacked(cells) => cells[y * self.dim_x + x].store(1, Ordering::Relaxed),
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        match &self.storage {
            Storage::Packed(words) => {
                let word = x * self.words_per_column + y / BITS_PER_WORD;
                (words[word].load(Ordering::Relaxed) >> (y % BITS_PER_WORD)) & 1 == 1
            }
            Storage::Unpacked(cells) => cells[y * self.dim_x + x].load(Ordering::Relaxed) != 0,
        }
    }

    /// Number of recurrences in the tile.
    pub fn count(&self) -> u64 {
        match &self.storage {
            Storage::Packed(words) => words
                .iter()
                .map(|w| u64::from(w.load(Ordering::Relaxed).count_ones()))
                .sum(),
            Storage::Unpacked(cells) => cells
                .iter()
                .filter(|c| c.load(Ordering::Relaxed) != 0)
                .count() as u64,
        }
    }
}

impl CellSource for TileMatrix {
    fn dim_x(&self) -> usize {
        self.dim_x
    }

    fn dim_y(&self) -> usize {
        self.dim_y
    }

    #[inline]
    fn is_set(&self, x: usize, y: usize) -> bool {
        self.get(x, y)
    }
}

impl fmt::Debug for TileMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileMatrix")
            .field("dim_x", &self.dim_x)
            .field("dim_y", &self.dim_y)
            .field("encoding", &self.encoding())
            .finish()
    }
}

fn check_shape<C: CellSource>(kernel: &str, source: &C, matrix: &TileMatrix) -> ComputeResult<()> {
    if source.dim_x() != matrix.dim_x || source.dim_y() != matrix.dim_y {
        return Err(ComputeError::kernel_failed(
            kernel,
            format!(
                "source is {}x{} but the matrix is {}x{}",
                source.dim_x(),
                source.dim_y(),
                matrix.dim_x,
                matrix.dim_y
            ),
        ));
    }
    Ok(())
}

/// Construction with one parallel unit per cell.
pub fn build_by_cell<S: ComputeSubstrate, C: CellSource>(
    substrate: &S,
    source: &C,
    matrix: &TileMatrix,
) -> ComputeResult<()> {
    const KERNEL: &str = "create_matrix_by_cell";
    check_shape(KERNEL, source, matrix)?;
    let dim_x = matrix.dim_x;
    if dim_x == 0 {
        return Ok(());
    }

    substrate.dispatch(KernelLaunch::new(KERNEL, matrix.dim_x * matrix.dim_y), |work| {
        (0..work).into_par_iter().for_each(|cell| {
            let (x, y) = (cell % dim_x, cell / dim_x);
            if source.is_set(x, y) {
                matrix.set(x, y);
            }
        });
    })
}

/// Construction with one parallel unit per column.
pub fn build_by_column<S: ComputeSubstrate, C: CellSource>(
    substrate: &S,
    source: &C,
    matrix: &TileMatrix,
) -> ComputeResult<()> {
    const KERNEL: &str = "create_matrix_by_column";
    check_shape(KERNEL, source, matrix)?;
    let dim_y = matrix.dim_y;

    substrate.dispatch(KernelLaunch::new(KERNEL, matrix.dim_x), |work| {
        (0..work).into_par_iter().for_each(|x| {
            for y in 0..dim_y {
                if source.is_set(x, y) {
                    matrix.set(x, y);
                }
            }
        });
    })
}
