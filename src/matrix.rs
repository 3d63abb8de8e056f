//! Dense matrices over GF(2^m).
//!
//! Row-major, one element per byte in memory, bit-packed on the wire.
//! Matrices are immutable once handed to callers; the mutating helpers are
//! used internally while a value is being built. Rank and solve run Gaussian
//! elimination and are only ever applied to public values, so their timing
//! discipline is relaxed; everything on a witness path (add, mul,
//! scalar accumulation, vector products) is branch-free on element values.

use zeroize::Zeroize;

use crate::field::Gf2m;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<u8>,
}

impl Matrix {
    pub fn zero(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            data: vec![0u8; rows * cols],
        }
    }

    /// Build from row-major elements. Length must equal rows * cols.
    pub fn from_elements(rows: usize, cols: usize, data: Vec<u8>) -> Self {
        assert_eq!(data.len(), rows * cols);
        Matrix { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn elements(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.data[row * self.cols + col] = value;
    }

    /// Entrywise addition: XOR of the underlying element buffers.
    pub fn add_assign(&mut self, other: &Matrix) {
        debug_assert_eq!(self.rows, other.rows);
        debug_assert_eq!(self.cols, other.cols);
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a ^= b;
        }
    }

    /// self += scalar * other, accumulating over the whole entry grid.
    pub fn scaled_add_assign(&mut self, gf: &Gf2m, scalar: u8, other: &Matrix) {
        debug_assert_eq!(self.rows, other.rows);
        debug_assert_eq!(self.cols, other.cols);
        for (a, &b) in self.data.iter_mut().zip(other.data.iter()) {
            *a ^= gf.mul(scalar, b);
        }
    }

    /// Matrix product self (p x q) * other (q x s).
    pub fn mul(&self, gf: &Gf2m, other: &Matrix) -> Matrix {
        assert_eq!(self.cols, other.rows);
        let mut out = Matrix::zero(self.rows, other.cols);
        for i in 0..self.rows {
            for t in 0..self.cols {
                let a = self.get(i, t);
                for j in 0..other.cols {
                    let v = out.get(i, j) ^ gf.mul(a, other.get(t, j));
                    out.set(i, j, v);
                }
            }
        }
        out
    }

    /// Row-vector product v (1 x rows) * self (rows x cols).
    pub fn row_vec_mul(&self, gf: &Gf2m, v: &[u8]) -> Vec<u8> {
        assert_eq!(v.len(), self.rows);
        let mut out = vec![0u8; self.cols];
        for (i, &vi) in v.iter().enumerate() {
            for j in 0..self.cols {
                out[j] ^= gf.mul(vi, self.get(i, j));
            }
        }
        out
    }

    /// Rank via Gaussian elimination. Public-data path.
    pub fn rank(&self, gf: &Gf2m) -> usize {
        let mut work = self.clone();
        let mut rank = 0usize;
        for col in 0..work.cols {
            if rank == work.rows {
                break;
            }
            let pivot = (rank..work.rows).find(|&row| work.get(row, col) != 0);
            let Some(pivot) = pivot else { continue };
            work.swap_rows(rank, pivot);
            let inv = gf.inv(work.get(rank, col));
            work.scale_row(gf, rank, inv);
            for row in 0..work.rows {
                if row != rank {
                    let factor = work.get(row, col);
                    work.eliminate_row(gf, row, rank, factor);
                }
            }
            rank += 1;
        }
        rank
    }

    /// Solve self * x = b for a full-column-rank system (rows >= cols).
    /// Returns `None` when the system is rank-deficient or inconsistent.
    /// Public-data path.
    pub fn solve(&self, gf: &Gf2m, b: &[u8]) -> Option<Vec<u8>> {
        assert_eq!(b.len(), self.rows);
        // Augmented matrix [self | b], reduced to row echelon form.
        let mut work = Matrix::zero(self.rows, self.cols + 1);
        for row in 0..self.rows {
            for col in 0..self.cols {
                work.set(row, col, self.get(row, col));
            }
            work.set(row, self.cols, b[row]);
        }
        let mut pivot_row = 0usize;
        for col in 0..self.cols {
            let pivot = (pivot_row..work.rows).find(|&row| work.get(row, col) != 0)?;
            work.swap_rows(pivot_row, pivot);
            let inv = gf.inv(work.get(pivot_row, col));
            work.scale_row(gf, pivot_row, inv);
            for row in 0..work.rows {
                if row != pivot_row {
                    let factor = work.get(row, col);
                    work.eliminate_row(gf, row, pivot_row, factor);
                }
            }
            pivot_row += 1;
        }
        // Any leftover nonzero augmented entry means the system is inconsistent.
        for row in pivot_row..work.rows {
            if work.get(row, self.cols) != 0 {
                return None;
            }
        }
        Some((0..self.cols).map(|col| work.get(col, self.cols)).collect())
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for col in 0..self.cols {
            self.data.swap(a * self.cols + col, b * self.cols + col);
        }
    }

    fn scale_row(&mut self, gf: &Gf2m, row: usize, factor: u8) {
        for col in 0..self.cols {
            let v = gf.mul(self.get(row, col), factor);
            self.set(row, col, v);
        }
    }

    fn eliminate_row(&mut self, gf: &Gf2m, target: usize, source: usize, factor: u8) {
        for col in 0..self.cols {
            let v = self.get(target, col) ^ gf.mul(factor, self.get(source, col));
            self.set(target, col, v);
        }
    }

    /// Bit-pack the entry grid (row-major) for the wire.
    pub fn pack(&self, gf: &Gf2m) -> Vec<u8> {
        gf.pack_elements(&self.data)
    }

    /// Strict unpack; rejects wrong lengths and dirty padding bits.
    pub fn unpack(gf: &Gf2m, bytes: &[u8], rows: usize, cols: usize) -> Option<Matrix> {
        let data = gf.unpack_elements(bytes, rows * cols)?;
        Some(Matrix { rows, cols, data })
    }
}

impl Zeroize for Matrix {
    fn zeroize(&mut self) {
        self.data.zeroize();
    }
}
