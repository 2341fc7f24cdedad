//! Wavefunction coefficient blocks, indexable by spinor component and column range.

use crate::linalg::{Matrix, NlScalar};

/// A block of wavefunction coefficients: one column-major matrix per spinor
/// component, columns are bands. The operator engine writes into these
/// additively and never owns them.
#[derive(Debug, Clone)]
pub struct WaveFunctions<T> {
    num_rows: usize,
    components: Vec<Matrix<T>>,
}

impl<T: NlScalar> WaveFunctions<T> {
    pub fn zeros(num_rows: usize, num_cols: usize, num_components: usize) -> Self {
        assert!(
            num_components == 1 || num_components == 2,
            "wavefunctions have 1 or 2 spinor components"
        );
        Self {
            num_rows,
            components: (0..num_components)
                .map(|_| Matrix::zeros(num_rows, num_cols))
                .collect(),
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.components[0].cols()
    }

    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    pub fn component(&self, ispn: usize) -> &Matrix<T> {
        &self.components[ispn]
    }

    pub fn component_mut(&mut self, ispn: usize) -> &mut Matrix<T> {
        &mut self.components[ispn]
    }

    /// Overwrite columns `[idx0, idx0 + n)` of component `ispn` with the same
    /// columns of `src`.
    pub fn copy_cols_from(&mut self, src: &Self, ispn: usize, idx0: usize, n: usize) {
        assert_eq!(self.num_rows, src.num_rows, "row counts must match");
        let dst = self.components[ispn].cols_slice_mut(idx0, n);
        dst.copy_from_slice(src.components[ispn].cols_slice(idx0, n));
    }
}
