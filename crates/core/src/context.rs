//! Simulation context: the validated upstream state operators are built from.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::unit_cell::UnitCell;

/// Where operator buffers live; `Device` requests an explicit mirrored snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemoryKind {
    #[default]
    Host,
    Device,
}

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("simulation context is not initialized")]
    NotInitialized,

    #[error("unsupported number of magnetic dimensions: {0} (expected 0, 1 or 3)")]
    InvalidMagDims(usize),

    #[error("atom {atom}: D matrix has {got} entries, expected {expected}")]
    DMatrixShape {
        atom: usize,
        got: usize,
        expected: usize,
    },

    #[error("atom type `{label}`: augmentation matrix has {got} entries, expected {expected}")]
    QMatrixShape {
        label: String,
        got: usize,
        expected: usize,
    },
}

/// Upstream context snapshot.
///
/// Constructed raw and then validated once by [`Context::initialize`];
/// operator constructors reject a context that has not passed validation.
#[derive(Debug, Clone)]
pub struct Context {
    unit_cell: UnitCell,
    num_mag_dims: usize,
    processing_unit: MemoryKind,
    initialized: bool,
}

impl Context {
    pub fn new(unit_cell: UnitCell, num_mag_dims: usize, processing_unit: MemoryKind) -> Self {
        Self {
            unit_cell,
            num_mag_dims,
            processing_unit,
            initialized: false,
        }
    }

    /// Validate the catalog shapes against the magnetic configuration.
    pub fn initialize(&mut self) -> Result<(), ContextError> {
        if !matches!(self.num_mag_dims, 0 | 1 | 3) {
            return Err(ContextError::InvalidMagDims(self.num_mag_dims));
        }
        for type_id in 0..self.unit_cell.num_atom_types() {
            let atom_type = self.unit_cell.atom_type_by_id(type_id);
            if let Some(q) = &atom_type.q_coeffs {
                let expected = atom_type.mt_basis_size * atom_type.mt_basis_size;
                if q.len() != expected {
                    return Err(ContextError::QMatrixShape {
                        label: atom_type.label.clone(),
                        got: q.len(),
                        expected,
                    });
                }
            }
        }
        let num_blocks = self.num_spin_blocks();
        for ia in 0..self.unit_cell.num_atoms() {
            let nbf = self.unit_cell.mt_basis_size(ia);
            let expected = nbf * nbf * num_blocks;
            let got = self.unit_cell.atom(ia).d_mtrx.len();
            if got != expected {
                return Err(ContextError::DMatrixShape {
                    atom: ia,
                    got,
                    expected,
                });
            }
        }
        self.initialized = true;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn ensure_initialized(&self) -> Result<(), ContextError> {
        if self.initialized {
            Ok(())
        } else {
            Err(ContextError::NotInitialized)
        }
    }

    pub fn unit_cell(&self) -> &UnitCell {
        &self.unit_cell
    }

    pub fn num_mag_dims(&self) -> usize {
        self.num_mag_dims
    }

    /// Spinor components: 1 non-magnetic, 2 otherwise.
    pub fn num_spins(&self) -> usize {
        if self.num_mag_dims > 0 {
            2
        } else {
            1
        }
    }

    /// Spin blocks of a spin-coupling operator: 4 in the non-collinear case
    /// (two diagonal plus two off-diagonal channels), otherwise one per spin.
    pub fn num_spin_blocks(&self) -> usize {
        if self.num_mag_dims == 3 {
            4
        } else {
            self.num_spins()
        }
    }

    pub fn processing_unit(&self) -> MemoryKind {
        self.processing_unit
    }
}
