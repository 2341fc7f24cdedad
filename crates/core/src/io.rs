//! Configuration file parsing for cell/context snapshots.
//!
//! A `CellConfig` is loadable from TOML and converts into a raw [`Context`]
//! (which still has to pass [`Context::initialize`]):
//!
//! ```toml
//! num_mag_dims = 1
//! processing_unit = "host"
//!
//! [[atom_types]]
//! label = "Ni"
//! mt_basis_size = 2
//! q_coeffs = [0.5, 0.1, 0.1, 0.3]
//! hubbard = { num_wf = 5 }
//!
//! [[atoms]]
//! type_id = 0
//! d_mtrx = [1.0, 0.0, 0.0, 2.0, 1.1, 0.0, 0.0, 2.1]
//! ```

use serde::{Deserialize, Serialize};

use crate::context::{Context, MemoryKind};
use crate::unit_cell::{Atom, AtomType, UnitCell};

/// Cell/context snapshot as read from a configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellConfig {
    pub atom_types: Vec<AtomType>,
    pub atoms: Vec<Atom>,
    #[serde(default)]
    pub num_mag_dims: usize,
    #[serde(default)]
    pub processing_unit: MemoryKind,
}

impl From<CellConfig> for Context {
    fn from(value: CellConfig) -> Self {
        Context::new(
            UnitCell::new(value.atom_types, value.atoms),
            value.num_mag_dims,
            value.processing_unit,
        )
    }
}
