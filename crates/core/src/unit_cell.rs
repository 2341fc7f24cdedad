//! Read-only snapshot of the atom catalog consumed at operator construction.

use serde::{Deserialize, Serialize};

/// Hubbard-corrected orbital manifold of an atom type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubbardOrbitals {
    /// Number of localized wavefunctions carrying the correction (2l + 1 per shell).
    pub num_wf: usize,
}

/// Pseudopotential descriptor shared by all atoms of one species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomType {
    pub label: String,
    /// Number of beta projectors of this species.
    pub mt_basis_size: usize,
    /// Augmentation (Q) coefficients, column-major `mt_basis_size²`.
    /// `None` for norm-conserving species; they contribute a zero-sized Q block.
    #[serde(default)]
    pub q_coeffs: Option<Vec<f64>>,
    #[serde(default)]
    pub hubbard: Option<HubbardOrbitals>,
}

impl AtomType {
    pub fn augment(&self) -> bool {
        self.q_coeffs.is_some()
    }

    pub fn hubbard_correction(&self) -> bool {
        self.hubbard.is_some()
    }
}

/// One atom of the cell.
///
/// `d_mtrx` holds the D coefficients seeded by the radial-integral producer:
/// one column-major `nbf×nbf` block per spin block, concatenated. The engine
/// consumes these values verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atom {
    pub type_id: usize,
    #[serde(default)]
    pub d_mtrx: Vec<f64>,
}

/// Atom catalog: species descriptors plus the atoms referencing them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitCell {
    atom_types: Vec<AtomType>,
    atoms: Vec<Atom>,
}

impl UnitCell {
    pub fn new(atom_types: Vec<AtomType>, atoms: Vec<Atom>) -> Self {
        for (ia, atom) in atoms.iter().enumerate() {
            assert!(
                atom.type_id < atom_types.len(),
                "atom {ia} references unknown atom type {}",
                atom.type_id
            );
        }
        Self { atom_types, atoms }
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn num_atom_types(&self) -> usize {
        self.atom_types.len()
    }

    pub fn atom(&self, ia: usize) -> &Atom {
        &self.atoms[ia]
    }

    /// Species descriptor of atom `ia`.
    pub fn atom_type(&self, ia: usize) -> &AtomType {
        &self.atom_types[self.atoms[ia].type_id]
    }

    pub fn atom_type_by_id(&self, type_id: usize) -> &AtomType {
        &self.atom_types[type_id]
    }

    pub fn mt_basis_size(&self, ia: usize) -> usize {
        self.atom_type(ia).mt_basis_size
    }

    pub fn num_beta_total(&self) -> usize {
        (0..self.num_atoms()).map(|ia| self.mt_basis_size(ia)).sum()
    }

    /// Total Hubbard wavefunction count and per-atom offsets into the global
    /// U manifold. Atoms without Hubbard correction get `None` and are
    /// skipped by the prefix sum.
    pub fn num_hubbard_wf(&self) -> (usize, Vec<Option<usize>>) {
        let mut offsets = Vec::with_capacity(self.atoms.len());
        let mut total = 0;
        for atom in &self.atoms {
            match &self.atom_types[atom.type_id].hubbard {
                Some(orbitals) => {
                    offsets.push(Some(total));
                    total += orbitals.num_wf;
                }
                None => offsets.push(None),
            }
        }
        (total, offsets)
    }
}
