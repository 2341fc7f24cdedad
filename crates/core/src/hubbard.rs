//! Hubbard occupation blocks and the assembled U operator.

use num_complex::Complex64;

use crate::context::{Context, ContextError};
use crate::linalg::Matrix;

/// Per-atom occupation-matrix blocks feeding the U correction.
///
/// Only Hubbard-active atoms carry blocks: one `nwf×nwf` complex matrix per
/// magnetic channel. Inactive atoms hold `None` and contribute nothing.
#[derive(Debug, Clone)]
pub struct OccupationMatrix {
    local: Vec<Option<Vec<Matrix<Complex64>>>>,
    num_channels: usize,
}

impl OccupationMatrix {
    pub fn zeros(ctx: &Context) -> Self {
        let uc = ctx.unit_cell();
        let num_channels = ctx.num_mag_dims() + 1;
        let local = (0..uc.num_atoms())
            .map(|ia| {
                uc.atom_type(ia).hubbard.as_ref().map(|orbitals| {
                    (0..num_channels)
                        .map(|_| Matrix::zeros(orbitals.num_wf, orbitals.num_wf))
                        .collect()
                })
            })
            .collect();
        Self {
            local,
            num_channels,
        }
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn local(&self, ia: usize) -> Option<&[Matrix<Complex64>]> {
        self.local[ia].as_deref()
    }

    pub fn local_mut(&mut self, ia: usize) -> Option<&mut [Matrix<Complex64>]> {
        self.local[ia].as_deref_mut()
    }
}

/// Hubbard-correction matrix over the full orbital manifold.
///
/// Block-diagonal by atom: only the on-site blocks of the occupation matrix
/// are copied in. A k-dependent transform of the occupancy would also fill
/// inter-atom blocks; until that lands the global matrix stays block-diagonal,
/// which is why `apply_u_operator` already works on the whole manifold rather
/// than per-atom chunks.
///
/// Rebuilt as a fresh instance at every SCF step; never mutated in place.
#[derive(Debug, Clone)]
pub struct UOperator {
    nhwf: usize,
    offsets: Vec<Option<usize>>,
    um: Vec<Matrix<Complex64>>,
}

impl UOperator {
    pub fn new(ctx: &Context, occupation: &OccupationMatrix) -> Result<Self, ContextError> {
        ctx.ensure_initialized()?;
        let uc = ctx.unit_cell();
        let num_channels = ctx.num_mag_dims() + 1;
        assert_eq!(
            occupation.num_channels(),
            num_channels,
            "occupation matrix channel count does not match the context"
        );
        let (nhwf, offsets) = uc.num_hubbard_wf();
        let mut um = vec![Matrix::zeros(nhwf, nhwf); num_channels];

        for ia in 0..uc.num_atoms() {
            let (offset, blocks) = match (offsets[ia], occupation.local(ia)) {
                (Some(offset), Some(blocks)) => (offset, blocks),
                _ => continue,
            };
            let num_wf = uc
                .atom_type(ia)
                .hubbard
                .as_ref()
                .map(|orbitals| orbitals.num_wf)
                .unwrap_or(0);
            for (channel, block) in blocks.iter().enumerate() {
                assert_eq!(block.rows(), num_wf, "occupation block shape mismatch");
                assert_eq!(block.cols(), num_wf, "occupation block shape mismatch");
                for m2 in 0..num_wf {
                    for m1 in 0..num_wf {
                        *um[channel].at_mut(offset + m1, offset + m2) = block.at(m1, m2);
                    }
                }
            }
        }

        Ok(Self { nhwf, offsets, um })
    }

    /// Total number of Hubbard wavefunctions in the manifold.
    pub fn nhwf(&self) -> usize {
        self.nhwf
    }

    /// Offset of atom `ia`'s orbitals in the manifold; `None` when the atom
    /// carries no Hubbard correction.
    pub fn offset(&self, ia: usize) -> Option<usize> {
        self.offsets[ia]
    }

    pub fn num_channels(&self) -> usize {
        self.um.len()
    }

    pub fn at(&self, m1: usize, m2: usize, channel: usize) -> Complex64 {
        self.um[channel].at(m1, m2)
    }

    pub fn channel(&self, channel: usize) -> &Matrix<Complex64> {
        &self.um[channel]
    }
}
