//! Beta-projector bookkeeping: atom chunks and projector-wavefunction inner products.

use crate::backend::NlBackend;
use crate::linalg::{Matrix, NlScalar};
use crate::unit_cell::UnitCell;
use crate::wave_functions::WaveFunctions;

/// One atom inside a chunk: global atom id, projector count, and the offset
/// of its projectors inside the chunk's coefficient matrix.
#[derive(Debug, Clone)]
pub struct ChunkAtom {
    pub ia: usize,
    pub nbf: usize,
    pub offset: usize,
}

/// A group of atoms processed together for locality.
#[derive(Debug, Clone)]
pub struct BetaChunk {
    pub atoms: Vec<ChunkAtom>,
    pub num_beta: usize,
}

/// Beta projectors, pre-expanded in the plane-wave basis and partitioned
/// into atom chunks. The chunk granularity is an upstream locality decision;
/// this type only carries it.
#[derive(Debug, Clone)]
pub struct BetaProjectors<T> {
    num_rows: usize,
    chunks: Vec<BetaChunk>,
    coeffs: Vec<Matrix<T>>,
}

impl<T: NlScalar> BetaProjectors<T> {
    /// Partition the cell's atoms into chunks of at most `atoms_per_chunk`
    /// consecutive atoms and slice the global coefficient matrix
    /// (`num_rows × total beta count`, columns in atom order) accordingly.
    pub fn new(
        unit_cell: &UnitCell,
        num_rows: usize,
        coeffs: Matrix<T>,
        atoms_per_chunk: usize,
    ) -> Self {
        assert!(atoms_per_chunk >= 1, "chunks must hold at least one atom");
        assert_eq!(coeffs.rows(), num_rows, "coefficient rows must match");
        assert_eq!(
            coeffs.cols(),
            unit_cell.num_beta_total(),
            "coefficient columns must cover every projector"
        );

        let mut chunks = Vec::new();
        let mut chunk_coeffs = Vec::new();
        let mut ia = 0;
        let mut col0 = 0;
        while ia < unit_cell.num_atoms() {
            let last = (ia + atoms_per_chunk).min(unit_cell.num_atoms());
            let mut atoms = Vec::with_capacity(last - ia);
            let mut num_beta = 0;
            for a in ia..last {
                let nbf = unit_cell.mt_basis_size(a);
                atoms.push(ChunkAtom {
                    ia: a,
                    nbf,
                    offset: num_beta,
                });
                num_beta += nbf;
            }
            let data = coeffs.cols_slice(col0, num_beta).to_vec();
            chunk_coeffs.push(Matrix::from_vec(num_rows, num_beta, data));
            chunks.push(BetaChunk { atoms, num_beta });
            col0 += num_beta;
            ia = last;
        }

        Self {
            num_rows,
            chunks,
            coeffs: chunk_coeffs,
        }
    }

    /// Build from an explicit chunk partition (used by tests and callers with
    /// their own distribution).
    pub fn from_chunks(num_rows: usize, chunks: Vec<BetaChunk>, coeffs: Vec<Matrix<T>>) -> Self {
        assert_eq!(chunks.len(), coeffs.len(), "one coefficient matrix per chunk");
        for (chunk, mtrx) in chunks.iter().zip(&coeffs) {
            assert_eq!(mtrx.rows(), num_rows);
            assert_eq!(mtrx.cols(), chunk.num_beta);
        }
        Self {
            num_rows,
            chunks,
            coeffs,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk(&self, ichunk: usize) -> &BetaChunk {
        &self.chunks[ichunk]
    }

    pub fn pw_coeffs(&self, ichunk: usize) -> &Matrix<T> {
        &self.coeffs[ichunk]
    }

    /// Inner-product matrix `⟨β|φ⟩` for one chunk, spinor component and
    /// column range. This is the expensive step shared between operator
    /// applications.
    pub fn inner<B: NlBackend>(
        &self,
        backend: &B,
        ichunk: usize,
        phi: &WaveFunctions<T>,
        ispn: usize,
        idx0: usize,
        n: usize,
    ) -> Matrix<T> {
        assert_eq!(phi.num_rows(), self.num_rows, "wavefunction rows must match");
        let chunk = &self.chunks[ichunk];
        let mut out = Matrix::zeros(chunk.num_beta, n);
        backend.gemm_ct(
            chunk.num_beta,
            n,
            self.num_rows,
            self.coeffs[ichunk].as_slice(),
            self.num_rows,
            phi.component(ispn).cols_slice(idx0, n),
            self.num_rows,
            out.as_mut_slice(),
            chunk.num_beta,
        );
        out
    }
}
