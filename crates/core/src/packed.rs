//! Packed-offset table for the flat per-atom operator blocks.

/// Offsets of per-atom operator blocks inside one flat buffer.
///
/// Atom `ia` owns `block_dim[ia]² · num_spin_blocks` consecutive entries
/// starting at `offset(ia)`; a zero-sized block (species without data for
/// this operator) is valid and contributes nothing.
#[derive(Debug, Clone)]
pub struct PackedLayout {
    block_dims: Vec<usize>,
    offsets: Vec<usize>,
    num_spin_blocks: usize,
    packed_size: usize,
}

impl PackedLayout {
    pub fn new(block_dims: Vec<usize>, num_spin_blocks: usize) -> Self {
        assert!(num_spin_blocks >= 1, "need at least one spin block");
        let mut offsets = Vec::with_capacity(block_dims.len());
        let mut total = 0;
        for &dim in &block_dims {
            offsets.push(total);
            total += dim * dim * num_spin_blocks;
        }
        Self {
            block_dims,
            offsets,
            num_spin_blocks,
            packed_size: total,
        }
    }

    pub fn num_atoms(&self) -> usize {
        self.block_dims.len()
    }

    pub fn block_dim(&self, ia: usize) -> usize {
        self.block_dims[ia]
    }

    pub fn offset(&self, ia: usize) -> usize {
        self.offsets[ia]
    }

    pub fn num_spin_blocks(&self) -> usize {
        self.num_spin_blocks
    }

    pub fn packed_size(&self) -> usize {
        self.packed_size
    }

    /// Flat index of element `(xi1, xi2)` in spin block `ispn` of atom `ia`.
    /// Indices past the atom's block dimension are a caller bug.
    #[inline]
    pub fn index(&self, xi1: usize, xi2: usize, ispn: usize, ia: usize) -> usize {
        let dim = self.block_dims[ia];
        assert!(
            xi1 < dim && xi2 < dim,
            "basis index ({xi1}, {xi2}) out of range for atom {ia} with {dim} projectors"
        );
        assert!(
            ispn < self.num_spin_blocks,
            "spin block {ispn} out of range ({} blocks)",
            self.num_spin_blocks
        );
        self.offsets[ia] + ispn * dim * dim + xi2 * dim + xi1
    }

    /// Range of atom `ia`'s spin block `ispn` in the flat buffer.
    pub fn block_range(&self, ispn: usize, ia: usize) -> std::ops::Range<usize> {
        let dim = self.block_dims[ia];
        assert!(
            ispn < self.num_spin_blocks,
            "spin block {ispn} out of range ({} blocks)",
            self.num_spin_blocks
        );
        let start = self.offsets[ia] + ispn * dim * dim;
        start..start + dim * dim
    }
}
