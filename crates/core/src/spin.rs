//! Spinor-component ranges and spin-block index mapping.

/// Range of spinor components an operation acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinRange {
    first: usize,
    count: usize,
}

impl SpinRange {
    /// One spinor component (collinear up or down, or the single non-magnetic channel).
    pub fn single(ispn: usize) -> Self {
        assert!(ispn < 2, "spinor component index must be 0 or 1");
        Self {
            first: ispn,
            count: 1,
        }
    }

    /// Both spinor components (non-collinear, or a collinear sweep over both channels).
    pub fn both() -> Self {
        Self { first: 0, count: 2 }
    }

    pub fn num(&self) -> usize {
        self.count
    }

    pub fn iter(&self) -> std::ops::Range<usize> {
        self.first..self.first + self.count
    }
}

/// Output and input spinor components coupled by a spin block.
///
/// Blocks 0 and 1 are the diagonal (up-up, down-down) channels; blocks 2 and 3
/// are the off-diagonal channels a non-spin-diagonal operator must also visit.
pub fn spin_block_components(block: usize) -> (usize, usize) {
    assert!(block < 4, "spin block index must be < 4, got {block}");
    let input = block & 1;
    let output = input ^ (block >> 1);
    (output, input)
}
