#![cfg(test)]

use super::context::{Context, ContextError, MemoryKind};
use super::operator::{NonLocalOperator, OperatorKind};
use super::unit_cell::{Atom, AtomType, UnitCell};

fn real_series(len: usize, seed: u64) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = (i as f64 + 1.0) * (seed as f64 + 0.5);
            (0.53 * t).sin()
        })
        .collect()
}

/// Two species (one augmented, one norm-conserving), three atoms, collinear
/// magnetism. Atoms 0 and 2 share species and D coefficients.
fn collinear_context(pu: MemoryKind) -> Context {
    let atom_types = vec![
        AtomType {
            label: "Ni".to_string(),
            mt_basis_size: 2,
            q_coeffs: Some(real_series(4, 1)),
            hubbard: None,
        },
        AtomType {
            label: "O".to_string(),
            mt_basis_size: 3,
            q_coeffs: None,
            hubbard: None,
        },
    ];
    let d_shared = real_series(2 * 2 * 2, 2);
    let atoms = vec![
        Atom {
            type_id: 0,
            d_mtrx: d_shared.clone(),
        },
        Atom {
            type_id: 1,
            d_mtrx: real_series(3 * 3 * 2, 3),
        },
        Atom {
            type_id: 0,
            d_mtrx: d_shared,
        },
    ];
    let mut ctx = Context::new(UnitCell::new(atom_types, atoms), 1, pu);
    ctx.initialize().unwrap();
    ctx
}

fn non_collinear_context() -> Context {
    let atom_types = vec![AtomType {
        label: "Fe".to_string(),
        mt_basis_size: 2,
        q_coeffs: Some(real_series(4, 4)),
        hubbard: None,
    }];
    let atoms = vec![Atom {
        type_id: 0,
        d_mtrx: real_series(2 * 2 * 4, 5),
    }];
    let mut ctx = Context::new(UnitCell::new(atom_types, atoms), 3, MemoryKind::Host);
    ctx.initialize().unwrap();
    ctx
}

#[test]
fn d_consumes_coefficients_verbatim() {
    let ctx = collinear_context(MemoryKind::Host);
    let d_op = NonLocalOperator::d(&ctx).unwrap();
    assert_eq!(d_op.kind(), OperatorKind::D);
    for ia in [0, 2] {
        let d_mtrx = &ctx.unit_cell().atom(ia).d_mtrx;
        for ispn in 0..2 {
            for xi2 in 0..2 {
                for xi1 in 0..2 {
                    assert_eq!(
                        d_op.value(xi1, xi2, ispn, ia),
                        d_mtrx[ispn * 4 + xi2 * 2 + xi1]
                    );
                }
            }
        }
    }
}

#[test]
fn packed_block_matches_elementwise_access() {
    let ctx = collinear_context(MemoryKind::Host);
    for op in [
        NonLocalOperator::d(&ctx).unwrap(),
        NonLocalOperator::q(&ctx).unwrap(),
    ] {
        for ia in 0..3 {
            let dim = op.layout().block_dim(ia);
            for ispn in 0..op.num_spin_blocks() {
                let block = op.block(ispn, ia);
                assert_eq!(block.len(), dim * dim);
                for xi2 in 0..dim {
                    for xi1 in 0..dim {
                        assert_eq!(block[xi2 * dim + xi1], op.value(xi1, xi2, ispn, ia));
                    }
                }
            }
        }
    }
}

#[test]
fn q_replicates_one_block_per_spin_channel() {
    let ctx = collinear_context(MemoryKind::Host);
    let q_op = NonLocalOperator::q(&ctx).unwrap();
    assert!(q_op.is_diag());
    assert_eq!(q_op.num_spin_blocks(), 2);
    let expected = ctx.unit_cell().atom_type(0).q_coeffs.as_deref().unwrap();
    assert_eq!(q_op.block(0, 0), expected);
    assert_eq!(q_op.block(1, 0), expected);
}

#[test]
fn q_skips_species_without_augmentation() {
    let ctx = collinear_context(MemoryKind::Host);
    let q_op = NonLocalOperator::q(&ctx).unwrap();
    assert_eq!(q_op.layout().block_dim(1), 0);
    assert!(q_op.block(0, 1).is_empty());
    // only the two augmented atoms contribute, 2×2 blocks in two channels
    assert_eq!(q_op.packed_size(), 2 * 4 * 2);
}

#[test]
fn d_packed_size_counts_every_spin_block() {
    let ctx = collinear_context(MemoryKind::Host);
    let d_op = NonLocalOperator::d(&ctx).unwrap();
    assert_eq!(d_op.packed_size(), (4 + 9 + 4) * 2);
}

#[test]
fn same_species_atoms_carry_bitwise_identical_blocks() {
    let ctx = collinear_context(MemoryKind::Host);
    for op in [
        NonLocalOperator::d(&ctx).unwrap(),
        NonLocalOperator::q(&ctx).unwrap(),
    ] {
        for ispn in 0..op.num_spin_blocks() {
            let lhs: Vec<u64> = op.block(ispn, 0).iter().map(|v| v.to_bits()).collect();
            let rhs: Vec<u64> = op.block(ispn, 2).iter().map(|v| v.to_bits()).collect();
            assert_eq!(lhs, rhs);
        }
    }
}

#[test]
fn non_collinear_d_has_four_blocks_and_couples_spins() {
    let ctx = non_collinear_context();
    let d_op = NonLocalOperator::d(&ctx).unwrap();
    assert!(!d_op.is_diag());
    assert_eq!(d_op.num_spin_blocks(), 4);
    assert_eq!(d_op.packed_size(), 4 * 4);

    // Q stays spin-diagonal with one block per spinor component
    let q_op = NonLocalOperator::q(&ctx).unwrap();
    assert!(q_op.is_diag());
    assert_eq!(q_op.num_spin_blocks(), 2);
}

#[test]
fn operators_reject_uninitialized_context() {
    let ctx = Context::new(
        UnitCell::new(
            vec![AtomType {
                label: "X".to_string(),
                mt_basis_size: 1,
                q_coeffs: None,
                hubbard: None,
            }],
            vec![Atom {
                type_id: 0,
                d_mtrx: vec![1.0],
            }],
        ),
        0,
        MemoryKind::Host,
    );
    assert!(matches!(
        NonLocalOperator::d(&ctx),
        Err(ContextError::NotInitialized)
    ));
    assert!(matches!(
        NonLocalOperator::q(&ctx),
        Err(ContextError::NotInitialized)
    ));
}

#[test]
fn device_processing_unit_mirrors_the_packed_buffer() {
    let ctx = collinear_context(MemoryKind::Device);
    let d_op = NonLocalOperator::d(&ctx).unwrap();
    let buf = d_op.buffer();
    assert!(buf.is_mirrored());
    assert_eq!(buf.sync_count(), 1);
    assert_eq!(buf.device().unwrap(), buf.host());
}

#[test]
fn host_processing_unit_leaves_no_mirror() {
    let ctx = collinear_context(MemoryKind::Host);
    let d_op = NonLocalOperator::d(&ctx).unwrap();
    assert!(!d_op.buffer().is_mirrored());
    assert_eq!(d_op.buffer().sync_count(), 0);
}

#[test]
#[should_panic(expected = "basis index")]
fn value_rejects_out_of_range_basis_index() {
    let ctx = collinear_context(MemoryKind::Host);
    let d_op = NonLocalOperator::d(&ctx).unwrap();
    let _ = d_op.value(2, 0, 0, 0);
}
