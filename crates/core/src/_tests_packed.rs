#![cfg(test)]

use super::packed::PackedLayout;

#[test]
fn offsets_are_prefix_sums_over_spin_blocks() {
    let layout = PackedLayout::new(vec![2, 3, 2], 2);
    assert_eq!(layout.offset(0), 0);
    assert_eq!(layout.offset(1), 2 * 2 * 2);
    assert_eq!(layout.offset(2), 2 * 2 * 2 + 3 * 3 * 2);
    assert_eq!(layout.packed_size(), (4 + 9 + 4) * 2);
}

#[test]
fn zero_sized_blocks_are_skipped_by_the_prefix_sum() {
    let layout = PackedLayout::new(vec![2, 0, 3], 1);
    assert_eq!(layout.block_dim(1), 0);
    assert_eq!(layout.offset(1), 4);
    assert_eq!(layout.offset(2), 4);
    assert_eq!(layout.packed_size(), 4 + 9);
    assert!(layout.block_range(0, 1).is_empty());
}

#[test]
fn index_is_column_major_within_a_spin_block() {
    let layout = PackedLayout::new(vec![3], 2);
    assert_eq!(layout.index(0, 0, 0, 0), 0);
    assert_eq!(layout.index(1, 0, 0, 0), 1);
    assert_eq!(layout.index(0, 1, 0, 0), 3);
    assert_eq!(layout.index(2, 2, 0, 0), 8);
    // second spin block starts one dim² further in
    assert_eq!(layout.index(0, 0, 1, 0), 9);
    assert_eq!(layout.index(1, 2, 1, 0), 9 + 7);
}

#[test]
fn block_range_covers_exactly_one_spin_block() {
    let layout = PackedLayout::new(vec![2, 3], 2);
    assert_eq!(layout.block_range(0, 0), 0..4);
    assert_eq!(layout.block_range(1, 0), 4..8);
    assert_eq!(layout.block_range(0, 1), 8..17);
    assert_eq!(layout.block_range(1, 1), 17..26);
}

#[test]
#[should_panic(expected = "basis index")]
fn index_rejects_out_of_range_basis_pair() {
    let layout = PackedLayout::new(vec![2], 1);
    let _ = layout.index(2, 0, 0, 0);
}

#[test]
#[should_panic(expected = "spin block")]
fn index_rejects_out_of_range_spin_block() {
    let layout = PackedLayout::new(vec![2], 2);
    let _ = layout.index(0, 0, 2, 0);
}

#[test]
#[should_panic(expected = "at least one spin block")]
fn layout_requires_a_spin_block() {
    let _ = PackedLayout::new(vec![2], 0);
}
