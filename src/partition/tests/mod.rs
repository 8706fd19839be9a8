use super::*;
use crate::check::DebugInvariants;


fn slice(r0: usize, r1: usize, c0: usize, c1: usize) -> Slice2D {
    Slice2D::new(Range::new(r0, r1), Range::new(c0, c1))
}

#[test]
fn fair_shares_exact_split() {
    assert_eq!(fair_shares(100, 4), vec![25, 25, 25, 25]);
}

#[test]
fn fair_shares_remainder_first() {
    assert_eq!(fair_shares(10, 3), vec![4, 3, 3]);
    assert_eq!(fair_shares(7, 7), vec![1; 7]);
    assert_eq!(fair_shares(13, 5), vec![3, 3, 3, 2, 2]);
}

#[test]
fn fair_shares_rejects_bad_part_counts() {
    assert!(std::panic::catch_unwind(|| fair_shares(10, 0)).is_err());
    assert!(std::panic::catch_unwind(|| fair_shares(3, 4)).is_err());
}

#[test]
fn target_order_is_group_then_unit_then_worker() {
    let a = Target::new(0, 10, 5);
    let b = Target::new(0, 11, 0);
    let c = Target::new(1, 0, 0);
    assert!(a < b);
    assert!(b < c);
    let mut sorted = vec![c, a, b];
    sorted.sort();
    assert_eq!(sorted, vec![a, b, c]);
}

#[test]
fn target_virtual_unit_flattens_the_hierarchy() {
    assert_eq!(Target::new(0, 7, 3).virtual_unit(1216), 7);
    assert_eq!(Target::new(2, 7, 0).virtual_unit(1216), 2 * 1216 + 7);
}

#[test]
fn below_minimum_chunk_goes_to_a_single_unit() {
    let s = slice(3, 7, 5, 9); // 4x4 < 6x6
    let p = partition_level(Target::group_level(2), s, 8, 6, 6);
    assert_eq!(p.len(), 1);
    assert_eq!(p.get(Target::unit_level(2, 0)), Some(s));
    assert!(p.validate_invariants().is_ok());
}

#[test]
fn narrow_grid_splits_by_rows_only() {
    // 100x2 with a 6-column minimum: long-and-narrow; 4 units requested,
    // min(4, 100/6) = 4 usable, 25 rows each, remainder 0.
    let s = slice(0, 100, 0, 2);
    let p = partition_level(Target::group_level(0), s, 4, 6, 6);
    assert_eq!(p.len(), 4);
    for (i, (target, region)) in p.iter().enumerate() {
        assert_eq!(target, Target::unit_level(0, i));
        assert_eq!(region.height(), 25);
        assert_eq!(region.width(), 2);
        assert_eq!(region.rows().from(), i * 25);
    }
    assert!(p.validate_invariants().is_ok());
}

#[test]
fn narrow_grid_respects_min_rows_cap() {
    // Only height/min_rows = 3 chunks are viable even with 4 units asked.
    let s = slice(0, 10, 0, 2);
    let p = partition_level(Target::group_level(0), s, 4, 3, 6);
    assert_eq!(p.len(), 3);
    let heights: Vec<_> = p.iter().map(|(_, r)| r.height()).collect();
    assert_eq!(heights, vec![4, 3, 3]);
}

#[test]
fn wide_grid_splits_by_cols_only() {
    let s = slice(0, 2, 0, 40);
    let p = partition_level(Target::group_level(0), s, 4, 6, 6);
    assert_eq!(p.len(), 4);
    let widths: Vec<_> = p.iter().map(|(_, r)| r.width()).collect();
    assert_eq!(widths, vec![10, 10, 10, 10]);
    for (_, r) in p.iter() {
        assert_eq!(r.rows(), s.rows());
    }
}

#[test]
fn general_strategy_tiles_12x12_into_four_6x6() {
    let s = slice(0, 12, 0, 12);
    let p = partition_level(Target::group_level(0), s, 4, 3, 3);
    assert_eq!(p.len(), 4);
    assert_eq!(p.get(Target::unit_level(0, 0)), Some(slice(0, 6, 0, 6)));
    assert_eq!(p.get(Target::unit_level(0, 1)), Some(slice(0, 6, 6, 12)));
    assert_eq!(p.get(Target::unit_level(0, 2)), Some(slice(6, 12, 0, 6)));
    assert_eq!(p.get(Target::unit_level(0, 3)), Some(slice(6, 12, 6, 12)));
    assert!(p.validate_invariants().is_ok());
}

#[test]
fn general_strategy_puts_tall_rows_and_wide_cols_first() {
    // 13x13 over 4 units: 2x2 lattice, shares 7+6 on both axes. The first
    // row of tiles is the tall one, the first column the wide one.
    let s = slice(0, 13, 0, 13);
    let p = partition_level(Target::group_level(0), s, 4, 3, 3);
    assert_eq!(p.len(), 4);
    assert_eq!(p.get(Target::unit_level(0, 0)), Some(slice(0, 7, 0, 7)));
    assert_eq!(p.get(Target::unit_level(0, 1)), Some(slice(0, 7, 7, 13)));
    assert_eq!(p.get(Target::unit_level(0, 2)), Some(slice(7, 13, 0, 7)));
    assert_eq!(p.get(Target::unit_level(0, 3)), Some(slice(7, 13, 7, 13)));
}

#[test]
fn general_strategy_never_uses_more_than_requested_units() {
    let s = slice(0, 12, 0, 12);
    let p = partition_level(Target::group_level(0), s, 100, 6, 6);
    // At a 6x6 minimum only a 2x2 lattice fits.
    assert_eq!(p.len(), 4);
    assert!(p.validate_invariants().is_ok());
}

#[test]
fn offset_slices_partition_in_place() {
    // Sub-regions handed down from a parent level keep their offsets.
    let s = slice(30, 60, 100, 160);
    let p = partition_level(Target::group_level(1), s, 6, 6, 6);
    assert!(p.validate_invariants().is_ok());
    for (target, region) in p.iter() {
        assert_eq!(target.group(), 1);
        assert!(region.rows().from() >= 30 && region.rows().to() <= 60);
        assert!(region.cols().from() >= 100 && region.cols().to() <= 160);
    }
}

#[test]
fn owner_lookup_by_cell_and_by_overlap() {
    let s = slice(0, 12, 0, 12);
    let p = partition_level(Target::group_level(0), s, 4, 3, 3);
    assert_eq!(p.owner_of(0, 0).unwrap().0, Target::unit_level(0, 0));
    assert_eq!(p.owner_of(11, 11).unwrap().0, Target::unit_level(0, 3));
    assert!(p.owner_of(12, 0).is_none());

    // A one-cell-wide column at col 6 crosses both right-hand tiles.
    let band = slice(0, 12, 6, 7);
    let owners: Vec<_> = p.owners_overlapping(band).map(|(t, _)| t).collect();
    assert_eq!(
        owners,
        vec![Target::unit_level(0, 1), Target::unit_level(0, 3)]
    );
}

#[test]
fn zero_units_panics() {
    let s = slice(0, 12, 0, 12);
    assert!(
        std::panic::catch_unwind(|| partition_level(Target::group_level(0), s, 0, 6, 6))
            .is_err()
    );
}
