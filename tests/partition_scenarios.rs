use grid_tiling::prelude::*;

#[test]
fn round_trip_12x12_four_tiles() {
    // 12x12 grid, one group, four tiles, 3x3 minimum: the general strategy
    // must produce exactly four 6x6 tiles covering the grid.
    let size = Size2D::new(12, 12);
    let groups = partition_across_groups(size, 1, usize::MAX).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups.get(Target::group_level(0)), Some(size.full_slice()));

    let tiles = refine_to_units(&groups, 4, 3, 3);
    assert_eq!(tiles.len(), 4);
    for (_, region) in tiles.iter() {
        assert_eq!(region.width(), 6);
        assert_eq!(region.height(), 6);
    }
    assert!(tiles.validate_invariants().is_ok());
}

#[test]
fn narrow_grid_uses_row_chunks() {
    // 100x2 with 6-column minimum triggers long-and-narrow: min(4, 100/6)
    // = 4 tiles, 25 rows each, no remainder.
    let size = Size2D::new(100, 2);
    let groups = partition_across_groups(size, 1, usize::MAX).unwrap();
    let tiles = refine_to_units(&groups, 4, 6, 6);
    assert_eq!(tiles.len(), 4);
    for (i, (target, region)) in tiles.iter().enumerate() {
        assert_eq!(target, Target::unit_level(0, i));
        assert_eq!(region.height(), 25);
        assert_eq!(region.width(), 2);
    }
}

#[test]
fn capacity_failure_returns_no_partitioning() {
    // 1,000,000 cells over 2 groups of at most 1,000 cells each: hopeless.
    let size = Size2D::new(1000, 1000);
    assert!(partition_across_groups(size, 2, 1000).is_none());

    let topology = Topology {
        num_groups: 2,
        max_cells_per_group: 1000,
        ..Topology::default()
    };
    assert!(matches!(
        partition_grid(size, &topology),
        Err(TilingError::CapacityExceeded {
            cells: 1_000_000,
            num_groups: 2,
            max_cells_per_group: 1000,
        })
    ));
}

#[test]
fn default_topology_matches_reference_hardware() {
    let t = Topology::default();
    assert_eq!(t.num_groups, 1);
    assert_eq!(t.units_per_group, 1216);
    assert_eq!(t.workers_per_unit, 6);
    assert_eq!(t.min_rows_per_unit, 6);
    assert_eq!(t.min_cols_per_unit, 6);
}

#[test]
fn full_compose_is_deterministic() {
    let size = Size2D::new(700, 500);
    let topology = Topology {
        num_groups: 4,
        units_per_group: 64,
        workers_per_unit: 6,
        ..Topology::default()
    };
    let a = partition_grid(size, &topology).unwrap();
    let b = partition_grid(size, &topology).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.iter().collect::<Vec<_>>(), b.iter().collect::<Vec<_>>());
    assert!(a.validate_invariants().is_ok());
}

#[test]
fn worker_split_prefers_the_evener_axis() {
    // 6x7 tiles split over 6 workers: rows divide exactly, so workers get
    // one row each.
    let size = Size2D::new(6, 7);
    let groups = partition_across_groups(size, 1, usize::MAX).unwrap();
    let workers = refine_to_workers(&groups, 6);
    assert_eq!(workers.len(), 6);
    for (_, region) in workers.iter() {
        assert_eq!(region.height(), 1);
        assert_eq!(region.width(), 7);
    }

    // 7x6: columns divide exactly, so the split flips.
    let size = Size2D::new(7, 6);
    let groups = partition_across_groups(size, 1, usize::MAX).unwrap();
    let workers = refine_to_workers(&groups, 6);
    assert_eq!(workers.len(), 6);
    for (_, region) in workers.iter() {
        assert_eq!(region.height(), 7);
        assert_eq!(region.width(), 1);
    }
}

#[test]
fn tiny_units_tolerate_fewer_workers_than_requested() {
    // A 2x2 grid cannot feed 6 workers; the map just has fewer entries.
    let size = Size2D::new(2, 2);
    let groups = partition_across_groups(size, 1, usize::MAX).unwrap();
    let workers = refine_to_workers(&groups, 6);
    assert_eq!(workers.len(), 2);
    assert!(workers.validate_invariants().is_ok());
}

#[test]
fn eight_groups_layout_covers_grid() {
    let size = Size2D::new(128, 64);
    let groups = partition_across_groups(size, 8, usize::MAX).unwrap();
    assert_eq!(groups.len(), 8);
    assert!(groups.validate_invariants().is_ok());
    // Both axes divide by 8 exactly; the tie keeps the wide layout, two
    // blocks tall and four wide.
    let first = groups.get(Target::group_level(0)).unwrap();
    assert_eq!(first.height(), 64);
    assert_eq!(first.width(), 16);
}

#[test]
fn odd_group_count_still_partitions() {
    let size = Size2D::new(90, 61);
    let groups = partition_across_groups(size, 3, usize::MAX).unwrap();
    assert_eq!(groups.len(), 3);
    assert!(groups.validate_invariants().is_ok());
    // 90 % 3 == 0 beats 61 % 3, so groups are row bands of 30.
    for (_, region) in groups.iter() {
        assert_eq!(region.height(), 30);
        assert_eq!(region.width(), 61);
    }
}

#[test]
fn dump_roundtrip_through_json() {
    let size = Size2D::new(48, 36);
    let topology = Topology {
        units_per_group: 16,
        workers_per_unit: 4,
        ..Topology::default()
    };
    let p = partition_grid(size, &topology).unwrap();

    let mut buf = Vec::new();
    write_json(&p, &mut buf).unwrap();
    let restored = read_json(buf.as_slice()).unwrap();
    assert_eq!(restored, p);

    let records = to_records(&p);
    assert_eq!(records.len(), p.len());
}
