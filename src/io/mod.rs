//! Diagnostic dumps of computed partitionings.
//!
//! A [`GridPartitioning`] serializes to an ordered list of flat records —
//! one per leaf target, with the target ids and the row/column ranges it
//! owns — wrapped together with the extent so a dump can be loaded back
//! and re-validated. The JSON layout is a debugging aid for visualization
//! tools, not a stability promise.

use std::io::{Read, Write};

use crate::check::DebugInvariants;
use crate::error::TilingError;
use crate::geometry::{Range, Slice2D};
use crate::partition::{GridPartitioning, Target};

/// One partition entry in dump form.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PartitionRecord {
    pub group: usize,
    pub unit: usize,
    pub worker: usize,
    pub rows: Range,
    pub cols: Range,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct PartitionDump {
    extent: Slice2D,
    partitioning: Vec<PartitionRecord>,
}

/// The partitioning as an ordered record list (map order).
pub fn to_records(partitioning: &GridPartitioning) -> Vec<PartitionRecord> {
    partitioning
        .iter()
        .map(|(target, slice)| PartitionRecord {
            group: target.group(),
            unit: target.unit(),
            worker: target.worker(),
            rows: slice.rows(),
            cols: slice.cols(),
        })
        .collect()
}

/// Writes a pretty-printed JSON dump of `partitioning`.
pub fn write_json<W: Write>(
    partitioning: &GridPartitioning,
    writer: W,
) -> Result<(), TilingError> {
    let dump = PartitionDump {
        extent: partitioning.extent(),
        partitioning: to_records(partitioning),
    };
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

/// Reads a dump back into a partitioning and re-validates the tiling
/// invariant, so a hand-edited or truncated dump cannot smuggle in an
/// overlapping or gappy map.
pub fn read_json<R: Read>(reader: R) -> Result<GridPartitioning, TilingError> {
    let dump: PartitionDump = serde_json::from_reader(reader)?;
    let mut partitioning = GridPartitioning::with_extent(dump.extent);
    for record in &dump.partitioning {
        let target = Target::new(record.group, record.unit, record.worker);
        let region = Slice2D::new(record.rows, record.cols);
        if partitioning.get(target).is_some() {
            return Err(TilingError::RegionOverlap { a: target, b: target });
        }
        if dump.extent.intersect(region) != Some(region) {
            return Err(TilingError::RegionOutOfExtent {
                target,
                region,
                extent: dump.extent,
            });
        }
        partitioning.insert(target, region);
    }
    partitioning.validate_invariants()?;
    Ok(partitioning)
}
