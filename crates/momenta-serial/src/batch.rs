//! Parallel decoding of independent records against a finished table.

use rayon::ThreadPool;
use tracing::info;

use momenta_ir::Operation;
use momenta_work::starmap_with_progress;

use crate::constant::ConstantTable;
use crate::deserializer::deserialize_operation;
use crate::error::SerialResult;
use crate::record::OperationRecord;

/// Decode many operation records that only read from `table`.
///
/// Records are spread over `pool` when one is given. The results keep the
/// order of `records`; the first failing record's error is returned.
pub fn deserialize_batch(
    records: &[OperationRecord],
    table: &ConstantTable,
    pool: Option<&ThreadPool>,
) -> SerialResult<Vec<Operation>> {
    info!(
        "Decoding {} records against {} constants",
        records.len(),
        table.len()
    );

    let mut decoded = starmap_with_progress(
        |index: usize, record: &OperationRecord| (index, deserialize_operation(record, table)),
        records.iter().enumerate().collect(),
        pool,
    );
    decoded.sort_unstable_by_key(|(index, _)| *index);
    decoded.into_iter().map(|(_, op)| op).collect()
}
