//! Row assembly.

use crate::error::GenerationError;
use crate::plan::FieldPlan;
use fakegen_core::Row;
use rand::Rng;

/// Build row `index` by running every plan once, in schema order.
///
/// The row's partition comes from the plan carrying the partition
/// assigner; a null or unhashable key leaves it unset.
pub fn assemble_row<R: Rng + ?Sized>(
    plans: &mut [FieldPlan],
    rng: &mut R,
    index: u64,
) -> Result<Row, GenerationError> {
    let mut row = Row::with_capacity(index, plans.len());
    for plan in plans.iter_mut() {
        let value = plan.generate(rng, index)?;
        if let Some(assigner) = plan.partitioner() {
            row.partition = assigner.assign(&value);
        }
        row.push(plan.name().clone(), value);
    }
    Ok(row)
}
