//! Geometric growth for the suite and case registries.

use crate::error::EngineError;

/// Capacity of the first reservation.
pub const INITIAL_CAPACITY: usize = 4;

/// Make room for one more element: 4 on first use, then double.
///
/// Uses `try_reserve_exact`, so an allocation failure leaves `items` untouched.
pub fn reserve_slot<T>(items: &mut Vec<T>, what: &'static str) -> Result<(), EngineError> {
    if items.len() < items.capacity() {
        return Ok(());
    }
    let target = if items.capacity() == 0 {
        INITIAL_CAPACITY
    } else {
        items.capacity().saturating_mul(2)
    };
    items
        .try_reserve_exact(target - items.len())
        .map_err(|_| EngineError::Allocation { what })
}
