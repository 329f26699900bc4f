use git2::Oid;

use crate::error::Result;
use crate::store::Store;

/// Point `name` at `new_head`, or do nothing when the head survived the
/// edit unchanged.
///
/// Returns `true` when the ref was moved. The update is a compare-and-swap
/// against `old_head` with `reason` recorded in the reflog, so a concurrent
/// external move of the ref fails the whole operation instead of being
/// overwritten, and the update can be identified and reverted later.
pub fn publish(
    store: &Store,
    name: &str,
    old_head: Oid,
    new_head: Oid,
    reason: &str,
) -> Result<bool> {
    if old_head == new_head {
        log::info!("{} unchanged at {}", name, old_head);
        return Ok(false);
    }
    store.compare_and_swap(name, old_head, new_head, reason)?;
    log::info!("updated {} from {} to {}", name, old_head, new_head);
    Ok(true)
}
