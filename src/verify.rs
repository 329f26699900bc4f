use git2::Oid;

use crate::error::{Error, Result};
use crate::store::Store;

/// Assert the rewrite left the tree contents untouched.
///
/// A metadata-only rewrite must produce a head whose tree is structurally
/// identical to the old head's. A non-empty diff means the rewrite itself
/// is unsound; it is reported as [`Error::TreeChanged`] and must never be
/// downgraded or published.
pub fn verify_trees(store: &Store, old_head: Oid, new_head: Oid) -> Result<()> {
    if old_head == new_head {
        return Ok(());
    }
    let paths = store.tree_diff(old_head, new_head)?;
    if !paths.is_empty() {
        return Err(Error::tree_changed(old_head, new_head, paths));
    }
    Ok(())
}
