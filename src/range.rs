use git2::Oid;

use crate::error::{Error, Result};
use crate::store::Store;

/// The editable region of history: every commit in `(ancestor, newest]`.
///
/// `ancestor` sits just outside the region and is never rewritten. Computed
/// once per invocation and immutable afterwards; both extraction and the
/// final tree check work from the same pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeBoundary {
    /// Head of the edit.
    pub newest: Oid,
    /// Exclusive lower bound, outside the edit.
    pub ancestor: Oid,
}

impl RangeBoundary {
    pub fn new(newest: Oid, ancestor: Oid) -> Self {
        Self { newest, ancestor }
    }

    /// Check the range is usable before extracting anything.
    ///
    /// # Errors
    /// * [`Error::EmptyRange`] when head and ancestor coincide.
    /// * [`Error::NotFound`] when `ancestor` is not actually an ancestor of
    ///   `newest` (a bogus explicit base).
    pub fn sanity_check(&self, store: &Store) -> Result<()> {
        if self.newest == self.ancestor {
            return Err(Error::empty_range(self.newest));
        }
        if !store.is_ancestor(self.ancestor, self.newest)? {
            return Err(Error::not_found(format!(
                "{} is not an ancestor of {}",
                self.ancestor, self.newest
            )));
        }
        Ok(())
    }
}

/// Pick the base giving the fewest commits between head and base.
///
/// `head_spec` is resolved to the newest commit. Each entry of `bases` is
/// resolved and its merge base with head considered; with no `bases` given,
/// every remote-tracking branch is a candidate. The winning ancestor is the
/// merge base minimizing the size of `(ancestor, newest]`.
///
/// # Errors
/// Returns [`Error::NoBase`] when no candidate shares any history with the
/// head.
pub fn select_base(store: &Store, head_spec: &str, bases: &[String]) -> Result<RangeBoundary> {
    let newest = store.resolve(head_spec)?;

    let candidates: Vec<(String, Oid)> = if bases.is_empty() {
        store.remote_heads()?
    } else {
        let mut out = Vec::with_capacity(bases.len());
        for spec in bases {
            out.push((spec.clone(), store.resolve(spec)?));
        }
        out
    };

    let mut best: Option<(usize, Oid, String)> = None;
    for (name, candidate) in candidates {
        let base = match store.merge_base(newest, candidate)? {
            Some(oid) => oid,
            None => continue,
        };
        let count = store.count_range(newest, base)?;
        log::debug!("base candidate {}: {} commits", name, count);
        match best {
            Some((best_count, _, _)) if best_count <= count => {}
            _ => best = Some((count, base, name)),
        }
    }

    match best {
        Some((count, ancestor, name)) => {
            log::info!(
                "using base {} ({}, {} commits above it)",
                ancestor,
                name,
                count
            );
            Ok(RangeBoundary::new(newest, ancestor))
        }
        None => Err(Error::no_base(newest)),
    }
}
