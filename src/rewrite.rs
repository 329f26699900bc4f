use std::collections::{HashMap, HashSet};

use git2::Oid;

use crate::commit::RawCommit;
use crate::error::{Error, Result};
use crate::extract::CommitRecord;
use crate::store::Store;

/// Mapping from original commit id to its id after the rewrite.
///
/// Covers every commit in the edited range plus every boundary parent
/// (which maps to itself). The map is total over everything referenced as
/// a parent by a rewritten commit; a miss means the rewrite plan is
/// inconsistent and is always a hard error, never a silent default.
#[derive(Debug, Default)]
pub struct CommitMap {
    map: HashMap<Oid, Oid>,
}

impl CommitMap {
    /// New id for `id`.
    ///
    /// # Errors
    /// Returns [`Error::UnmappedParent`] when `id` has no entry.
    pub fn resolve(&self, id: Oid) -> Result<Oid> {
        self.map
            .get(&id)
            .copied()
            .ok_or_else(|| Error::unmapped_parent(id))
    }

    pub fn get(&self, id: Oid) -> Option<Oid> {
        self.map.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of commits that received a new id.
    pub fn rewritten(&self) -> usize {
        self.map.iter().filter(|(old, new)| old != new).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Oid, Oid)> + '_ {
        self.map.iter().map(|(&k, &v)| (k, v))
    }

    fn insert(&mut self, old: Oid, new: Oid) {
        self.map.insert(old, new);
    }
}

/// Result of the depth-first traversal: record indices in parents-first
/// order plus the parents found outside the edited set.
struct TopoOrder {
    order: Vec<usize>,
    boundary: HashSet<Oid>,
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Done,
}

struct Frame {
    idx: usize,
    parents: Vec<Oid>,
    next: usize,
}

/// Post-order depth-first sort of `records` over the parent relation.
///
/// Uses an explicit stack so arbitrarily long ranges cannot overflow the
/// call stack. Parents that do not resolve to a record are collected as
/// boundary parents and never recursed into.
///
/// # Errors
/// * [`Error::ParentCycle`] when a parent is reached while still being
///   visited. A cycle cannot come out of real history; it indicates a
///   corrupt or adversarial input.
/// * [`Error::IncompleteWalk`] when the emitted count differs from the
///   input count (e.g. duplicate records).
fn topo_order(records: &[CommitRecord]) -> Result<TopoOrder> {
    let index: HashMap<Oid, usize> = records
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id, i))
        .collect();

    let mut mark: HashMap<Oid, Mark> = HashMap::new();
    let mut order: Vec<usize> = Vec::with_capacity(records.len());
    let mut boundary: HashSet<Oid> = HashSet::new();
    let mut stack: Vec<Frame> = Vec::new();

    for start in 0..records.len() {
        if mark.contains_key(&records[start].id) {
            continue;
        }
        mark.insert(records[start].id, Mark::Visiting);
        stack.push(Frame {
            idx: start,
            parents: records[start].commit.parent_ids()?,
            next: 0,
        });

        while let Some(frame) = stack.last_mut() {
            let idx = frame.idx;
            let pending = if frame.next < frame.parents.len() {
                let parent = frame.parents[frame.next];
                frame.next += 1;
                Some(parent)
            } else {
                None
            };

            let parent = match pending {
                Some(parent) => parent,
                None => {
                    // All parents emitted; emit this record.
                    mark.insert(records[idx].id, Mark::Done);
                    order.push(idx);
                    stack.pop();
                    continue;
                }
            };

            match index.get(&parent) {
                None => {
                    // Outside the edited set.
                    boundary.insert(parent);
                    mark.insert(parent, Mark::Done);
                }
                Some(&pidx) => match mark.get(&parent) {
                    Some(Mark::Done) => {}
                    Some(Mark::Visiting) => return Err(Error::parent_cycle(parent)),
                    None => {
                        mark.insert(parent, Mark::Visiting);
                        stack.push(Frame {
                            idx: pidx,
                            parents: records[pidx].commit.parent_ids()?,
                            next: 0,
                        });
                    }
                },
            }
        }
    }

    if order.len() != records.len() {
        return Err(Error::incomplete_walk(records.len(), order.len()));
    }
    Ok(TopoOrder { order, boundary })
}

/// `true` when every parent of `record` maps to itself.
fn same_parents(record: &CommitRecord, map: &CommitMap) -> Result<bool> {
    for parent in record.commit.parent_ids()? {
        if map.resolve(parent)? != parent {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Re-create the edited commits bottom-up and return the completed map.
///
/// Processing in topological order guarantees a parent's new id exists
/// before any child embedding it is serialized. A record whose edited body
/// matches the extracted body and whose parents all map to themselves keeps
/// its original id and no object is written, so untouched history stays
/// byte-for-byte shared with every branch that references it.
///
/// Nothing outside the object database is modified; the caller publishes
/// the new head only after verifying it.
pub fn rewrite(store: &Store, records: &[CommitRecord]) -> Result<CommitMap> {
    let topo = topo_order(records)?;

    let mut map = CommitMap::default();
    for &parent in &topo.boundary {
        map.insert(parent, parent);
    }

    for &idx in &topo.order {
        let record = &records[idx];
        let edited = record.read_edited()?;

        if edited == record.commit.body && same_parents(record, &map)? {
            map.insert(record.id, record.id);
            continue;
        }

        let new_id = store.write_commit(&remapped(record, &edited, &map)?)?;
        log::debug!("rewrote {} -> {}", record.id, new_id);
        map.insert(record.id, new_id);
    }

    log::info!(
        "rewrote {} of {} commits",
        map.rewritten(),
        records.len()
    );
    Ok(map)
}

/// Copy a record's commit with parents remapped and the edited body.
///
/// Every header field is carried over verbatim except `parent` values,
/// which are replaced by their image under `map`.
fn remapped(record: &CommitRecord, body: &[u8], map: &CommitMap) -> Result<RawCommit> {
    let mut fields = record.commit.fields.clone();
    for field in &mut fields {
        if field.key == "parent" {
            let hex = std::str::from_utf8(&field.value)
                .map_err(|_| Error::bad_commit("parent id is not UTF-8"))?;
            let old = Oid::from_str(hex.trim())
                .map_err(|_| Error::bad_commit(format!("bad parent id: {}", hex)))?;
            field.value = map.resolve(old)?.to_string().into_bytes();
        }
    }
    Ok(RawCommit {
        fields,
        body: body.to_vec(),
    })
}
