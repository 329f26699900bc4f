use std::fs;
use std::path::{Path, PathBuf};

use git2::Oid;

use crate::commit::RawCommit;
use crate::error::Result;
use crate::range::RangeBoundary;
use crate::store::Store;

/// Longest sanitized subject kept in a scratch filename.
const MAX_SUBJECT_CHARS: usize = 64;

/// One commit of the editable range, with its body persisted to a scratch
/// file for the editing session.
///
/// `commit.body` keeps the originally extracted body; the scratch file at
/// `path` is the mutable copy. The rewrite compares the two to decide
/// whether anything actually changed.
#[derive(Debug)]
pub struct CommitRecord {
    /// Original commit digest, immutable once extracted.
    pub id: Oid,
    /// 1-based position in the range, oldest first. Only used for stable
    /// file naming.
    pub seq: usize,
    /// Parsed header fields and original body.
    pub commit: RawCommit,
    /// Scratch file holding the editable body.
    pub path: PathBuf,
}

impl CommitRecord {
    /// Load the (possibly edited) body back from the scratch file.
    pub fn read_edited(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.path)?)
    }

    /// Replace the scratch file contents, the programmatic editing path.
    pub fn write_body(&self, body: &[u8]) -> Result<()> {
        fs::write(&self.path, body)?;
        Ok(())
    }
}

/// Extract every commit of `range` into `dir`, oldest first.
///
/// Each body lands in a file named `NNN-<subject>.COMMIT_EDITMSG` so a
/// directory listing shows the commits in chronological order. Any
/// unreadable object aborts the extraction; the caller owns `dir` and
/// discards it on error, so no partial state survives.
pub fn extract_range(store: &Store, range: &RangeBoundary, dir: &Path) -> Result<Vec<CommitRecord>> {
    let ids = store.range_commits(range)?;

    let mut records = Vec::with_capacity(ids.len());
    for (num, id) in ids.into_iter().enumerate() {
        records.push(extract_commit(store, id, dir, num + 1)?);
    }
    log::debug!("extracted {} commits into {}", records.len(), dir.display());
    Ok(records)
}

/// Extract a single commit body to a file named after the commit.
fn extract_commit(store: &Store, id: Oid, dir: &Path, seq: usize) -> Result<CommitRecord> {
    let commit = store.read_commit(id)?;
    let path = dir.join(scratch_file_name(seq, &commit.subject()));
    fs::write(&path, &commit.body)?;
    Ok(CommitRecord {
        id,
        seq,
        commit,
        path,
    })
}

/// `NNN-<sanitized subject>.COMMIT_EDITMSG`, sortable by sequence number.
fn scratch_file_name(seq: usize, subject: &str) -> String {
    let cleaned: String = subject
        .chars()
        .take(MAX_SUBJECT_CHARS)
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' || c == ' ' {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("{:03}-{}.COMMIT_EDITMSG", seq, cleaned)
}
