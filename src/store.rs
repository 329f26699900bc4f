use std::path::{Path, PathBuf};

use git2::{BranchType, ObjectType, Oid, Sort};

use crate::commit::RawCommit;
use crate::error::{Error, Result};
use crate::range::RangeBoundary;

/// Handle to the repository's object database and refs.
///
/// All reads and writes the rewrite engine performs go through this type;
/// nothing here touches the working tree or the index.
pub struct Store {
    repo: git2::Repository,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("repo", &self.repo.path())
            .finish()
    }
}

impl Store {
    /// Open the repository at `path` (bare or not).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let repo = git2::Repository::open(path.as_ref()).map_err(Error::git)?;
        Ok(Store { repo })
    }

    /// Walk upward from `path` to find the enclosing repository.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let repo = git2::Repository::discover(path.as_ref()).map_err(Error::git)?;
        Ok(Store { repo })
    }

    /// Path to the repository's git directory.
    pub fn path(&self) -> PathBuf {
        self.repo.path().to_path_buf()
    }

    /// Resolve a revision spec (ref name, hash, `HEAD`, ...) to a commit id.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if the spec does not resolve to a commit.
    pub fn resolve(&self, spec: &str) -> Result<Oid> {
        let obj = self
            .repo
            .revparse_single(spec)
            .map_err(|_| Error::not_found(format!("revision '{}'", spec)))?;
        let commit = obj
            .peel_to_commit()
            .map_err(|_| Error::not_found(format!("'{}' is not a commit", spec)))?;
        Ok(commit.id())
    }

    /// Current target of a ref, following symbolic refs. `None` if the ref
    /// does not exist.
    pub fn ref_target(&self, name: &str) -> Result<Option<Oid>> {
        match self.repo.find_reference(name) {
            Ok(r) => {
                let direct = r.resolve().map_err(Error::git)?;
                Ok(direct.target())
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(Error::git(e)),
        }
    }

    // -----------------------------------------------------------------------
    // Raw objects
    // -----------------------------------------------------------------------

    /// Read and parse the raw commit object `oid`.
    ///
    /// # Errors
    /// * [`Error::NotFound`] if the object does not exist.
    /// * [`Error::BadCommit`] if it exists but is not a commit.
    pub fn read_commit(&self, oid: Oid) -> Result<RawCommit> {
        let odb = self.repo.odb().map_err(Error::git)?;
        let obj = odb
            .read(oid)
            .map_err(|_| Error::not_found(format!("object {}", oid)))?;
        if obj.kind() != ObjectType::Commit {
            return Err(Error::bad_commit(format!("{} is not a commit", oid)));
        }
        RawCommit::parse(obj.data())
    }

    /// Write a commit object, returning its digest.
    ///
    /// The digest is a pure function of the serialized bytes, so writing an
    /// unmodified commit yields its original id.
    pub fn write_commit(&self, commit: &RawCommit) -> Result<Oid> {
        let odb = self.repo.odb().map_err(Error::git)?;
        odb.write(ObjectType::Commit, &commit.to_bytes())
            .map_err(Error::git)
    }

    // -----------------------------------------------------------------------
    // Graph queries
    // -----------------------------------------------------------------------

    /// The commits in `(ancestor, newest]`, oldest first.
    pub fn range_commits(&self, range: &RangeBoundary) -> Result<Vec<Oid>> {
        let mut walk = self.repo.revwalk().map_err(Error::git)?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)
            .map_err(Error::git)?;
        walk.push(range.newest).map_err(Error::git)?;
        walk.hide(range.ancestor).map_err(Error::git)?;

        let mut out = Vec::new();
        for oid in walk {
            out.push(oid.map_err(Error::git)?);
        }
        log::debug!(
            "range ({}, {}] holds {} commits",
            range.ancestor,
            range.newest,
            out.len()
        );
        Ok(out)
    }

    /// Number of commits in `(ancestor, newest]`.
    pub fn count_range(&self, newest: Oid, ancestor: Oid) -> Result<usize> {
        let (ahead, _behind) = self
            .repo
            .graph_ahead_behind(newest, ancestor)
            .map_err(Error::git)?;
        Ok(ahead)
    }

    /// Best common ancestor of two commits, or `None` if the histories are
    /// unrelated.
    pub fn merge_base(&self, a: Oid, b: Oid) -> Result<Option<Oid>> {
        match self.repo.merge_base(a, b) {
            Ok(oid) => Ok(Some(oid)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(Error::git(e)),
        }
    }

    /// `true` if `ancestor` is reachable from `commit`.
    pub fn is_ancestor(&self, ancestor: Oid, commit: Oid) -> Result<bool> {
        if ancestor == commit {
            return Ok(true);
        }
        self.repo
            .graph_descendant_of(commit, ancestor)
            .map_err(Error::git)
    }

    /// Tips of all remote-tracking branches, the default base candidates.
    pub fn remote_heads(&self) -> Result<Vec<(String, Oid)>> {
        let branches = self
            .repo
            .branches(Some(BranchType::Remote))
            .map_err(Error::git)?;
        let mut out = Vec::new();
        for branch in branches {
            let (branch, _) = branch.map_err(Error::git)?;
            let target = match branch.get().target() {
                Some(oid) => oid,
                // Symbolic entries like origin/HEAD carry no direct target.
                None => continue,
            };
            if let Ok(Some(name)) = branch.name() {
                out.push((name.to_string(), target));
            }
        }
        Ok(out)
    }

    // -----------------------------------------------------------------------
    // Trees
    // -----------------------------------------------------------------------

    /// Paths whose content or mode differs between the trees of two commits.
    pub fn tree_diff(&self, a: Oid, b: Oid) -> Result<Vec<String>> {
        let tree_a = self
            .repo
            .find_commit(a)
            .and_then(|c| c.tree())
            .map_err(Error::git)?;
        let tree_b = self
            .repo
            .find_commit(b)
            .and_then(|c| c.tree())
            .map_err(Error::git)?;
        let diff = self
            .repo
            .diff_tree_to_tree(Some(&tree_a), Some(&tree_b), None)
            .map_err(Error::git)?;

        let mut paths = Vec::new();
        for delta in diff.deltas() {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();
            paths.push(path);
        }
        Ok(paths)
    }

    // -----------------------------------------------------------------------
    // Refs
    // -----------------------------------------------------------------------

    /// Atomically move `name` from `expected_old` to `new`, recording
    /// `reason` in the reflog. Symbolic refs (`HEAD`) are followed to the
    /// branch they point at, as `git update-ref` does.
    ///
    /// # Errors
    /// * [`Error::NotFound`] if the ref does not exist.
    /// * [`Error::RefConflict`] if the ref no longer points at
    ///   `expected_old` at write time.
    pub fn compare_and_swap(
        &self,
        name: &str,
        expected_old: Oid,
        new: Oid,
        reason: &str,
    ) -> Result<()> {
        let target_name = {
            let reference = self
                .repo
                .find_reference(name)
                .map_err(|_| Error::not_found(format!("ref '{}'", name)))?;
            let direct = reference.resolve().map_err(Error::git)?;
            direct
                .name()
                .ok_or_else(|| Error::git_msg(format!("ref '{}' has a non-UTF-8 name", name)))?
                .to_string()
        };

        match self
            .repo
            .reference_matching(&target_name, new, true, expected_old, reason)
        {
            Ok(_) => Ok(()),
            Err(e) if e.code() == git2::ErrorCode::Modified => {
                Err(Error::ref_conflict(target_name))
            }
            Err(e) => Err(Error::git(e)),
        }
    }
}
