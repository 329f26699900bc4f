/// All errors produced by reword.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("no valid base found below {0}")]
    NoBase(String),

    #[error("empty range: {0} is already at the base")]
    EmptyRange(String),

    #[error("parent cycle through commit {0}")]
    ParentCycle(String),

    #[error("commit map has no entry for parent {0}")]
    UnmappedParent(String),

    #[error("traversal emitted {emitted} of {expected} commits")]
    IncompleteWalk { expected: usize, emitted: usize },

    #[error("tree changed between {old} and {new}: {paths:?}")]
    TreeChanged {
        old: String,
        new: String,
        paths: Vec<String>,
    },

    #[error("ref {0} moved concurrently, not updating")]
    RefConflict(String),

    #[error("malformed commit object: {0}")]
    BadCommit(String),

    #[error("git error: {0}")]
    Git(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn no_base(head: impl ToString) -> Self {
        Self::NoBase(head.to_string())
    }

    pub fn empty_range(head: impl ToString) -> Self {
        Self::EmptyRange(head.to_string())
    }

    pub fn parent_cycle(id: impl ToString) -> Self {
        Self::ParentCycle(id.to_string())
    }

    pub fn unmapped_parent(id: impl ToString) -> Self {
        Self::UnmappedParent(id.to_string())
    }

    pub fn incomplete_walk(expected: usize, emitted: usize) -> Self {
        Self::IncompleteWalk { expected, emitted }
    }

    pub fn tree_changed(old: impl ToString, new: impl ToString, paths: Vec<String>) -> Self {
        Self::TreeChanged {
            old: old.to_string(),
            new: new.to_string(),
            paths,
        }
    }

    pub fn ref_conflict(name: impl Into<String>) -> Self {
        Self::RefConflict(name.into())
    }

    pub fn bad_commit(msg: impl Into<String>) -> Self {
        Self::BadCommit(msg.into())
    }

    pub fn git(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Git(Box::new(err))
    }

    pub fn git_msg(msg: impl Into<String>) -> Self {
        Self::Git(msg.into().into())
    }
}
