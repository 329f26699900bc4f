use std::path::PathBuf;

use git2::Oid;
use tempfile::TempDir;

use crate::editor::Editor;
use crate::error::Result;
use crate::extract::{extract_range, CommitRecord};
use crate::publish::publish;
use crate::range::RangeBoundary;
use crate::rewrite::rewrite;
use crate::store::Store;
use crate::verify::verify_trees;

/// Terminal state of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The edit changed nothing; no object was written and the ref was not
    /// touched.
    Unchanged { head: Oid },
    /// The ref was moved to the rewritten head.
    Updated {
        old_head: Oid,
        new_head: Oid,
        /// How many commits received new ids.
        rewritten: usize,
    },
}

/// One full edit operation: extract a range, let it be edited, rewrite,
/// verify and publish.
///
/// The session owns the scratch directory holding the editable files; it is
/// removed when the session is dropped, on every exit path. Stages run
/// strictly in order and nothing is written to the object store before
/// [`finish`](Self::finish), so abandoning a session at any earlier point
/// (including killing the editor) leaves the repository untouched.
///
/// ```rust,no_run
/// use reword::{select_base, EditSession, Editor, Store};
///
/// let store = Store::discover(".").unwrap();
/// let range = select_base(&store, "HEAD", &[]).unwrap();
/// let session = EditSession::prepare(&store, range).unwrap();
/// session.edit(&Editor::from_env()).unwrap();
/// let outcome = session.finish("HEAD", "reword: edit").unwrap();
/// println!("{:?}", outcome);
/// ```
#[derive(Debug)]
pub struct EditSession<'a> {
    store: &'a Store,
    boundary: RangeBoundary,
    records: Vec<CommitRecord>,
    // Held for RAII teardown of the scratch files.
    _scratch: TempDir,
}

impl<'a> EditSession<'a> {
    /// Check the range and extract its commits into a fresh scratch
    /// directory.
    pub fn prepare(store: &'a Store, boundary: RangeBoundary) -> Result<Self> {
        boundary.sanity_check(store)?;
        let scratch = tempfile::Builder::new().prefix("reword-").tempdir()?;
        let records = extract_range(store, &boundary, scratch.path())?;
        Ok(Self {
            store,
            boundary,
            records,
            _scratch: scratch,
        })
    }

    pub fn boundary(&self) -> &RangeBoundary {
        &self.boundary
    }

    /// The extracted commits, oldest first.
    pub fn records(&self) -> &[CommitRecord] {
        &self.records
    }

    /// Scratch file paths, oldest commit first.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.records.iter().map(|r| r.path.clone()).collect()
    }

    /// Run the interactive editor over all scratch files and wait.
    pub fn edit(&self, editor: &Editor) -> Result<()> {
        editor.launch(&self.paths())
    }

    /// Programmatic editing: feed each record's current body to `f` and
    /// persist any replacement it returns. Returns how many bodies were
    /// replaced.
    pub fn apply<F>(&self, mut f: F) -> Result<usize>
    where
        F: FnMut(&CommitRecord, &[u8]) -> Result<Option<Vec<u8>>>,
    {
        let mut touched = 0;
        for record in &self.records {
            let body = record.read_edited()?;
            if let Some(new_body) = f(record, &body)? {
                record.write_body(&new_body)?;
                touched += 1;
            }
        }
        Ok(touched)
    }

    /// Rewrite the range from the scratch files, verify tree equality and
    /// publish the new head to `refname`.
    ///
    /// Consumes the session; the scratch directory is removed on return,
    /// whether the rewrite succeeded or not.
    pub fn finish(self, refname: &str, reason: &str) -> Result<Outcome> {
        let old_head = self.boundary.newest;

        let map = rewrite(self.store, &self.records)?;
        let new_head = map.resolve(old_head)?;

        if new_head == old_head {
            return Ok(Outcome::Unchanged { head: old_head });
        }

        verify_trees(self.store, old_head, new_head)?;
        publish(self.store, refname, old_head, new_head, reason)?;

        Ok(Outcome::Updated {
            old_head,
            new_head,
            rewritten: map.rewritten(),
        })
    }
}
