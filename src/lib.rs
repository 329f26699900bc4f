//! Edit commit messages across a range of history without a rebase.
//!
//! `reword` pulls the commits between a base and a head out of the object
//! database, hands their message bodies to an editor (or a programmatic
//! rewrite), then rebuilds the commit graph bottom-up: parents are remapped
//! through a commit-id translation table, unchanged commits keep their
//! original ids, and the head ref is only moved after checking that the
//! rewritten history carries byte-identical tree contents. The working tree
//! is never touched and `git rebase` is never involved.
//!
//! # Key types
//!
//! - [`Store`] — handle to the repository's object database and refs.
//! - [`RangeBoundary`] / [`select_base`] — the editable region, picked as
//!   the base with the fewest commits below the head.
//! - [`EditSession`] — extract, edit, rewrite, verify, publish; owns the
//!   scratch directory for the whole operation.
//! - [`CommitMap`] — old id → new id for every commit in the range plus all
//!   boundary parents.
//!
//! # Quick example
//!
//! ```rust,no_run
//! use reword::{select_base, EditSession, Editor, Store};
//!
//! let store = Store::discover(".").unwrap();
//! let range = select_base(&store, "HEAD", &[]).unwrap();
//! let session = EditSession::prepare(&store, range).unwrap();
//! session.edit(&Editor::from_env()).unwrap();
//! session.finish("HEAD", "reword: edit").unwrap();
//! ```

pub mod commit;
pub mod editor;
pub mod error;
pub mod extract;
pub mod publish;
pub mod range;
pub mod rewrite;
pub mod session;
pub mod store;
pub mod verify;

// Re-export primary public types at crate root.
pub use commit::{HeaderField, RawCommit};
pub use editor::Editor;
pub use error::{Error, Result};
pub use extract::CommitRecord;
pub use range::{select_base, RangeBoundary};
pub use rewrite::{rewrite, CommitMap};
pub use session::{EditSession, Outcome};
pub use store::Store;
pub use verify::verify_trees;
