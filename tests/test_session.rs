mod common;

use reword::commit::{append_trailer, has_trailer};
use reword::{EditSession, Editor, Error, Outcome, RangeBoundary};

// ---------------------------------------------------------------------------
// Interactive flow
// ---------------------------------------------------------------------------

#[test]
fn no_edit_leaves_everything_alone() {
    let dir = tempfile::tempdir().unwrap();
    let (repo, store) = common::create_repo(dir.path());
    let ids = common::linear_chain(&repo, &["a\n\none\n", "b\n\ntwo\n"]);
    common::set_main(&repo, ids[2]);

    let session = EditSession::prepare(&store, RangeBoundary::new(ids[2], ids[0])).unwrap();
    // An editor that saves nothing.
    session.edit(&Editor::new("true")).unwrap();

    let outcome = session.finish("HEAD", "reword: edit").unwrap();
    assert_eq!(outcome, Outcome::Unchanged { head: ids[2] });
    assert_eq!(store.ref_target("refs/heads/main").unwrap(), Some(ids[2]));
}

#[test]
fn failing_editor_is_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let (repo, store) = common::create_repo(dir.path());
    let ids = common::linear_chain(&repo, &["a\n\none\n"]);
    common::set_main(&repo, ids[1]);

    let session = EditSession::prepare(&store, RangeBoundary::new(ids[1], ids[0])).unwrap();
    // Non-zero exit: the files on disk stay authoritative.
    session.edit(&Editor::new("false")).unwrap();
    let outcome = session.finish("HEAD", "reword: edit").unwrap();
    assert_eq!(outcome, Outcome::Unchanged { head: ids[1] });
}

#[test]
fn edited_body_moves_the_ref() {
    let dir = tempfile::tempdir().unwrap();
    let (repo, store) = common::create_repo(dir.path());
    let ids = common::linear_chain(&repo, &["a\n\none\n", "b\n\ntwo\n", "c\n\nthree\n"]);
    common::set_main(&repo, ids[3]);

    let session = EditSession::prepare(&store, RangeBoundary::new(ids[3], ids[0])).unwrap();
    session.records()[1].write_body(b"b reworded\n\ntwo\n").unwrap();

    let outcome = session.finish("HEAD", "reword: edit").unwrap();
    let (old_head, new_head, rewritten) = match outcome {
        Outcome::Updated {
            old_head,
            new_head,
            rewritten,
        } => (old_head, new_head, rewritten),
        other => panic!("expected update, got {:?}", other),
    };

    assert_eq!(old_head, ids[3]);
    assert_ne!(new_head, ids[3]);
    assert_eq!(rewritten, 2);
    assert_eq!(store.ref_target("refs/heads/main").unwrap(), Some(new_head));
    // Tree contents are untouched by construction.
    assert!(store.tree_diff(old_head, new_head).unwrap().is_empty());
    // The new head carries the edit.
    let raw = store.read_commit(new_head).unwrap();
    assert_eq!(raw.body, b"c\n\nthree\n");
    let parent = raw.parent_ids().unwrap()[0];
    assert_eq!(store.read_commit(parent).unwrap().body, b"b reworded\n\ntwo\n");
}

#[test]
fn scratch_files_are_removed_after_finish() {
    let dir = tempfile::tempdir().unwrap();
    let (repo, store) = common::create_repo(dir.path());
    let ids = common::linear_chain(&repo, &["a\n\none\n"]);
    common::set_main(&repo, ids[1]);

    let session = EditSession::prepare(&store, RangeBoundary::new(ids[1], ids[0])).unwrap();
    let paths = session.paths();
    assert!(paths.iter().all(|p| p.exists()));

    session.finish("HEAD", "reword: edit").unwrap();
    assert!(paths.iter().all(|p| !p.exists()));
}

#[test]
fn abandoned_session_leaves_no_trace() {
    let dir = tempfile::tempdir().unwrap();
    let (repo, store) = common::create_repo(dir.path());
    let ids = common::linear_chain(&repo, &["a\n\none\n"]);
    common::set_main(&repo, ids[1]);

    let paths = {
        let session = EditSession::prepare(&store, RangeBoundary::new(ids[1], ids[0])).unwrap();
        session.records()[0].write_body(b"edited\n\nx\n").unwrap();
        session.paths()
        // Dropped without finish: user cancellation.
    };

    assert!(paths.iter().all(|p| !p.exists()));
    assert_eq!(store.ref_target("refs/heads/main").unwrap(), Some(ids[1]));
}

// ---------------------------------------------------------------------------
// Programmatic editing
// ---------------------------------------------------------------------------

#[test]
fn apply_rewrites_bodies_across_the_range() {
    let dir = tempfile::tempdir().unwrap();
    let (repo, store) = common::create_repo(dir.path());
    let ids = common::linear_chain(
        &repo,
        &["a\n\nSigned-off-by: A <a@b>\n", "b\n\nSigned-off-by: A <a@b>\n"],
    );
    common::set_main(&repo, ids[2]);

    let session = EditSession::prepare(&store, RangeBoundary::new(ids[2], ids[0])).unwrap();
    let touched = session
        .apply(|record, body| {
            if has_trailer(body, "Change-Id") {
                Ok(None)
            } else {
                append_trailer(body, "Change-Id", &format!("I{}", record.id)).map(Some)
            }
        })
        .unwrap();
    assert_eq!(touched, 2);

    let outcome = session.finish("HEAD", "reword: add-trailer Change-Id").unwrap();
    let new_head = match outcome {
        Outcome::Updated { new_head, .. } => new_head,
        other => panic!("expected update, got {:?}", other),
    };

    let raw = store.read_commit(new_head).unwrap();
    let body = String::from_utf8(raw.body).unwrap();
    assert!(body.contains(&format!("Change-Id: I{}", ids[2])), "{}", body);
    assert!(body.ends_with("Signed-off-by: A <a@b>\n"));
}

#[test]
fn apply_skipping_everything_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let (repo, store) = common::create_repo(dir.path());
    let ids = common::linear_chain(&repo, &["a\n\none\n"]);
    common::set_main(&repo, ids[1]);

    let session = EditSession::prepare(&store, RangeBoundary::new(ids[1], ids[0])).unwrap();
    let touched = session.apply(|_, _| Ok(None)).unwrap();
    assert_eq!(touched, 0);
    let outcome = session.finish("HEAD", "reword: edit").unwrap();
    assert_eq!(outcome, Outcome::Unchanged { head: ids[1] });
}

// ---------------------------------------------------------------------------
// Concurrent ref movement
// ---------------------------------------------------------------------------

#[test]
fn ref_moved_during_session_is_a_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let (repo, store) = common::create_repo(dir.path());
    let ids = common::linear_chain(&repo, &["a\n\none\n", "b\n\ntwo\n"]);
    common::set_main(&repo, ids[2]);

    let session = EditSession::prepare(&store, RangeBoundary::new(ids[2], ids[0])).unwrap();
    session.records()[0].write_body(b"a reworded\n\none\n").unwrap();

    // Someone else rewinds the branch while we are editing.
    repo.reference("refs/heads/main", ids[1], true, "external").unwrap();

    let err = session.finish("HEAD", "reword: edit").unwrap_err();
    assert!(matches!(err, Error::RefConflict(_)), "got {:?}", err);
    assert_eq!(store.ref_target("refs/heads/main").unwrap(), Some(ids[1]));
}

// ---------------------------------------------------------------------------
// Preparation failures
// ---------------------------------------------------------------------------

#[test]
fn empty_range_fails_prepare() {
    let dir = tempfile::tempdir().unwrap();
    let (repo, store) = common::create_repo(dir.path());
    let ids = common::linear_chain(&repo, &["a\n\none\n"]);
    common::set_main(&repo, ids[1]);

    let err = EditSession::prepare(&store, RangeBoundary::new(ids[1], ids[1])).unwrap_err();
    assert!(matches!(err, Error::EmptyRange(_)), "got {:?}", err);
}
