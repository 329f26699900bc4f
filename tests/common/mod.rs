use std::path::Path;

use git2::{Oid, Repository, Signature, Time};

use reword::Store;

/// Create a repository under `dir` and return handles to it.
///
/// The `Repository` handle is for building fixture history; the `Store` is
/// the handle under test. Both point at the same on-disk repo.
pub fn create_repo(dir: &Path) -> (Repository, Store) {
    let path = dir.join("repo");
    let repo = Repository::init(&path).unwrap();
    let store = Store::open(&path).unwrap();
    (repo, store)
}

pub fn signature() -> Signature<'static> {
    Signature::new("Test Author", "test@example.com", &Time::new(1_700_000_000, 0)).unwrap()
}

/// Create a commit whose tree holds exactly `files` (flat names only).
pub fn commit_with_files(
    repo: &Repository,
    parents: &[Oid],
    message: &str,
    files: &[(&str, &str)],
) -> Oid {
    let sig = signature();
    let mut builder = repo.treebuilder(None).unwrap();
    for (name, content) in files {
        let blob = repo.blob(content.as_bytes()).unwrap();
        builder.insert(*name, blob, 0o100_644).unwrap();
    }
    let tree_id = builder.write().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let parent_commits: Vec<git2::Commit> = parents
        .iter()
        .map(|p| repo.find_commit(*p).unwrap())
        .collect();
    let parent_refs: Vec<&git2::Commit> = parent_commits.iter().collect();

    repo.commit(None, &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
}

/// Build a linear chain: a root plus one commit per message, each touching
/// `data.txt`. Returns the ids root-first.
#[allow(dead_code)]
pub fn linear_chain(repo: &Repository, messages: &[&str]) -> Vec<Oid> {
    let mut ids = Vec::with_capacity(messages.len() + 1);
    let root = commit_with_files(repo, &[], "root\n\nbase commit\n", &[("data.txt", "0")]);
    ids.push(root);
    for (i, message) in messages.iter().enumerate() {
        let content = format!("{}", i + 1);
        let prev = *ids.last().unwrap();
        ids.push(commit_with_files(
            repo,
            &[prev],
            message,
            &[("data.txt", content.as_str())],
        ));
    }
    ids
}

/// Point `refs/heads/main` at `oid` and make HEAD track it.
#[allow(dead_code)]
pub fn set_main(repo: &Repository, oid: Oid) {
    repo.reference("refs/heads/main", oid, true, "test setup")
        .unwrap();
    repo.set_head("refs/heads/main").unwrap();
}

/// Create a remote-tracking ref (a base candidate) at `oid`.
#[allow(dead_code)]
pub fn set_remote(repo: &Repository, name: &str, oid: Oid) {
    repo.reference(&format!("refs/remotes/{}", name), oid, true, "test setup")
        .unwrap();
}
