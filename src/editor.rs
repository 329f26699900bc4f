use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use crate::error::Result;

/// The interactive editor launched over the scratch files.
///
/// A blocking foreground process; the session resumes when it exits. The
/// scratch files are authoritative, not the exit status: an editor that
/// exits non-zero after saving still produces a valid edit, so a non-zero
/// status is logged and tolerated. Aborting the editor before the session
/// resumes leaves the object store and refs untouched, since nothing is
/// written until the rewrite runs.
#[derive(Debug, Clone)]
pub struct Editor {
    program: OsString,
    args: Vec<OsString>,
}

impl Editor {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Extra arguments placed before the file list.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Editor from `$VISUAL`, then `$EDITOR`, falling back to `vi`.
    ///
    /// An explicit constructor for the CLI; the library itself never reads
    /// the environment.
    pub fn from_env() -> Self {
        let program = std::env::var_os("VISUAL")
            .or_else(|| std::env::var_os("EDITOR"))
            .unwrap_or_else(|| "vi".into());
        Self::new(program)
    }

    /// Run the editor on all `paths` and wait for it to exit.
    ///
    /// # Errors
    /// Returns [`Error::Io`](crate::Error::Io) only when the editor cannot
    /// be spawned at all.
    pub fn launch(&self, paths: &[PathBuf]) -> Result<()> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .args(paths)
            .status()?;
        if !status.success() {
            log::warn!(
                "editor {:?} exited with {}; continuing with the files on disk",
                self.program,
                status
            );
        }
        Ok(())
    }
}
