use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use reword::{commit, select_base, EditSession, Editor, Error, Outcome, Store};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Repository to operate on (discovered from the current directory by
    /// default)
    #[arg(long, global = true)]
    repo: Option<PathBuf>,

    /// Upstream base point; may be given several times. Defaults to all
    /// remote-tracking branches
    #[arg(long = "base", global = true)]
    base: Vec<String>,

    /// The ref to rewrite
    #[arg(long = "ref", default_value = "HEAD", global = true)]
    refname: String,

    /// Print the outcome as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open every commit message above the base in your editor
    Edit {
        /// Editor command ($VISUAL, then $EDITOR, then vi by default)
        #[arg(long, env = "REWORD_EDITOR")]
        editor: Option<String>,
    },
    /// Add a trailer to every commit in the range that lacks it
    AddTrailer {
        /// Trailer key, e.g. Change-Id
        key: String,
        /// Trailer value
        value: String,
    },
    /// Remove a trailer from every commit in the range
    RmTrailer {
        /// Trailer key to delete
        key: String,
    },
}

#[derive(serde::Serialize)]
struct Report {
    outcome: &'static str,
    head: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    old_head: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rewritten: Option<usize>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::EmptyRange(_)) => {
            // Nothing above the base is a normal state, not a failure.
            println!("No commits.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("reword: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> reword::Result<()> {
    let store = match &cli.repo {
        Some(path) => Store::open(path)?,
        None => Store::discover(".")?,
    };

    let range = select_base(&store, &cli.refname, &cli.base)?;
    let session = EditSession::prepare(&store, range)?;

    let reason = match &cli.command {
        Command::Edit { .. } => "reword: edit".to_string(),
        Command::AddTrailer { key, .. } => format!("reword: add-trailer {}", key),
        Command::RmTrailer { key } => format!("reword: rm-trailer {}", key),
    };

    match &cli.command {
        Command::Edit { editor } => {
            let editor = match editor {
                Some(cmd) => Editor::new(cmd),
                None => Editor::from_env(),
            };
            session.edit(&editor)?;
        }
        Command::AddTrailer { key, value } => {
            session.apply(|_record, body| {
                if commit::has_trailer(body, key) {
                    Ok(None)
                } else {
                    commit::append_trailer(body, key, value).map(Some)
                }
            })?;
        }
        Command::RmTrailer { key } => {
            session.apply(|_record, body| {
                let stripped = commit::remove_trailers(body, key);
                Ok((stripped != body).then_some(stripped))
            })?;
        }
    }

    let outcome = session.finish(&cli.refname, &reason)?;
    report(cli, &outcome);
    Ok(())
}

fn report(cli: &Cli, outcome: &Outcome) {
    if cli.json {
        let report = match outcome {
            Outcome::Unchanged { head } => Report {
                outcome: "unchanged",
                head: head.to_string(),
                old_head: None,
                rewritten: None,
            },
            Outcome::Updated {
                old_head,
                new_head,
                rewritten,
            } => Report {
                outcome: "updated",
                head: new_head.to_string(),
                old_head: Some(old_head.to_string()),
                rewritten: Some(*rewritten),
            },
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).expect("report serializes")
        );
        return;
    }

    match outcome {
        Outcome::Unchanged { .. } => println!("No change."),
        Outcome::Updated {
            old_head,
            new_head,
            rewritten,
        } => println!(
            "Updated {} from {} to {} ({} commits rewritten)",
            cli.refname, old_head, new_head, rewritten
        ),
    }
}
