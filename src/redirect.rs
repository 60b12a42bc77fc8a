//! `<`/`>` redirection for a single, non-piped command.
//!
//! The operator must be the second-to-last token and the target path the last
//! one, with at least one command token before the operator. Combinations —
//! both operators on one line, a repeated operator, or a redirection mixed
//! with a pipe — are rejected by the caller's classification or here.

use crate::env::Environment;
use crate::tokens;
use anyhow::{Context, Result, bail};
use std::fs::File;
use std::path::PathBuf;

/// Which standard stream of the command is rebound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// `<`: the command reads standard input from the target file.
    Input,
    /// `>`: the command writes standard output to the target file,
    /// overwriting it if it exists.
    Output,
}

/// A parsed redirection: the direction and the target path taken from the
/// last token of the line.
#[derive(Debug)]
pub struct Redirection {
    pub kind: RedirectKind,
    pub target: PathBuf,
}

impl Redirection {
    /// Open the target with the mode the direction requires, resolving a
    /// relative path against the environment's current directory. The open
    /// happens before any child is created, so a missing `<` target is
    /// surfaced without launching anything.
    pub fn open(&self, env: &Environment) -> Result<File> {
        let path = if self.target.is_absolute() {
            self.target.clone()
        } else {
            env.current_dir.join(&self.target)
        };
        match self.kind {
            RedirectKind::Input => File::open(&path)
                .with_context(|| format!("cannot open {} for reading", self.target.display())),
            RedirectKind::Output => File::create(&path)
                .with_context(|| format!("cannot create {} for writing", self.target.display())),
        }
    }
}

/// Split a line known to contain a redirection operator into the command's
/// tokens and the parsed [`Redirection`]. Anything but exactly one operator
/// in the second-to-last position is a syntax error.
pub fn split(line: &[String]) -> Result<(&[String], Redirection)> {
    let inputs = line.iter().filter(|t| *t == tokens::REDIRECT_INPUT).count();
    let outputs = line.iter().filter(|t| *t == tokens::REDIRECT_OUTPUT).count();

    if inputs > 0 && outputs > 0 {
        bail!("syntax error: cannot combine < and > on one line");
    }
    let (kind, op, found) = if inputs > 0 {
        (RedirectKind::Input, tokens::REDIRECT_INPUT, inputs)
    } else {
        (RedirectKind::Output, tokens::REDIRECT_OUTPUT, outputs)
    };
    if found != 1 {
        bail!("syntax error: {} may appear only once", op);
    }
    if line.len() < 3 || line[line.len() - 2] != op {
        bail!(
            "syntax error: {} must be followed by a file name at the end of the line",
            op
        );
    }

    let redirection = Redirection {
        kind,
        target: PathBuf::from(&line[line.len() - 1]),
    };
    Ok((&line[..line.len() - 2], redirection))
}
