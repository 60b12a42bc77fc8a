//! Built-in commands executed in-process, never via process creation.
//!
//! The set of built-ins is a closed enum so a missing handler is a compile
//! error, and lookup is an exact, case-sensitive match on the first token.
//! Argument shapes are parsed with [`argh`], so malformed usage produces a
//! usage message instead of silent misbehavior.

use crate::env::Environment;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::env as stdenv;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// The commands the interpreter implements itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Help,
    Exit,
    Cd,
    Pwd,
}

impl Builtin {
    pub const ALL: [Builtin; 4] = [Builtin::Help, Builtin::Exit, Builtin::Cd, Builtin::Pwd];

    /// Exact-match lookup on a command name. `None` means "not a built-in"
    /// and the caller falls through to external-command handling.
    pub fn lookup(name: &str) -> Option<Builtin> {
        Builtin::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Help => "?",
            Builtin::Exit => "exit",
            Builtin::Cd => "cd",
            Builtin::Pwd => "pwd",
        }
    }

    /// One-line description shown by the help command.
    pub fn doc(self) -> &'static str {
        match self {
            Builtin::Help => "show this help menu",
            Builtin::Exit => "exit the command shell",
            Builtin::Cd => "change the current working directory to that specified directory",
            Builtin::Pwd => "print the current working directory to standard output",
        }
    }

    /// Run the built-in against the rest of the line's tokens, writing any
    /// user-visible output to `stdout`. Errors are returned for the caller to
    /// surface; they never terminate the interpreter.
    pub fn execute(
        self,
        args: &[&str],
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<()> {
        match self {
            Builtin::Help => match Help::from_args(&[self.name()], args) {
                Ok(cmd) => cmd.run(stdout),
                Err(exit) => report_usage(stdout, exit),
            },
            Builtin::Exit => match Exit::from_args(&[self.name()], args) {
                Ok(cmd) => cmd.run(env),
                Err(exit) => report_usage(stdout, exit),
            },
            Builtin::Cd => match Cd::from_args(&[self.name()], args) {
                Ok(cmd) => cmd.run(env),
                Err(exit) => report_usage(stdout, exit),
            },
            Builtin::Pwd => match Pwd::from_args(&[self.name()], args) {
                Ok(cmd) => cmd.run(stdout, env),
                Err(exit) => report_usage(stdout, exit),
            },
        }
    }
}

fn report_usage(stdout: &mut dyn Write, exit: EarlyExit) -> Result<()> {
    writeln!(stdout, "{}", exit.output.trim_end())?;
    Ok(())
}

#[derive(FromArgs)]
/// Show this help menu.
struct Help {}

impl Help {
    fn run(self, stdout: &mut dyn Write) -> Result<()> {
        for builtin in Builtin::ALL {
            writeln!(stdout, "{} - {}", builtin.name(), builtin.doc())?;
        }
        Ok(())
    }
}

#[derive(FromArgs)]
/// Exit the command shell.
struct Exit {
    #[argh(positional, greedy)]
    /// ignored; a full shell would accept an exit status here.
    _args: Vec<String>,
}

impl Exit {
    fn run(self, env: &mut Environment) -> Result<()> {
        // The loop checks the flag before the next prompt, so shutdown can
        // still restore the saved terminal mode. The process exits with 0.
        env.should_exit = true;
        Ok(())
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, changes to the directory named by HOME.
struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory. Defaults to $HOME when omitted.
    target: Option<String>,
}

impl Cd {
    fn run(self, env: &mut Environment) -> Result<()> {
        let target = match &self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => {
                if let Some(home) = env.get_var("HOME") {
                    PathBuf::from(home)
                } else {
                    return Err(anyhow::anyhow!("cd: no target and HOME not set"));
                }
            }
        };

        let new_dir = if target.is_absolute() {
            target
        } else {
            env.current_dir.join(target)
        };

        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: can't canonicalize {}", new_dir.display()))?;

        stdenv::set_current_dir(&canonical)
            .with_context(|| format!("cd: can't chdir to {}", canonical.display()))?;
        env.current_dir = canonical;
        Ok(())
    }
}

#[derive(FromArgs)]
/// Print the current working directory to standard output.
struct Pwd {}

impl Pwd {
    fn run(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<()> {
        writeln!(stdout, "{}", env.current_dir.to_string_lossy())?;
        Ok(())
    }
}
