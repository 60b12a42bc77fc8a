//! Resolving and launching external programs.
//!
//! The launcher owns the whole lifecycle of a single child: resolve the
//! executable, spawn it with the requested standard-stream wiring, and block
//! until its termination is observed. At most one child is ever outstanding.

use crate::env::Environment;
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// Resolve a command name to an executable path.
///
/// The name is tried as given first — an absolute path, or any relative path
/// probed against the environment's current directory. If that candidate is
/// not an executable regular file, each directory of the `PATH` variable is
/// probed in order and the first executable match wins. `None` means the
/// caller should report `<name>: command not found` and abandon the line.
pub fn resolve<'a>(env: &Environment, name: &'a str) -> Option<Cow<'a, Path>> {
    if name.is_empty() {
        return None;
    }

    let path = Path::new(name);
    if path.is_absolute() {
        if is_executable(path) {
            return Some(Cow::Borrowed(path));
        }
    } else {
        let direct = env.current_dir.join(path);
        if is_executable(&direct) {
            return Some(Cow::Owned(direct));
        }
    }

    let search_paths = env.get_var("PATH")?;
    find_in_path(&search_paths, path).map(Cow::Owned)
}

fn find_in_path(search_paths: &str, cmd: &Path) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        let candidate = dir.join(cmd);
        if is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// A candidate qualifies when it is a regular file with an execute bit, so a
/// directory or plain data file falls through to the PATH scan.
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Spawn one child with its standard input and output bound to the given
/// handles, the environment's variables exported and its current directory
/// applied, then block until the child exits. The captured exit status is
/// returned even though most callers discard it.
pub fn launch(
    env: &Environment,
    program: &Path,
    args: &[String],
    stdin: Stdio,
    stdout: Stdio,
) -> Result<ExitStatus> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(stdin)
        .stdout(stdout)
        .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(&env.current_dir)
        .spawn()
        .with_context(|| format!("failed to start {}", program.display()))?;
    let status = child
        .wait()
        .with_context(|| format!("failed to wait for {}", program.display()))?;
    log::debug!("{} exited with {}", program.display(), status);
    Ok(status)
}
