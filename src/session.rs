//! Terminal and process-group bookkeeping.
//!
//! Acquired once at startup: the interpreter waits until its process group is
//! the terminal's foreground group, claims the terminal, and snapshots the
//! terminal mode so it can be restored at shutdown. Nothing here runs when
//! standard input is not a terminal.

use anyhow::{Context, Result};
use nix::sys::signal::{Signal, killpg};
use nix::sys::termios::{SetArg, Termios, tcgetattr, tcsetattr};
use nix::unistd::{Pid, getpgrp, getpid, tcgetpgrp, tcsetpgrp};
use std::io::{self, IsTerminal};

/// Process-wide terminal state, created once before the read-eval loop and
/// passed explicitly rather than held as a global.
pub struct Session {
    interactive: bool,
    pgid: Pid,
    saved_modes: Option<Termios>,
}

impl Session {
    /// Acquire foreground control of the terminal.
    ///
    /// If standard input is not a terminal this records the fact and performs
    /// no terminal calls. Otherwise it loops until the calling process's
    /// group is the foreground group — sending `SIGTTIN` to its own group
    /// stops the process until an external `SIGCONT` arrives when it is
    /// foregrounded — then claims the terminal for its own process id and
    /// snapshots the terminal mode. Terminal call failures are startup
    /// errors.
    pub fn initialize() -> Result<Session> {
        if !io::stdin().is_terminal() {
            return Ok(Session::detached());
        }

        let terminal = io::stdin();
        loop {
            let foreground = tcgetpgrp(&terminal).context("tcgetpgrp on the terminal")?;
            let own = getpgrp();
            if foreground == own {
                break;
            }
            killpg(own, Signal::SIGTTIN).context("stopping until foregrounded")?;
        }

        let pgid = getpid();
        tcsetpgrp(&terminal, pgid).context("claiming the terminal")?;
        let saved_modes = tcgetattr(&terminal).context("saving terminal modes")?;
        log::debug!("session initialized, foreground pgid {}", pgid);

        Ok(Session {
            interactive: true,
            pgid,
            saved_modes: Some(saved_modes),
        })
    }

    /// A session that never touches the terminal.
    pub(crate) fn detached() -> Session {
        Session {
            interactive: false,
            pgid: getpid(),
            saved_modes: None,
        }
    }

    /// Derived once at startup from whether standard input is a terminal.
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Reapply the terminal modes saved at startup. Best-effort: at shutdown
    /// there is nothing useful left to do with a failure but log it.
    pub fn restore(&self) {
        let Some(modes) = &self.saved_modes else {
            return;
        };
        if let Err(err) = tcsetattr(io::stdin(), SetArg::TCSADRAIN, modes) {
            log::warn!("failed to restore terminal modes for {}: {}", self.pgid, err);
        }
    }
}
