//! File-gated diagnostics.
//!
//! When the `RELSH_LOG` environment variable names a writable path, a
//! debug-level logger is installed there. Best-effort: failures are silently
//! ignored — logging must never block startup, and it never writes to the
//! interpreter's own standard streams.

use simplelog::{Config, LevelFilter, WriteLogger};
use std::fs::File;

/// Environment variable naming the log file.
pub const LOG_ENV: &str = "RELSH_LOG";

/// Install the file logger if `RELSH_LOG` is set and usable.
pub fn init() {
    let Some(path) = std::env::var_os(LOG_ENV) else {
        return;
    };
    let Ok(file) = File::create(&path) else {
        return;
    };
    let _ = WriteLogger::init(LevelFilter::Debug, Config::default(), file);
}
