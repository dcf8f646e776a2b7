//! Process-wide logger for the binaries.
//!
//! Records go to stderr so stdout stays free for the board and for the JSON
//! printed by `sim`. Crate messages carry their own `[Relay]`, `[Session]` or
//! `[Node]` prefix, so only the level is added here.

#![cfg(feature = "std")]

use std::env;
use std::io::Write;

use log::{self, LevelFilter, Metadata, Record};

/// Environment variable holding the log level.
pub const LOG_ENV: &str = "TERRITORY_LOG";

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let mut err = std::io::stderr().lock();
            // Nowhere to report a failed write to stderr.
            let _ = writeln!(err, "{:<5} {}", record.level(), record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: StderrLogger = StderrLogger;

/// Level named by `value` (`off`, `error` .. `trace`, any case), `info` when
/// missing or unknown.
pub fn log_level(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|lvl| lvl.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Install the logger with the level from [`LOG_ENV`]. Later calls only
/// leave the first logger in place.
pub fn init_logging() {
    let level = log_level(env::var(LOG_ENV).ok().as_deref());
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
