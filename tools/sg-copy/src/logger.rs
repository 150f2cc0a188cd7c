//! Code implementing the logging solution for `sg-copy`.

use std::io::{self, Write};

use log::{Level, LevelFilter, Log, Metadata, Record};

/// The [`Log`] implementation installed by [`init()`].
static LOGGER: StderrLogger = StderrLogger;

/// Installs the `sg-copy` logger.
///
/// `verbosity` selects the most detailed level that is emitted: warnings and errors by default,
/// [`Level::Debug`] at `1`, and [`Level::Trace`] above that.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    // Installation only fails if a logger is already present, in which case it stays in charge.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

/// Writes each record to standard error, prefixed by its level.
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let prefix = match record.level() {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO ",
            Level::Warn => "WARN ",
            Level::Error => "ERROR",
        };

        // Ignore any logging errors because there is no method to report or deal with them.
        let _ = writeln!(io::stderr(), "{prefix}: {}", record.args());
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}
