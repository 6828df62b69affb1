//! Minimal stderr backend for the `log` facade
//!
//! ```
//! nbsim::logger::init(log::LevelFilter::Info);
//! log::info!("starting run");
//! ```
//!
//! Info lines are printed as `[   uptime_ms INFO] message`, every other level
//! also carries the `file:line:` of the call site.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

static CONSOLE: Console = Console;
static START: OnceLock<Instant> = OnceLock::new();

pub struct Console;

fn uptime_ms() -> u128 {
    START.get_or_init(Instant::now).elapsed().as_millis()
}

/// Format a logging message (without trailing newline)
pub fn format_msg(record: &Record) -> String {
    let head = format!("[{:>10} {}] ", uptime_ms(), record.level().as_str());

    match record.level() {
        Level::Info => format!("{head}{}", record.args()),
        _ => match (record.file(), record.line()) {
            (Some(file), Some(line)) => format!("{head}{file}:{line}: {}", record.args()),
            _ => format!("{head}{}", record.args()),
        },
    }
}

impl Log for Console {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = format_msg(record);
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "{msg}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Install the console logger; a second call only changes the level
pub fn init(level: LevelFilter) {
    START.get_or_init(Instant::now);
    let _ = log::set_logger(&CONSOLE);
    log::set_max_level(level);
}

/// Map a `-v` repeat count to a level filter
pub fn level_from_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_lines_have_no_location() {
        let msg = format_msg(
            &Record::builder()
                .args(format_args!("hello"))
                .level(Level::Info)
                .file(Some("src/lib.rs"))
                .line(Some(3))
                .build(),
        );
        assert!(msg.ends_with("INFO] hello"), "{msg}");
    }

    #[test]
    fn other_levels_carry_location() {
        let msg = format_msg(
            &Record::builder()
                .args(format_args!("careful"))
                .level(Level::Warn)
                .file(Some("src/simulation/integrator.rs"))
                .line(Some(42))
                .build(),
        );
        assert!(msg.contains("WARN] src/simulation/integrator.rs:42: careful"), "{msg}");
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_from_verbosity(0), LevelFilter::Info);
        assert_eq!(level_from_verbosity(1), LevelFilter::Debug);
        assert_eq!(level_from_verbosity(5), LevelFilter::Trace);
    }
}
