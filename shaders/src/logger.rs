//! fallback stderr logger.
//!
//! the crate only logs through the `log` facade; hosts normally install their own logger
//! (env_logger, tracing-log, ...). this one exists for small demos and for the tests here, where
//! nothing else is around to print compile diagnostics.

use std::io::Write as _;

struct StderrLogger;

fn format_record(record: &log::Record) -> String {
    let location = match (record.file(), record.line()) {
        (Some(file), Some(line)) => format!("{file}:{line}"),
        _ => record.target().to_string(),
    };
    format!("[{level}] {location}: {text}", level = record.level(), text = record.args())
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // a closed stderr is not worth failing over.
        _ = writeln!(std::io::stderr().lock(), "{}", format_record(record));
    }

    fn flush(&self) {
        _ = std::io::stderr().flush();
    }
}

static LOGGER: StderrLogger = StderrLogger;

/// installs the stderr logger and sets the max level.
///
/// if another logger is already installed (or this one was installed before) only the max level is
/// updated.
pub fn init(max_level: log::LevelFilter) {
    if log::set_logger(&LOGGER).is_err() {
        log::debug!("logger is already set");
    }
    log::set_max_level(max_level);
}

#[test]
fn test_init_is_repeatable() {
    // NOTE: other tests also init with trace; the max level is global.
    init(log::LevelFilter::Trace);
    init(log::LevelFilter::Trace);
    assert_eq!(log::max_level(), log::LevelFilter::Trace);
    log::trace!("logger is up");
}

#[test]
fn test_format_record() {
    // records borrow their format_args!, so each one is built and formatted in one statement.
    let with_location = format_record(
        &log::Record::builder()
            .args(format_args!("linked program {}", 3))
            .level(log::Level::Debug)
            .target("shaders::builder")
            .file(Some("shaders/src/builder.rs"))
            .line(Some(42))
            .build(),
    );
    assert_eq!(with_location, "[DEBUG] shaders/src/builder.rs:42: linked program 3");

    let without_location = format_record(
        &log::Record::builder()
            .args(format_args!("no shader named {:?}", "a.vert"))
            .level(log::Level::Warn)
            .target("shaders::source")
            .build(),
    );
    assert_eq!(without_location, "[WARN] shaders::source: no shader named \"a.vert\"");
}
