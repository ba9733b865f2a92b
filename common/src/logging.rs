//! log4rs setup shared by the three service binaries.

use log::LevelFilter;
use log4rs::{
    append::{console::ConsoleAppender, file::FileAppender},
    config::{Appender, Logger, Root},
    encode::pattern::PatternEncoder,
    init_config, Config,
};
use std::path::Path;

const LOGGING_PATTERN: &str = "[{d} {h({l})} {M}] {m}{n}";

/// Sets up console + rolling file logging for `logger_name` (typically the
/// binary's crate name) at `level`, writing to `log_file`. Does nothing if
/// `level` is `Off`.
pub fn setup(logger_name: &str, log_file: &str, level: LevelFilter) {
    if level == LevelFilter::Off {
        return;
    }

    if let Some(parent) = Path::new(log_file).parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let pattern = Box::new(PatternEncoder::new(LOGGING_PATTERN));
    let console = Box::new(ConsoleAppender::builder().encoder(pattern.clone()).build());
    let file = Box::new(
        FileAppender::builder()
            .encoder(pattern)
            .build(log_file)
            .expect("unable to create logging file appender"),
    );

    const APPENDERS: [&str; 2] = ["stdout", "file"];

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", console))
        .appender(Appender::builder().build("file", file))
        .logger(
            Logger::builder()
                .appenders(APPENDERS)
                .additive(false)
                .build(logger_name, level),
        )
        .build(
            Root::builder()
                .appenders(APPENDERS)
                .build(LevelFilter::Warn),
        )
        .expect("failed to create logging config");

    init_config(config).expect("unable to initialize logger");
}
