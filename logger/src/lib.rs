//! Default logging setup for collkit's tests and tools
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(missing_docs)]

use std::{sync::Mutex, time::Instant};

use log::SetLoggerError;

const TIMESTAMP_STYLE: anstyle::Style =
    anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::BrightBlack)));

const TARGET_STYLE: anstyle::Style =
    anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Magenta)));

/// Environment variable holding the log filter, defaulting to `info`.
pub const FILTER_ENV: &str = "COLLKIT_LOG";

/// Environment variable controlling whether log output is colored.
pub const STYLE_ENV: &str = "COLLKIT_LOG_STYLE";

fn builder() -> env_logger::Builder {
    let start_time = Instant::now();
    let last_target = Mutex::new(String::new());

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::new()
            .filter_or(FILTER_ENV, "info")
            .write_style(STYLE_ENV),
    );
    builder.format(move |buf, record| {
        use std::io::Write;

        let timestamp = start_time.elapsed();
        let level = record.level();
        let target = record.target();

        // Records of the same target are grouped below a single header line.
        let mut last_target = last_target.lock().unwrap_or_else(|err| err.into_inner());
        if target != *last_target {
            last_target.clear();
            last_target.push_str(target);

            writeln!(
                buf,
                "{} {}",
                format_args!("{style}{timestamp:>9.2?}{style:#}", style = TIMESTAMP_STYLE),
                format_args!("{style}{target}{style:#}", style = TARGET_STYLE)
            )?;
        }
        writeln!(
            buf,
            "{} {} {}",
            format_args!("{style}{timestamp:>9.2?}{style:#}", style = TIMESTAMP_STYLE),
            format_args!(
                "{style}{level:<5}{style:#}",
                style = buf.default_level_style(level),
            ),
            record.args(),
        )
    });
    builder
}

/// Perform the default logging setup used by collkit tools.
///
/// Panics if a logger was already installed.
pub fn setup() {
    builder().init();
}

/// Perform the default logging setup, unless a logger was already installed.
///
/// Tests call this at their start, so running several tests in one process is fine.
pub fn try_setup() -> Result<(), SetLoggerError> {
    builder().is_test(true).try_init()
}
