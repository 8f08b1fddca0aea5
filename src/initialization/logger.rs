//! Logger initialization.

use std::io::Write;

use colored::*;
use log::{Level, LevelFilter};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Initializes the logger with the specified level and format.
///
/// `RUST_LOG` is read first; `level` then takes precedence for this crate and
/// as the global default. HTTP stack internals (`reqwest`, `hyper`, `rustls`)
/// are capped at `Info` so `--log-level trace` stays readable.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already set.
///
/// # Examples
///
/// ```bash
/// # Quick debugging via the environment
/// RUST_LOG=debug transfer_client https://example.com
///
/// # Per-module filtering
/// RUST_LOG=transfer_client=trace,hyper=debug transfer_client https://example.com
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    for noisy in ["reqwest", "hyper", "hyper_util", "rustls"] {
        builder.filter_module(noisy, level.min(LevelFilter::Info));
    }
    builder.filter_module("transfer_client", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{}",
                    json_line(
                        chrono::Utc::now().timestamp_millis(),
                        record.level(),
                        record.target(),
                        &record.args().to_string(),
                    )
                )
            });
        }
        LogFormat::Plain => {
            colored::control::set_override(true);
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{} [{}] {}",
                    record.target().cyan(),
                    colored_level(record.level()),
                    record.args()
                )
            });
        }
    }

    // try_init: tests may initialize more than once per process
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}

fn colored_level(level: Level) -> ColoredString {
    let text = level.to_string();
    match level {
        Level::Error => text.red(),
        Level::Warn => text.yellow(),
        Level::Info => text.green(),
        Level::Debug => text.blue(),
        Level::Trace => text.purple(),
    }
}

/// One log record as a single-line JSON object.
fn json_line(timestamp_millis: i64, level: Level, target: &str, message: &str) -> String {
    let escape = |text: &str| serde_json::to_string(text).unwrap_or_else(|_| "\"\"".into());
    format!(
        "{{\"ts\":{timestamp_millis},\"level\":\"{level}\",\"target\":{},\"msg\":{}}}",
        escape(target),
        escape(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_line_is_valid_json() {
        let line = json_line(
            1_700_000_000_000,
            Level::Warn,
            "transfer_client::executor",
            "Redirect status 301 for \"http://x/\" but no Location header",
        );
        let value: serde_json::Value = serde_json::from_str(&line).expect("valid JSON");
        assert_eq!(value["ts"], 1_700_000_000_000_i64);
        assert_eq!(value["level"], "WARN");
        assert_eq!(value["target"], "transfer_client::executor");
        assert!(value["msg"].as_str().expect("msg").contains("\"http://x/\""));
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_json_line_escapes_newlines() {
        let line = json_line(0, Level::Info, "t", "first\nsecond");
        assert!(!line.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&line).expect("valid JSON");
        assert_eq!(value["msg"], "first\nsecond");
    }

    #[test]
    fn test_colored_level_keeps_level_name() {
        for level in [Level::Error, Level::Warn, Level::Info, Level::Debug, Level::Trace] {
            assert!(colored_level(level)
                .to_string()
                .contains(&level.to_string()));
        }
    }

    #[test]
    fn test_repeated_init_does_not_panic() {
        // Only the first initialization in the process can succeed
        let first = init_logger_with(LevelFilter::Info, LogFormat::Plain);
        let second = init_logger_with(LevelFilter::Debug, LogFormat::Json);
        assert!(first.is_err() || second.is_err());
    }
}
