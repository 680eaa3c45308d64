//! Bridge from the `log` facade to a logger provided by the host app.

use std::sync::{Arc, OnceLock};

/// Receives log messages emitted by this library.
///
/// Exported via `UniFFI` so the host app can route messages into its own
/// logging (`os_log`, Logcat, ...).
///
/// # Examples
///
/// ```rust
/// use keychain_core::logger::{LogLevel, Logger};
///
/// struct StdoutLogger;
///
/// impl Logger for StdoutLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         println!("[{level:?}] {message}");
///     }
/// }
/// ```
///
/// ## Swift
///
/// ```swift
/// final class KeychainLoggerBridge: KeychainCore.Logger {
///     static let shared = KeychainLoggerBridge()
///
///     func log(level: KeychainCore.LogLevel, message: String) {
///         os_log("%{public}@", message)
///     }
/// }
///
/// // once, at launch
/// setLogger(logger: KeychainLoggerBridge.shared)
/// ```
#[uniffi::export(with_foreign)]
pub trait Logger: Sync + Send {
    /// Logs `message` at `level`.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum LogLevel {
    /// Very low priority, extremely detailed messages.
    Trace,
    /// Lower priority debugging information.
    Debug,
    /// Progress of the application.
    Info,
    /// Potentially harmful situations.
    Warn,
    /// Errors the application can still recover from.
    Error,
}

/// `log::Log` implementation forwarding records to the foreign [`Logger`].
struct ForeignLogger;

impl log::Log for ForeignLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if !is_forwarded(record.level(), record.module_path()) {
            return;
        }

        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(log_level(record.level()), format!("{}", record.args()));
        } else {
            eprintln!("Logger not set: {}", record.args());
        }
    }

    fn flush(&self) {}
}

/// Debug and Trace from dependencies are noise for the host app.
fn is_forwarded(level: log::Level, module_path: Option<&str>) -> bool {
    level <= log::Level::Info || module_path.is_some_and(|path| path.starts_with("keychain"))
}

const fn log_level(level: log::Level) -> LogLevel {
    match level {
        log::Level::Error => LogLevel::Error,
        log::Level::Warn => LogLevel::Warn,
        log::Level::Info => LogLevel::Info,
        log::Level::Debug => LogLevel::Debug,
        log::Level::Trace => LogLevel::Trace,
    }
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Installs the host logger. Only the first call has an effect.
#[uniffi::export]
pub fn set_logger(logger: Arc<dyn Logger>) {
    if LOGGER_INSTANCE.set(logger).is_err() {
        eprintln!("Logger already set");
        return;
    }

    if let Err(e) = init_logger() {
        eprintln!("Failed to set logger: {e}");
    }
}

fn init_logger() -> Result<(), log::SetLoggerError> {
    static LOGGER: ForeignLogger = ForeignLogger;
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(log::Level::Debug, Some("keychain_core::store") => true ; "own debug")]
    #[test_case(log::Level::Trace, Some("keychain_core::profile") => true ; "own trace")]
    #[test_case(log::Level::Debug, Some("keyring::keyutils") => false ; "dependency debug")]
    #[test_case(log::Level::Trace, None => false ; "unknown module trace")]
    #[test_case(log::Level::Info, Some("keyring::keyutils") => true ; "dependency info")]
    #[test_case(log::Level::Error, None => true ; "unknown module error")]
    fn test_is_forwarded(level: log::Level, module_path: Option<&str>) -> bool {
        is_forwarded(level, module_path)
    }

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(log_level(log::Level::Error), LogLevel::Error);
        assert_eq!(log_level(log::Level::Warn), LogLevel::Warn);
        assert_eq!(log_level(log::Level::Info), LogLevel::Info);
        assert_eq!(log_level(log::Level::Debug), LogLevel::Debug);
        assert_eq!(log_level(log::Level::Trace), LogLevel::Trace);
    }
}
