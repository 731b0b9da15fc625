//! Logging and diagnostics for the marshalling layer.
//!
//! Decisions that are otherwise invisible to the caller (a defensive copy, a
//! widened integer dtype, a zero-copy view) are reported through the `log`
//! facade. `log_metric!` emits them as structured key/value events and is
//! compiled out of release builds.

use log::LevelFilter;
use std::fs::OpenOptions;
use std::sync::Once;

use crate::error::Result;

/// Logs a structured key-value event at `debug` level, only in debug builds.
///
/// # Example
/// ```
/// use grblas_core::log_metric;
/// let len = 4;
/// log_metric!("event"="copy_for_ownership", "len"=&len);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            let mut parts = Vec::new();
            $(
                parts.push(format!("{}={}", $key, $value));
            )+
            $crate::__log::debug!(target: "grblas_core::metrics", "{}", parts.join(" "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` at `Info` level (overridable through `RUST_LOG`),
/// appending to `log_file` when one is given. Only the first call has any
/// effect; later calls never touch `log_file`. If the file cannot be opened the
/// logger still goes to stderr and the error is returned.
pub fn init_logging(log_file: Option<&str>) -> Result<()> {
    let mut open_error = None;

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(LevelFilter::Info);
        builder.parse_default_env();

        // Just the level and the message.
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())
        });

        if let Some(path) = log_file {
            match OpenOptions::new().append(true).create(true).open(path) {
                Ok(file) => {
                    builder.target(env_logger::Target::Pipe(Box::new(file)));
                }
                Err(e) => open_error = Some(e),
            }
        }

        let _ = builder.try_init();
    });

    match open_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
