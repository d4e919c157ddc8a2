use colored::*;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Level {
    #[strum(serialize = "ERROR")]
    Error,
    #[strum(serialize = "WARN")]
    Warn,
    #[strum(serialize = "INFO")]
    Info,
    #[strum(serialize = "DEBUG")]
    Debug,
    #[strum(serialize = "TRACE")]
    Trace,
}

/// Formats a trace line, indented two spaces per call depth.
pub fn format_log(depth: usize, level: Level, msg: &str) -> String {
    let label = format!("{:5}", level.to_string());
    let (l, m) = match level {
        Level::Error => (label.red(), msg.red()),
        Level::Warn => (label.yellow(), msg.yellow()),
        Level::Info => (label.green(), msg.green()),
        Level::Debug => (label.cyan(), msg.cyan()),
        Level::Trace => (label.normal(), msg.normal()),
    };
    format!("{}[{}] {}", "  ".repeat(depth), l, m)
}

#[macro_export]
macro_rules! tx_trace {
    ($exec:expr, $($args: expr),+) => {
        if $exec.is_tracing() {
            $exec.log($crate::execution::Level::Trace, format!($($args),+));
        }
    };
}

#[macro_export]
macro_rules! tx_debug {
    ($exec:expr, $($args: expr),+) => {
        if $exec.is_tracing() {
            $exec.log($crate::execution::Level::Debug, format!($($args),+));
        }
    };
}

#[macro_export]
macro_rules! tx_info {
    ($exec:expr, $($args: expr),+) => {
        if $exec.is_tracing() {
            $exec.log($crate::execution::Level::Info, format!($($args),+));
        }
    };
}

#[macro_export]
macro_rules! tx_error {
    ($exec:expr, $($args: expr),+) => {
        if $exec.is_tracing() {
            $exec.log($crate::execution::Level::Error, format!($($args),+));
        }
    };
}

#[macro_export]
macro_rules! tx_warn {
    ($exec:expr, $($args: expr),+) => {
        if $exec.is_tracing() {
            $exec.log($crate::execution::Level::Warn, format!($($args),+));
        }
    };
}
