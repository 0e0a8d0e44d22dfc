//! FILENAME: engine/src/logging.rs
//! PURPOSE: Category-tagged logging macros for the table engine.
//! CONTEXT: The engine is a library, so it never owns a log sink. Every line
//! goes through the `log` facade with the category as the target
//! (`tabula::JOIN`, `tabula::GROUP`, ...) and the host application decides
//! where it ends up.

#[doc(hidden)]
pub use log;

// ============================================================================
// MACRO DEFINITIONS & EXPORTS
// ============================================================================

#[macro_export]
macro_rules! log_debug {
    ($cat:literal, $($arg:tt)*) => {
        $crate::logging::log::debug!(target: concat!("tabula::", $cat), $($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($cat:literal, $($arg:tt)*) => {
        $crate::logging::log::info!(target: concat!("tabula::", $cat), $($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($cat:literal, $($arg:tt)*) => {
        $crate::logging::log::warn!(target: concat!("tabula::", $cat), $($arg)*)
    };
}

// ENTER/EXIT macros for operation tracing

#[macro_export]
macro_rules! log_enter {
    ($cat:literal, $func:literal) => {
        $crate::logging::log::trace!(target: concat!("tabula::", $cat), "ENTER {}", $func)
    };
    ($cat:literal, $func:literal, $($arg:tt)*) => {
        $crate::logging::log::trace!(
            target: concat!("tabula::", $cat),
            "ENTER {} {}",
            $func,
            format_args!($($arg)*)
        )
    };
}

#[macro_export]
macro_rules! log_exit {
    ($cat:literal, $func:literal) => {
        $crate::logging::log::trace!(target: concat!("tabula::", $cat), "EXIT {}", $func)
    };
    ($cat:literal, $func:literal, $($arg:tt)*) => {
        $crate::logging::log::trace!(
            target: concat!("tabula::", $cat),
            "EXIT {} {}",
            $func,
            format_args!($($arg)*)
        )
    };
}

// Re-export the macros so they can be imported via `use crate::logging::log_debug;`
pub use crate::{log_debug, log_enter, log_exit, log_info, log_warn};
