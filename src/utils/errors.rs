//! Styled diagnostics written to standard error.

use crate::color;

pub(crate) const DEFAULT_EXIT_CODE: i32 = 1;

pub(crate) fn warn_internal(text: &str) {
    eprintln!(
        "{} {}",
        color::painted(&color::WARNING_INDICATOR, "warning:"),
        color::painted(&color::WARNING_TEXT, text)
    );
}

pub(crate) fn error_internal(text: &str) {
    eprintln!(
        "{} {}",
        color::painted(&color::ERROR_INDICATOR, "error:"),
        color::painted(&color::ERROR_TEXT, text)
    );
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => ({
        let formatted = format!($($arg)*);
        $crate::utils::errors::warn_internal(&formatted);
    })
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => ({
        let formatted = format!($($arg)*);
        $crate::utils::errors::error_internal(&formatted);
    })
}

#[macro_export]
macro_rules! die {
    ($($arg:tt)*) => ({
        let formatted = format!($($arg)*);
        $crate::utils::errors::error_internal(&formatted);
        ::std::process::exit($crate::utils::errors::DEFAULT_EXIT_CODE)
    })
}
