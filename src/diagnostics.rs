//! Advisory warnings about likely mistakes in reducer setup.
//!
//! Warnings are only produced in debug builds, or when the
//! `release_diagnostics` feature is enabled. They never affect control
//! flow or return values.

use std::fmt::Display;

pub(crate) const TARGET: &str = "reactive_store";

#[cfg(test)]
thread_local! {
    static EMITTED: std::cell::RefCell<Vec<String>> = std::cell::RefCell::new(Vec::new());
}

/// Whether diagnostic warnings are produced in this build.
pub(crate) fn enabled() -> bool {
    cfg!(any(debug_assertions, feature = "release_diagnostics"))
}

pub(crate) fn warning<M: Display>(message: M) {
    if enabled() {
        #[cfg(test)]
        EMITTED.with(|emitted| emitted.borrow_mut().push(message.to_string()));

        log::warn!(target: TARGET, "{}", message);
    }
}

/// The warnings emitted on this thread since the last call.
#[cfg(test)]
pub(crate) fn take_warnings() -> Vec<String> {
    EMITTED.with(|emitted| emitted.take())
}
