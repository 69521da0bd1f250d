use std::fmt::Display;

/// Diagnostic sink. Emits a `debug` event and never fails.
pub fn log(message: impl Display) {
    tracing::debug!(target: "stubcore", "{message}");
}
