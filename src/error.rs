use thiserror::Error;

/// Raised by the replacement registry before any mutation takes place.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidTargetError {
    #[error("replacement target must be an object, got {found}")]
    NotAnObject { found: &'static str },

    #[error("substitute for '{property}' must be a function, got {found}")]
    NotCallable {
        property: String,
        found: &'static str,
    },

    #[error("property '{property}' cannot be replaced: it is read-only and non-configurable, or the target is not extensible")]
    Locked { property: String },

    #[error("substitute is already installed as '{property}' on another target")]
    AlreadyInstalled { property: String },
}
