use thiserror::Error;

/// Errors produced when decoding the serialized forms.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("unknown delta operation: {0:?}")]
    UnknownOperation(String),

    #[error("unknown conflict type: {0:?}")]
    UnknownConflictType(String),

    #[error("malformed {what}: {detail}")]
    Malformed { what: &'static str, detail: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl TypeError {
    pub(crate) fn malformed(what: &'static str, detail: impl Into<String>) -> Self {
        TypeError::Malformed {
            what,
            detail: detail.into(),
        }
    }
}

/// Convenience alias for decoding results.
pub type TypeResult<T> = Result<T, TypeError>;
