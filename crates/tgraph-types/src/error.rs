use thiserror::Error;

/// Errors produced by type operations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("URI must not be empty")]
    EmptyUri,

    #[error("invalid character {ch:?} in URI {uri:?}")]
    InvalidUriChar { uri: String, ch: char },
}
