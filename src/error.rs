use thiserror::Error;

/// Errors surfaced by the signature core.
///
/// Verification never returns one of these; malformed input to `verify`
/// yields a plain `false` so callers cannot distinguish which internal
/// check rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MirathError {
    #[error("unknown or unsupported parameter tag: {0:#04x}")]
    InvalidParams(u8),

    #[error("invalid key material: {0}")]
    InvalidKey(&'static str),
}

/// Errors raised while building a signed-prescription envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error(transparent)]
    Canonical(#[from] CanonicalError),

    #[error(transparent)]
    Signature(#[from] MirathError),
}

/// Errors from prescription canonicalization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("unknown field id: {0:#04x}")]
    UnknownFieldId(u8),

    #[error("field {field} is not a valid decimal integer: {value:?}")]
    InvalidNumeric { field: &'static str, value: String },
}
