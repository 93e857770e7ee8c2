use thiserror::Error;

/// The engine's error taxonomy. `prepare()`-style constructors fail fast
/// with the first blocking error they hit; `validate()`-style methods
/// never return `Err` for a semantic mismatch, only a `bool`.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ── Caller supplied the wrong kind of value ─────────────────────────────
    #[error("type error: {0}")]
    TypeError(String),

    // ── Caller's data violates a semantic rule ──────────────────────────────
    #[error("value error: {0}")]
    ValueError(String),

    // ── Script runtime refused a required authorization ─────────────────────
    #[error("auth error: {0}")]
    AuthError(String),

    // ── A value fell outside the canonical encoder's domain ─────────────────
    #[error("encoding error: {0}")]
    EncodingError(String),

    // ── Propagated from the storage layer ───────────────────────────────────
    #[error("storage error: {0}")]
    StorageError(String),
}

impl LedgerError {
    pub fn value_error(msg: impl Into<String>) -> Self {
        LedgerError::ValueError(msg.into())
    }

    pub fn type_error(msg: impl Into<String>) -> Self {
        LedgerError::TypeError(msg.into())
    }

    pub fn auth_error(msg: impl Into<String>) -> Self {
        LedgerError::AuthError(msg.into())
    }
}

impl From<ledgerchain_codec::CodecError> for LedgerError {
    fn from(e: ledgerchain_codec::CodecError) -> Self {
        LedgerError::EncodingError(e.to_string())
    }
}
