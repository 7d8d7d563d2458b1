//! Error types for the protocol layer.
//!
//! Each crate in Bingohall defines its own error enum. A `ProtocolError`
//! always means the bytes or the values were malformed, never that a
//! room rejected an operation.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, or an
    /// unknown request type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A value parsed fine but breaks a protocol rule, e.g. an empty
    /// handle or a card cell outside 1..=75.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}
