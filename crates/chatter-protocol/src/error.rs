use thiserror::Error;

/// Reasons an inbound client frame is rejected.
///
/// All of these are connection-local: the frame is dropped and the
/// connection stays open.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Payload is not valid JSON.
    #[error("malformed JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Valid JSON, but not an object.
    #[error("frame must be a JSON object")]
    NotAnObject,

    /// A required field is absent.
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    /// A required field has the wrong JSON type.
    #[error("field `{field}` must be a {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    /// Binary payload that is not UTF-8 text.
    #[error("payload is not valid UTF-8")]
    InvalidUtf8,

    /// Payload exceeds the configured frame size limit.
    #[error("payload too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },
}
