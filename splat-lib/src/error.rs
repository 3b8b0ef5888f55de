use std::io;

#[derive(Debug, thiserror::Error)]
pub enum PlyError {
    #[error("Malformed PLY header: {0}")]
    MalformedHeader(String),

    /// Counted in bytes for binary bodies and in vertex lines for ascii bodies.
    #[error("Vertex data is truncated, need {needed}, have {available}")]
    TruncatedData { needed: usize, available: usize },

    /// Reported through the log only; the property is read with a 4 byte width.
    #[error("Unsupported scalar type '{0}', assuming a 4 byte float")]
    UnsupportedScalarType(String),

    #[error("The splat collection is empty.")]
    EmptyCollection,

    #[error("An I/O error occurred: {0}")]
    Io(#[from] io::Error),
}

impl PlyError {
    pub(crate) fn header(msg: impl Into<String>) -> Self {
        PlyError::MalformedHeader(msg.into())
    }
}
