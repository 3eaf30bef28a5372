use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures produced while extracting, decoding, and linking block graphs.
#[derive(Debug, Error)]
pub enum Error {
    /// Input ran out before bracket and string depth returned to zero.
    #[error("unclosed json fragment, read {fragment:?}")]
    UnclosedFragment {
        /// Everything scanned before the input was exhausted.
        fragment: String,
    },
    /// `e`/`E` not followed by an optionally signed digit.
    #[error("invalid exponent at offset {offset}")]
    InvalidExponent { offset: usize },
    /// Shadow status code outside 1..=3.
    #[error("invalid shadow status code {code}")]
    UnknownShadowCode { code: i64 },
    /// Primitive kind code outside 4..=13.
    #[error("invalid primitive code {code}")]
    UnknownPrimCode { code: i64 },
    /// Strict decode of a closed span failed.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// Structurally malformed encoding.
    #[error("decode: {0}")]
    Decode(String),
}

impl Error {
    pub fn decode(message: impl Into<String>) -> Self {
        Error::Decode(message.into())
    }
}
