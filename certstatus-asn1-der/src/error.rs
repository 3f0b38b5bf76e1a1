use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Asn1DecodingError {
    #[error("truncated data at offset {offset}: {needed} more byte(s) needed")]
    TruncatedData { offset: usize, needed: usize },

    #[error("malformed {context} at offset {offset}")]
    MalformedHeader { offset: usize, context: &'static str },

    #[error("indefinite length on primitive element at offset {offset}")]
    IndefinitePrimitive { offset: usize },

    #[error("reserved length octet at offset {offset}")]
    InvalidLength { offset: usize },

    #[error("length at offset {offset} exceeds what this platform can address")]
    LengthTooLong { offset: usize },

    #[error("indefinite length element starting at offset {offset} has no end-of-contents octets")]
    MissingEndOfContents { offset: usize },

    #[error("invalid BIT STRING at offset {offset}: {context}")]
    InvalidBitString { offset: usize, context: &'static str },

    #[error("invalid OBJECT IDENTIFIER at offset {offset}: {context}")]
    InvalidObjectIdentifier { offset: usize, context: &'static str },

    #[error("invalid {time_type} `{value}` at offset {offset}")]
    InvalidTime {
        offset: usize,
        time_type: &'static str,
        value: String,
    },

    #[error("invalid {value_type} content at offset {offset}")]
    InvalidValue { offset: usize, value_type: &'static str },

    #[error("elements nested deeper than {max_depth} levels")]
    DepthExceeded { max_depth: usize },

    #[error("{remaining} trailing byte(s) after the root element")]
    TrailingData { remaining: usize },

    #[error("expected {expected}, found {found}")]
    UnexpectedElement { expected: &'static str, found: String },
}

impl Asn1DecodingError {
    /// An element that is absent where the caller's schema requires one.
    pub fn missing(expected: &'static str) -> Self {
        Self::UnexpectedElement {
            expected,
            found: "nothing".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Asn1EncodingError {
    #[error("tag number {number} can't be encoded")]
    InvalidTagNumber { number: String },

    #[error("UTCTime can't represent year {year}")]
    UtcTimeOutOfRange { year: i32 },

    #[error("GeneralizedTime can't represent year {year}")]
    GeneralizedTimeOutOfRange { year: i32 },
}
