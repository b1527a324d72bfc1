use crate::annotations::AnnotationKind;
use thiserror::Error;

/// Why a tuple stream was rejected as malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Malformed {
    /// The block is not a JSON array.
    Shape,
    /// The array length is not a multiple of the kind's tuple width.
    Length {
        /// Array length.
        len: usize,
        /// Expected tuple width.
        width: usize,
    },
    /// A tuple field has the wrong JSON type (or an invalid value for its field).
    Field {
        /// Tuple index within the stream.
        index: usize,
        /// Field name.
        field: &'static str,
    },
    /// The computed end offset lies before the start offset.
    Inverted {
        /// Tuple index within the stream.
        index: usize,
        /// Computed start offset.
        from: usize,
        /// Computed end offset.
        to: usize,
    },
}

impl std::fmt::Display for Malformed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Malformed::Shape => f.write_str("block is not an array"),
            Malformed::Length { len, width } => {
                write!(f, "length {len} is not a multiple of tuple width {width}")
            }
            Malformed::Field { index, field } => write!(f, "tuple {index}: invalid `{field}`"),
            Malformed::Inverted { index, from, to } => {
                write!(f, "tuple {index}: range ends at {to} before it starts at {from}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced while decoding one annotation kind.
///
/// A failure covers the whole tuple stream of that kind and nothing else.
pub enum DecodeError {
    #[error("malformed {kind} annotation: {reason}")]
    /// The tuple stream's length or field shapes are invalid.
    MalformedAnnotation {
        /// Annotation kind being decoded.
        kind: AnnotationKind,
        /// What was wrong.
        reason: Malformed,
    },

    #[error("{kind} annotation {index} out of range: row {row}, column {column}")]
    /// A position lies outside the document.
    OutOfRange {
        /// Annotation kind being decoded.
        kind: AnnotationKind,
        /// Tuple index within the stream.
        index: usize,
        /// 1-based row of the offending position.
        row: u64,
        /// 1-based column of the offending position.
        column: u64,
    },
}

impl DecodeError {
    /// The annotation kind this error is scoped to.
    pub fn kind(&self) -> AnnotationKind {
        match self {
            DecodeError::MalformedAnnotation { kind, .. } | DecodeError::OutOfRange { kind, .. } => {
                *kind
            }
        }
    }
}
