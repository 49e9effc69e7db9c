use std::error::Error;
use std::fmt;

/// Typed failure modes of the record codec.
///
/// Nothing in this crate recovers silently: every anomaly either aborts the
/// current decode with one of these, or is rejected before any state is
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Bad magic, truncated payload, or a structurally impossible record.
    Format { message: String },
    /// A read of `wanted` bits was requested with only `available` bits
    /// left before the start of the bit sequence.
    ReadPastStart { wanted: usize, available: usize },
    /// The property table has no entry for an id met while decoding; the
    /// widths of everything downstream are unknowable.
    UnknownPropertyId { id: u16 },
    /// A value to encode does not fit its field width. Rejected rather
    /// than truncated.
    OutOfRange { value: i64, bits: u8 },
    /// Removal of a property the record does not carry.
    PropertyNotFound { id: u16 },
}

impl RecordError {
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format { message } => write!(f, "malformed record: {message}"),
            Self::ReadPastStart { wanted, available } => write!(
                f,
                "read past start of bit sequence: wanted {wanted} bits, {available} available"
            ),
            Self::UnknownPropertyId { id } => {
                write!(f, "property id {id} not present in property table")
            }
            Self::OutOfRange { value, bits } => {
                write!(f, "value {value} does not fit in {bits} bits")
            }
            Self::PropertyNotFound { id } => write!(f, "record has no property with id {id}"),
        }
    }
}

impl Error for RecordError {}
