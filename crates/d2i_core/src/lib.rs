//! Codec and edit engine for bit-packed item records.
//!
//! Records are a two-byte magic followed by a payload whose bytes are
//! decoded tail-first into one continuous bit sequence. Fixed header
//! fields live at known bit offsets from the file start; the variable
//! property section is described by a caller-supplied table and
//! terminated by a sentinel id.

pub mod bitstring;
pub mod core_api;
pub mod error;
pub mod props;
pub mod reader;
pub mod record;
pub mod writer;

pub use bitstring::BitString;
pub use error::RecordError;
pub use props::{PropertyDef, PropertyEntry, PropertyTable};
pub use reader::ReverseBitReader;
pub use record::builder::RecordBuilder;
pub use record::fields::FieldId;
pub use record::{ExtendedData, ItemClass, ItemQuality, ItemRecord, MAGIC};
