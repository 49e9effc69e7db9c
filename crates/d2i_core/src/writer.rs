//! In-place mutation of a record's bit sequence.
//!
//! All offsets taken here are fixed bit offsets counted from the start of
//! the file, including the 16-bit magic that is never present in the
//! sequence itself. The single bridge between those offsets and sequence
//! positions is [`bit_position`]; callers must never cache a translated
//! position across a structural edit, only re-derive it.

use crate::bitstring::{BITS_PER_BYTE, BitString};
use crate::error::RecordError;

/// Width of the magic prefix, counted by file-start offsets but absent
/// from the bit sequence.
pub const MAGIC_BITS: usize = 16;

/// Translate a file-start bit offset into a sequence position.
///
/// A field of `width` bits at file offset `offset` occupies
/// `[position, position + width)` where
/// `position = len - (offset - MAGIC_BITS) - width`.
pub fn bit_position(len: usize, offset: usize, width: usize) -> Result<usize, RecordError> {
    let from_top = offset.checked_sub(MAGIC_BITS).ok_or_else(|| {
        RecordError::format(format!("field offset {offset} lies inside the magic prefix"))
    })?;
    let end = len.checked_sub(from_top).ok_or(RecordError::ReadPastStart {
        wanted: from_top,
        available: len,
    })?;
    end.checked_sub(width).ok_or(RecordError::ReadPastStart {
        wanted: width,
        available: end,
    })
}

/// Overwrite a fixed-width field with `value`, MSB-first. Values that do
/// not fit the width are rejected before anything is written.
pub fn replace_value(
    bits: &mut BitString,
    offset: usize,
    width: usize,
    value: u32,
) -> Result<(), RecordError> {
    if u64::from(value) >= 1u64 << width {
        return Err(RecordError::OutOfRange {
            value: i64::from(value),
            bits: width as u8,
        });
    }
    let position = bit_position(bits.len(), offset, width)?;
    bits.write_group(position, width, value);
    Ok(())
}

/// Splice `to_insert` in at file offset `offset`. Content at smaller file
/// offsets keeps its offsets; content at larger offsets shifts later.
pub fn insert_bits(
    bits: &mut BitString,
    offset: usize,
    to_insert: &BitString,
) -> Result<(), RecordError> {
    let position = bit_position(bits.len(), offset, 0)?;
    bits.insert(position, to_insert);
    Ok(())
}

/// Remove the `width` bits at file offset `offset`.
pub fn remove_bits(bits: &mut BitString, offset: usize, width: usize) -> Result<(), RecordError> {
    let position = bit_position(bits.len(), offset, width)?;
    bits.remove(position, width);
    Ok(())
}

/// Restore the byte-alignment invariant after a structural edit by
/// extending the tail padding region (sequence position 0, the file end
/// beyond the property sentinel) with zero bits. Padding anywhere else
/// would shift header fields out of phase with their file-start offsets.
pub fn align_to_byte_boundary(bits: &mut BitString) {
    let extra = bits.len() % BITS_PER_BYTE;
    if extra != 0 {
        let padding = BitString::from_group(0, BITS_PER_BYTE - extra);
        bits.insert(0, &padding);
    }
}
