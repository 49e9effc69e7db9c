use crate::error::RecordError;

pub const BITS_PER_BYTE: usize = 8;

/// The addressable bit view of a record payload (magic already stripped).
///
/// Payload byte `N-1` occupies positions `[0, 8)` with its bits MSB-first,
/// byte `N-2` occupies `[8, 16)`, and so on; payload byte 0 fills the last
/// eight positions. Position 0 is therefore the file tail (the padding
/// region beyond the property sentinel) and the highest positions hold the
/// record header. Every fixed field offset in this crate is translated
/// against the top of this sequence, so structural edits near position 0
/// never disturb header addressing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitString {
    bits: Vec<bool>,
}

impl BitString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode payload bytes into the chunk-reversed bit sequence.
    pub fn from_payload(payload: &[u8]) -> Self {
        let mut bits = Vec::with_capacity(payload.len() * BITS_PER_BYTE);
        for &byte in payload.iter().rev() {
            for shift in (0..BITS_PER_BYTE).rev() {
                bits.push((byte >> shift) & 1 == 1);
            }
        }
        Self { bits }
    }

    /// Re-render payload bytes; the exact inverse of [`from_payload`].
    ///
    /// [`from_payload`]: Self::from_payload
    pub fn to_payload(&self) -> Result<Vec<u8>, RecordError> {
        if self.bits.len() % BITS_PER_BYTE != 0 {
            return Err(RecordError::format(format!(
                "bit sequence length {} is not byte aligned",
                self.bits.len()
            )));
        }

        let mut out = Vec::with_capacity(self.bits.len() / BITS_PER_BYTE);
        for chunk in self.bits.chunks(BITS_PER_BYTE) {
            let mut byte = 0u8;
            for &bit in chunk {
                byte = (byte << 1) | u8::from(bit);
            }
            out.push(byte);
        }
        out.reverse();
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bit(&self, position: usize) -> bool {
        self.bits[position]
    }

    /// Interpret the `width` bits at `position` MSB-first.
    pub fn read_group(&self, position: usize, width: usize) -> u32 {
        let mut value = 0u32;
        for &bit in &self.bits[position..position + width] {
            value = (value << 1) | u32::from(bit);
        }
        value
    }

    /// Overwrite the `width` bits at `position` with `value`, MSB-first.
    /// The caller has already checked that `value` fits.
    pub fn write_group(&mut self, position: usize, width: usize, value: u32) {
        for (index, slot) in self.bits[position..position + width].iter_mut().enumerate() {
            let shift = width - 1 - index;
            *slot = (value >> shift) & 1 == 1;
        }
    }

    /// Render `value` as a free-standing `width`-bit group.
    pub fn from_group(value: u32, width: usize) -> Self {
        let mut group = Self {
            bits: vec![false; width],
        };
        group.write_group(0, width, value);
        group
    }

    /// Splice `other` in at `position`; existing bits at and above
    /// `position` shift up by `other.len()`.
    pub fn insert(&mut self, position: usize, other: &BitString) {
        self.bits
            .splice(position..position, other.bits.iter().copied());
    }

    /// Remove the `width` bits at `position`; bits above shift down.
    pub fn remove(&mut self, position: usize, width: usize) {
        self.bits.drain(position..position + width);
    }

    /// Append `other` above the current top of the sequence.
    pub fn extend(&mut self, other: &BitString) {
        self.bits.extend_from_slice(&other.bits);
    }
}
