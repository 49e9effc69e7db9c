use crate::bitstring::BitString;
use crate::error::RecordError;

/// Maximum group width a single read can produce.
pub const MAX_READ_WIDTH: usize = 32;

/// Cursor over a [`BitString`] that consumes fields from the top of the
/// sequence downward. The cursor starts at the sequence length and
/// decreases; position 0 is exhaustion. Fields are decoded MSB-first
/// within their group, with no implicit alignment.
pub struct ReverseBitReader<'a> {
    bits: &'a BitString,
    position: usize,
}

impl<'a> ReverseBitReader<'a> {
    pub fn new(bits: &'a BitString) -> Self {
        Self {
            bits,
            position: bits.len(),
        }
    }

    pub fn read_bool(&mut self) -> Result<bool, RecordError> {
        self.consume(1)?;
        Ok(self.bits.bit(self.position))
    }

    pub fn read_number(&mut self, width: usize) -> Result<u32, RecordError> {
        if width > MAX_READ_WIDTH {
            return Err(RecordError::format(format!(
                "field width {width} exceeds {MAX_READ_WIDTH} bits"
            )));
        }
        self.consume(width)?;
        Ok(self.bits.read_group(self.position, width))
    }

    pub fn skip(&mut self, width: usize) -> Result<(), RecordError> {
        self.consume(width)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn set_position(&mut self, position: usize) -> Result<(), RecordError> {
        if position > self.bits.len() {
            return Err(RecordError::format(format!(
                "cursor position {position} beyond sequence length {}",
                self.bits.len()
            )));
        }
        self.position = position;
        Ok(())
    }

    /// Bits left between the cursor and the start of the sequence.
    pub fn remaining(&self) -> usize {
        self.position
    }

    fn consume(&mut self, width: usize) -> Result<(), RecordError> {
        if width > self.position {
            return Err(RecordError::ReadPastStart {
                wanted: width,
                available: self.position,
            });
        }
        self.position -= width;
        Ok(())
    }
}
