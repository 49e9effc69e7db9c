use crate::bitstring::BitString;
use crate::error::RecordError;
use crate::props::{END_MARKER, PROPERTY_ID_BITS};
use crate::record::{ItemQuality, MAGIC, TYPE_CODE_CHAR_BITS, TYPE_CODE_CHARS};
use crate::writer;

/// Assembles a minimal extended record from scratch: header flags, the
/// four-character type code, the extended preamble, and an empty property
/// list. Socketed, personalized, and runeword shapes are out of scope;
/// decode a real record to work with those.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    type_code: String,
    version: u32,
    location: u32,
    equipped_slot: u32,
    column: u32,
    row: u32,
    storage: u32,
    identified: bool,
    ethereal: bool,
    quest: bool,
    starter: bool,
    guid: u32,
    ilvl: u32,
    unique_id: Option<u32>,
}

impl RecordBuilder {
    pub fn new(type_code: &str) -> Result<Self, RecordError> {
        if type_code.is_empty() || type_code.len() > TYPE_CODE_CHARS || !type_code.is_ascii() {
            return Err(RecordError::format(format!(
                "type code {type_code:?} must be 1 to {TYPE_CODE_CHARS} ASCII characters"
            )));
        }
        Ok(Self {
            type_code: type_code.to_string(),
            version: 101,
            location: 0,
            equipped_slot: 0,
            column: 0,
            row: 0,
            storage: 1,
            identified: true,
            ethereal: false,
            quest: false,
            starter: false,
            guid: 0,
            ilvl: 1,
            unique_id: None,
        })
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn location(mut self, location: u32) -> Self {
        self.location = location;
        self
    }

    pub fn equipped_slot(mut self, slot: u32) -> Self {
        self.equipped_slot = slot;
        self
    }

    pub fn position(mut self, column: u32, row: u32) -> Self {
        self.column = column;
        self.row = row;
        self
    }

    pub fn storage(mut self, storage: u32) -> Self {
        self.storage = storage;
        self
    }

    pub fn identified(mut self, identified: bool) -> Self {
        self.identified = identified;
        self
    }

    pub fn ethereal(mut self, ethereal: bool) -> Self {
        self.ethereal = ethereal;
        self
    }

    pub fn quest(mut self, quest: bool) -> Self {
        self.quest = quest;
        self
    }

    pub fn starter(mut self, starter: bool) -> Self {
        self.starter = starter;
        self
    }

    pub fn guid(mut self, guid: u32) -> Self {
        self.guid = guid;
        self
    }

    pub fn ilvl(mut self, ilvl: u32) -> Self {
        self.ilvl = ilvl;
        self
    }

    /// Mark the item Unique with the given 15-bit identifier.
    pub fn unique_id(mut self, id: u32) -> Self {
        self.unique_id = Some(id);
        self
    }

    pub fn build(&self) -> Result<Vec<u8>, RecordError> {
        let quality = if self.unique_id.is_some() {
            ItemQuality::Unique
        } else {
            ItemQuality::Normal
        };

        let mut groups: Vec<(u32, usize)> = vec![
            (u32::from(self.quest), 1),
            (0, 3),
            (u32::from(self.identified), 1),
            (0, 6),
            (0, 1), // socketed
            (0, 4),
            (0, 1), // ear
            (u32::from(self.starter), 1),
            (0, 3),
            (0, 1), // compact
            (u32::from(self.ethereal), 1),
            (0, 1),
            (0, 1), // personalized
            (0, 1),
            (0, 1), // runeword
            (0, 5),
            (self.version, 8),
            (0, 2),
            (self.location, 3),
            (self.equipped_slot, 4),
            (self.column, 4),
            (self.row, 4),
            (self.storage, 3),
        ];

        let mut padded = self.type_code.clone();
        while padded.len() < TYPE_CODE_CHARS {
            padded.push(' ');
        }
        for byte in padded.bytes() {
            groups.push((u32::from(byte), TYPE_CODE_CHAR_BITS));
        }

        groups.push((0, 3)); // sockets
        groups.push((self.guid, 32));
        groups.push((self.ilvl, 7));
        groups.push((quality.raw(), 4));
        groups.push((0, 1)); // variable graphic flag
        groups.push((0, 1)); // autoprefix flag
        if let Some(id) = self.unique_id {
            groups.push((id, 15));
        }
        groups.push((0, 1)); // reserved
        groups.push((u32::from(END_MARKER), PROPERTY_ID_BITS));

        let mut bits = BitString::new();
        for (value, width) in groups {
            if width < 32 && u64::from(value) >= 1u64 << width {
                return Err(RecordError::OutOfRange {
                    value: i64::from(value),
                    bits: width as u8,
                });
            }
            // Each group lands at the file end so far, so the earlier
            // groups stay closer to the header.
            bits.insert(0, &BitString::from_group(value, width));
        }
        writer::align_to_byte_boundary(&mut bits);

        let payload = bits.to_payload()?;
        let mut out = Vec::with_capacity(MAGIC.len() + payload.len());
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&payload);
        Ok(out)
    }
}
