pub mod builder;
pub mod fields;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bitstring::BitString;
use crate::error::RecordError;
use crate::props::{
    END_MARKER, PROPERTY_ID_BITS, PropertyEntry, PropertyTable, decode_properties, encode_property,
};
use crate::reader::ReverseBitReader;
use crate::writer::{self, MAGIC_BITS};
use fields::FieldId;

/// Two-byte magic prefixing every item record on disk.
pub const MAGIC: [u8; 2] = *b"JM";

const TYPE_CODE_CHARS: usize = 4;
const TYPE_CODE_CHAR_BITS: usize = 8;
const PERSONALIZATION_MAX_CHARS: usize = 16;
const PERSONALIZATION_CHAR_BITS: usize = 7;
const QUANTITY_BITS: usize = 9;
const FILLED_SOCKETS_BITS: usize = 4;
const SET_BONUS_FLAG_BITS: usize = 5;
const AFFIX_BITS: usize = 11;
const RARE_AFFIX_SLOTS: usize = 6;

/// Property ids whose table entries describe the extended body fields.
const DEFENSE_PROPERTY_ID: u16 = 31;
const MAX_DURABILITY_PROPERTY_ID: u16 = 73;
const DURABILITY_PROPERTY_ID: u16 = 72;

/// Item classification the decode walk cannot derive from the record
/// itself; the original reads it from the game's item database, here the
/// caller injects it alongside the property table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemClass {
    #[serde(default)]
    pub armor: bool,
    #[serde(default)]
    pub weapon: bool,
    #[serde(default)]
    pub stackable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemQuality {
    LowQuality,
    Normal,
    HighQuality,
    Magic,
    Set,
    Rare,
    Unique,
    Crafted,
    Honorific,
}

impl ItemQuality {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(Self::LowQuality),
            2 => Some(Self::Normal),
            3 => Some(Self::HighQuality),
            4 => Some(Self::Magic),
            5 => Some(Self::Set),
            6 => Some(Self::Rare),
            7 => Some(Self::Unique),
            8 => Some(Self::Crafted),
            9 => Some(Self::Honorific),
            _ => None,
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            Self::LowQuality => 1,
            Self::Normal => 2,
            Self::HighQuality => 3,
            Self::Magic => 4,
            Self::Set => 5,
            Self::Rare => 6,
            Self::Unique => 7,
            Self::Crafted => 8,
            Self::Honorific => 9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LowQuality => "LowQuality",
            Self::Normal => "Normal",
            Self::HighQuality => "HighQuality",
            Self::Magic => "Magic",
            Self::Set => "Set",
            Self::Rare => "Rare",
            Self::Unique => "Unique",
            Self::Crafted => "Crafted",
            Self::Honorific => "Honorific",
        }
    }
}

impl fmt::Display for ItemQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields present only on non-compact records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedData {
    pub sockets: u32,
    pub guid: u32,
    pub ilvl: u32,
    pub quality: ItemQuality,
    pub variable_graphic: Option<u32>,
    pub autoprefix: Option<u32>,
    pub set_or_unique_id: Option<u32>,
    pub runeword_code: Option<u32>,
    pub personalization: Option<String>,
    pub defense: Option<i32>,
    pub max_durability: Option<i32>,
    pub current_durability: Option<i32>,
    pub quantity: Option<u32>,
    pub filled_sockets: Option<u32>,
}

/// A decoded item record: the owned bit sequence plus the values the
/// decode walk produced. Fixed fields are always read back from the bit
/// sequence itself, so edits cannot leave a stale mirror behind.
#[derive(Debug, Clone)]
pub struct ItemRecord {
    bits: BitString,
    class: ItemClass,
    pub type_code: String,
    pub extended: Option<ExtendedData>,
    pub properties: Vec<PropertyEntry>,
    pub runeword_properties: Vec<PropertyEntry>,
    /// File-start bit offset of the property section. Constant across
    /// property edits because everything before it is fixed-width for a
    /// given record shape.
    properties_offset: usize,
}

impl ItemRecord {
    /// Byte length of the magic prefix.
    pub const MAGIC_LEN: usize = MAGIC.len();

    /// Decode a full on-disk record, magic included.
    pub fn decode(
        bytes: &[u8],
        table: &PropertyTable,
        class: ItemClass,
    ) -> Result<Self, RecordError> {
        if bytes.len() < MAGIC.len() {
            return Err(RecordError::format(format!(
                "record truncated: {} bytes, need at least {}",
                bytes.len(),
                MAGIC.len()
            )));
        }
        if bytes[..MAGIC.len()] != MAGIC {
            return Err(RecordError::format(format!(
                "bad magic: expected {:02X?}, got {:02X?}",
                MAGIC,
                &bytes[..MAGIC.len()]
            )));
        }

        let bits = BitString::from_payload(&bytes[MAGIC.len()..]);
        let mut reader = ReverseBitReader::new(&bits);

        // Flag block, offsets 16..76 from file start.
        let _quest = reader.read_bool()?;
        reader.skip(3)?;
        let _identified = reader.read_bool()?;
        reader.skip(6)?;
        let socketed = reader.read_bool()?;
        reader.skip(4)?;
        let ear = reader.read_bool()?;
        let _starter = reader.read_bool()?;
        reader.skip(3)?;
        let compact = reader.read_bool()?;
        let _ethereal = reader.read_bool()?;
        reader.skip(1)?;
        let personalized = reader.read_bool()?;
        reader.skip(1)?;
        let runeword = reader.read_bool()?;
        reader.skip(5)?;
        let _version = reader.read_number(8)?;
        reader.skip(2)?;
        let _location = reader.read_number(3)?;
        let _equipped_slot = reader.read_number(4)?;
        let _column = reader.read_number(4)?;
        let _row = reader.read_number(4)?;
        let _storage = reader.read_number(3)?;

        if ear {
            return Err(RecordError::format("ear records are not supported"));
        }

        let mut type_chars = String::with_capacity(TYPE_CODE_CHARS);
        for _ in 0..TYPE_CODE_CHARS {
            let code = reader.read_number(TYPE_CODE_CHAR_BITS)?;
            if code != 0 {
                type_chars.push(char::from(code as u8));
            }
        }
        let type_code = type_chars.trim_end().to_string();

        let extended = if compact {
            None
        } else {
            Some(parse_extended(
                &mut reader,
                table,
                class,
                socketed,
                runeword,
                personalized,
            )?)
        };

        let properties_offset = MAGIC_BITS + (bits.len() - reader.position());

        let (properties, runeword_properties) = if compact {
            (Vec::new(), Vec::new())
        } else {
            let properties = decode_properties(&mut reader, table)?;
            let runeword_properties = if runeword {
                decode_properties(&mut reader, table)?
            } else {
                Vec::new()
            };
            (properties, runeword_properties)
        };

        Ok(Self {
            bits,
            class,
            type_code,
            extended,
            properties,
            runeword_properties,
            properties_offset,
        })
    }

    /// Re-render the record to bytes: aligned payload behind the magic.
    pub fn encode(&self) -> Result<Vec<u8>, RecordError> {
        let mut bits = self.bits.clone();
        writer::align_to_byte_boundary(&mut bits);
        let payload = bits.to_payload()?;
        let mut out = Vec::with_capacity(MAGIC.len() + payload.len());
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&payload);
        Ok(out)
    }

    pub fn class(&self) -> ItemClass {
        self.class
    }

    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_compact(&self) -> bool {
        self.extended.is_none()
    }

    /// Read a fixed-offset field straight from the bit sequence.
    pub fn get_field(&self, field: FieldId) -> Result<u32, RecordError> {
        let position = writer::bit_position(self.bits.len(), field.offset(), field.width())?;
        Ok(self.bits.read_group(position, field.width()))
    }

    pub fn flag(&self, field: FieldId) -> Result<bool, RecordError> {
        Ok(self.get_field(field)? != 0)
    }

    /// Overwrite a fixed-offset field in place. Rejects values that do
    /// not fit the field width, leaving the record untouched.
    pub fn set_field(&mut self, field: FieldId, value: u32) -> Result<(), RecordError> {
        writer::replace_value(&mut self.bits, field.offset(), field.width(), value)
    }

    /// Insert a property immediately before the item list's sentinel and
    /// restore byte alignment. Feasibility (table lookup, range checks,
    /// sentinel scan) is established before any bit moves; on error the
    /// record is unchanged.
    pub fn add_property(
        &mut self,
        table: &PropertyTable,
        id: u16,
        value: i32,
        param: Option<u32>,
    ) -> Result<(), RecordError> {
        if self.is_compact() {
            return Err(RecordError::format(
                "compact records carry no property list",
            ));
        }
        let def = table
            .lookup(id)
            .ok_or(RecordError::UnknownPropertyId { id })?;
        let group = encode_property(&def, id, value, param)?;
        let sentinel_offset = self.item_sentinel_offset(table)?;

        let mut bits = self.bits.clone();
        writer::insert_bits(&mut bits, sentinel_offset, &group)?;
        writer::align_to_byte_boundary(&mut bits);
        self.commit(bits, table)
    }

    /// Remove the first property with the given id from the item list.
    pub fn remove_property(&mut self, table: &PropertyTable, id: u16) -> Result<(), RecordError> {
        if self.is_compact() {
            return Err(RecordError::PropertyNotFound { id });
        }

        let mut reader = ReverseBitReader::new(&self.bits);
        reader.set_position(self.property_list_position()?)?;
        loop {
            let before = reader.position();
            let read_id = reader.read_number(PROPERTY_ID_BITS)? as u16;
            if read_id == END_MARKER {
                return Err(RecordError::PropertyNotFound { id });
            }
            let def = table
                .lookup(read_id)
                .ok_or(RecordError::UnknownPropertyId { id: read_id })?;
            reader.skip(def.param_bits as usize + def.bits as usize)?;
            if read_id == id {
                let width = before - reader.position();
                let offset = MAGIC_BITS + (self.bits.len() - before);
                let mut bits = self.bits.clone();
                writer::remove_bits(&mut bits, offset, width)?;
                writer::align_to_byte_boundary(&mut bits);
                return self.commit(bits, table);
            }
        }
    }

    /// Cursor position where the property section starts, re-derived
    /// from the current sequence length.
    fn property_list_position(&self) -> Result<usize, RecordError> {
        writer::bit_position(self.bits.len(), self.properties_offset, 0)
    }

    /// File-start offset of the item list's terminating sentinel, found
    /// by a sequential scan (entries are only self-describing in list
    /// order).
    fn item_sentinel_offset(&self, table: &PropertyTable) -> Result<usize, RecordError> {
        let mut reader = ReverseBitReader::new(&self.bits);
        reader.set_position(self.property_list_position()?)?;
        loop {
            let before = reader.position();
            let id = reader.read_number(PROPERTY_ID_BITS)? as u16;
            if id == END_MARKER {
                return Ok(MAGIC_BITS + (self.bits.len() - before));
            }
            let def = table
                .lookup(id)
                .ok_or(RecordError::UnknownPropertyId { id })?;
            reader.skip(def.param_bits as usize + def.bits as usize)?;
        }
    }

    /// Adopt an edited bit sequence and re-derive the property lists
    /// from it, so in-memory state never survives a structural edit.
    fn commit(&mut self, bits: BitString, table: &PropertyTable) -> Result<(), RecordError> {
        let runeword = {
            let position = writer::bit_position(
                bits.len(),
                FieldId::Runeword.offset(),
                FieldId::Runeword.width(),
            )?;
            bits.read_group(position, FieldId::Runeword.width()) != 0
        };

        let mut reader = ReverseBitReader::new(&bits);
        reader.set_position(writer::bit_position(bits.len(), self.properties_offset, 0)?)?;
        let properties = decode_properties(&mut reader, table)?;
        let runeword_properties = if runeword {
            decode_properties(&mut reader, table)?
        } else {
            Vec::new()
        };

        self.bits = bits;
        self.properties = properties;
        self.runeword_properties = runeword_properties;
        Ok(())
    }
}

fn parse_extended(
    reader: &mut ReverseBitReader<'_>,
    table: &PropertyTable,
    class: ItemClass,
    socketed: bool,
    runeword: bool,
    personalized: bool,
) -> Result<ExtendedData, RecordError> {
    let sockets = reader.read_number(3)?;
    let guid = reader.read_number(32)?;
    let ilvl = reader.read_number(7)?;
    let quality_raw = reader.read_number(4)?;
    let quality = ItemQuality::from_raw(quality_raw)
        .ok_or_else(|| RecordError::format(format!("unknown quality value {quality_raw}")))?;

    let mut ext = ExtendedData {
        sockets,
        guid,
        ilvl,
        quality,
        variable_graphic: None,
        autoprefix: None,
        set_or_unique_id: None,
        runeword_code: None,
        personalization: None,
        defense: None,
        max_durability: None,
        current_durability: None,
        quantity: None,
        filled_sockets: None,
    };

    if reader.read_bool()? {
        ext.variable_graphic = Some(reader.read_number(3)?);
    }
    if reader.read_bool()? {
        ext.autoprefix = Some(reader.read_number(AFFIX_BITS)?);
    }

    match quality {
        ItemQuality::Normal => {}
        ItemQuality::LowQuality | ItemQuality::HighQuality => reader.skip(3)?,
        ItemQuality::Magic => reader.skip(22)?,
        ItemQuality::Set | ItemQuality::Unique => {
            ext.set_or_unique_id = Some(reader.read_number(15)?);
        }
        ItemQuality::Rare | ItemQuality::Crafted => {
            reader.skip(16)?;
            for _ in 0..RARE_AFFIX_SLOTS {
                if reader.read_bool()? {
                    reader.skip(AFFIX_BITS)?;
                }
            }
        }
        ItemQuality::Honorific => reader.skip(16)?,
    }

    if runeword {
        ext.runeword_code = Some(reader.read_number(16)?);
    }

    if personalized {
        let mut name = String::new();
        for _ in 0..PERSONALIZATION_MAX_CHARS {
            let code = reader.read_number(PERSONALIZATION_CHAR_BITS)?;
            if code == 0 {
                break;
            }
            name.push(char::from(code as u8));
        }
        ext.personalization = Some(name);
    }

    // Reserved bit (tome-of-identify marker), present on every
    // extended record.
    reader.skip(1)?;

    if class.armor {
        let def = table
            .lookup(DEFENSE_PROPERTY_ID)
            .ok_or(RecordError::UnknownPropertyId {
                id: DEFENSE_PROPERTY_ID,
            })?;
        let raw = reader.read_number(def.bits as usize)?;
        ext.defense = Some(raw as i32 - def.add);
    }

    if class.armor || class.weapon {
        let max_def =
            table
                .lookup(MAX_DURABILITY_PROPERTY_ID)
                .ok_or(RecordError::UnknownPropertyId {
                    id: MAX_DURABILITY_PROPERTY_ID,
                })?;
        let raw = reader.read_number(max_def.bits as usize)?;
        let max_durability = raw as i32 - max_def.add;
        ext.max_durability = Some(max_durability);

        if max_durability > 0 {
            let def =
                table
                    .lookup(DURABILITY_PROPERTY_ID)
                    .ok_or(RecordError::UnknownPropertyId {
                        id: DURABILITY_PROPERTY_ID,
                    })?;
            let raw = reader.read_number(def.bits as usize)?;
            ext.current_durability = Some(raw as i32 - def.add);
        }
    }

    if class.stackable {
        ext.quantity = Some(reader.read_number(QUANTITY_BITS)?);
    }

    if socketed {
        ext.filled_sockets = Some(reader.read_number(FILLED_SOCKETS_BITS)?);
    }

    if quality == ItemQuality::Set {
        reader.skip(SET_BONUS_FLAG_BITS)?;
    }

    Ok(ext)
}
