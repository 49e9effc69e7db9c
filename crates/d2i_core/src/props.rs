use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bitstring::BitString;
use crate::error::RecordError;
use crate::reader::{MAX_READ_WIDTH, ReverseBitReader};

/// Width of a property id field.
pub const PROPERTY_ID_BITS: usize = 9;

/// All-ones 9-bit id terminating a property list.
pub const END_MARKER: u16 = 0x1FF;

/// Encoding description of one property id: optional parameter width,
/// value width, and the bias added to the semantic value on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyDef {
    #[serde(default)]
    pub param_bits: u8,
    pub bits: u8,
    #[serde(default)]
    pub add: i32,
}

impl PropertyDef {
    /// Total bits one entry of this property occupies, id included.
    pub fn entry_width(&self) -> usize {
        PROPERTY_ID_BITS + self.param_bits as usize + self.bits as usize
    }
}

/// Read-only lookup from property id to its encoding. Injected into every
/// codec operation that touches the variable-length section; never
/// mutated by the codec.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyTable {
    defs: BTreeMap<u16, PropertyDef>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_defs<I: IntoIterator<Item = (u16, PropertyDef)>>(defs: I) -> Self {
        Self {
            defs: defs.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, id: u16, def: PropertyDef) {
        self.defs.insert(id, def);
    }

    pub fn lookup(&self, id: u16) -> Option<PropertyDef> {
        self.defs.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// One decoded property: id, optional parameter, and the unbiased value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyEntry {
    pub id: u16,
    pub param: Option<u32>,
    pub value: i32,
}

/// Decode a sentinel-terminated property list from the reader's current
/// position. Entries come back in list order. An id absent from the table
/// aborts the whole decode; no partial list escapes. Duplicate ids are
/// preserved, deciding their legality is the caller's business.
pub fn decode_properties(
    reader: &mut ReverseBitReader<'_>,
    table: &PropertyTable,
) -> Result<Vec<PropertyEntry>, RecordError> {
    let mut entries = Vec::new();
    loop {
        let id = reader.read_number(PROPERTY_ID_BITS)? as u16;
        if id == END_MARKER {
            return Ok(entries);
        }
        let def = table
            .lookup(id)
            .ok_or(RecordError::UnknownPropertyId { id })?;
        let param = if def.param_bits > 0 {
            Some(reader.read_number(def.param_bits as usize)?)
        } else {
            None
        };
        let raw = reader.read_number(def.bits as usize)?;
        entries.push(PropertyEntry {
            id,
            param,
            value: raw as i32 - def.add,
        });
    }
}

/// Build the bit group for one property entry. The id is decoded first,
/// so it sits at the top of the group, above the parameter and the biased
/// value. All range checks happen here, before any sequence is touched.
pub fn encode_property(
    def: &PropertyDef,
    id: u16,
    value: i32,
    param: Option<u32>,
) -> Result<BitString, RecordError> {
    if def.bits as usize > MAX_READ_WIDTH || def.param_bits as usize > MAX_READ_WIDTH {
        return Err(RecordError::format(format!(
            "property definition exceeds {MAX_READ_WIDTH}-bit field limit"
        )));
    }

    let raw = i64::from(value) + i64::from(def.add);
    if raw < 0 || raw >= 1i64 << def.bits {
        return Err(RecordError::OutOfRange {
            value: raw,
            bits: def.bits,
        });
    }

    let param_value = match (def.param_bits, param) {
        (0, Some(_)) => {
            return Err(RecordError::format(format!(
                "property {id} does not take a parameter"
            )));
        }
        (0, None) => None,
        (width, p) => {
            let p = p.unwrap_or(0);
            if u64::from(p) >= 1u64 << width {
                return Err(RecordError::OutOfRange {
                    value: i64::from(p),
                    bits: width,
                });
            }
            Some(p)
        }
    };

    let mut group = BitString::from_group(raw as u32, def.bits as usize);
    if let Some(p) = param_value {
        group.extend(&BitString::from_group(p, def.param_bits as usize));
    }
    group.extend(&BitString::from_group(u32::from(id), PROPERTY_ID_BITS));
    Ok(group)
}

/// The bit group of the list-terminating sentinel.
pub fn sentinel_group() -> BitString {
    BitString::from_group(u32::from(END_MARKER), PROPERTY_ID_BITS)
}

/// Encode a whole property list, sentinel last in decode order. The first
/// list entry must be decoded first, so entries are laid down from the
/// sentinel upward in reverse list order.
pub fn encode_properties(
    entries: &[PropertyEntry],
    table: &PropertyTable,
) -> Result<BitString, RecordError> {
    let mut out = sentinel_group();
    for entry in entries.iter().rev() {
        let def = table
            .lookup(entry.id)
            .ok_or(RecordError::UnknownPropertyId { id: entry.id })?;
        out.extend(&encode_property(&def, entry.id, entry.value, entry.param)?);
    }
    Ok(out)
}
