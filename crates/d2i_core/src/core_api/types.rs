use serde::{Deserialize, Serialize};

use crate::record::ItemQuality;

/// Read-model of an open item record: everything a front end shows
/// without touching the bit sequence. Setters keep it in step with the
/// record they edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub type_code: String,
    pub compact: bool,
    pub identified: bool,
    pub socketed: bool,
    pub ethereal: bool,
    pub personalized: bool,
    pub runeword: bool,
    pub version: u32,
    pub location: u32,
    pub equipped_slot: u32,
    pub column: u32,
    pub row: u32,
    pub storage: u32,
    pub quality: Option<ItemQuality>,
    pub ilvl: Option<u32>,
    pub sockets: Option<u32>,
    pub personalization: Option<String>,
    pub defense: Option<i32>,
    pub max_durability: Option<i32>,
    pub current_durability: Option<i32>,
    pub quantity: Option<u32>,
    pub property_count: usize,
    pub runeword_property_count: usize,
    pub byte_len: usize,
}
