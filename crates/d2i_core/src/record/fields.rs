use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed-offset fields of the record header. Offsets count bits from the
/// start of the file, magic included, so the first flag sits at 16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldId {
    Quest,
    Identified,
    Socketed,
    Ear,
    Starter,
    Compact,
    Ethereal,
    Personalized,
    Runeword,
    Version,
    Location,
    EquippedSlot,
    Column,
    Row,
    Storage,
}

impl FieldId {
    pub const ALL: [FieldId; 15] = [
        FieldId::Quest,
        FieldId::Identified,
        FieldId::Socketed,
        FieldId::Ear,
        FieldId::Starter,
        FieldId::Compact,
        FieldId::Ethereal,
        FieldId::Personalized,
        FieldId::Runeword,
        FieldId::Version,
        FieldId::Location,
        FieldId::EquippedSlot,
        FieldId::Column,
        FieldId::Row,
        FieldId::Storage,
    ];

    pub fn offset(self) -> usize {
        match self {
            Self::Quest => 16,
            Self::Identified => 20,
            Self::Socketed => 27,
            Self::Ear => 32,
            Self::Starter => 33,
            Self::Compact => 37,
            Self::Ethereal => 38,
            Self::Personalized => 40,
            Self::Runeword => 42,
            Self::Version => 48,
            Self::Location => 58,
            Self::EquippedSlot => 61,
            Self::Column => 65,
            Self::Row => 69,
            Self::Storage => 73,
        }
    }

    pub fn width(self) -> usize {
        match self {
            Self::Version => 8,
            Self::EquippedSlot | Self::Column | Self::Row => 4,
            Self::Location | Self::Storage => 3,
            _ => 1,
        }
    }

    /// Flags whose value decides which sections the decode walk visits.
    /// Rewriting one of these in place invalidates everything downstream
    /// of the header, so the session layer refuses to.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            Self::Compact | Self::Socketed | Self::Ear | Self::Personalized | Self::Runeword
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Quest => "quest",
            Self::Identified => "identified",
            Self::Socketed => "socketed",
            Self::Ear => "ear",
            Self::Starter => "starter",
            Self::Compact => "compact",
            Self::Ethereal => "ethereal",
            Self::Personalized => "personalized",
            Self::Runeword => "runeword",
            Self::Version => "version",
            Self::Location => "location",
            Self::EquippedSlot => "equipped_slot",
            Self::Column => "column",
            Self::Row => "row",
            Self::Storage => "storage",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
