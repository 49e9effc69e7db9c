use crate::props::{PropertyEntry, PropertyTable};
use crate::record::fields::FieldId;
use crate::record::{ItemClass, ItemRecord};

use super::error::{CoreError, CoreErrorCode};
use super::types::ItemSnapshot;

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

/// An open item record plus the lookup context its edits need. The
/// snapshot mirrors the record and is patched alongside every edit.
#[derive(Debug)]
pub struct Session {
    record: ItemRecord,
    table: PropertyTable,
    snapshot: ItemSnapshot,
}

impl Engine {
    pub fn new() -> Self {
        Self
    }

    pub fn open_bytes<B: AsRef<[u8]>>(
        &self,
        bytes: B,
        table: &PropertyTable,
        class: ItemClass,
    ) -> Result<Session, CoreError> {
        let record = ItemRecord::decode(bytes.as_ref(), table, class).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Parse,
                format!("failed to parse item record: {e}"),
            )
        })?;
        let snapshot = snapshot_of(&record)?;
        Ok(Session {
            record,
            table: table.clone(),
            snapshot,
        })
    }
}

impl Session {
    pub fn snapshot(&self) -> &ItemSnapshot {
        &self.snapshot
    }

    pub fn record(&self) -> &ItemRecord {
        &self.record
    }

    pub fn properties(&self) -> &[PropertyEntry] {
        &self.record.properties
    }

    pub fn runeword_properties(&self) -> &[PropertyEntry] {
        &self.record.runeword_properties
    }

    pub fn field(&self, field: FieldId) -> Result<u32, CoreError> {
        self.record.get_field(field).map_err(|e| {
            CoreError::new(CoreErrorCode::Parse, format!("failed to read {field}: {e}"))
        })
    }

    /// Rewrite one fixed header field. Structural flags are refused:
    /// flipping one would change the record's shape without moving the
    /// sections that shape implies.
    pub fn set_field(&mut self, field: FieldId, value: u32) -> Result<(), CoreError> {
        if field.is_structural() {
            return Err(CoreError::new(
                CoreErrorCode::UnsupportedOperation,
                format!("the {field} flag decides the record layout and cannot be edited in place"),
            ));
        }
        self.record.set_field(field, value).map_err(|e| {
            CoreError::new(CoreErrorCode::Edit, format!("failed to set {field}: {e}"))
        })
    }

    pub fn set_row(&mut self, row: u32) -> Result<(), CoreError> {
        self.set_field(FieldId::Row, row)?;
        self.snapshot.row = row;
        Ok(())
    }

    pub fn set_column(&mut self, column: u32) -> Result<(), CoreError> {
        self.set_field(FieldId::Column, column)?;
        self.snapshot.column = column;
        Ok(())
    }

    pub fn set_location(&mut self, location: u32) -> Result<(), CoreError> {
        self.set_field(FieldId::Location, location)?;
        self.snapshot.location = location;
        Ok(())
    }

    pub fn set_equipped_slot(&mut self, slot: u32) -> Result<(), CoreError> {
        self.set_field(FieldId::EquippedSlot, slot)?;
        self.snapshot.equipped_slot = slot;
        Ok(())
    }

    pub fn set_storage(&mut self, storage: u32) -> Result<(), CoreError> {
        self.set_field(FieldId::Storage, storage)?;
        self.snapshot.storage = storage;
        Ok(())
    }

    pub fn set_version(&mut self, version: u32) -> Result<(), CoreError> {
        self.set_field(FieldId::Version, version)?;
        self.snapshot.version = version;
        Ok(())
    }

    pub fn set_identified(&mut self, identified: bool) -> Result<(), CoreError> {
        self.set_field(FieldId::Identified, u32::from(identified))?;
        self.snapshot.identified = identified;
        Ok(())
    }

    pub fn set_ethereal(&mut self, ethereal: bool) -> Result<(), CoreError> {
        self.set_field(FieldId::Ethereal, u32::from(ethereal))?;
        self.snapshot.ethereal = ethereal;
        Ok(())
    }

    pub fn set_quest(&mut self, quest: bool) -> Result<(), CoreError> {
        self.set_field(FieldId::Quest, u32::from(quest))
    }

    pub fn set_starter(&mut self, starter: bool) -> Result<(), CoreError> {
        self.set_field(FieldId::Starter, u32::from(starter))
    }

    pub fn add_property(
        &mut self,
        id: u16,
        value: i32,
        param: Option<u32>,
    ) -> Result<(), CoreError> {
        self.record
            .add_property(&self.table, id, value, param)
            .map_err(|e| {
                CoreError::new(
                    CoreErrorCode::Edit,
                    format!("failed to add property {id}: {e}"),
                )
            })?;
        self.refresh_snapshot_counts();
        Ok(())
    }

    pub fn remove_property(&mut self, id: u16) -> Result<(), CoreError> {
        self.record
            .remove_property(&self.table, id)
            .map_err(|e| {
                CoreError::new(
                    CoreErrorCode::Edit,
                    format!("failed to remove property {id}: {e}"),
                )
            })?;
        self.refresh_snapshot_counts();
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CoreError> {
        self.record
            .encode()
            .map_err(|e| CoreError::new(CoreErrorCode::Io, format!("failed to emit bytes: {e}")))
    }

    fn refresh_snapshot_counts(&mut self) {
        self.snapshot.property_count = self.record.properties.len();
        self.snapshot.runeword_property_count = self.record.runeword_properties.len();
        self.snapshot.byte_len = ItemRecord::MAGIC_LEN + self.record.bit_len() / 8;
    }
}

fn snapshot_of(record: &ItemRecord) -> Result<ItemSnapshot, CoreError> {
    let field = |f: FieldId| {
        record
            .get_field(f)
            .map_err(|e| CoreError::new(CoreErrorCode::Parse, format!("failed to read {f}: {e}")))
    };

    let ext = record.extended.as_ref();
    Ok(ItemSnapshot {
        type_code: record.type_code.clone(),
        compact: record.is_compact(),
        identified: field(FieldId::Identified)? != 0,
        socketed: field(FieldId::Socketed)? != 0,
        ethereal: field(FieldId::Ethereal)? != 0,
        personalized: field(FieldId::Personalized)? != 0,
        runeword: field(FieldId::Runeword)? != 0,
        version: field(FieldId::Version)?,
        location: field(FieldId::Location)?,
        equipped_slot: field(FieldId::EquippedSlot)?,
        column: field(FieldId::Column)?,
        row: field(FieldId::Row)?,
        storage: field(FieldId::Storage)?,
        quality: ext.map(|e| e.quality),
        ilvl: ext.map(|e| e.ilvl),
        sockets: ext.map(|e| e.sockets),
        personalization: ext.and_then(|e| e.personalization.clone()),
        defense: ext.and_then(|e| e.defense),
        max_durability: ext.and_then(|e| e.max_durability),
        current_durability: ext.and_then(|e| e.current_durability),
        quantity: ext.and_then(|e| e.quantity),
        property_count: record.properties.len(),
        runeword_property_count: record.runeword_properties.len(),
        byte_len: ItemRecord::MAGIC_LEN + record.bit_len() / 8,
    })
}
