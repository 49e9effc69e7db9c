use std::fmt::Write as _;

use d2i_core::core_api::Session;
use d2i_core::props::PropertyEntry;
use serde_json::{Map as JsonMap, Value as JsonValue};

const LABEL_WIDTH: usize = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextStyle {
    #[default]
    ItemSheet,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    pub type_code: bool,
    pub version: bool,
    pub flags: bool,
    pub location: bool,
    pub position: bool,
    pub storage: bool,
    pub quality: bool,
    pub ilvl: bool,
    pub sockets: bool,
    pub defense: bool,
    pub durability: bool,
    pub quantity: bool,
    pub personalization: bool,
    pub properties: bool,
    pub runeword_properties: bool,
}

impl FieldSelection {
    pub fn is_any_selected(&self) -> bool {
        self.type_code
            || self.version
            || self.flags
            || self.location
            || self.position
            || self.storage
            || self.quality
            || self.ilvl
            || self.sockets
            || self.defense
            || self.durability
            || self.quantity
            || self.personalization
            || self.properties
            || self.runeword_properties
    }
}

pub fn render_json_full(session: &Session, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(default_json(session)),
    }
}

pub fn render_json_selected(
    session: &Session,
    fields: &FieldSelection,
    style: JsonStyle,
) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(selected_json(fields, session)),
    }
}

pub fn render_text(session: &Session, style: TextStyle) -> String {
    match style {
        TextStyle::ItemSheet => render_item_sheet(session),
    }
}

fn default_json(session: &Session) -> JsonMap<String, JsonValue> {
    let snapshot = session.snapshot();
    let mut out = JsonMap::new();

    out.insert(
        "type_code".to_string(),
        JsonValue::String(snapshot.type_code.clone()),
    );
    out.insert("version".to_string(), JsonValue::from(snapshot.version));
    out.insert("flags".to_string(), JsonValue::Object(flags_json(session)));
    out.insert("location".to_string(), JsonValue::from(snapshot.location));
    out.insert(
        "equipped_slot".to_string(),
        JsonValue::from(snapshot.equipped_slot),
    );
    out.insert("column".to_string(), JsonValue::from(snapshot.column));
    out.insert("row".to_string(), JsonValue::from(snapshot.row));
    out.insert("storage".to_string(), JsonValue::from(snapshot.storage));
    out.insert(
        "quality".to_string(),
        match snapshot.quality {
            Some(q) => JsonValue::String(q.to_string()),
            None => JsonValue::Null,
        },
    );
    out.insert("ilvl".to_string(), option_u32(snapshot.ilvl));
    out.insert("sockets".to_string(), option_u32(snapshot.sockets));
    out.insert(
        "personalization".to_string(),
        match &snapshot.personalization {
            Some(name) => JsonValue::String(name.clone()),
            None => JsonValue::Null,
        },
    );
    out.insert("defense".to_string(), option_i32(snapshot.defense));
    out.insert(
        "max_durability".to_string(),
        option_i32(snapshot.max_durability),
    );
    out.insert(
        "current_durability".to_string(),
        option_i32(snapshot.current_durability),
    );
    out.insert("quantity".to_string(), option_u32(snapshot.quantity));
    out.insert(
        "properties".to_string(),
        properties_to_json(session.properties()),
    );
    out.insert(
        "runeword_properties".to_string(),
        properties_to_json(session.runeword_properties()),
    );
    out.insert("byte_len".to_string(), JsonValue::from(snapshot.byte_len));

    out
}

fn selected_json(fields: &FieldSelection, session: &Session) -> JsonMap<String, JsonValue> {
    let snapshot = session.snapshot();
    let mut out = JsonMap::new();

    if fields.type_code {
        out.insert(
            "type_code".to_string(),
            JsonValue::String(snapshot.type_code.clone()),
        );
    }
    if fields.version {
        out.insert("version".to_string(), JsonValue::from(snapshot.version));
    }
    if fields.flags {
        out.insert("flags".to_string(), JsonValue::Object(flags_json(session)));
    }
    if fields.location {
        out.insert("location".to_string(), JsonValue::from(snapshot.location));
        out.insert(
            "equipped_slot".to_string(),
            JsonValue::from(snapshot.equipped_slot),
        );
    }
    if fields.position {
        out.insert("column".to_string(), JsonValue::from(snapshot.column));
        out.insert("row".to_string(), JsonValue::from(snapshot.row));
    }
    if fields.storage {
        out.insert("storage".to_string(), JsonValue::from(snapshot.storage));
    }
    if fields.quality {
        out.insert(
            "quality".to_string(),
            match snapshot.quality {
                Some(q) => JsonValue::String(q.to_string()),
                None => JsonValue::Null,
            },
        );
    }
    if fields.ilvl {
        out.insert("ilvl".to_string(), option_u32(snapshot.ilvl));
    }
    if fields.sockets {
        out.insert("sockets".to_string(), option_u32(snapshot.sockets));
    }
    if fields.defense {
        out.insert("defense".to_string(), option_i32(snapshot.defense));
    }
    if fields.durability {
        out.insert(
            "max_durability".to_string(),
            option_i32(snapshot.max_durability),
        );
        out.insert(
            "current_durability".to_string(),
            option_i32(snapshot.current_durability),
        );
    }
    if fields.quantity {
        out.insert("quantity".to_string(), option_u32(snapshot.quantity));
    }
    if fields.personalization {
        out.insert(
            "personalization".to_string(),
            match &snapshot.personalization {
                Some(name) => JsonValue::String(name.clone()),
                None => JsonValue::Null,
            },
        );
    }
    if fields.properties {
        out.insert(
            "properties".to_string(),
            properties_to_json(session.properties()),
        );
    }
    if fields.runeword_properties {
        out.insert(
            "runeword_properties".to_string(),
            properties_to_json(session.runeword_properties()),
        );
    }

    out
}

fn flags_json(session: &Session) -> JsonMap<String, JsonValue> {
    let snapshot = session.snapshot();
    let mut out = JsonMap::new();
    out.insert("compact".to_string(), JsonValue::Bool(snapshot.compact));
    out.insert(
        "identified".to_string(),
        JsonValue::Bool(snapshot.identified),
    );
    out.insert("socketed".to_string(), JsonValue::Bool(snapshot.socketed));
    out.insert("ethereal".to_string(), JsonValue::Bool(snapshot.ethereal));
    out.insert(
        "personalized".to_string(),
        JsonValue::Bool(snapshot.personalized),
    );
    out.insert("runeword".to_string(), JsonValue::Bool(snapshot.runeword));
    out
}

fn properties_to_json(entries: &[PropertyEntry]) -> JsonValue {
    JsonValue::Array(
        entries
            .iter()
            .map(|entry| {
                let mut m = JsonMap::new();
                m.insert("id".to_string(), JsonValue::from(entry.id));
                if let Some(param) = entry.param {
                    m.insert("param".to_string(), JsonValue::from(param));
                }
                m.insert("value".to_string(), JsonValue::from(entry.value));
                JsonValue::Object(m)
            })
            .collect(),
    )
}

fn option_u32(value: Option<u32>) -> JsonValue {
    match value {
        Some(v) => JsonValue::from(v),
        None => JsonValue::Null,
    }
}

fn option_i32(value: Option<i32>) -> JsonValue {
    match value {
        Some(v) => JsonValue::from(v),
        None => JsonValue::Null,
    }
}

fn render_item_sheet(session: &Session) -> String {
    let snapshot = session.snapshot();
    let mut out = String::new();

    writeln!(&mut out, "Item: {}", snapshot.type_code).expect("writing to String cannot fail");
    write_row(&mut out, "Version", snapshot.version.to_string());
    write_row(
        &mut out,
        "Kind",
        if snapshot.compact {
            "compact".to_string()
        } else {
            "extended".to_string()
        },
    );

    let mut flags = Vec::new();
    if snapshot.identified {
        flags.push("identified");
    }
    if snapshot.socketed {
        flags.push("socketed");
    }
    if snapshot.ethereal {
        flags.push("ethereal");
    }
    if snapshot.personalized {
        flags.push("personalized");
    }
    if snapshot.runeword {
        flags.push("runeword");
    }
    write_row(
        &mut out,
        "Flags",
        if flags.is_empty() {
            "none".to_string()
        } else {
            flags.join(", ")
        },
    );

    write_row(
        &mut out,
        "Location",
        format!(
            "location {} slot {} storage {}",
            snapshot.location, snapshot.equipped_slot, snapshot.storage
        ),
    );
    write_row(
        &mut out,
        "Position",
        format!("column {} row {}", snapshot.column, snapshot.row),
    );

    if let Some(quality) = snapshot.quality {
        write_row(&mut out, "Quality", quality.to_string());
    }
    if let Some(ilvl) = snapshot.ilvl {
        write_row(&mut out, "Item level", ilvl.to_string());
    }
    if let Some(sockets) = snapshot.sockets {
        write_row(&mut out, "Sockets", sockets.to_string());
    }
    if let Some(name) = &snapshot.personalization {
        write_row(&mut out, "Inscribed", name.clone());
    }
    if let Some(defense) = snapshot.defense {
        write_row(&mut out, "Defense", defense.to_string());
    }
    if let (Some(current), Some(max)) = (snapshot.current_durability, snapshot.max_durability) {
        write_row(&mut out, "Durability", format!("{current}/{max}"));
    } else if let Some(max) = snapshot.max_durability {
        write_row(&mut out, "Durability", format!("-/{max}"));
    }
    if let Some(quantity) = snapshot.quantity {
        write_row(&mut out, "Quantity", quantity.to_string());
    }

    write_property_section(&mut out, "Properties", session.properties());
    if snapshot.runeword {
        write_property_section(
            &mut out,
            "Runeword properties",
            session.runeword_properties(),
        );
    }

    out
}

fn write_row(out: &mut String, label: &str, value: String) {
    writeln!(out, "  {label:<LABEL_WIDTH$}{value}").expect("writing to String cannot fail");
}

fn write_property_section(out: &mut String, title: &str, entries: &[PropertyEntry]) {
    writeln!(out).expect("writing to String cannot fail");
    writeln!(out, "{title}:").expect("writing to String cannot fail");
    if entries.is_empty() {
        writeln!(out, "  none").expect("writing to String cannot fail");
        return;
    }
    for entry in entries {
        match entry.param {
            Some(param) => writeln!(
                out,
                "  id {:>3}  value {:>6}  param {param}",
                entry.id, entry.value
            )
            .expect("writing to String cannot fail"),
            None => writeln!(out, "  id {:>3}  value {:>6}", entry.id, entry.value)
                .expect("writing to String cannot fail"),
        }
    }
}
