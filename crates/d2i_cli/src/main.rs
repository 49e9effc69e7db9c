use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use d2i_core::core_api::{Engine, Session};
use d2i_core::props::{PropertyDef, PropertyTable};
use d2i_core::record::ItemClass;
use d2i_render::{FieldSelection, JsonStyle, TextStyle, render_json_full, render_json_selected};

#[derive(Debug, Parser)]
#[command(author, about)]
struct Cli {
    #[arg(value_name = "ITEM.D2I")]
    path: PathBuf,
    /// JSON file mapping property ids to their bit layouts.
    #[arg(long, value_name = "PROPS.JSON")]
    props: PathBuf,
    #[arg(long)]
    armor: bool,
    #[arg(long)]
    weapon: bool,
    #[arg(long)]
    stackable: bool,
    #[arg(long = "type-code")]
    type_code: bool,
    #[arg(long)]
    version: bool,
    #[arg(long)]
    flags: bool,
    #[arg(long)]
    location: bool,
    #[arg(long)]
    position: bool,
    #[arg(long)]
    storage: bool,
    #[arg(long)]
    quality: bool,
    #[arg(long)]
    ilvl: bool,
    #[arg(long)]
    sockets: bool,
    #[arg(long)]
    defense: bool,
    #[arg(long)]
    durability: bool,
    #[arg(long)]
    quantity: bool,
    #[arg(long)]
    personalization: bool,
    #[arg(long)]
    properties: bool,
    #[arg(long = "runeword-properties")]
    runeword_properties: bool,
    #[arg(long)]
    json: bool,
    #[arg(long = "set-row")]
    set_row: Option<u32>,
    #[arg(long = "set-column")]
    set_column: Option<u32>,
    #[arg(long = "set-location")]
    set_location: Option<u32>,
    #[arg(long = "set-equipped-slot")]
    set_equipped_slot: Option<u32>,
    #[arg(long = "set-storage")]
    set_storage: Option<u32>,
    #[arg(long = "set-version")]
    set_version: Option<u32>,
    #[arg(long = "set-identified")]
    set_identified: Option<bool>,
    #[arg(long = "set-ethereal")]
    set_ethereal: Option<bool>,
    /// Property to append, as ID:VALUE or ID:VALUE:PARAM. Repeatable.
    #[arg(long = "add-prop", value_name = "ID:VALUE[:PARAM]")]
    add_prop: Vec<String>,
    /// Property id to remove. Repeatable.
    #[arg(long = "remove-prop", value_name = "ID")]
    remove_prop: Vec<u16>,
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy)]
struct PropEdit {
    id: u16,
    value: i32,
    param: Option<u32>,
}

fn main() {
    let cli = Cli::parse();
    let fields = FieldSelection {
        type_code: cli.type_code,
        version: cli.version,
        flags: cli.flags,
        location: cli.location,
        position: cli.position,
        storage: cli.storage,
        quality: cli.quality,
        ilvl: cli.ilvl,
        sockets: cli.sockets,
        defense: cli.defense,
        durability: cli.durability,
        quantity: cli.quantity,
        personalization: cli.personalization,
        properties: cli.properties,
        runeword_properties: cli.runeword_properties,
    };

    let prop_edits: Vec<PropEdit> = cli
        .add_prop
        .iter()
        .map(|spec| {
            parse_prop_edit(spec).unwrap_or_else(|e| {
                eprintln!("Invalid --add-prop value '{spec}': {e}");
                process::exit(2);
            })
        })
        .collect();

    let has_edits = cli.set_row.is_some()
        || cli.set_column.is_some()
        || cli.set_location.is_some()
        || cli.set_equipped_slot.is_some()
        || cli.set_storage.is_some()
        || cli.set_version.is_some()
        || cli.set_identified.is_some()
        || cli.set_ethereal.is_some()
        || !prop_edits.is_empty()
        || !cli.remove_prop.is_empty();

    if has_edits && cli.output.is_none() {
        eprintln!("editing flags require --output <PATH>");
        process::exit(2);
    }
    if !has_edits && cli.output.is_some() {
        eprintln!("--output requires at least one editing flag");
        process::exit(2);
    }

    let table = load_property_table(&cli.props);
    let class = ItemClass {
        armor: cli.armor,
        weapon: cli.weapon,
        stackable: cli.stackable,
    };

    let bytes = fs::read(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", cli.path.display());
        process::exit(1);
    });

    let engine = Engine::new();
    let mut session = engine.open_bytes(bytes, &table, class).unwrap_or_else(|e| {
        eprintln!("Error parsing item record: {}", cli.path.display());
        eprintln!("  {}", e);
        process::exit(1);
    });

    if let Some(row) = cli.set_row {
        session.set_row(row).unwrap_or_else(|e| {
            eprintln!("Error applying row edit: {e}");
            process::exit(1);
        });
    }
    if let Some(column) = cli.set_column {
        session.set_column(column).unwrap_or_else(|e| {
            eprintln!("Error applying column edit: {e}");
            process::exit(1);
        });
    }
    if let Some(location) = cli.set_location {
        session.set_location(location).unwrap_or_else(|e| {
            eprintln!("Error applying location edit: {e}");
            process::exit(1);
        });
    }
    if let Some(slot) = cli.set_equipped_slot {
        session.set_equipped_slot(slot).unwrap_or_else(|e| {
            eprintln!("Error applying equipped slot edit: {e}");
            process::exit(1);
        });
    }
    if let Some(storage) = cli.set_storage {
        session.set_storage(storage).unwrap_or_else(|e| {
            eprintln!("Error applying storage edit: {e}");
            process::exit(1);
        });
    }
    if let Some(version) = cli.set_version {
        session.set_version(version).unwrap_or_else(|e| {
            eprintln!("Error applying version edit: {e}");
            process::exit(1);
        });
    }
    if let Some(identified) = cli.set_identified {
        session.set_identified(identified).unwrap_or_else(|e| {
            eprintln!("Error applying identified edit: {e}");
            process::exit(1);
        });
    }
    if let Some(ethereal) = cli.set_ethereal {
        session.set_ethereal(ethereal).unwrap_or_else(|e| {
            eprintln!("Error applying ethereal edit: {e}");
            process::exit(1);
        });
    }
    for edit in &prop_edits {
        session
            .add_property(edit.id, edit.value, edit.param)
            .unwrap_or_else(|e| {
                eprintln!("Error adding property {}: {e}", edit.id);
                process::exit(1);
            });
    }
    for &id in &cli.remove_prop {
        session.remove_property(id).unwrap_or_else(|e| {
            eprintln!("Error removing property {id}: {e}");
            process::exit(1);
        });
    }

    if has_edits {
        let out_path = cli.output.as_ref().expect("checked above");
        let edited_bytes = session.to_bytes().unwrap_or_else(|e| {
            eprintln!("Error creating edited record bytes: {e}");
            process::exit(1);
        });
        fs::write(out_path, edited_bytes).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", out_path.display());
            process::exit(1);
        });
    }

    if cli.json {
        let json = if fields.is_any_selected() {
            render_json_selected(&session, &fields, JsonStyle::CanonicalV1)
        } else {
            render_json_full(&session, JsonStyle::CanonicalV1)
        };
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        println!("{rendered}");
        return;
    }

    if fields.is_any_selected() {
        for (key, value) in selected_pairs(&fields, &session) {
            println!("{key}={value}");
        }
        return;
    }

    if cli.output.is_some() {
        let out_path = cli.output.as_ref().expect("checked above");
        println!("Wrote edited record to {}", out_path.display());
        return;
    }

    print!("{}", d2i_render::render_text(&session, TextStyle::ItemSheet));
}

fn load_property_table(path: &PathBuf) -> PropertyTable {
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        process::exit(1);
    });
    let defs: BTreeMap<u16, PropertyDef> = serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("Error parsing {}: {e}", path.display());
        process::exit(1);
    });
    PropertyTable::from_defs(defs)
}

fn parse_prop_edit(spec: &str) -> Result<PropEdit, String> {
    let mut parts = spec.splitn(3, ':');
    let id = parts
        .next()
        .ok_or("missing property id")?
        .parse::<u16>()
        .map_err(|e| format!("bad property id: {e}"))?;
    let value = parts
        .next()
        .ok_or("missing value, expected ID:VALUE[:PARAM]")?
        .parse::<i32>()
        .map_err(|e| format!("bad value: {e}"))?;
    let param = match parts.next() {
        Some(raw) => Some(raw.parse::<u32>().map_err(|e| format!("bad param: {e}"))?),
        None => None,
    };
    Ok(PropEdit { id, value, param })
}

fn selected_pairs(fields: &FieldSelection, session: &Session) -> Vec<(&'static str, String)> {
    let snapshot = session.snapshot();
    let mut out = Vec::new();

    if fields.type_code {
        out.push(("type_code", snapshot.type_code.clone()));
    }
    if fields.version {
        out.push(("version", snapshot.version.to_string()));
    }
    if fields.flags {
        out.push(("compact", snapshot.compact.to_string()));
        out.push(("identified", snapshot.identified.to_string()));
        out.push(("socketed", snapshot.socketed.to_string()));
        out.push(("ethereal", snapshot.ethereal.to_string()));
        out.push(("personalized", snapshot.personalized.to_string()));
        out.push(("runeword", snapshot.runeword.to_string()));
    }
    if fields.location {
        out.push(("location", snapshot.location.to_string()));
        out.push(("equipped_slot", snapshot.equipped_slot.to_string()));
    }
    if fields.position {
        out.push(("column", snapshot.column.to_string()));
        out.push(("row", snapshot.row.to_string()));
    }
    if fields.storage {
        out.push(("storage", snapshot.storage.to_string()));
    }
    if fields.quality {
        out.push((
            "quality",
            snapshot
                .quality
                .map(|q| q.to_string())
                .unwrap_or_else(|| "none".to_string()),
        ));
    }
    if fields.ilvl {
        out.push(("ilvl", option_to_string(snapshot.ilvl)));
    }
    if fields.sockets {
        out.push(("sockets", option_to_string(snapshot.sockets)));
    }
    if fields.defense {
        out.push(("defense", option_to_string(snapshot.defense)));
    }
    if fields.durability {
        out.push(("max_durability", option_to_string(snapshot.max_durability)));
        out.push((
            "current_durability",
            option_to_string(snapshot.current_durability),
        ));
    }
    if fields.quantity {
        out.push(("quantity", option_to_string(snapshot.quantity)));
    }
    if fields.personalization {
        out.push((
            "personalization",
            snapshot
                .personalization
                .clone()
                .unwrap_or_else(|| "none".to_string()),
        ));
    }
    if fields.properties {
        for entry in session.properties() {
            out.push(("property", format_property(entry)));
        }
    }
    if fields.runeword_properties {
        for entry in session.runeword_properties() {
            out.push(("runeword_property", format_property(entry)));
        }
    }

    out
}

fn format_property(entry: &d2i_core::props::PropertyEntry) -> String {
    match entry.param {
        Some(param) => format!("id={} value={} param={param}", entry.id, entry.value),
        None => format!("id={} value={}", entry.id, entry.value),
    }
}

fn option_to_string<T: ToString>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "none".to_string(),
    }
}
