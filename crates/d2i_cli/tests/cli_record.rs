use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use d2i_core::RecordBuilder;
use serde_json::Value;

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_d2i-se"))
        .args(args)
        .output()
        .expect("failed to run d2i-se CLI")
}

fn temp_path(prefix: &str, extension: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "{prefix}_{}_{nanos}.{extension}",
        std::process::id()
    ))
}

fn write_sample_record() -> PathBuf {
    let bytes = RecordBuilder::new("box")
        .expect("valid type code")
        .ilvl(12)
        .position(2, 6)
        .build()
        .expect("build");
    let path = temp_path("d2i_item", "d2i");
    fs::write(&path, bytes).expect("write fixture");
    path
}

fn write_props_file() -> PathBuf {
    let path = temp_path("d2i_props", "json");
    fs::write(&path, r#"{"80": {"bits": 9, "add": 100}}"#).expect("write props");
    path
}

#[test]
fn cli_prints_requested_fields_as_pairs() {
    let item = write_sample_record();
    let props = write_props_file();

    let output = run_cli(&[
        "--props",
        props.to_str().expect("utf8 path"),
        "--type-code",
        "--position",
        item.to_str().expect("utf8 path"),
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["type_code=box", "column=2", "row=6"]);

    fs::remove_file(item).ok();
    fs::remove_file(props).ok();
}

#[test]
fn cli_renders_full_json() {
    let item = write_sample_record();
    let props = write_props_file();

    let output = run_cli(&[
        "--props",
        props.to_str().expect("utf8 path"),
        "--json",
        item.to_str().expect("utf8 path"),
    ]);
    assert!(output.status.success());

    let json: Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(json["type_code"], Value::from("box"));
    assert_eq!(json["row"], Value::from(6));
    assert_eq!(json["quality"], Value::from("Normal"));
    assert_eq!(json["flags"]["compact"], Value::Bool(false));

    fs::remove_file(item).ok();
    fs::remove_file(props).ok();
}

#[test]
fn cli_without_field_flags_prints_the_item_sheet() {
    let item = write_sample_record();
    let props = write_props_file();

    let output = run_cli(&[
        "--props",
        props.to_str().expect("utf8 path"),
        item.to_str().expect("utf8 path"),
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Item: box"));
    assert!(stdout.contains("Properties:"));

    fs::remove_file(item).ok();
    fs::remove_file(props).ok();
}

#[test]
fn cli_edit_writes_a_new_record() {
    let item = write_sample_record();
    let props = write_props_file();
    let edited = temp_path("d2i_edited", "d2i");

    let output = run_cli(&[
        "--props",
        props.to_str().expect("utf8 path"),
        "--set-row",
        "9",
        "--add-prop",
        "80:50",
        "--output",
        edited.to_str().expect("utf8 path"),
        item.to_str().expect("utf8 path"),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Wrote edited record to"));

    let output = run_cli(&[
        "--props",
        props.to_str().expect("utf8 path"),
        "--json",
        edited.to_str().expect("utf8 path"),
    ]);
    assert!(output.status.success());
    let json: Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(json["row"], Value::from(9));
    let properties = json["properties"].as_array().expect("properties array");
    assert_eq!(properties.len(), 1);
    assert_eq!(properties[0]["id"], Value::from(80));
    assert_eq!(properties[0]["value"], Value::from(50));

    fs::remove_file(item).ok();
    fs::remove_file(props).ok();
    fs::remove_file(edited).ok();
}

#[test]
fn cli_edit_without_output_is_a_usage_error() {
    let item = write_sample_record();
    let props = write_props_file();

    let output = run_cli(&[
        "--props",
        props.to_str().expect("utf8 path"),
        "--set-row",
        "9",
        item.to_str().expect("utf8 path"),
    ]);
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));

    fs::remove_file(item).ok();
    fs::remove_file(props).ok();
}

#[test]
fn cli_reports_unknown_property_ids() {
    let item = write_sample_record();
    let props = write_props_file();
    let edited = temp_path("d2i_unused", "d2i");

    let output = run_cli(&[
        "--props",
        props.to_str().expect("utf8 path"),
        "--add-prop",
        "300:1",
        "--output",
        edited.to_str().expect("utf8 path"),
        item.to_str().expect("utf8 path"),
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("property id 300"));

    fs::remove_file(item).ok();
    fs::remove_file(props).ok();
    fs::remove_file(edited).ok();
}
