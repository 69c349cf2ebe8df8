//! Integrationstest für das Beispiel `load_catalogue.rs`.
//!
//! Erwartung: zwei valide JSONL-Zeilen → zwei Ausgabezeilen; ein Datensatz
//! mit Dauer 0 wird beim Katalogaufbau aussortiert und taucht nicht auf.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn write_temp_jsonl() -> std::path::PathBuf {
    let tmp =
        std::env::temp_dir().join(format!("freizeit_catalogue_test_{}.jsonl", std::process::id()));
    fs::write(
        &tmp,
        r#"{"name":"Bake bread","category":"Cook","subcategory":"Baking","estimated_minutes":90}
{"name":"Broken","category":"Cook","subcategory":"Baking","estimated_minutes":0}
{"name":"Read a novel","category":"Read","subcategory":"Novels","estimated_minutes":45}"#,
    )
    .unwrap_or_else(|e| panic!("Fehler beim Schreiben der temporären JSONL-Datei: {e}"));
    tmp
}

#[test]
fn example_load_catalogue_lists_valid_records_only() {
    let path = write_temp_jsonl();
    let mut cmd = Command::new("cargo");
    cmd.args([
        "run",
        "--package",
        "freizeit-core",
        "--example",
        "load_catalogue",
        "--",
        path.to_str()
            .unwrap_or_else(|| panic!("Temporärer Pfad ist kein valides UTF-8: {:?}", path)),
    ]);

    cmd.assert()
        .success()
        .stdout(
            predicate::str::contains("Bake bread").and(predicate::str::contains("Read a novel")),
        )
        .stdout(predicate::str::contains("Broken").not());
}

#[test]
fn example_load_catalogue_accepts_stdin() {
    let input = r#"{"name":"Stretch","category":"Sport","subcategory":"Mobility","estimated_minutes":15}"#;

    let mut cmd = Command::new("cargo");
    cmd.args([
        "run",
        "--package",
        "freizeit-core",
        "--example",
        "load_catalogue",
    ]);
    cmd.write_stdin(input);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Stretch").and(predicate::str::contains("15")));
}
