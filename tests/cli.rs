use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

const CSV: &str =
    "id,kind,confidence\n1,road,0.1\n2,river,0.2\n3,road,0.2\n4,lake,0.5\n5,road,0.9\n";

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("mapclass").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("classify"))
        .stdout(predicate::str::contains("legend"));
}

#[test]
fn classify_prints_equal_interval_breaks() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("r.csv");
    fs::write(&input, CSV).unwrap();

    let mut cmd = Command::cargo_bin("mapclass").unwrap();
    cmd.args(["classify", "--column", "confidence", "--method", "equal-interval", "-k", "3"])
        .arg(&input)
        .arg("--stats");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("breaks: 0.1, 0.3667, 0.6333, 0.9"))
        .stdout(predicate::str::contains("class 3"))
        .stdout(predicate::str::contains("median=0.2"));
}

#[test]
fn unknown_column_fails_with_available_list() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("r.csv");
    fs::write(&input, CSV).unwrap();

    let mut cmd = Command::cargo_bin("mapclass").unwrap();
    cmd.args(["classify", "--column", "nope"]).arg(&input);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("column 'nope' not found"))
        .stderr(predicate::str::contains("confidence"));
}

#[test]
fn expr_prints_match_and_filter_json() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("r.csv");
    fs::write(&input, CSV).unwrap();

    let mut cmd = Command::cargo_bin("mapclass").unwrap();
    cmd.args(["expr", "--column", "kind", "--hide", "road"]).arg(&input);
    let out = cmd.assert().success().get_output().stdout.clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["paint"][0], "match");
    assert_eq!(v["filter"][0], "in");
    assert_eq!(v["filter"][2][1], serde_json::json!(["river", "lake"]));
    assert_eq!(v["selectedRows"], 2);
}

#[test]
fn expr_hides_other_bucket() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("r.csv");
    let config = dir.path().join("style.json");
    fs::write(&input, CSV).unwrap();
    fs::write(&config, r#"{"classify": {"maxCategories": 2}}"#).unwrap();

    let mut cmd = Command::cargo_bin("mapclass").unwrap();
    cmd.args(["expr", "--column", "kind", "--hide-other", "--config"])
        .arg(&config)
        .arg(&input);
    let out = cmd.assert().success().get_output().stdout.clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["filter"][2][1], serde_json::json!(["road", "river"]));
    assert_eq!(v["selectedRows"], 4);
}

#[test]
fn legend_writes_svg_with_range() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("r.csv");
    let out = dir.path().join("legend.svg");
    fs::write(&input, CSV).unwrap();

    let mut cmd = Command::cargo_bin("mapclass").unwrap();
    cmd.args(["legend", "--column", "confidence", "--range", "0.2:0.6", "--out"])
        .arg(&out)
        .arg(&input);
    cmd.assert().success();
    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("confidence"));
}

#[test]
fn legend_rejects_non_svg_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("r.csv");
    fs::write(&input, CSV).unwrap();

    let mut cmd = Command::cargo_bin("mapclass").unwrap();
    cmd.args(["legend", "--out", "x.png"]).arg(&input);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains(".svg"));
}
