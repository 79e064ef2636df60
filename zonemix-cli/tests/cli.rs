use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn zmix() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("zmix"));
    cmd.env("RUST_LOG", "off");
    cmd
}

const CONFIG: &str = r#"{
  "zones": [
    {
      "name": "world",
      "kind": { "type": "global" },
      "seed": 7,
      "tracks": [
        { "name": "overworld", "length": 20.0 },
        { "name": "meadow", "length": 15.0 }
      ],
      "transition": "cut",
      "pause": { "type": "static", "seconds": 2.0 }
    },
    {
      "name": "cave",
      "kind": { "type": "local", "stay_delay": 1.0 },
      "seed": 3,
      "tracks": [{ "name": "drips", "length": 30.0 }],
      "switch_in": { "kind": "fade", "fade_time": 1.0 },
      "switch_out": { "kind": "fade", "fade_time": 1.0 }
    }
  ],
  "mute_zones": [{ "name": "library", "stay_delay": 0.5, "hard_pause": true }]
}"#;

#[test]
fn create_config_outputs_template_zones() {
    zmix()
        .args(["create", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"world\""))
        .stdout(predicate::str::contains("\"cave\""))
        .stdout(predicate::str::contains("cross_fade"));
}

#[test]
fn created_config_validates() {
    let output = zmix().args(["create", "config"]).output().expect("run");
    assert!(output.status.success());

    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("music.json");
    fs::write(&path, &output.stdout).expect("write config");

    zmix()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("config ok: 2 zones, 1 mute zones"));
}

#[test]
fn created_script_validates_against_created_config() {
    let dir = tempdir().expect("tempdir");
    let config = zmix().args(["create", "config"]).output().expect("run");
    let script = zmix().args(["create", "script"]).output().expect("run");
    let config_path = dir.path().join("music.json");
    let script_path = dir.path().join("walk.json");
    fs::write(&config_path, &config.stdout).expect("write config");
    fs::write(&script_path, &script.stdout).expect("write script");

    zmix()
        .arg("validate")
        .arg(&config_path)
        .arg("--script")
        .arg(&script_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("script ok: 8 events"));
}

#[test]
fn validate_rejects_zone_without_tracks() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("broken.json");
    fs::write(&path, r#"{ "zones": [ { "name": "empty" } ] }"#).expect("write");

    zmix()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("zone 'empty': no tracks"));
}

#[test]
fn validate_reports_malformed_json() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ zones: ").expect("write");

    zmix()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("parse error"));
}

#[test]
fn simulate_prints_timeline_and_summary() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("music.json");
    fs::write(&path, CONFIG).expect("write");

    zmix()
        .arg("simulate")
        .arg(&path)
        .args(["--duration", "30", "--frame", "0.05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("timeline:"))
        .stdout(predicate::str::contains("Idle -> Playing"))
        .stdout(predicate::str::contains("TrackEnding -> Paused"))
        .stdout(predicate::str::contains("final:"));
}

#[test]
fn simulate_follows_listener_script() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("music.json");
    let script_path = dir.path().join("walk.json");
    fs::write(&config_path, CONFIG).expect("write config");
    fs::write(
        &script_path,
        r#"{
  "duration": 12.0,
  "frame": 0.05,
  "events": [
    { "at": 2.0, "event": "enter", "zone": "cave" }
  ]
}"#,
    )
    .expect("write script");

    zmix()
        .arg("simulate")
        .arg(&config_path)
        .arg("--script")
        .arg(&script_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Playing -> Paused"))
        .stdout(predicate::str::contains("Paused -> FadeIn"))
        .stdout(predicate::str::contains("final: Playing in 'cave'"));
}

#[test]
fn simulate_rejects_unknown_zone_in_script() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("music.json");
    let script_path = dir.path().join("walk.json");
    fs::write(&config_path, CONFIG).expect("write config");
    fs::write(
        &script_path,
        r#"{ "duration": 5.0, "events": [ { "at": 1.0, "event": "enter", "zone": "nowhere" } ] }"#,
    )
    .expect("write script");

    zmix()
        .arg("simulate")
        .arg(&config_path)
        .arg("-s")
        .arg(&script_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown zone 'nowhere'"));
}

#[test]
fn simulate_pauses_inside_mute_zone() {
    let dir = tempdir().expect("tempdir");
    let config_path = dir.path().join("music.json");
    let script_path = dir.path().join("walk.json");
    fs::write(&config_path, CONFIG).expect("write config");
    fs::write(
        &script_path,
        r#"{
  "duration": 6.0,
  "frame": 0.05,
  "events": [
    { "at": 2.0, "event": "enter", "zone": "library" }
  ]
}"#,
    )
    .expect("write script");

    zmix()
        .arg("simulate")
        .arg(&config_path)
        .arg("--script")
        .arg(&script_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Playing -> Paused"))
        .stdout(predicate::str::contains("library         mute  (engaged)"))
        .stdout(predicate::str::contains("final: Paused in 'world'"))
        .stdout(predicate::str::contains("(paused)"));
}
