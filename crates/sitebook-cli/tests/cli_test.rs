//! End-to-end tests for the `sitebook` binary.
//!
//! Each test runs the compiled binary with its config directory and state
//! file pointed into a fresh temp dir, so nothing touches the real home.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn sitebook(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sitebook"))
        .args(args)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("SITEBOOK_STATE_PATH", home.join("state.json"))
        .env_remove("SITEBOOK_REFERENCE_PATH")
        .env_remove("SITEBOOK_CLASSIFIER")
        .env_remove("SITEBOOK_LLM_URL")
        .env_remove("SITEBOOK_LLM_MODEL")
        .env_remove("SITEBOOK_LLM_API_KEY")
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run sitebook")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "sitebook failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn schedule_prints_six_phases() {
    let home = TempDir::new().unwrap();
    let out = stdout(&sitebook(
        home.path(),
        &["schedule", "Galloway", "2024-06-03", "--lot", "12"],
    ));

    assert!(out.starts_with("Schedule for Galloway, lot 12 (start 06/03/2024)"));
    for (phase, date) in [
        ("Hang", "06/04/2024"),
        ("Scrap", "06/05/2024"),
        ("Tape", "06/07/2024"),
        ("Bed", "06/10/2024"),
        ("Skim", "06/12/2024"),
        ("Sand", "06/13/2024"),
    ] {
        let line = out
            .lines()
            .find(|l| l.starts_with(phase))
            .unwrap_or_else(|| panic!("no {phase} row in:\n{out}"));
        assert!(line.contains("America Drywall"), "{line}");
        assert!(line.ends_with(date), "{line}");
    }
}

#[test]
fn schedule_rejects_bad_date() {
    let home = TempDir::new().unwrap();
    let output = sitebook(home.path(), &["schedule", "Galloway", "2024-13-40"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("2024-13-40"), "stderr: {stderr}");
}

#[test]
fn communities_lists_builtin_table() {
    let home = TempDir::new().unwrap();
    let out = stdout(&sitebook(home.path(), &["communities"]));
    assert_eq!(out.lines().count(), 1 + 8);
    let claremont = out.lines().find(|l| l.starts_with("Claremont")).unwrap();
    assert!(claremont.contains("Ricardo") && claremont.contains("Scrap Brothers"));
}

#[test]
fn order_mud_prints_scrap_date() {
    let home = TempDir::new().unwrap();
    let out = stdout(&sitebook(
        home.path(),
        &["order-mud", "Claremont", "06/03/2024", "--lot", "27"],
    ));
    assert!(out.starts_with("Mud order queued for 06/05/2024 (lot 27, Claremont)"));
    assert!(out.contains("Scrap crew: Scrap Brothers"));
}

#[test]
fn epo_lifecycle_persists_between_runs() {
    let home = TempDir::new().unwrap();
    stdout(&sitebook(
        home.path(),
        &[
            "epo", "send", "--lot", "12", "--community", "Galloway", "--to",
            "pm@builder.test", "--amount", "$450",
        ],
    ));
    stdout(&sitebook(home.path(), &["epo", "follow-up", "0"]));

    let list = stdout(&sitebook(home.path(), &["epo", "list"]));
    let row = list.lines().nth(1).unwrap();
    assert!(row.contains("pm@builder.test") && row.ends_with("follow_up_sent"));

    stdout(&sitebook(home.path(), &["epo", "replied", "0"]));
    let output = sitebook(home.path(), &["epo", "follow-up", "0"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot move from replied"), "stderr: {stderr}");

    let state = std::fs::read_to_string(home.path().join("state.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&state).unwrap();
    assert_eq!(json["epo_log"][0]["replied"], true);
}

#[test]
fn note_add_and_list() {
    let home = TempDir::new().unwrap();
    let out = stdout(&sitebook(
        home.path(),
        &[
            "note", "add", "--lot", "8", "--community", "Camden", "nail", "pops", "in",
            "bonus", "room",
        ],
    ));
    assert_eq!(out.trim(), "Note 0 filed as repair (keywords): Schedule repair");

    let list = stdout(&sitebook(home.path(), &["note", "list", "--lot", "8"]));
    assert!(list.contains("nail pops in bonus room"));

    let other = stdout(&sitebook(home.path(), &["note", "list", "--lot", "9"]));
    assert!(other.starts_with("No notes recorded."));
}

#[test]
fn init_writes_config_used_by_later_runs() {
    let home = TempDir::new().unwrap();
    let custom_state = home.path().join("custom.json");
    let custom = custom_state.to_str().unwrap();
    stdout(&sitebook(home.path(), &["init", "--state-path", custom]));

    let output = Command::new(env!("CARGO_BIN_EXE_sitebook"))
        .args([
            "epo", "send", "--lot", "1", "--community", "Maxwell", "--to", "a@b.test",
            "--amount", "$10",
        ])
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("SITEBOOK_STATE_PATH")
        .env("RUST_LOG", "warn")
        .output()
        .unwrap();
    stdout(&output);
    assert!(custom_state.exists());
}

#[test]
fn completions_generate_for_bash() {
    let home = TempDir::new().unwrap();
    let out = stdout(&sitebook(home.path(), &["completions", "bash"]));
    assert!(out.contains("sitebook"));
}
