// Minimal integration test that drives the compiled binary through a PTY.
// This exercises the real event loop and crossterm input handling across
// the main boundaries without relying on internal modules.
//
// Notes:
// - Requires a TTY; uses expectrl which allocates a pseudo terminal.
// - Marked Unix-only and ignored by default to avoid CI/platform issues.
// - Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_completes_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("keysprint");
    let cmd = format!("{} -s 1 -b common", bin.display());

    let mut p = spawn(cmd)?;

    // Give the app a moment to initialize the terminal/alternate screen
    std::thread::sleep(Duration::from_millis(200));

    // Start the session and type a little
    p.send("\r")?;
    p.send("the ")?;

    // Let the one second timer run out so the results card shows
    std::thread::sleep(Duration::from_millis(1500));

    // Send ESC to exit from the results card
    p.send("\x1b")?;

    p.expect(Eof)?;
    Ok(())
}

#[test]
fn clear_best_exits_without_a_tty() {
    let home = tempfile::tempdir().unwrap();
    assert_cmd::Command::cargo_bin("keysprint")
        .unwrap()
        .env("HOME", home.path())
        .arg("--clear-best")
        .assert()
        .success()
        .stdout("high score reset\n");
}
