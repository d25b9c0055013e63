use std::process::Command;

#[test]
fn headless_run_prints_the_final_frame() {
    let output = Command::new(env!("CARGO_BIN_EXE_bubble-arena"))
        .current_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/../.."))
        .args(["--ticks", "240", "--render-every", "0", "--players", "4"])
        .output()
        .expect("failed to run bubble-arena");

    assert!(output.status.success(), "bubble-arena should exit cleanly");
    let stdout = String::from_utf8(output.stdout).expect("utf8 output");
    assert!(stdout.starts_with("bubble-arena frame 240"));
    let grid: Vec<&str> = stdout.lines().skip(1).take(15).collect();
    assert_eq!(grid.len(), 15);
    assert!(grid.iter().all(|row| row.chars().count() == 15));
    assert!(grid[1].contains('#'), "posts from the bundled level are drawn");
}

#[test]
fn unknown_level_fails_with_context() {
    let output = Command::new(env!("CARGO_BIN_EXE_bubble-arena"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["--level", "nowhere", "--ticks", "1"])
        .output()
        .expect("failed to run bubble-arena");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to prepare the arena"));
}
