use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "construction-disaster-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_sweep_writes_csv_report() {
    let exe = env!("CARGO_BIN_EXE_construction-disaster-tester");
    let output_path = temp_path("csv");
    let status = Command::new(exe)
        .args([
            "--seeds",
            "1..4",
            "--difficulties",
            "relaxing,challenging",
            "--heavy",
            "both",
            "--iterations",
            "20",
            "--report",
            "csv",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    let lines: Vec<&str> = content.lines().collect();
    assert!(lines[0].starts_with("seed,difficulty"));
    assert_eq!(lines.len(), 1 + 3 * 2 * 2);
}

#[test]
fn cli_json_report_lists_cases() {
    let exe = env!("CARGO_BIN_EXE_construction-disaster-tester");
    let output_path = temp_path("json");
    let output = Command::new(exe)
        .args([
            "--seeds",
            "42",
            "--difficulties",
            "normal",
            "--heavy",
            "disabled",
            "--iterations",
            "10",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Construction Disaster Tester"));

    let content = std::fs::read_to_string(output_path).expect("read output");
    let value: serde_json::Value = serde_json::from_str(&content).expect("valid json");
    assert_eq!(value[0]["seed"], 42);
    assert_eq!(value[0]["passed"], true);
    assert_eq!(value[0]["tally"]["explosions"], 0);
}

#[test]
fn cli_rejects_bad_config() {
    let exe = env!("CARGO_BIN_EXE_construction-disaster-tester");
    let config_path = temp_path("config");
    std::fs::write(&config_path, r#"{ "explosion_radius": { "min": 5.0, "max": 1.0 } }"#)
        .expect("write config");
    let output = Command::new(exe)
        .args(["--iterations", "1", "--config"])
        .arg(&config_path)
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid config"));
}

#[test]
fn cli_rejects_unknown_seed_token() {
    let exe = env!("CARGO_BIN_EXE_construction-disaster-tester");
    let output = Command::new(exe)
        .args(["--seeds", "banana", "--iterations", "1"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
}
