use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "limes"])
        .status()
        .expect("failed to invoke cargo check for limes CLI binary");

    assert!(status.success(), "cargo check --bin limes should succeed");
}

#[test]
fn inspect_reports_json_score() {
    let output = Command::new(env!("CARGO_BIN_EXE_limes"))
        .args([
            "inspect",
            "--cards",
            "0,0:7:0",
            "--workers",
            "0,0 1,1",
            "--variants",
            "profis",
            "--json",
        ])
        .output()
        .expect("failed to run limes inspect");

    assert!(output.status.success(), "limes inspect should succeed");
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("inspect prints json");
    assert_eq!(report["variants"]["profis"], true);
    assert_eq!(report["territories"].as_array().map(Vec::len), Some(2));
}

#[test]
fn inspect_rejects_detached_cards() {
    let output = Command::new(env!("CARGO_BIN_EXE_limes"))
        .args(["inspect", "--cards", "0,0:7:0 3,3:1:0"])
        .output()
        .expect("failed to run limes inspect");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Detached"), "unexpected stderr: {stderr}");
}
