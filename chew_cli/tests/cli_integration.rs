use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use assert_cmd::Command;
use tempfile::tempdir;

const UNSET_KEY: &str = "CHEW_CLI_TEST_KEY_NEVER_SET";

// Estimator pointed at a closed local port with a key variable nobody sets,
// so no test ever reaches the network.
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = format!(
        r#"
[estimator]
endpoint = "http://127.0.0.1:9/v1beta"
model = "test-model"
api_key_env = "{UNSET_KEY}"
timeout_ms = 2000

[camera]
prefer_rear = false
"#
    );
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn write_jpeg(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("meal.jpg");
    fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xFF, 0xD9]).unwrap();
    path
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["pace", "--target-chews", "3"], 0, "bite 1 complete", "stdout")]
#[case(&["pace"], 2, "required", "stderr")]
#[case(&["pace", "--target-chews", "3", "--cycles", "0"], 2, "cycles", "stderr")]
#[case(&["pace", "--target-chews", "3", "--cycles", "10001"], 2, "cycles", "stderr")]
#[case(&["pace", "--target-chews", "3", "--cycles", "4294967295"], 2, "cycles", "stderr")]
#[case(&["pace", "--target-chews", "1", "--cycles", "200"], 0, "bite 200 complete", "stdout")]
#[case(&["self-check"], 0, "NOT set", "stdout")]
#[case(&["analyze", "--image", "/definitely/not/here.jpg"], 1, "meal photo", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("chew_cli").unwrap();
    cmd.env_remove(UNSET_KEY);
    // Always include a valid config to avoid relying on default path
    cmd.arg("--config").arg(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
#[case("[estimator]\ntimeout_ms = 0\n", "timeout_ms")]
#[case("[estimator]\nendpoint = \"ftp://x\"\n", "endpoint")]
#[case("[logging]\nlevel = \"loud\"\n", "logging.level")]
#[case("this is = = not toml", "invalid configuration")]
fn invalid_config_exits_with_three(#[case] toml: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, toml).unwrap();

    let mut cmd = Command::cargo_bin("chew_cli").unwrap();
    cmd.arg("--config").arg(&path).arg("self-check");
    cmd.assert()
        .code(3)
        .stderr(predicate::str::contains(needle));
}

#[test]
fn explicit_missing_config_is_a_config_error() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("chew_cli").unwrap();
    cmd.arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg("self-check");
    cmd.assert().code(3);
}

#[test]
fn json_errors_are_structured() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[estimator]\nmodel = \"\"\n").unwrap();

    let mut cmd = Command::cargo_bin("chew_cli").unwrap();
    cmd.arg("--json").arg("--config").arg(&path).arg("self-check");
    let out = cmd.assert().code(3).get_output().stderr.clone();
    let last = String::from_utf8(out)
        .unwrap()
        .lines()
        .rev()
        .find(|l| l.contains("\"reason\""))
        .map(str::to_owned)
        .unwrap();
    let v: serde_json::Value = serde_json::from_str(&last).unwrap();
    assert_eq!(v["reason"], "InvalidConfig");
}

#[test]
fn analyze_without_credentials_prints_fallback() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let image = write_jpeg(&dir);

    let mut cmd = Command::cargo_bin("chew_cli").unwrap();
    cmd.env_remove(UNSET_KEY)
        .arg("--json")
        .arg("--config")
        .arg(&cfg)
        .arg("analyze")
        .arg("--image")
        .arg(&image);
    let out = cmd.assert().success().get_output().stdout.clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["analysis"]["foodName"], "AI 连接中断");
    assert_eq!(v["analysis"]["calories"], 0);
    assert_eq!(v["analysis"]["textureLevel"], "Medium");
    assert_eq!(v["analysis"]["recommendedChews"], 30);
    assert_eq!(v["degradation"]["kind"], "missingCredentials");
    assert_eq!(v["degradation"]["env"], UNSET_KEY);
}

// Commands queued behind the demo countdown run once it finishes; the loop
// exits when stdin is closed and nothing is pending.
#[test]
fn session_without_camera_runs_demo_to_summary() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("chew_cli").unwrap();
    cmd.arg("--json")
        .arg("--config")
        .arg(&cfg)
        .arg("session")
        .write_stdin("start\ngo\nend\n");
    let out = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(out).unwrap();
    let events: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    let views: Vec<&str> = events
        .iter()
        .filter(|e| e["event"] == "viewChanged")
        .filter_map(|e| e["view"].as_str())
        .collect();
    assert_eq!(
        views,
        vec!["CameraAnalysis", "MealPrep", "EatingSession", "Summary"]
    );

    let ready = events
        .iter()
        .find(|e| e["event"] == "analysisReady")
        .unwrap();
    assert_eq!(ready["analysis"]["calories"], 850);
    assert_eq!(ready["degradation"]["kind"], "cameraUnavailable");

    let ended = events
        .iter()
        .find(|e| e["event"] == "sessionEnded")
        .unwrap();
    assert_eq!(ended["meal"]["totalBites"], 0);
    assert_eq!(ended["meal"]["averageChewsPerBite"], 45);
}

#[test]
fn session_with_image_analyzes_the_frame() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let image = write_jpeg(&dir);

    let mut cmd = Command::cargo_bin("chew_cli").unwrap();
    cmd.env_remove(UNSET_KEY)
        .arg("--json")
        .arg("--config")
        .arg(&cfg)
        .arg("session")
        .arg("--image")
        .arg(&image)
        .write_stdin("start\nsnap\ngo\nend\n");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"missingCredentials\""))
        .stdout(predicate::str::contains("\"sessionEnded\""));
}

#[test]
fn home_jumps_the_queue_while_busy() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("chew_cli").unwrap();
    cmd.arg("--json")
        .arg("--config")
        .arg(&cfg)
        .arg("session")
        .write_stdin("start\ngo\nhome\n");
    let out = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("\"Dashboard\""));
    assert!(!text.contains("analysisReady"));
}
