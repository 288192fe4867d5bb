use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

/// Entry point that prints each argument on its own line, bracketed.
const ECHO_ARGS: &str = "echo started\nfor a in \"$@\"; do echo \"[$a]\"; done\n";

fn invoke(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("invoke").unwrap();
    cmd.arg("--root").arg(root).arg("--no-pull").arg("--interpreter").arg("sh");
    cmd
}

fn wait_for(path: &Path, needle: &str) -> String {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let text = fs::read_to_string(path).unwrap_or_default();
        if text.contains(needle) || Instant::now() > deadline {
            return text;
        }
        thread::sleep(Duration::from_millis(50));
    }
}

#[test]
fn missing_arguments_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    invoke(dir.path())
        .arg("train.sh")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("required"));
}

#[test]
fn missing_config_launches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("train.sh"), ECHO_ARGS).unwrap();

    invoke(dir.path())
        .arg("train.sh")
        .arg(dir.path().join("absent.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));

    assert!(!dir.path().join("logs").exists());
    assert!(!dir.path().join("train.pid").exists());
}

#[test]
fn missing_txt_config_reports_not_found_first() {
    let dir = tempfile::tempdir().unwrap();
    invoke(dir.path())
        .arg("train.sh")
        .arg(dir.path().join("absent.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn wrong_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("run.txt");
    fs::write(&cfg, "a: 1\n").unwrap();

    invoke(dir.path())
        .arg("train.sh")
        .arg(&cfg)
        .assert()
        .failure()
        .stderr(predicate::str::contains("must end in .yaml or .yml"));
    assert!(!dir.path().join("logs").exists());
}

#[test]
fn missing_entry_point_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("run.yaml");
    fs::write(&cfg, "lr: 0.1\n").unwrap();

    invoke(dir.path())
        .arg("ghost.sh")
        .arg(&cfg)
        .assert()
        .failure()
        .stderr(predicate::str::contains("entry point not found"));
    assert!(!dir.path().join("ghost.pid").exists());
}

#[test]
fn dry_run_prints_arguments_only() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("run.yaml");
    fs::write(
        &cfg,
        "d: A\nt: B\nroot_dir: /r\nlog_dir: /l\nk-fold-id: 2\nscratch: true\nx: 5\n",
    )
    .unwrap();

    let out = invoke(dir.path())
        .arg("--dry-run")
        .arg("foo.sh")
        .arg(&cfg)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(
        json["args"],
        serde_json::json!(["--log", "/l/A_2_B/foo/k-fold-2", "/r/k-fold-2", "--scratch", "--x", "5"])
    );
    assert_eq!(json["root_path"], "/r/k-fold-2");
    assert!(!dir.path().join("logs").exists());
    assert!(!dir.path().join("foo.pid").exists());
}

#[test]
fn launch_records_pid_and_writes_log() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("train.sh"), ECHO_ARGS).unwrap();
    let cfg = root.join("fold_a.yaml");
    fs::write(&cfg, "log_dir: /l\nname: two words\nk: 3\n").unwrap();

    invoke(root)
        .arg("train.sh")
        .arg(&cfg)
        .assert()
        .success()
        .stdout(predicate::str::contains("launched train.sh"))
        .stdout(predicate::str::contains("tail -f"));

    let pid: u32 = fs::read_to_string(root.join("train.pid"))
        .unwrap()
        .trim()
        .parse()
        .unwrap();
    assert!(pid > 0);

    let latest = root.join("logs").join("latest.log");
    let target = fs::read_link(&latest).unwrap();
    let name = target.to_string_lossy();
    assert!(name.starts_with("train_") && name.ends_with("_fold_a.log"), "{name}");

    let log = wait_for(&latest, "[3]");
    assert!(
        log.contains("[--log]\n[/l/UnknownD_2_UnknownT/train/k-fold-0]\n[--name]\n[two words]\n[-k]\n[3]\n"),
        "{log}"
    );
}

#[test]
fn relaunch_overwrites_pid_and_keeps_old_logs() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("train.sh"), ECHO_ARGS).unwrap();
    let first_cfg = root.join("a.yaml");
    let second_cfg = root.join("b.yaml");
    fs::write(&first_cfg, "x: 1\n").unwrap();
    fs::write(&second_cfg, "x: 2\n").unwrap();

    invoke(root).arg("train.sh").arg(&first_cfg).assert().success();
    let first_pid = fs::read_to_string(root.join("train.pid")).unwrap();
    invoke(root).arg("train.sh").arg(&second_cfg).assert().success();
    let second_pid = fs::read_to_string(root.join("train.pid")).unwrap();

    assert_ne!(first_pid, second_pid);
    let logs: Vec<_> = fs::read_dir(root.join("logs"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n != "latest.log")
        .collect();
    assert_eq!(logs.len(), 2, "{logs:?}");
    let latest = fs::read_link(root.join("logs").join("latest.log")).unwrap();
    assert!(latest.to_string_lossy().ends_with("_b.log"));
}

#[test]
fn status_and_stop_use_the_registry() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("sleeper.sh"), "echo up\nexec sleep 30\n").unwrap();
    let cfg = root.join("run.yaml");
    fs::write(&cfg, "epochs: 1\n").unwrap();

    invoke(root).arg("sleeper.sh").arg(&cfg).assert().success();
    wait_for(&root.join("logs").join("latest.log"), "up");

    let mut status = Command::cargo_bin("invoke").unwrap();
    status
        .arg("status")
        .arg("sleeper.sh")
        .arg("--root")
        .arg(root)
        .assert()
        .success()
        .stdout(predicate::str::contains("running (pid"));

    let mut stop = Command::cargo_bin("invoke").unwrap();
    stop.arg("stop")
        .arg("sleeper")
        .arg("--root")
        .arg(root)
        .assert()
        .success()
        .stdout(predicate::str::contains("sent SIGTERM"));

    assert!(root.join("sleeper.pid").exists());
}

#[test]
fn status_without_launch_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut status = Command::cargo_bin("invoke").unwrap();
    status
        .arg("status")
        .arg("nothing")
        .arg("--root")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no process registered"));
}
