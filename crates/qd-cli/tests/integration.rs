#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// A sandbox with its own HOME, an empty PATH directory, and a config file
/// that points the tool lookup inside the sandbox.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("bin")).unwrap();
        std::fs::create_dir_all(dir.path().join("home")).unwrap();
        let sandbox = Self { dir };
        sandbox.write_config("");
        sandbox
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn tool_path(&self) -> PathBuf {
        self.path().join("opt/quarkdown")
    }

    fn config_path(&self) -> PathBuf {
        self.path().join("config.yaml")
    }

    fn write_config(&self, notify_section: &str) {
        let yaml = format!(
            "tool:\n  known_paths:\n    - {}\ninstall:\n  brew_known_paths: []\n{notify_section}",
            self.tool_path().display()
        );
        std::fs::write(self.config_path(), yaml).unwrap();
    }

    fn command(&self, bin: &str) -> Command {
        let mut cmd = Command::cargo_bin(bin).unwrap();
        cmd.current_dir(self.path())
            .env("QD_CONFIG", self.config_path())
            .env("HOME", self.path().join("home"))
            .env("PATH", self.path().join("bin"))
            .env_remove("RUST_LOG");
        cmd
    }

    fn qd(&self) -> Command {
        self.command("qd")
    }

    fn notify(&self) -> Command {
        self.command("codex-notify")
    }

    fn doc(&self, name: &str) -> PathBuf {
        let path = self.path().join(name);
        std::fs::write(&path, ".doctype {paged}\n").unwrap();
        path
    }

    /// Fake compiler that records its arguments, one per line.
    #[cfg(unix)]
    fn install_fake_tool(&self, exit_code: i32) -> PathBuf {
        let record = self.path().join("tool-args.txt");
        let body = format!(
            "if [ \"$1\" = \"--version\" ]; then echo 'Quarkdown 1.6.0'; exit 0; fi\n\
             printf '%s\\n' \"$@\" > '{}'\n\
             exit {exit_code}",
            record.display()
        );
        write_script(&self.tool_path(), &body);
        record
    }
}

#[cfg(unix)]
fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// qd usage
// ---------------------------------------------------------------------------

#[test]
fn no_command_prints_usage_and_exits_1() {
    let sb = Sandbox::new();
    sb.qd()
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("compile"));
}

#[test]
fn unknown_command_prints_usage_and_exits_1() {
    let sb = Sandbox::new();
    sb.qd()
        .arg("frobnicate")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn compile_without_file_exits_1() {
    let sb = Sandbox::new();
    sb.qd()
        .arg("compile")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage:"));
}

// ---------------------------------------------------------------------------
// qd status
// ---------------------------------------------------------------------------

#[test]
fn status_without_tool_exits_1() {
    let sb = Sandbox::new();
    sb.qd()
        .arg("status")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[X] quarkdown not found"))
        .stdout(predicate::str::contains("qd install"));
}

#[test]
fn status_twice_agrees() {
    let sb = Sandbox::new();
    let first = sb.qd().arg("status").output().unwrap();
    let second = sb.qd().arg("status").output().unwrap();
    assert_eq!(first.status.code(), second.status.code());
    assert_eq!(first.stdout, second.stdout);
}

#[cfg(unix)]
#[test]
fn status_with_tool_reports_version_and_ignores_runtime() {
    let sb = Sandbox::new();
    sb.install_fake_tool(0);
    sb.qd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] quarkdown found"))
        .stdout(predicate::str::contains("Version: Quarkdown 1.6.0"))
        .stdout(predicate::str::contains("Warning: java not found"));
}

#[cfg(unix)]
#[test]
fn status_json_is_machine_readable() {
    let sb = Sandbox::new();
    sb.install_fake_tool(0);
    let output = sb.qd().args(["status", "--json"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["tool"]["tool"], "quarkdown");
    assert_eq!(value["tool"]["version"], "Quarkdown 1.6.0");
    assert!(value["runtime"]["path"].is_null());
}

#[test]
fn missing_explicit_config_fails() {
    let sb = Sandbox::new();
    sb.qd()
        .args(["status", "--config"])
        .arg(sb.path().join("nope.yaml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config file not found"));
}

// ---------------------------------------------------------------------------
// qd compile / pdf / preview
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn compile_missing_file_fails_without_running_tool() {
    let sb = Sandbox::new();
    let record = sb.install_fake_tool(0);
    sb.qd()
        .args(["compile", "missing.qd"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("file not found"));
    assert!(!record.exists());
}

#[cfg(unix)]
#[test]
fn compile_passes_arguments_with_default_output_dir() {
    let sb = Sandbox::new();
    let record = sb.install_fake_tool(0);
    let doc = sb.doc("main.qd");

    sb.qd()
        .args(["compile", "main.qd"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Output saved to: ./output"));

    let args = read_lines(&record);
    let canonical = std::fs::canonicalize(&doc).unwrap();
    assert_eq!(
        args,
        vec![
            "c".to_string(),
            canonical.display().to_string(),
            "-o".to_string(),
            "./output".to_string()
        ]
    );
}

#[cfg(unix)]
#[test]
fn compile_wrong_extension_warns_and_continues() {
    let sb = Sandbox::new();
    let record = sb.install_fake_tool(0);
    sb.doc("notes.md");

    sb.qd()
        .args(["compile", "notes.md", "dist"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Warning: Expected .qd file"));
    assert_eq!(read_lines(&record)[3], "dist");
}

#[cfg(unix)]
#[test]
fn compile_tool_failure_exits_1() {
    let sb = Sandbox::new();
    sb.install_fake_tool(3);
    sb.doc("main.qd");

    sb.qd()
        .args(["compile", "main.qd"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("exited with status 3"));
}

#[test]
fn compile_declined_install_exits_1() {
    let sb = Sandbox::new();
    sb.doc("main.qd");

    sb.qd()
        .args(["compile", "main.qd"])
        .write_stdin("n\n")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Install now? [Y/n]"))
        .stderr(predicate::str::contains("not installed"));
}

#[cfg(unix)]
#[test]
fn pdf_adds_pdf_flag() {
    let sb = Sandbox::new();
    let record = sb.install_fake_tool(0);
    sb.doc("main.qd");

    sb.qd().args(["pdf", "main.qd"]).assert().success();

    let args = read_lines(&record);
    assert_eq!(args[2], "--pdf");
    assert_eq!(args[4], "./output");
}

#[cfg(unix)]
#[test]
fn pdf_failure_prints_puppeteer_hint() {
    let sb = Sandbox::new();
    sb.install_fake_tool(1);
    sb.doc("main.qd");

    sb.qd()
        .args(["pdf", "main.qd"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("npm install -g puppeteer"));
}

#[cfg(unix)]
#[test]
fn preview_runs_watch_mode() {
    let sb = Sandbox::new();
    let record = sb.install_fake_tool(0);
    sb.doc("main.qd");

    sb.qd().args(["preview", "main.qd"]).assert().success();

    let args = read_lines(&record);
    assert_eq!(&args[2..], &["-p".to_string(), "-w".to_string()]);
}

#[cfg(unix)]
#[test]
fn install_when_present_is_a_no_op() {
    let sb = Sandbox::new();
    sb.install_fake_tool(0);
    sb.qd()
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains("already installed"));
}

#[cfg(target_os = "linux")]
#[test]
fn install_skips_homebrew_quietly_when_brew_is_missing() {
    // No brew anywhere and no `sh` on PATH, so nothing is actually run.
    let sb = Sandbox::new();
    sb.qd()
        .arg("install")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Installing via Homebrew").not())
        .stdout(predicate::str::contains("Installing via install script"))
        .stderr(predicate::str::contains("Homebrew: brew not found"))
        .stderr(predicate::str::contains("Manual installation"));
}

// ---------------------------------------------------------------------------
// qd create
// ---------------------------------------------------------------------------

#[test]
fn create_scaffolds_project() {
    let sb = Sandbox::new();
    sb.qd()
        .args(["create", "my_report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project created"));

    let project = sb.path().join("my_report");
    assert!(project.join("images").is_dir());
    assert!(project.join("code").is_dir());
    assert!(project.join("diagrams").is_dir());
    let main = std::fs::read_to_string(project.join("main.qd")).unwrap();
    assert!(main.contains(".doctype {paged}"));
    let setup = std::fs::read_to_string(project.join("setup.qd")).unwrap();
    assert!(setup.contains(".docname {My Report}"));
}

#[test]
fn create_with_doc_type() {
    let sb = Sandbox::new();
    sb.qd().args(["create", "deck", "slides"]).assert().success();
    let main = std::fs::read_to_string(sb.path().join("deck/main.qd")).unwrap();
    assert!(main.contains(".doctype {slides}"));
}

#[test]
fn create_existing_directory_fails() {
    let sb = Sandbox::new();
    std::fs::create_dir(sb.path().join("taken")).unwrap();
    sb.qd()
        .args(["create", "taken"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn create_unknown_doc_type_exits_1() {
    let sb = Sandbox::new();
    sb.qd()
        .args(["create", "book", "novel"])
        .assert()
        .code(1);
    assert!(!sb.path().join("book").exists());
}

// ---------------------------------------------------------------------------
// codex-notify
// ---------------------------------------------------------------------------

#[test]
fn notify_without_payload_prints_usage() {
    let sb = Sandbox::new();
    sb.notify()
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn notify_malformed_payload_exits_1() {
    let sb = Sandbox::new();
    sb.notify()
        .arg("{not json")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("not sending").not());
}

#[test]
fn notify_unknown_kind_is_suppressed() {
    let sb = Sandbox::new();
    sb.notify()
        .arg(r#"{"type": "unknown-kind", "thread-id": "t"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "not sending a push notification for: unknown-kind",
        ));
}

#[test]
fn notify_non_string_kind_is_suppressed() {
    let sb = Sandbox::new();
    sb.notify()
        .arg(r#"{"type": 123}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "not sending a push notification for: 123",
        ));
}

#[test]
fn notify_suppressed_event_ignores_broken_default_config() {
    let sb = Sandbox::new();
    let config_dir = sb.path().join("home/.config/qd-tools");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.yaml"), "tool: [oops\n").unwrap();

    sb.notify()
        .env_remove("QD_CONFIG")
        .arg(r#"{"type": "unknown-kind"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "not sending a push notification for: unknown-kind",
        ));
}

#[test]
fn notify_parse_error_is_reported_once() {
    let sb = Sandbox::new();
    let output = sb.notify().arg("{not json").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("invalid notification payload").count(), 1);
    assert_eq!(stderr.matches("key must be a string").count(), 1);
}

#[test]
fn notify_missing_notifier_exits_1() {
    let sb = Sandbox::new();
    sb.write_config(&format!(
        "notify:\n  notifier: {}\n  sound_script: null\n",
        sb.path().join("bin/no-such-notifier").display()
    ));
    sb.notify()
        .arg(r#"{"type": "agent-turn-complete"}"#)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[cfg(unix)]
#[test]
fn notify_turn_complete_sends_notification_and_sound_cue() {
    let sb = Sandbox::new();
    let notifier_record = sb.path().join("notifier-args.txt");
    let sound_record = sb.path().join("sound-args.txt");
    let notifier = sb.path().join("hooks/terminal-notifier");
    let sound = sb.path().join("hooks/play-sound.sh");
    write_script(
        &notifier,
        &format!("printf '%s\\n' \"$@\" > '{}'", notifier_record.display()),
    );
    write_script(
        &sound,
        &format!("printf '%s\\n' \"$1\" > '{}'", sound_record.display()),
    );
    sb.write_config(&format!(
        "notify:\n  notifier: {}\n  sound_script: {}\n",
        notifier.display(),
        sound.display()
    ));

    sb.notify()
        .arg(
            r#"{
                "type": "agent-turn-complete",
                "thread-id": "abc",
                "cwd": "/tmp/proj",
                "input-messages": ["fix the bug"],
                "last-assistant-message": "Build passed"
            }"#,
        )
        .assert()
        .success();

    assert_eq!(
        read_lines(&notifier_record),
        vec![
            "-title",
            "Codex: Build passedfix the bug",
            "-message",
            "fix the bug",
            "-group",
            "codex-abc",
            "-ignoreDnD",
            "-activate",
            "com.googlecode.iterm2",
        ]
    );

    // The sound cue is detached; give it a moment to land.
    let deadline = Instant::now() + Duration::from_secs(5);
    while !sound_record.exists() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(50));
    }
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(read_lines(&sound_record), vec!["/tmp/proj"]);
}

#[cfg(unix)]
#[test]
fn notify_broken_sound_cue_does_not_fail() {
    let sb = Sandbox::new();
    let notifier = sb.path().join("hooks/terminal-notifier");
    write_script(&notifier, "exit 0");
    sb.write_config(&format!(
        "notify:\n  notifier: {}\n  sound_script: {}\n",
        notifier.display(),
        sb.path().join("hooks/missing-sound.sh").display()
    ));

    sb.notify()
        .arg(r#"{"type": "agent-turn-complete", "cwd": "/tmp/proj"}"#)
        .assert()
        .success();
}

#[cfg(unix)]
#[test]
fn notify_failing_notifier_exits_non_zero() {
    let sb = Sandbox::new();
    let notifier = sb.path().join("hooks/terminal-notifier");
    write_script(&notifier, "exit 2");
    sb.write_config(&format!(
        "notify:\n  notifier: {}\n  sound_script: null\n",
        notifier.display()
    ));

    sb.notify()
        .arg(r#"{"type": "agent-turn-complete"}"#)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("exited with status 2"));
}
