use assert_cmd::Command;
use predicates::str::contains;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};

struct Sandbox {
    dir: tempfile::TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("personalbest.ini"), "[spa]\ngt3=137512\n").unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config").join("config.toml")
    }

    fn source(&self) -> PathBuf {
        self.dir.path().join("personalbest.ini")
    }

    fn repo(&self) -> PathBuf {
        let repo = self.dir.path().join("site");
        if !repo.join(".git").exists() {
            std::fs::create_dir_all(&repo).unwrap();
            let status = std::process::Command::new("git")
                .args(["init", "-b", "main"])
                .current_dir(&repo)
                .output()
                .unwrap()
                .status;
            assert!(status.success());
        }
        repo
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("lap-updater").unwrap();
        cmd.env("LAP_UPDATER_CONFIG", self.config_path())
            .env("LAP_UPDATER_STATE_DIR", self.dir.path().join("state"))
            .env_remove("RUST_LOG");
        cmd
    }

    fn init(&self, probe_url: &str) {
        self.cmd()
            .args(["init", "--source"])
            .arg(self.source())
            .arg("--repo")
            .arg(self.repo())
            .args(["--probe-url", probe_url, "--probe-timeout-ms", "500"])
            .assert()
            .success()
            .stdout(contains("Config written to"));
    }
}

/// Answers one HTTP request with 204 on a random local port.
fn serve_204_once() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(b"HTTP/1.1 204 No Content\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        }
    });
    format!("http://{}/generate_204", addr)
}

fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/generate_204", addr)
}

#[test]
fn help_exits_zero() {
    Command::cargo_bin("lap-updater")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("publish"));
}

#[test]
fn no_args_shows_help() {
    Command::cargo_bin("lap-updater").unwrap().assert().failure();
}

#[test]
fn init_show_path_uses_override() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["init", "--show-path"])
        .assert()
        .success()
        .stdout(contains("config.toml"));
}

#[test]
fn init_requires_source_and_repo() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .arg("init")
        .assert()
        .failure()
        .stderr(contains("--source and --repo are required"));
}

#[test]
fn check_without_config_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .arg("check")
        .assert()
        .failure()
        .stderr(contains("config not found"));
}

#[test]
fn status_on_fresh_state() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(contains("No publish attempts yet"));
}

#[test]
fn status_json() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["status", "--json"])
        .assert()
        .success()
        .stdout(contains("\"last_outcome\": \"none\""));
}

#[test]
fn check_offline_stops_before_copy() {
    let sandbox = Sandbox::new();
    sandbox.init(&closed_port_url());

    sandbox
        .cmd()
        .arg("check")
        .assert()
        .failure()
        .stderr(contains("no internet connection"));
    assert!(!sandbox.repo().join("data/personalbest.ini").exists());
}

#[test]
fn publish_without_detected_changes_is_refused() {
    let sandbox = Sandbox::new();
    sandbox.init(&serve_204_once());

    sandbox
        .cmd()
        .arg("publish")
        .assert()
        .failure()
        .stderr(contains("no changes waiting to be published"));
}

#[test]
fn prefs_set_then_show() {
    let sandbox = Sandbox::new();
    let site_config = sandbox.path().join("site/src/data/config.json");
    std::fs::create_dir_all(site_config.parent().unwrap()).unwrap();
    std::fs::write(&site_config, r#"{ "driverProfile": { "name": "Old" }, "theme": "dark" }"#).unwrap();
    sandbox.init(&closed_port_url());

    sandbox
        .cmd()
        .args(["prefs", "set", "--driver-name", "  Sam  ", "--featured-lap-show", "true"])
        .assert()
        .success()
        .stdout(contains("Preference saved to"));

    sandbox
        .cmd()
        .args(["prefs", "show"])
        .assert()
        .success()
        .stdout(contains("Sam"));

    let saved = std::fs::read_to_string(&site_config).unwrap();
    assert!(saved.contains("\"theme\": \"dark\""));
    assert!(saved.contains("\"show\": true"));
}

#[test]
fn prefs_with_explicit_repo_needs_no_config() {
    let sandbox = Sandbox::new();
    let other = sandbox.path().join("other-site");
    let site_config = other.join("src/data/config.json");
    std::fs::create_dir_all(site_config.parent().unwrap()).unwrap();
    std::fs::write(&site_config, r#"{ "meta": { "title": "Laps" } }"#).unwrap();

    sandbox
        .cmd()
        .args(["prefs", "--repo"])
        .arg(&other)
        .args(["show", "--json"])
        .assert()
        .success()
        .stdout(contains("\"title\": \"Laps\""));
}
