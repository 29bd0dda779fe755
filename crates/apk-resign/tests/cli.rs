//! Runs the binary against a stub SDK
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const COPYING_SIGNER: &str = r#"#!/bin/sh
out=""
while [ "$#" -gt 1 ]; do
  if [ "$1" = "--out" ]; then
    out="$2"
    shift
  fi
  shift
done
cp "$1" "$out"
"#;

struct Env {
    temp: TempDir,
}

impl Env {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("home")).unwrap();
        std::fs::create_dir_all(temp.path().join("bin")).unwrap();
        std::fs::write(temp.path().join("app.apk"), b"PK\x03\x04").unwrap();
        Self { temp }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.temp.path().join(name)
    }

    fn sdk_with_signer(&self) -> PathBuf {
        let sdk = self.path("sdk");
        let version_dir = sdk.join("build-tools").join("34.0.0");
        std::fs::create_dir_all(&version_dir).unwrap();
        let signer = version_dir.join("apksigner");
        std::fs::write(&signer, COPYING_SIGNER).unwrap();
        std::fs::set_permissions(&signer, std::fs::Permissions::from_mode(0o755)).unwrap();
        sdk
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_apk-resign"));
        command
            .args(args)
            .arg("--config")
            .arg(self.path("profiles.json"))
            .env("HOME", self.path("home"))
            .env_remove("ANDROID_HOME")
            .env_remove("ANDROID_SDK_ROOT")
            .env_remove("APK_RESIGN_CONFIG")
            .env_remove("RUST_LOG");
        command
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().unwrap()
    }

    /// Run with a search path that holds no tools
    fn run_without_path_tools(&self, args: &[&str]) -> Output {
        self.command(args)
            .env("PATH", self.path("bin"))
            .output()
            .unwrap()
    }
}

fn str_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_resign_end_to_end() {
    let env = Env::new();
    let sdk = env.sdk_with_signer();
    let apk = env.path("app.apk");

    let out = env.run(&[
        "-q",
        "profile",
        "set",
        "release",
        "--keystore",
        "k.jks",
        "--alias",
        "a",
        "--password",
        "p",
    ]);
    assert!(out.status.success(), "{out:?}");

    let out = env.run(&[
        "resign",
        str_arg(&apk),
        "-p",
        "release",
        "--sdk",
        str_arg(&sdk),
        "--format",
        "json",
    ]);
    assert!(out.status.success(), "{out:?}");

    let events: Vec<serde_json::Value> = String::from_utf8(out.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let values: Vec<u64> = events
        .iter()
        .filter(|e| e["type"] == "progress")
        .map(|e| e["value"].as_u64().unwrap())
        .collect();
    assert_eq!(values, vec![10, 20, 30, 90]);
    let last = events.last().unwrap();
    assert_eq!(last["type"], "complete");
    assert!(env.path("app_resigned.apk").exists());

    // --sdk was remembered
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(env.path("profiles.json")).unwrap()).unwrap();
    assert_eq!(stored["sdk_path"], str_arg(&sdk));
}

#[test]
fn test_resign_with_incomplete_profile() {
    let env = Env::new();
    let sdk = env.sdk_with_signer();
    let apk = env.path("app.apk");

    let out = env.run(&["resign", str_arg(&apk), "--sdk", str_arg(&sdk)]);

    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("keystore path"), "{stderr}");
    assert!(!env.path("app_resigned.apk").exists());
}

#[test]
fn test_tools_reports_missing_signer() {
    let env = Env::new();
    let empty_sdk = env.path("empty-sdk");
    std::fs::create_dir_all(&empty_sdk).unwrap();

    let out = env.run_without_path_tools(&["tools", "--sdk", str_arg(&empty_sdk), "--format", "json"]);

    assert_eq!(out.status.code(), Some(3));
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert!(report["signer"].is_null());
    assert_eq!(report["missing"], serde_json::json!(["apksigner"]));
}

#[test]
fn test_profile_list_masks_passwords() {
    let env = Env::new();
    let out = env.run(&["-q", "profile", "set", "release", "--password", "hunter2"]);
    assert!(out.status.success(), "{out:?}");

    let out = env.run(&["profile", "list", "--format", "json"]);
    assert!(out.status.success(), "{out:?}");

    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(!stdout.contains("hunter2"));
    let profiles: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let names: Vec<_> = profiles
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["default", "release"]);
}
