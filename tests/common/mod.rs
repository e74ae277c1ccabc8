#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use auditor_bridge::ScanResult;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestEnv {
    _tmp: TempDir,
    pub base: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let base = tmp.path().join("bridge");
        fs::create_dir_all(&base).expect("create base dir");
        Self { _tmp: tmp, base }
    }

    pub fn request(&self, body: &str) -> PathBuf {
        let path = self.base.join("request.json");
        fs::write(&path, body).expect("write request");
        path
    }

    pub fn output(&self) -> PathBuf {
        self.base.join("result.json")
    }

    pub fn vendor_dir(&self) -> PathBuf {
        self.base.join("vendor").join("engine")
    }

    pub fn install_vendor(&self) -> PathBuf {
        let dir = self.vendor_dir();
        fs::create_dir_all(&dir).expect("create vendor dir");
        dir
    }

    pub fn files_in(&self, sub: &str) -> Vec<PathBuf> {
        match fs::read_dir(self.base.join(sub)) {
            Ok(entries) => entries.map(|e| e.expect("dir entry").path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("auditor-bridge");
        cmd.arg("--base-dir")
            .arg(&self.base)
            .env_remove("AUDITOR_LIVE")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn read_result(&self, path: &Path) -> ScanResult {
        let text = fs::read_to_string(path).expect("read result");
        serde_json::from_str(&text).expect("valid result json")
    }
}

pub fn parse_stdout(stdout: &[u8]) -> ScanResult {
    serde_json::from_slice(stdout).expect("stdout is a result document")
}
