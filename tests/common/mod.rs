//! Shared test infrastructure for CLI integration tests.
#![allow(dead_code)]

use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Fake `futility` that checks the key files exist and writes `VBLOCK`
/// followed by the firmware body to the requested vblock path.
pub const FAKE_FUTILITY: &str = r#"
printf '%s\n' "$@" > "$(dirname "$0")/futility.args"
if [ "$1" = "version" ]; then
    echo "v0.0-fake"
    exit 0
fi
vblock=""; fv=""; keyblock=""; signprivate=""; kernelkey=""
while [ $# -gt 0 ]; do
    case "$1" in
        --vblock) vblock="$2"; shift 2 ;;
        --fv) fv="$2"; shift 2 ;;
        --keyblock) keyblock="$2"; shift 2 ;;
        --signprivate) signprivate="$2"; shift 2 ;;
        --kernelkey) kernelkey="$2"; shift 2 ;;
        *) shift ;;
    esac
done
for key in "$keyblock" "$signprivate" "$kernelkey"; do
    if [ ! -f "$key" ]; then
        echo "Error reading key $key" >&2
        exit 1
    fi
done
{ printf 'VBLOCK'; cat "$fv"; } > "$vblock"
"#;

pub struct Fixture {
    pub temp: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("create temp dir");
        for dir in ["tools", "keys", "out", "empty-path", "home"] {
            std::fs::create_dir_all(temp.path().join(dir)).expect("create fixture dir");
        }
        Fixture { temp }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.temp.path().join(rel)
    }

    pub fn tools_dir(&self) -> PathBuf {
        self.path("tools")
    }

    pub fn outdir(&self) -> PathBuf {
        self.path("out")
    }

    #[cfg(unix)]
    pub fn install_futility(&self, body: &str) {
        use std::os::unix::fs::PermissionsExt;
        let path = self.tools_dir().join("futility");
        std::fs::write(&path, format!("#!/bin/sh\n{body}")).expect("write futility");
        let mut perms = std::fs::metadata(&path).expect("stat").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("chmod futility");
    }

    pub fn write_keys(&self) {
        for name in [
            "firmware.keyblock",
            "firmware_data_key.vbprivk",
            "kernel_subkey.vbpubk",
        ] {
            std::fs::write(self.path("keys").join(name), name).expect("write key");
        }
    }

    /// Write `u-boot.bin` and `u-boot.dtb`, 512 bytes each.
    pub fn write_blobs(&self) -> Vec<u8> {
        let uboot = vec![0x11u8; 512];
        let dtb = vec![0x22u8; 512];
        std::fs::write(self.path("u-boot.bin"), &uboot).expect("write u-boot");
        std::fs::write(self.path("u-boot.dtb"), &dtb).expect("write dtb");
        let mut joined = uboot;
        joined.extend(dtb);
        joined
    }

    pub fn write_description(&self, props: serde_json::Value) -> PathBuf {
        let desc = json!({
            "entry": {"path": "/binman/rw-a/vblock", "props": props},
            "contents": [
                {"phandle": 1, "name": "u-boot", "file": "u-boot.bin"},
                {"phandle": 2, "name": "u-boot-dtb", "file": "u-boot.dtb"}
            ]
        });
        let path = self.path("vblock.json");
        std::fs::write(&path, serde_json::to_vec_pretty(&desc).expect("serialize"))
            .expect("write description");
        path
    }

    pub fn full_props(&self) -> serde_json::Value {
        json!({
            "content": [1, 2],
            "keydir": self.path("keys").display().to_string(),
            "keyblock": "firmware.keyblock",
            "signprivate": "firmware_data_key.vbprivk",
            "version": 1,
            "kernelkey": "kernel_subkey.vbpubk",
            "preamble-flags": 0
        })
    }

    /// Run the binary with a private `HOME`.
    pub fn run(&self, args: &[&str], path_var: Option<&Path>) -> Output {
        let mut command = Command::new(env!("CARGO_BIN_EXE_binman-vblock"));
        command
            .args(args)
            .env("HOME", self.path("home"))
            .env_remove("RUST_LOG");
        if let Some(path_var) = path_var {
            command.env("PATH", path_var);
        }
        command.output().expect("run binman-vblock")
    }

    pub fn scratch_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.outdir())
            .expect("read outdir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

pub fn report(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!(
            "parse report: {err}\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    })
}
