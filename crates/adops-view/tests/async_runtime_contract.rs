// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::{Path, PathBuf};

fn collect_rs_files(root: &Path, out: &mut Vec<PathBuf>) {
    if let Ok(entries) = fs::read_dir(root) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                collect_rs_files(&path, out);
            } else if path.extension().and_then(|x| x.to_str()) == Some("rs") {
                out.push(path);
            }
        }
    }
}

#[test]
fn view_source_never_blocks_the_runtime() {
    let mut files = Vec::new();
    collect_rs_files(&PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src"), &mut files);
    assert!(!files.is_empty());
    for path in files {
        let text = fs::read_to_string(&path).expect("read view source file");
        for forbidden in ["std::thread::sleep", "block_on(", "std::sync::Mutex", "std::fs::"] {
            assert!(
                !text.contains(forbidden),
                "`{forbidden}` is forbidden in view source: {}",
                path.display()
            );
        }
    }
}

#[test]
fn view_crate_stays_below_the_command_line() {
    let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
    let cargo_toml = fs::read_to_string(manifest).expect("read Cargo.toml");
    for forbidden in ["adops-cli", "clap"] {
        assert!(
            !cargo_toml.contains(forbidden),
            "forbidden dependency in view crate: {forbidden}"
        );
    }
}
