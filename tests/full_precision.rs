//! Engine outputs stay at full precision; rounding belongs to presentation

use std::fs;
use std::path::{Path, PathBuf};

fn rust_sources(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            rust_sources(&path, out);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
}

#[test]
fn test_engine_sources_never_round() {
    let crates = Path::new(env!("CARGO_MANIFEST_DIR")).join("crates");
    let mut sources = Vec::new();
    for entry in fs::read_dir(&crates).unwrap().flatten() {
        if entry.file_name().to_string_lossy().starts_with("statbench-") {
            rust_sources(&entry.path().join("src"), &mut sources);
        }
    }
    assert!(!sources.is_empty());

    let offenders: Vec<String> = sources
        .iter()
        .filter(|path| {
            fs::read_to_string(path)
                .map(|text| text.contains(".round()"))
                .unwrap_or(false)
        })
        .map(|path| path.display().to_string())
        .collect();
    assert!(offenders.is_empty(), "rounding in {offenders:?}");
}
