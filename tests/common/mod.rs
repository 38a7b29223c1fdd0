#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Scratch layout: `watched/` with `a.txt` and `sub/`, plus `out/` for artifacts
pub struct Scenario {
    pub temp: TempDir,
    pub watched: PathBuf,
    pub output: PathBuf,
    pub log: PathBuf,
    pub config: PathBuf,
}

impl Scenario {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        // Notification backends report resolved paths (macOS tmp is a symlink).
        let base = temp.path().canonicalize().unwrap();
        let watched = base.join("watched");
        fs::create_dir_all(watched.join("sub")).unwrap();
        fs::write(watched.join("a.txt"), "a").unwrap();

        let output = base.join("out/listing.txt");
        let log = base.join("out/watcher.log");
        let config = base.join("config/path_watcher.toml");

        Self {
            temp,
            watched,
            output,
            log,
            config,
        }
    }

    /// Write a config file watching `roots`
    pub fn write_config(&self, roots: &[&Path], recursive: bool) {
        let paths: Vec<String> = roots
            .iter()
            .map(|root| format!("{:?}", root.to_string_lossy()))
            .collect();
        let content = format!(
            "[watch]\npaths = [{}]\nrecursive = {recursive}\n\n[output]\npath = {:?}\n\n[log]\npath = {:?}\nlevel = \"debug\"\n",
            paths.join(", "),
            self.output.to_string_lossy(),
            self.log.to_string_lossy(),
        );
        fs::create_dir_all(self.config.parent().unwrap()).unwrap();
        fs::write(&self.config, content).unwrap();
    }
}

/// Read the listing file as lines; `None` while it does not exist yet
pub fn read_listing(path: &Path) -> Option<Vec<String>> {
    let content = fs::read_to_string(path).ok()?;
    if content.is_empty() {
        return Some(Vec::new());
    }
    Some(content.split('\n').map(ToString::to_string).collect())
}

/// Poll `path` until its listing equals `expected` or five seconds pass
pub fn wait_for_listing(path: &Path, expected: &[&str]) -> Vec<String> {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let current = read_listing(path).unwrap_or_default();
        if current == expected || Instant::now() >= deadline {
            return current;
        }
        thread::sleep(Duration::from_millis(50));
    }
}
