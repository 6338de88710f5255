#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use file_logger::{LoggerConfig, FILE_EXTENSION};
use tempfile::TempDir;

pub struct TestContext {
    pub dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Cannot create temporary log directory."),
        }
    }

    pub fn config(&self,
                  level: &str,
                  max_file_size: u64
    ) -> LoggerConfig {
        LoggerConfig::new(level, self.dir.path(), max_file_size)
            .unwrap()
            .with_idle_interval(Duration::from_millis(20))
    }

    pub fn log_files(&self) -> Vec<PathBuf> {
        log_files_in(self.dir.path())
    }

    pub fn lines(&self) -> Vec<String> {
        lines_in(self.dir.path())
    }
}

/// Log files ordered by name, which is also creation order.
pub fn log_files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == FILE_EXTENSION))
        .collect();
    files.sort();
    files
}

pub fn lines_in(dir: &Path) -> Vec<String> {
    log_files_in(dir)
        .iter()
        .flat_map(|path| {
            fs::read_to_string(path)
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

#[derive(Debug, PartialEq)]
pub struct ParsedLine {
    pub timestamp: String,
    pub level: String,
    pub file: String,
    pub function: String,
    pub line: u32,
    pub message: String,
}

/// Splits `[ts] [LEVEL] [file: function: line] message`.
pub fn parse_line(raw: &str) -> ParsedLine {
    let mut parts = raw.splitn(4, "] ");
    let timestamp = parts.next().unwrap().strip_prefix('[').unwrap().to_string();
    let level = parts.next().unwrap().strip_prefix('[').unwrap().to_string();
    let site = parts.next().unwrap().strip_prefix('[').unwrap();
    let message = parts.next().unwrap_or("").to_string();

    let mut site_parts = site.splitn(3, ": ");
    ParsedLine {
        timestamp,
        level,
        file: site_parts.next().unwrap().to_string(),
        function: site_parts.next().unwrap().to_string(),
        line: site_parts.next().unwrap().parse().unwrap(),
        message,
    }
}
