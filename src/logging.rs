use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use serde::{Serialize, Deserialize};
use chrono::Local;

/// Maximum size per log file before rotation (~5 MB)
const MAX_LOG_FILE_SIZE: u64 = 5 * 1024 * 1024;
/// Number of rotated log files to keep
const MAX_LOG_FILES: usize = 5;
/// In-memory log buffer cap
const MAX_MEMORY_LOGS: usize = 2000;

const LOG_FILE_STEM: &str = "genre-diversity";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}

pub struct LogState {
    pub logs: Mutex<Vec<LogEntry>>,
    pub log_dir: Mutex<Option<PathBuf>>,
    pub debug_mode: AtomicBool,
    pub echo_stderr: AtomicBool,
}

impl Default for LogState {
    fn default() -> Self {
        Self::new()
    }
}

impl LogState {
    pub fn new() -> Self {
        Self {
            logs: Mutex::new(Vec::new()),
            log_dir: Mutex::new(None),
            debug_mode: AtomicBool::new(false),
            echo_stderr: AtomicBool::new(true),
        }
    }

    /// Default persistent log directory: `<data_local_dir>/genre-diversity/logs`.
    pub fn default_log_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("genre-diversity")
            .join("logs")
    }

    /// Initialise the persistent log directory.
    pub fn init_log_dir(&self, log_dir: &Path) {
        if let Err(e) = fs::create_dir_all(log_dir) {
            eprintln!("[LogState] Failed to create log directory {:?}: {}", log_dir, e);
            return;
        }

        if let Ok(mut dir) = self.log_dir.lock() {
            *dir = Some(log_dir.to_path_buf());
        }

        // Write a startup marker
        self.write_to_file("INFO", &format!(
            "=== genre-diversity run started at {} ===",
            Local::now().format("%Y-%m-%d %H:%M:%S %Z")
        ));
    }

    /// The current (active) log file path.
    pub fn current_log_path(&self) -> Option<PathBuf> {
        self.log_dir
            .lock()
            .ok()?
            .as_ref()
            .map(|d| d.join(format!("{}.log", LOG_FILE_STEM)))
    }

    /// Returns the log directory path.
    pub fn get_log_dir(&self) -> Option<PathBuf> {
        self.log_dir.lock().ok()?.clone()
    }

    /// Rotate log files: genre-diversity.log → genre-diversity.1.log → …
    fn rotate_if_needed(&self) {
        let Some(current) = self.current_log_path() else { return };
        let file_size = fs::metadata(&current).map(|m| m.len()).unwrap_or(0);
        if file_size < MAX_LOG_FILE_SIZE {
            return;
        }

        let Some(dir) = self.get_log_dir() else { return };

        // Shift existing rotated files
        for i in (1..MAX_LOG_FILES).rev() {
            let from = dir.join(format!("{}.{}.log", LOG_FILE_STEM, i));
            let to = dir.join(format!("{}.{}.log", LOG_FILE_STEM, i + 1));
            let _ = fs::rename(&from, &to);
        }
        // Rotate current → .1
        let _ = fs::rename(&current, dir.join(format!("{}.1.log", LOG_FILE_STEM)));
    }

    /// Append a formatted line to the persistent log file.
    fn write_to_file(&self, level: &str, message: &str) {
        self.rotate_if_needed();
        let Some(path) = self.current_log_path() else { return };

        let line = format!(
            "[{}] [{}] {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            level,
            message
        );

        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) {
            let _ = file.write_all(line.as_bytes());
        }
    }

    /// Core logging method: writes to memory, file, and stderr.
    pub fn add_log(&self, level: &str, message: &str) {
        // Skip DEBUG messages if debug mode is off
        if level == "DEBUG" && !self.is_debug() {
            return;
        }

        let entry = LogEntry {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            level: level.to_string(),
            message: message.to_string(),
        };

        if let Ok(mut logs) = self.logs.lock() {
            logs.push(entry);
            if logs.len() > MAX_MEMORY_LOGS {
                let drain_count = MAX_MEMORY_LOGS / 5;
                logs.drain(..drain_count);
            }
        }

        self.write_to_file(level, message);

        if self.echo_stderr.load(Ordering::Relaxed) {
            eprintln!("[{}] {}", level, message);
        }
    }

    pub fn error(&self, message: &str) {
        self.add_log("ERROR", message);
    }

    pub fn warn(&self, message: &str) {
        self.add_log("WARN", message);
    }

    pub fn info(&self, message: &str) {
        self.add_log("INFO", message);
    }

    pub fn debug(&self, message: &str) {
        self.add_log("DEBUG", message);
    }

    /// Snapshot of the in-memory buffer.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.logs.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_debug(&self) -> bool {
        self.debug_mode.load(Ordering::Relaxed)
    }

    pub fn set_debug(&self, enabled: bool) {
        self.debug_mode.store(enabled, Ordering::Relaxed);
    }

    pub fn set_echo(&self, enabled: bool) {
        self.echo_stderr.store(enabled, Ordering::Relaxed);
    }
}
