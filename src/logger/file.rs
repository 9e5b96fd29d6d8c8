/// Plain-text log file output
///
/// One file per process start: `logs/blinckybot_<date>_<time>.log`.
use super::config::get_logger_config;
use crate::paths;
use chrono::Local;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};

static LOG_FILE: Lazy<Mutex<Option<BufWriter<File>>>> = Lazy::new(|| Mutex::new(None));

pub fn init_file_logging() {
    if !get_logger_config().file_logging {
        return;
    }

    let dir = paths::get_logs_directory();
    if let Err(e) = fs::create_dir_all(&dir) {
        eprintln!("Failed to create logs directory {}: {}", dir.display(), e);
        return;
    }

    let name = format!("blinckybot_{}.log", Local::now().format("%Y-%m-%d_%H-%M-%S"));
    let path = dir.join(name);

    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            *LOG_FILE.lock() = Some(BufWriter::new(file));
        }
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", path.display(), e);
        }
    }
}

pub fn write_to_file(line: &str) {
    let mut guard = LOG_FILE.lock();
    if let Some(writer) = guard.as_mut() {
        if writeln!(writer, "{}", line).is_err() {
            // Disk full or file removed; stop trying.
            *guard = None;
        }
    }
}

pub fn flush_file_logging() {
    if let Some(writer) = LOG_FILE.lock().as_mut() {
        let _ = writer.flush();
    }
}
