//! Size-rotated log file writer
//!
//! The active file is renamed to a timestamped backup when the next write
//! would push it past the configured size. After each rotation, backups beyond
//! `max_backups` or older than `max_age` days are removed, and the rest are
//! gzip-compressed when `compress` is set.
//!
//! Backup names keep the original extension after the timestamp:
//! `app.log` rotates to `app-2025-01-08T10-30-45.123.log` (or
//! `app-2025-01-08T10-30-45.123.log.gz` once compressed).

use crate::core::error::{LoggerError, Result};
use crate::core::options::FileOutputConfig;
use chrono::{Duration, Local, NaiveDateTime, Timelike, Utc};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Timestamp embedded in backup file names
const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

const COMPRESS_SUFFIX: &str = ".gz";

/// A rotated file found next to the active one
#[derive(Debug, Clone)]
struct Backup {
    path: PathBuf,
    timestamp: NaiveDateTime,
    compressed: bool,
}

impl Backup {
    /// Name without the compression suffix, identifying one rotation
    fn base_name(&self) -> String {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        name.strip_suffix(COMPRESS_SUFFIX)
            .map(str::to_owned)
            .unwrap_or(name)
    }
}

/// Rotating file destination, used as the writer behind file outputs
///
/// # Examples
///
/// ```no_run
/// use fslog::{FileOutputConfig, RotatingFileWriter};
/// use std::io::Write;
///
/// let config = FileOutputConfig::new("/var/log/app.log")
///     .with_max_size(10)
///     .with_max_backups(5)
///     .with_compress(true);
/// let mut writer = RotatingFileWriter::open(config).unwrap();
/// writer.write_all(b"hello\n").unwrap();
/// ```
#[derive(Debug)]
pub struct RotatingFileWriter {
    path: PathBuf,
    config: FileOutputConfig,
    max_bytes: u64,
    file: Option<File>,
    current_size: u64,
    last_backup: Option<NaiveDateTime>,
}

impl RotatingFileWriter {
    /// Open (or create) the configured file, creating its directory if needed
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created or opened
    pub fn open(config: FileOutputConfig) -> Result<Self> {
        let path = config.resolved_filename();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size) = Self::open_append(&path)?;

        Ok(Self {
            max_bytes: config.max_size_bytes(),
            path,
            config,
            file: Some(file),
            current_size,
            last_backup: None,
        })
    }

    /// Override the rotation threshold with an exact byte count
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes.max(1);
        self
    }

    fn open_append(path: &Path) -> Result<(File, u64)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_output(path.display().to_string(), format!("Failed to open: {}", e))
            })?;

        let size = file
            .metadata()
            .map_err(|e| {
                LoggerError::file_output(
                    path.display().to_string(),
                    format!("Cannot access file metadata: {}", e),
                )
            })?
            .len();
        Ok((file, size))
    }

    /// Get current file size
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// Get the active file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn config(&self) -> &FileOutputConfig {
        &self.config
    }

    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// `app.log` splits into (`app`, `.log`)
    fn name_parts(&self) -> (String, String) {
        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("fslog.log");
        match file_name.rfind('.') {
            Some(idx) if idx > 0 => (file_name[..idx].to_string(), file_name[idx..].to_string()),
            _ => (file_name.to_string(), String::new()),
        }
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn now(&self) -> NaiveDateTime {
        if self.config.local_time {
            Local::now().naive_local()
        } else {
            Utc::now().naive_utc()
        }
    }

    /// First unused backup path at or after `timestamp`
    fn backup_path(&self, mut timestamp: NaiveDateTime) -> (PathBuf, NaiveDateTime) {
        let (stem, ext) = self.name_parts();
        let dir = self.dir();
        loop {
            let name = format!("{}-{}{}", stem, timestamp.format(BACKUP_TIME_FORMAT), ext);
            let candidate = dir.join(&name);
            let compressed = dir.join(format!("{}{}", name, COMPRESS_SUFFIX));
            if !candidate.exists() && !compressed.exists() {
                return (candidate, timestamp);
            }
            // Two rotations in the same millisecond
            timestamp += Duration::milliseconds(1);
        }
    }

    /// Perform log rotation
    fn rotate(&mut self) -> Result<()> {
        // Explicitly drop the handle before renaming
        if let Some(mut file) = self.file.take() {
            file.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        if self.path.exists() {
            let now = self.now();
            let mut stamp = now
                .with_nanosecond(now.nanosecond() / 1_000_000 * 1_000_000)
                .unwrap_or(now);
            // Backups must sort in rotation order even within one millisecond
            if let Some(last) = self.last_backup {
                if stamp <= last {
                    stamp = last + Duration::milliseconds(1);
                }
            }

            let (backup, stamp) = self.backup_path(stamp);
            fs::rename(&self.path, &backup).map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;
            self.last_backup = Some(stamp);
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to create new log file: {}", e),
                )
            })?;

        self.file = Some(file);
        self.current_size = 0;

        self.mill();
        Ok(())
    }

    /// Rotated files belonging to this writer, newest first
    fn backups(&self) -> Result<Vec<Backup>> {
        let (stem, ext) = self.name_parts();
        let prefix = format!("{}-", stem);
        let dir = self.dir();

        let entries = fs::read_dir(&dir).map_err(|e| {
            LoggerError::io_operation(
                "list log backups",
                format!("Cannot read directory '{}'", dir.display()),
                e,
            )
        })?;

        let mut backups = Vec::new();
        for entry in entries.filter_map(|e| e.ok()) {
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(rest) = name.strip_prefix(&prefix) else {
                continue;
            };
            let (rest, compressed) = match rest.strip_suffix(COMPRESS_SUFFIX) {
                Some(r) => (r, true),
                None => (rest, false),
            };
            let Some(stamp) = rest.strip_suffix(ext.as_str()) else {
                continue;
            };
            if let Ok(timestamp) = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT) {
                backups.push(Backup {
                    path: entry.path(),
                    timestamp,
                    compressed,
                });
            }
        }

        backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(backups)
    }

    /// Remove surplus and expired backups, then compress what remains.
    ///
    /// Failures here never fail the write that triggered rotation; they are
    /// reported on stderr and retried after the next rotation.
    fn mill(&self) {
        let backups = match self.backups() {
            Ok(backups) => backups,
            Err(e) => {
                eprintln!("[LOGGER WARNING] Cannot inspect log backups: {}", e);
                return;
            }
        };

        let mut remaining = Vec::new();
        let mut remove = Vec::new();

        if self.config.max_backups > 0 {
            let mut preserved = HashSet::new();
            for backup in backups {
                preserved.insert(backup.base_name());
                if preserved.len() > self.config.max_backups {
                    remove.push(backup);
                } else {
                    remaining.push(backup);
                }
            }
        } else {
            remaining = backups;
        }

        if self.config.max_age > 0 {
            let cutoff = self.now() - Duration::days(i64::from(self.config.max_age));
            let (expired, kept): (Vec<_>, Vec<_>) =
                remaining.into_iter().partition(|b| b.timestamp < cutoff);
            remove.extend(expired);
            remaining = kept;
        }

        for backup in &remove {
            if let Err(e) = fs::remove_file(&backup.path) {
                eprintln!(
                    "[LOGGER WARNING] Failed to remove old backup {}: {}",
                    backup.path.display(),
                    e
                );
            }
        }

        if self.config.compress {
            for backup in remaining.iter().filter(|b| !b.compressed) {
                if let Err(e) = compress_file(&backup.path) {
                    eprintln!("[LOGGER WARNING] {}", e);
                }
            }
        }
    }
}

/// Gzip `path` into `path.gz`, removing the original only once the
/// compressed file is complete.
fn compress_file(path: &Path) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let gz_path = path.with_file_name(format!("{}{}", file_name, COMPRESS_SUFFIX));
    let temp_gz_path = path.with_file_name(format!("{}{}.tmp", file_name, COMPRESS_SUFFIX));

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&temp_gz_path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to create temporary compressed file: {}", temp_gz_path.display()),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let streamed = io::copy(&mut reader, &mut encoder)
        .and_then(|_| encoder.finish())
        .and_then(|mut out| out.flush());
    if let Err(e) = streamed {
        let _ = fs::remove_file(&temp_gz_path);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress {}", path.display()),
            e,
        ));
    }

    fs::rename(&temp_gz_path, &gz_path).map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to rename compressed file to: {}", gz_path.display()),
            e,
        )
    })?;

    fs::remove_file(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Compressed but could not remove {}", path.display()),
            e,
        )
    })
}

impl Write for RotatingFileWriter {
    /// Writes the whole buffer or nothing, rotating first if it would not fit
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = buf.len() as u64;
        if len > self.max_bytes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "write length {} exceeds maximum file size {}",
                    len, self.max_bytes
                ),
            ));
        }

        if self.file.is_none() {
            let (file, size) = Self::open_append(&self.path).map_err(io::Error::other)?;
            self.file = Some(file);
            self.current_size = size;
        }

        if self.current_size + len > self.max_bytes {
            self.rotate().map_err(io::Error::other)?;
        }

        match self.file.as_mut() {
            Some(file) => {
                file.write_all(buf)?;
                self.current_size += len;
                Ok(buf.len())
            }
            None => Err(io::Error::other("log file not open")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => {
                file.flush()?;
                file.sync_data()
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::tempdir;

    fn entries(dir: &Path, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with(prefix))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_open_creates_directory() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("nested").join("app.log");

        let writer = RotatingFileWriter::open(FileOutputConfig::new(&log_path)).unwrap();
        assert!(log_path.exists());
        assert_eq!(writer.path(), log_path);
        assert_eq!(writer.current_size(), 0);
        assert_eq!(writer.max_bytes(), 100 * 1024 * 1024);
    }

    #[test]
    fn test_open_resumes_existing_size() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("app.log");
        fs::write(&log_path, b"existing\n").unwrap();

        let writer = RotatingFileWriter::open(FileOutputConfig::new(&log_path)).unwrap();
        assert_eq!(writer.current_size(), 9);
    }

    #[test]
    fn test_rotation_creates_backup() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("rotation.log");

        let mut writer = RotatingFileWriter::open(FileOutputConfig::new(&log_path))
            .unwrap()
            .with_max_bytes(100);

        for i in 0..20 {
            writeln!(writer, "Test message number {:02}", i).unwrap();
        }
        writer.flush().unwrap();

        let backups = entries(dir.path(), "rotation-");
        assert!(!backups.is_empty());
        assert!(backups.iter().all(|n| n.ends_with(".log")));
        assert!(writer.current_size() <= 100);

        // Nothing lost across rotations
        let mut total = fs::read_to_string(&log_path).unwrap();
        for name in &backups {
            total.push_str(&fs::read_to_string(dir.path().join(name)).unwrap());
        }
        for i in 0..20 {
            assert!(total.contains(&format!("Test message number {:02}", i)));
        }
    }

    #[test]
    fn test_max_backups_prunes_oldest() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("multi.log");

        let config = FileOutputConfig::new(&log_path).with_max_backups(2);
        let mut writer = RotatingFileWriter::open(config).unwrap().with_max_bytes(50);

        for i in 0..100 {
            writeln!(writer, "Entry {}", i).unwrap();
        }

        let backups = entries(dir.path(), "multi-");
        assert_eq!(backups.len(), 2);

        // Pruning removed the oldest rotations, not the latest ones
        let kept: String = backups
            .iter()
            .map(|name| fs::read_to_string(dir.path().join(name)).unwrap())
            .collect();
        assert!(!kept.contains("Entry 0\n"));
        assert!(kept.contains("Entry 9"));

        // The newest entries survive
        let current = fs::read_to_string(&log_path).unwrap();
        assert!(current.contains("Entry 99"));
    }

    #[test]
    fn test_compressed_backups() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("zipped.log");

        let config = FileOutputConfig::new(&log_path)
            .with_compress(true)
            .with_local_time(true);
        let mut writer = RotatingFileWriter::open(config).unwrap().with_max_bytes(64);

        writer.write_all(b"first line that fills the file up to the limit!!\n").unwrap();
        writer.write_all(b"second line forcing a rotation of the first one\n").unwrap();

        let backups = entries(dir.path(), "zipped-");
        assert_eq!(backups.len(), 1);
        assert!(backups[0].ends_with(".log.gz"));

        let mut decoded = String::new();
        GzDecoder::new(File::open(dir.path().join(&backups[0])).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert!(decoded.starts_with("first line"));
    }

    #[test]
    fn test_max_age_removes_expired_backups() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("aged.log");
        let stale = dir.path().join("aged-2000-01-01T00-00-00.000.log");
        fs::write(&stale, b"ancient\n").unwrap();
        let unrelated = dir.path().join("other-2000-01-01T00-00-00.000.log");
        fs::write(&unrelated, b"not ours\n").unwrap();

        let config = FileOutputConfig::new(&log_path).with_max_age(1);
        let mut writer = RotatingFileWriter::open(config).unwrap().with_max_bytes(16);
        writer.write_all(b"0123456789abcd\n").unwrap();
        writer.write_all(b"0123456789abcd\n").unwrap();

        assert!(!stale.exists());
        assert!(unrelated.exists());
        assert_eq!(entries(dir.path(), "aged-").len(), 1);
    }

    #[test]
    fn test_oversized_write_rejected() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("small.log");

        let mut writer = RotatingFileWriter::open(FileOutputConfig::new(&log_path))
            .unwrap()
            .with_max_bytes(8);
        let err = writer.write(b"far more than eight bytes").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(writer.current_size(), 0);
    }

    #[test]
    fn test_backup_name_parsing() {
        let dir = tempdir().unwrap();
        let writer =
            RotatingFileWriter::open(FileOutputConfig::new(dir.path().join("svc.log"))).unwrap();

        assert_eq!(writer.name_parts(), ("svc".to_string(), ".log".to_string()));

        let stamp = NaiveDateTime::parse_from_str("2024-05-06T07-08-09.010", BACKUP_TIME_FORMAT)
            .unwrap();
        let (path, _) = writer.backup_path(stamp);
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "svc-2024-05-06T07-08-09.010.log"
        );

        fs::write(&path, b"taken").unwrap();
        let (next, next_stamp) = writer.backup_path(stamp);
        assert_eq!(next_stamp, stamp + Duration::milliseconds(1));
        assert_eq!(
            next.file_name().unwrap().to_str().unwrap(),
            "svc-2024-05-06T07-08-09.011.log"
        );
    }
}
