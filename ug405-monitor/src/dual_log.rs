//! Date-rotated light/full text logs
//!
//! Two append-only files per day, one per scan mode:
//! `<log_dir>/light_log_YYYY-MM-DD.txt` and `<log_dir>/full_log_YYYY-MM-DD.txt`.
//! A file gets a header block the first time it is created; every line after
//! that is `[<timestamp>] <message>`. The date is re-checked on every write,
//! there is no midnight timer.

use chrono::{DateTime, Local, NaiveDate};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use ug405_decoder::ScanMode;

/// Storage behind the dual logger
pub trait LogSink {
    /// Append one complete line to the log of `mode`
    fn append(&mut self, mode: ScanMode, line: &str) -> io::Result<()>;
}

/// Effective configuration written into each new log file
#[derive(Debug, Clone)]
pub struct LogHeader {
    pub scan_mode: ScanMode,
    pub host: String,
    pub skip_duplicates: bool,
}

impl LogHeader {
    fn render(&self, date: NaiveDate, mode: ScanMode) -> String {
        format!(
            "SNMP Monitor Log - {} ({} Mode)\nScan Mode: {}\nIP Address: {}\nSkip Duplicates: {}\n{}\n\n",
            date.format("%Y-%m-%d"),
            mode.title(),
            self.scan_mode,
            self.host,
            self.skip_duplicates,
            "=".repeat(80)
        )
    }
}

/// Timestamp used inside log files: `2024-05-01 13:45:12.345`
pub fn log_timestamp(now: &DateTime<Local>) -> String {
    now.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Timestamp used on the console: `13:45:12.345`
pub fn console_timestamp(now: &DateTime<Local>) -> String {
    now.format("%H:%M:%S%.3f").to_string()
}

/// File-backed sink with per-day rotation
pub struct FileLogSink {
    dir: PathBuf,
    header: LogHeader,
    current_date: Option<NaiveDate>,
}

impl FileLogSink {
    /// Create the log directory (if needed) and a sink writing into it
    pub fn new(dir: impl Into<PathBuf>, header: LogHeader) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            header,
            current_date: None,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the log for `mode` on `date`
    pub fn path_for(&self, mode: ScanMode, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}_log_{}.txt", mode, date.format("%Y-%m-%d")))
    }

    /// Append as if the current date were `date`
    pub fn append_on(&mut self, date: NaiveDate, mode: ScanMode, line: &str) -> io::Result<()> {
        if self.current_date != Some(date) {
            self.open_day(date)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(mode, date))?;
        writeln!(file, "{}", line)
    }

    fn open_day(&mut self, date: NaiveDate) -> io::Result<()> {
        for mode in [ScanMode::Light, ScanMode::Full] {
            let path = self.path_for(mode, date);
            if !path.exists() {
                log::info!("Creating log file {:?}", path);
                fs::write(&path, self.header.render(date, mode))?;
            }
        }
        self.current_date = Some(date);
        Ok(())
    }
}

impl LogSink for FileLogSink {
    fn append(&mut self, mode: ScanMode, line: &str) -> io::Result<()> {
        self.append_on(Local::now().date_naive(), mode, line)
    }
}

/// In-memory sink
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    pub light: Vec<String>,
    pub full: Vec<String>,
}

#[cfg(test)]
impl MemoryLogSink {
    pub fn lines(&self, mode: ScanMode) -> &[String] {
        match mode {
            ScanMode::Light => &self.light,
            ScanMode::Full => &self.full,
        }
    }
}

#[cfg(test)]
impl LogSink for MemoryLogSink {
    fn append(&mut self, mode: ScanMode, line: &str) -> io::Result<()> {
        match mode {
            ScanMode::Light => self.light.push(line.to_string()),
            ScanMode::Full => self.full.push(line.to_string()),
        }
        Ok(())
    }
}

/// Writes timestamped messages into the light and full logs
///
/// Write failures are reported on the console and otherwise ignored.
pub struct DualLogger<S> {
    sink: S,
}

impl<S: LogSink> DualLogger<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn write_light(&mut self, timestamp: &str, message: &str) {
        self.write(ScanMode::Light, timestamp, message);
    }

    pub fn write_full(&mut self, timestamp: &str, message: &str) {
        self.write(ScanMode::Full, timestamp, message);
    }

    pub fn write_both(&mut self, timestamp: &str, message: &str) {
        self.write_light(timestamp, message);
        self.write_full(timestamp, message);
    }

    fn write(&mut self, mode: ScanMode, timestamp: &str, message: &str) {
        let line = format!("[{}] {}", timestamp, message);
        if let Err(e) = self.sink.append(mode, &line) {
            log::error!("Failed to write {} log: {}", mode, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn header() -> LogHeader {
        LogHeader {
            scan_mode: ScanMode::Full,
            host: "10.179.72.97".to_string(),
            skip_duplicates: true,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_header_written_once_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileLogSink::new(dir.path(), header()).unwrap();

        sink.append_on(date(1), ScanMode::Light, "[t] first").unwrap();
        sink.append_on(date(1), ScanMode::Light, "[t] second").unwrap();

        let light = fs::read_to_string(dir.path().join("light_log_2024-03-01.txt")).unwrap();
        assert!(light.starts_with("SNMP Monitor Log - 2024-03-01 (Light Mode)\n"));
        assert!(light.contains("Scan Mode: full\n"));
        assert!(light.contains("IP Address: 10.179.72.97\n"));
        assert!(light.contains("Skip Duplicates: true\n"));
        assert!(light.ends_with(&format!("{}\n\n[t] first\n[t] second\n", "=".repeat(80))));
        assert_eq!(light.matches("SNMP Monitor Log").count(), 1);

        // The other mode's file is created with its header on the same day
        let full = fs::read_to_string(dir.path().join("full_log_2024-03-01.txt")).unwrap();
        assert!(full.starts_with("SNMP Monitor Log - 2024-03-01 (Full Mode)\n"));
        assert!(!full.contains("[t]"));
    }

    #[test]
    fn test_rotation_on_date_change() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileLogSink::new(dir.path(), header()).unwrap();

        sink.append_on(date(1), ScanMode::Full, "[a] before midnight").unwrap();
        sink.append_on(date(2), ScanMode::Full, "[b] after midnight").unwrap();

        let day1 = fs::read_to_string(sink.path_for(ScanMode::Full, date(1))).unwrap();
        let day2 = fs::read_to_string(sink.path_for(ScanMode::Full, date(2))).unwrap();
        assert!(day1.contains("before midnight") && !day1.contains("after midnight"));
        assert!(day2.contains("after midnight") && !day2.contains("before midnight"));
    }

    #[test]
    fn test_existing_file_is_appended_without_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("light_log_2024-03-05.txt");
        fs::write(&path, "earlier run\n").unwrap();

        let mut sink = FileLogSink::new(dir.path(), header()).unwrap();
        sink.append_on(date(5), ScanMode::Light, "[x] resumed").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "earlier run\n[x] resumed\n");
    }

    #[test]
    fn test_new_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("logs").join("snmp");
        let sink = FileLogSink::new(&nested, header()).unwrap();
        assert!(sink.dir().is_dir());
    }

    #[test]
    fn test_dual_logger_formats_lines() {
        let mut logger = DualLogger::new(MemoryLogSink::default());
        logger.write_both("2024-03-01 10:00:00.000", "Monitoring started");
        logger.write_light("2024-03-01 10:00:00.200", "⚪ 1=0");
        logger.write_full("2024-03-01 10:00:00.200", "⚪ 1=0");

        assert_eq!(
            logger.sink().light,
            vec![
                "[2024-03-01 10:00:00.000] Monitoring started",
                "[2024-03-01 10:00:00.200] ⚪ 1=0",
            ]
        );
        assert_eq!(logger.sink().lines(ScanMode::Full).len(), 2);
    }

    struct BrokenSink;

    impl LogSink for BrokenSink {
        fn append(&mut self, _mode: ScanMode, _line: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    #[test]
    fn test_write_failure_is_absorbed() {
        let mut logger = DualLogger::new(BrokenSink);
        // Must not panic
        logger.write_both("t", "message");
    }

    #[test]
    fn test_timestamp_formats() {
        let now = Local.with_ymd_and_hms(2024, 3, 1, 7, 5, 9).unwrap();
        assert_eq!(log_timestamp(&now), "2024-03-01 07:05:09.000");
        assert_eq!(console_timestamp(&now), "07:05:09.000");
    }
}
