//! Polling loop
//!
//! One sequential task per controller: resolve and read the frame, decode it,
//! print the selected view and append both views to the logs. The detector
//! count is learned from the first frame that decodes and never changes
//! afterwards.

use crate::dual_log::{console_timestamp, log_timestamp, DualLogger, LogSink};
use chrono::Local;
use std::io::Write;
use std::time::Duration;
use tokio::sync::watch;
use ug405_decoder::render::{render_compact, render_full, render_light};
use ug405_decoder::{DecodedFrame, ProtocolError, ScanMode, ScnResolver, SnmpTransport};

/// Smallest step of the failure backoff when the interval is shorter
const BACKOFF_BASE: Duration = Duration::from_millis(100);

/// How detector lines are printed on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleStyle {
    /// Same lines as the log of the selected mode
    #[default]
    Standard,
    /// Fixed-width `D 1=0⚪, D 2=1🟢` lines (light mode only)
    Compact,
    /// One JSON object per frame
    Json,
}

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub scan_mode: ScanMode,
    pub skip_duplicates: bool,
    pub interval: Duration,
    pub backoff_max: Option<Duration>,
    pub max_cycles: Option<u64>,
    pub console_style: ConsoleStyle,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            scan_mode: ScanMode::Light,
            skip_duplicates: false,
            interval: Duration::from_millis(200),
            backoff_max: None,
            max_cycles: None,
            console_style: ConsoleStyle::Standard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Detector count not yet known
    Bootstrapping,
    /// Detector count fixed
    Steady,
}

/// Mutable state owned by the loop
#[derive(Debug, Default)]
pub struct PollState {
    pub detector_count: usize,
    pub first_run_done: bool,
    pub previous_raw_frame: Option<String>,
    pub consecutive_failures: u32,
}

impl PollState {
    pub fn phase(&self) -> Phase {
        if self.first_run_done {
            Phase::Steady
        } else {
            Phase::Bootstrapping
        }
    }
}

/// What a single cycle produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Device did not answer one of the two requests
    NoData,
    /// Host is not a valid IPv4 address
    InvalidTarget,
    /// Frame identical to the previous one, nothing emitted
    Suppressed,
    /// Frame arrived but held no detector symbols
    InvalidFormat,
    /// Frame decoded; `detectors` readings were emitted
    Decoded { detectors: usize },
}

/// Why `run` returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    Interrupted,
    CyclesExhausted,
}

pub struct PollLoop<T, S, W> {
    resolver: ScnResolver<T>,
    logger: DualLogger<S>,
    console: W,
    settings: PollSettings,
    state: PollState,
}

impl<T, S, W> PollLoop<T, S, W>
where
    T: SnmpTransport,
    S: LogSink,
    W: Write,
{
    pub fn new(resolver: ScnResolver<T>, logger: DualLogger<S>, console: W, settings: PollSettings) -> Self {
        Self {
            resolver,
            logger,
            console,
            settings,
            state: PollState::default(),
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    #[cfg(test)]
    pub fn logger(&self) -> &DualLogger<S> {
        &self.logger
    }

    #[cfg(test)]
    pub fn console(&self) -> &W {
        &self.console
    }

    /// Poll until `shutdown` turns true or the cycle limit is reached
    ///
    /// Shutdown is only observed between cycles; a cycle in flight always
    /// completes. The stop reason is written to both logs.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> RunEnd {
        self.announce_start();

        let mut cycles: u64 = 0;
        let end = loop {
            if *shutdown.borrow() {
                break RunEnd::Interrupted;
            }
            if self.settings.max_cycles.is_some_and(|max| cycles >= max) {
                break RunEnd::CyclesExhausted;
            }

            let outcome = self.run_cycle().await;
            cycles += 1;
            log::trace!("Cycle {} finished: {:?}", cycles, outcome);

            if self.settings.max_cycles.is_some_and(|max| cycles >= max) {
                continue;
            }

            let delay = self.next_delay();
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = shutdown.changed() => {
                    // Sender gone: nobody can interrupt us any more, keep the cadence
                    if changed.is_err() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        };

        let timestamp = log_timestamp(&Local::now());
        match end {
            RunEnd::Interrupted => {
                self.say("\nMonitoring stopped by user");
                self.logger.write_both(&timestamp, "Monitoring stopped by user");
            }
            RunEnd::CyclesExhausted => {
                let message = format!("Monitoring finished after {} cycles", cycles);
                self.say(&message);
                self.logger.write_both(&timestamp, &message);
            }
        }
        log::info!("Polling stopped after {} cycles ({:?})", cycles, end);
        end
    }

    /// Execute one poll cycle
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let result = self.resolver.fetch_frame().await;

        let now = Local::now();
        let console_ts = console_timestamp(&now);
        let log_ts = log_timestamp(&now);

        match result {
            Ok(raw) => {
                self.state.consecutive_failures = 0;
                self.handle_frame(raw, &console_ts, &log_ts)
            }
            Err(ProtocolError::InvalidTarget(host)) => {
                self.state.consecutive_failures = self.state.consecutive_failures.saturating_add(1);
                self.event(&console_ts, &log_ts, &format!("Invalid IP address: {}", host));
                CycleOutcome::InvalidTarget
            }
            Err(ProtocolError::NoResponse(reason)) => {
                self.state.consecutive_failures = self.state.consecutive_failures.saturating_add(1);
                log::debug!("No frame from {}: {}", self.resolver.host(), reason);
                self.event(&console_ts, &log_ts, "No data from device");
                CycleOutcome::NoData
            }
        }
    }

    /// Delay before the next cycle, stretched while the device keeps failing
    pub fn next_delay(&self) -> Duration {
        let interval = self.settings.interval;
        let Some(max) = self.settings.backoff_max else {
            return interval;
        };
        let failures = self.state.consecutive_failures;
        if failures == 0 {
            return interval;
        }

        let base = interval.max(BACKOFF_BASE);
        let factor = 1u32 << (failures - 1).min(16);
        base.saturating_mul(factor).min(max.max(interval))
    }

    fn handle_frame(&mut self, raw: String, console_ts: &str, log_ts: &str) -> CycleOutcome {
        if self.settings.skip_duplicates && self.state.previous_raw_frame.as_deref() == Some(raw.as_str()) {
            log::trace!("Duplicate frame suppressed");
            return CycleOutcome::Suppressed;
        }

        self.say(&format!("[{}] Raw data: '{}'", console_ts, raw));
        self.logger.write_both(log_ts, &format!("Raw data: '{}'", raw));

        let outcome = match DecodedFrame::decode(Some(&raw)) {
            Ok(frame) => {
                if self.state.phase() == Phase::Bootstrapping {
                    self.learn_detector_count(frame.len(), log_ts);
                }
                self.emit_frame(&frame, log_ts)
            }
            Err(e) => {
                log::debug!("Frame {:?} rejected: {}", raw, e);
                self.event(console_ts, log_ts, "Invalid data format");
                CycleOutcome::InvalidFormat
            }
        };

        self.state.previous_raw_frame = Some(raw);
        outcome
    }

    fn learn_detector_count(&mut self, count: usize, log_ts: &str) {
        self.state.detector_count = count;
        self.state.first_run_done = true;

        let message = format!("Detectors discovered: {}", count);
        log::info!("{}", message);
        self.say(&message);
        self.logger.write_both(log_ts, &message);
    }

    fn emit_frame(&mut self, frame: &DecodedFrame, log_ts: &str) -> CycleOutcome {
        let count = self.state.detector_count;
        let light = frame.light(count);
        let planes = frame.full(count);

        let light_line = render_light(&light);
        let plane_lines = render_full(&planes);

        match (self.settings.console_style, self.settings.scan_mode) {
            (ConsoleStyle::Json, ScanMode::Light) => {
                let json = serde_json::json!({ "timestamp": log_ts, "detectors": light });
                self.say(&json.to_string());
            }
            (ConsoleStyle::Json, ScanMode::Full) => {
                let json = serde_json::json!({ "timestamp": log_ts, "planes": planes });
                self.say(&json.to_string());
            }
            (ConsoleStyle::Compact, ScanMode::Light) => self.say(&render_compact(&light)),
            (_, ScanMode::Light) => self.say(&light_line),
            (_, ScanMode::Full) => self.say(&plane_lines.join("\n")),
        }

        self.logger.write_light(log_ts, &light_line);
        for line in &plane_lines {
            self.logger.write_full(log_ts, line);
        }

        CycleOutcome::Decoded {
            detectors: light.len(),
        }
    }

    fn announce_start(&mut self) {
        let timestamp = log_timestamp(&Local::now());
        let skip = if self.settings.skip_duplicates { "ON" } else { "OFF" };
        let lines = [
            "Monitoring started".to_string(),
            format!("Scan mode: {}", self.settings.scan_mode),
            format!("IP address: {}", self.resolver.host()),
            format!("Skip duplicate frames: {}", skip),
        ];

        for line in &lines[1..] {
            self.say(line);
        }
        for line in &lines {
            self.logger.write_both(&timestamp, line);
        }
    }

    /// Console + both logs
    fn event(&mut self, console_ts: &str, log_ts: &str, message: &str) {
        self.say(&format!("[{}] {}", console_ts, message));
        self.logger.write_both(log_ts, message);
    }

    fn say(&mut self, line: &str) {
        if let Err(e) = writeln!(self.console, "{}", line) {
            log::warn!("Console write failed: {}", e);
        }
    }
}
