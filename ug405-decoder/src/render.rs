//! Text rendering of detector readings
//!
//! Light mode prints one line per frame, full mode one line per bit plane.
//! Idle detectors are marked ⚪, active ones 🟢.

use crate::types::DetectorReading;

const IDLE_MARK: &str = "⚪";
const ACTIVE_MARK: &str = "🟢";

fn mark(active: bool) -> &'static str {
    if active {
        ACTIVE_MARK
    } else {
        IDLE_MARK
    }
}

/// `⚪ 1=0 🟢 2=1 ...`
pub fn render_light(readings: &[DetectorReading]) -> String {
    readings
        .iter()
        .map(|r| format!("{} {}={}", mark(r.active), r.position, r.symbol))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One light-style line per bit plane
pub fn render_full(planes: &[Vec<DetectorReading>]) -> Vec<String> {
    planes.iter().map(|plane| render_light(plane)).collect()
}

/// Fixed-width console style: `D 1=0⚪, D 2=1🟢`
pub fn render_compact(readings: &[DetectorReading]) -> String {
    readings
        .iter()
        .map(|r| format!("D{:2}={}{}", r.position, r.symbol, mark(r.active)))
        .collect::<Vec<_>>()
        .join(", ")
}
