//! Transfer rate from consecutive cumulative byte counters.

use crate::model::RateSample;

const UNITS: [&str; 5] = ["B/s", "kB/s", "MB/s", "GB/s", "TB/s"];

/// Text shown when no rate can be computed.
pub const UNKNOWN_RATE: &str = "? B/s";

/// Rendered download/upload rates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateText {
    pub down: String,
    pub up: String,
}

impl RateText {
    pub fn unknown() -> Self {
        Self {
            down: UNKNOWN_RATE.to_string(),
            up: UNKNOWN_RATE.to_string(),
        }
    }
}

/// Keeps the previous sample and turns each new one into a rate.
#[derive(Debug, Default)]
pub struct RateTracker {
    previous: Option<RateSample>,
}

impl RateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a sample. `None` means the stream reported no data.
    ///
    /// The first sample after a reset only seeds the tracker and yields `None`.
    pub fn sample(&mut self, current: Option<RateSample>) -> Option<RateText> {
        let Some(current) = current else {
            self.previous = None;
            return Some(RateText::unknown());
        };
        let text = self.previous.map(|prev| {
            let elapsed_ms = current.timestamp_ms as f64 - prev.timestamp_ms as f64;
            RateText {
                down: human_readable_speed(bytes_per_second(
                    prev.bytes_recvd,
                    current.bytes_recvd,
                    elapsed_ms,
                )),
                up: human_readable_speed(bytes_per_second(
                    prev.bytes_sent,
                    current.bytes_sent,
                    elapsed_ms,
                )),
            }
        });
        self.previous = Some(current);
        text
    }

    pub fn previous(&self) -> Option<&RateSample> {
        self.previous.as_ref()
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}

/// Negative result is the "no data" sentinel (counter went backwards, or
/// the clock did not advance).
fn bytes_per_second(before: u64, after: u64, elapsed_ms: f64) -> f64 {
    if elapsed_ms <= 0.0 {
        return -1.0;
    }
    (after as f64 - before as f64) * 1000.0 / elapsed_ms
}

/// Scale a byte rate to the largest unit keeping at most two integer digits.
///
/// Negative input renders as `"? B/s"`.
pub fn human_readable_speed(speed: f64) -> String {
    if speed.is_nan() || speed < 0.0 {
        return UNKNOWN_RATE.to_string();
    }
    let mut i = if speed < 1.0 {
        0
    } else {
        ((speed.ln() / 1024f64.ln()).floor() as usize).min(UNITS.len() - 1)
    };
    let mut value = speed / 1024f64.powi(i as i32);
    let mut decimals = 2;
    let whole = value.round();
    if whole > 99.0 && i + 1 < UNITS.len() {
        i += 1;
        value /= 1024.0;
    } else if whole > 9.0 {
        decimals = 1;
    }
    format!("{} {}", to_fixed(value, decimals), UNITS[i])
}

/// Fixed-point rendering where exact halves round up.
fn to_fixed(value: f64, decimals: i32) -> String {
    let scale = 10f64.powi(decimals);
    let scaled = value * scale;
    let value = if scaled.fract() == 0.5 {
        scaled.ceil() / scale
    } else {
        value
    };
    format!("{:.*}", decimals as usize, value)
}
