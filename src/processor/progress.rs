use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// Structured progress reported while ffmpeg runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Input duration became known (or is unavailable).
    Started { total: Option<Duration> },
    /// ffmpeg reported another stats line.
    Advanced {
        processed: Duration,
        total: Option<Duration>,
        speed: Option<f64>,
    },
    /// The child process exited.
    Finished { success: bool },
}

impl ProgressEvent {
    pub fn percentage(&self) -> Option<f64> {
        match self {
            ProgressEvent::Advanced {
                processed,
                total: Some(total),
                ..
            } if !total.is_zero() => {
                Some((processed.as_secs_f64() / total.as_secs_f64() * 100.0).min(100.0))
            }
            _ => None,
        }
    }
}

/// Receives progress events. Implementations must not block for long; they run
/// on the same task that drains ffmpeg's stderr.
pub trait ProgressSink: Send {
    fn on_event(&mut self, event: &ProgressEvent);
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn on_event(&mut self, _event: &ProgressEvent) {}
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingProgressSink {
    pub events: Vec<ProgressEvent>,
}

impl RecordingProgressSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advanced_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Advanced { .. }))
            .count()
    }
}

impl ProgressSink for RecordingProgressSink {
    fn on_event(&mut self, event: &ProgressEvent) {
        self.events.push(event.clone());
    }
}

fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*Duration:\s*(\d+:\d{2}:\d{2}(?:\.\d+)?|N/A)").expect("valid duration regex")
    })
}

fn time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"time=\s*(\d+:\d{2}:\d{2}(?:\.\d+)?)").expect("valid time regex"))
}

fn speed_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"speed=\s*([0-9.]+)x").expect("valid speed regex"))
}

/// Parse an ffmpeg `HH:MM:SS.ff` timestamp.
pub fn parse_timestamp(value: &str) -> Option<Duration> {
    let mut parts = value.trim().split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds_part = parts.next()?;
    if parts.next().is_some() || minutes >= 60 {
        return None;
    }

    let (whole, fraction) = match seconds_part.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (seconds_part, ""),
    };
    let seconds: u64 = whole.parse().ok()?;
    if seconds >= 60 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let nanos = if fraction.is_empty() {
        0
    } else {
        let digits: String = fraction.chars().chain("000000000".chars()).take(9).collect();
        digits.parse::<u32>().ok()?
    };

    Some(Duration::new(hours * 3600 + minutes * 60 + seconds, nanos))
}

/// Whether a stderr line is a periodic stats line rather than a diagnostic.
pub fn is_stats_line(line: &str) -> bool {
    line.contains("time=") && (line.contains("size=") || line.contains("speed="))
}

/// Turns ffmpeg stderr lines into [`ProgressEvent`]s.
#[derive(Debug, Default)]
pub struct ProgressParser {
    total: Option<Duration>,
    started: bool,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> Option<Duration> {
        self.total
    }

    pub fn parse_line(&mut self, line: &str) -> Option<ProgressEvent> {
        if !self.started {
            if let Some(caps) = duration_regex().captures(line) {
                self.started = true;
                self.total = parse_timestamp(&caps[1]);
                return Some(ProgressEvent::Started { total: self.total });
            }
        }

        if !is_stats_line(line) {
            return None;
        }

        let processed = time_regex()
            .captures(line)
            .and_then(|caps| parse_timestamp(&caps[1]))?;
        let speed = speed_regex()
            .captures(line)
            .and_then(|caps| caps[1].parse::<f64>().ok());

        Some(ProgressEvent::Advanced {
            processed,
            total: self.total,
            speed,
        })
    }
}
