use crate::processor::{ProgressEvent, ProgressSink};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct ProgressManager {
    multi_progress: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            enabled,
        }
    }

    /// Bar measured in milliseconds of processed media.
    pub fn create_duration_progress(&self, total: Duration) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self
            .multi_progress
            .add(ProgressBar::new(total.as_millis() as u64));
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent:>3}% {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        pb.set_message("Extracting audio...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new_spinner());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        pb.set_message(message.to_string());
        pb
    }
}

/// Renders ffmpeg progress as an indicatif bar (or a spinner when the input
/// duration is unknown).
pub struct TerminalProgressSink {
    manager: ProgressManager,
    bar: Option<ProgressBar>,
    has_total: bool,
    start_time: Instant,
}

impl TerminalProgressSink {
    pub fn new(manager: &ProgressManager) -> Self {
        Self {
            manager: manager.clone(),
            bar: None,
            has_total: false,
            start_time: Instant::now(),
        }
    }

    fn ensure_bar(&mut self, total: Option<Duration>) {
        if self.bar.is_some() {
            return;
        }

        let bar = match total {
            Some(total) if !total.is_zero() => {
                self.has_total = true;
                self.manager.create_duration_progress(total)
            }
            _ => self.manager.create_spinner("Extracting audio..."),
        };
        self.bar = Some(bar);
    }
}

impl ProgressSink for TerminalProgressSink {
    fn on_event(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { total } => {
                self.ensure_bar(*total);
            }
            ProgressEvent::Advanced {
                processed,
                total,
                speed,
            } => {
                self.ensure_bar(*total);
                let message = progress_message(*processed, *total, *speed);
                if let Some(ref bar) = self.bar {
                    if self.has_total {
                        bar.set_position(processed.as_millis() as u64);
                    }
                    bar.set_message(message);
                }
            }
            ProgressEvent::Finished { success } => {
                if let Some(bar) = self.bar.take() {
                    if *success {
                        finish_progress_with_summary(
                            &bar,
                            "Audio extracted",
                            self.start_time.elapsed(),
                        );
                    } else {
                        bar.abandon_with_message("ffmpeg reported an error");
                    }
                }
            }
        }
    }
}

pub fn progress_message(processed: Duration, total: Option<Duration>, speed: Option<f64>) -> String {
    let mut message = match total {
        Some(total) => format!("{} / {}", format_clock(processed), format_clock(total)),
        None => format!("{} processed", format_clock(processed)),
    };

    if let Some(speed) = speed {
        message.push_str(&format!(" ({:.1}x)", speed));
    }

    message
}

pub fn finish_progress_with_summary(pb: &ProgressBar, message: &str, duration: Duration) {
    let final_message = format!("{} (completed in {})", message, format_duration(duration));
    pb.finish_with_message(final_message);
}

/// `HH:MM:SS` rendering of a media timestamp.
pub fn format_clock(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}
