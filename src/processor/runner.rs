use super::command::ExtractionCommand;
use super::progress::{ProgressEvent, ProgressParser, ProgressSink};
use crate::error::{ExtractorError, Result};
use crate::ui::GracefulShutdown;
use std::collections::VecDeque;
use std::io;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;

const READ_BUFFER_SIZE: usize = 4096;
const MAX_LINE_BYTES: usize = 16 * 1024;
const DIAGNOSTIC_TAIL_LINES: usize = 200;

/// What the child process left behind once it exited.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub exit_code: Option<i32>,
    pub success: bool,
    pub diagnostics: String,
    pub progress_updates: usize,
}

/// Spawns ffmpeg, relays its stderr, and waits for it while honouring
/// cancellation.
pub struct ProcessRunner<'a> {
    shutdown: &'a GracefulShutdown,
}

impl<'a> ProcessRunner<'a> {
    pub fn new(shutdown: &'a GracefulShutdown) -> Self {
        Self { shutdown }
    }

    pub async fn run(
        &self,
        command: &ExtractionCommand,
        sink: &mut dyn ProgressSink,
    ) -> Result<RunOutcome> {
        self.shutdown.check_shutdown()?;

        tracing::info!("Running {}", command.display_line());

        let mut child = command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                    ExtractorError::ProcessorNotFound {
                        program: format!("{} could not be started: {}", command.program().display(), e),
                    }
                }
                _ => ExtractorError::Io(e),
            })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "ffmpeg stderr was not captured"))?;

        let mut relay = DiagnosticRelay::new(sink, DIAGNOSTIC_TAIL_LINES);

        let status = tokio::select! {
            result = async { tokio::try_join!(relay.drain(stderr), child.wait()) } => match result {
                Ok((_, status)) => status,
                Err(e) => {
                    tracing::warn!("Lost track of ffmpeg: {}", e);
                    terminate(&mut child).await;
                    return Err(ExtractorError::Io(e));
                }
            },
            _ = self.shutdown.cancelled() => {
                tracing::warn!("Cancellation requested, stopping ffmpeg");
                terminate(&mut child).await;
                return Err(ExtractorError::Interrupted);
            }
        };

        // ffmpeg shares the terminal's process group, so Ctrl+C may reach it
        // before our handler wins the race above.
        if !self.shutdown.is_running() {
            return Err(ExtractorError::Interrupted);
        }

        let success = status.success();
        tracing::debug!("ffmpeg exited with {}", status);
        relay.emit(ProgressEvent::Finished { success });

        Ok(RunOutcome {
            exit_code: status.code(),
            success,
            diagnostics: relay.diagnostics(),
            progress_updates: relay.progress_updates,
        })
    }
}

async fn terminate(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        tracing::debug!("Failed to signal ffmpeg: {}", e);
    }

    match child.wait().await {
        Ok(status) => tracing::debug!("ffmpeg stopped with {}", status),
        Err(e) => tracing::warn!("Failed to wait for ffmpeg to stop: {}", e),
    }
}

/// Splits the diagnostic stream into lines, forwards progress to the sink and
/// keeps a bounded tail of everything else.
struct DiagnosticRelay<'s> {
    parser: ProgressParser,
    sink: &'s mut dyn ProgressSink,
    tail: VecDeque<String>,
    max_lines: usize,
    progress_updates: usize,
}

impl<'s> DiagnosticRelay<'s> {
    fn new(sink: &'s mut dyn ProgressSink, max_lines: usize) -> Self {
        Self {
            parser: ProgressParser::new(),
            sink,
            tail: VecDeque::with_capacity(max_lines.min(64)),
            max_lines,
            progress_updates: 0,
        }
    }

    async fn drain<R: AsyncRead + Unpin>(&mut self, mut reader: R) -> io::Result<()> {
        let mut buffer = [0u8; READ_BUFFER_SIZE];
        let mut pending: Vec<u8> = Vec::new();

        loop {
            let read = reader.read(&mut buffer).await?;
            if read == 0 {
                break;
            }

            for &byte in &buffer[..read] {
                if byte == b'\r' || byte == b'\n' {
                    self.handle_line(&pending);
                    pending.clear();
                } else {
                    pending.push(byte);
                    if pending.len() >= MAX_LINE_BYTES {
                        self.handle_line(&pending);
                        pending.clear();
                    }
                }
            }
        }

        self.handle_line(&pending);
        Ok(())
    }

    fn handle_line(&mut self, raw: &[u8]) {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end();
        if line.trim().is_empty() {
            return;
        }

        match self.parser.parse_line(line) {
            Some(event @ ProgressEvent::Advanced { .. }) => {
                self.progress_updates += 1;
                self.emit(event);
            }
            Some(event) => {
                self.emit(event);
                self.remember(line);
            }
            None => {
                tracing::trace!("ffmpeg: {}", line);
                self.remember(line);
            }
        }
    }

    fn emit(&mut self, event: ProgressEvent) {
        self.sink.on_event(&event);
    }

    fn remember(&mut self, line: &str) {
        if self.tail.len() == self.max_lines {
            self.tail.pop_front();
        }
        self.tail.push_back(line.to_string());
    }

    fn diagnostics(&self) -> String {
        self.tail.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
    }
}
