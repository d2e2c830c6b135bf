use crate::processor::RunOutcome;
use std::path::PathBuf;
use std::time::Duration;

/// Result of a finished ffmpeg run.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub output_path: PathBuf,
    pub exit_code: Option<i32>,
    pub success: bool,
    pub diagnostics: String,
    pub progress_updates: usize,
    pub elapsed: Duration,
    pub output_size: Option<u64>,
    pub processor_version: String,
}

impl ProcessResult {
    pub fn from_outcome(
        outcome: RunOutcome,
        output_path: PathBuf,
        elapsed: Duration,
        processor_version: String,
    ) -> Self {
        let output_size = std::fs::metadata(&output_path).ok().map(|m| m.len());

        Self {
            output_path,
            exit_code: outcome.exit_code,
            success: outcome.success && outcome.exit_code == Some(0),
            diagnostics: outcome.diagnostics,
            progress_updates: outcome.progress_updates,
            elapsed,
            output_size,
            processor_version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn outcome(exit_code: Option<i32>) -> RunOutcome {
        RunOutcome {
            exit_code,
            success: exit_code == Some(0),
            diagnostics: "Stream mapping:".to_string(),
            progress_updates: 3,
        }
    }

    #[test]
    fn test_success_follows_exit_code() {
        let result = ProcessResult::from_outcome(
            outcome(Some(0)),
            PathBuf::from("/nonexistent/out.mp3"),
            Duration::from_secs(1),
            String::new(),
        );
        assert!(result.success);
        assert_eq!(result.output_size, None);

        let result = ProcessResult::from_outcome(
            outcome(None),
            PathBuf::from("/nonexistent/out.mp3"),
            Duration::from_secs(1),
            String::new(),
        );
        assert!(!result.success);
    }

    #[test]
    fn test_output_size_is_read_from_disk() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.wav");
        std::fs::write(&output, vec![0u8; 44]).unwrap();

        let result = ProcessResult::from_outcome(
            outcome(Some(0)),
            output,
            Duration::from_millis(10),
            "ffmpeg version 6.1".to_string(),
        );
        assert_eq!(result.output_size, Some(44));
        assert_eq!(result.progress_updates, 3);
    }
}
