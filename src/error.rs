use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("Input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Media processor not found: {program}")]
    ProcessorNotFound { program: String },

    #[error("Invalid output path: {}", path.display())]
    OutputPathInvalid { path: PathBuf, reason: String },

    #[error("ffmpeg exited with {}", describe_exit(*code))]
    ExternalProcessor {
        code: Option<i32>,
        diagnostics: String,
        output: PathBuf,
    },

    #[error("Extraction was cancelled by user")]
    Interrupted,

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl ExtractorError {
    /// Process exit code for this failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            ExtractorError::UnsupportedFormat { .. } => 2,
            ExtractorError::InputNotFound { .. } => 3,
            ExtractorError::ProcessorNotFound { .. } => 4,
            ExtractorError::OutputPathInvalid { .. } => 5,
            ExtractorError::ExternalProcessor { .. } => 6,
            ExtractorError::Interrupted => 130,
            ExtractorError::Io(_) | ExtractorError::Config { .. } => 1,
        }
    }
}

impl UserFriendlyError for ExtractorError {
    fn user_message(&self) -> String {
        match self {
            ExtractorError::InputNotFound { path } => {
                format!("Input file not found: {}", path.display())
            }
            ExtractorError::UnsupportedFormat { format } => {
                format!(
                    "Unsupported audio format '{}' (supported: {})",
                    format,
                    crate::format::AudioFormat::supported_list()
                )
            }
            ExtractorError::ProcessorNotFound { program } => {
                format!("ffmpeg is not installed or could not be run ({})", program)
            }
            ExtractorError::OutputPathInvalid { path, reason } => {
                format!("Invalid output path {}: {}", path.display(), reason)
            }
            ExtractorError::ExternalProcessor { code, diagnostics, .. } => {
                let diagnostics = diagnostics.trim();
                if diagnostics.is_empty() {
                    format!("Extraction failed: ffmpeg exited with {}", describe_exit(*code))
                } else {
                    format!(
                        "Extraction failed: ffmpeg exited with {}\n{}",
                        describe_exit(*code),
                        diagnostics
                    )
                }
            }
            ExtractorError::Interrupted => "Extraction cancelled by user".to_string(),
            ExtractorError::Io(e) => format!("IO error: {}", e),
            ExtractorError::Config { message } => format!("Configuration error: {}", message),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            ExtractorError::InputNotFound { .. } => Some(
                "Check that the path points to an existing, readable video file.".to_string()
            ),
            ExtractorError::UnsupportedFormat { .. } => Some(
                "Choose one of the supported formats with --format (e.g., --format mp3).".to_string()
            ),
            ExtractorError::ProcessorNotFound { .. } => Some(
                "Install ffmpeg and make sure it is on your PATH (macOS: brew install ffmpeg, \
                 Debian/Ubuntu: apt-get install ffmpeg, Windows: https://ffmpeg.org/download.html), \
                 or point to the binary with --ffmpeg."
                    .to_string(),
            ),
            ExtractorError::OutputPathInvalid { .. } => Some(
                "Create the target directory first or choose a different path with --output.".to_string()
            ),
            ExtractorError::ExternalProcessor { output, .. } => Some(format!(
                "Review the ffmpeg output above. A partial file may have been left at {}.",
                output.display()
            )),
            ExtractorError::Interrupted => Some(
                "The partially written output file, if any, was left in place.".to_string()
            ),
            ExtractorError::Config { .. } => Some(
                "Check your configuration file syntax and values.".to_string()
            ),
            ExtractorError::Io(_) => None,
        }
    }
}

impl From<toml::de::Error> for ExtractorError {
    fn from(error: toml::de::Error) -> Self {
        ExtractorError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractorError>;

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let error = ExtractorError::UnsupportedFormat {
            format: "xyz".to_string(),
        };
        assert!(error.user_message().contains("xyz"));
        assert!(error.user_message().contains("mp3"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_processor_not_found_has_remediation() {
        let error = ExtractorError::ProcessorNotFound {
            program: "ffmpeg".to_string(),
        };
        let suggestion = error.suggestion().unwrap();
        assert!(suggestion.contains("Install ffmpeg"));
        assert!(!error.user_message().contains("No such file"));
    }

    #[test]
    fn test_external_processor_keeps_diagnostics_verbatim() {
        let error = ExtractorError::ExternalProcessor {
            code: Some(1),
            diagnostics: "sample.mp4: Invalid data found when processing input".to_string(),
            output: PathBuf::from("sample.mp3"),
        };
        let message = error.user_message();
        assert!(message.contains("exit code 1"));
        assert!(message.contains("Invalid data found when processing input"));
        assert!(error.suggestion().unwrap().contains("sample.mp3"));
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            ExtractorError::UnsupportedFormat { format: "x".into() },
            ExtractorError::InputNotFound { path: "a".into() },
            ExtractorError::ProcessorNotFound { program: "ffmpeg".into() },
            ExtractorError::OutputPathInvalid { path: "b".into(), reason: String::new() },
            ExtractorError::ExternalProcessor {
                code: Some(1),
                diagnostics: String::new(),
                output: "c".into(),
            },
            ExtractorError::Interrupted,
        ];
        let mut codes: Vec<i32> = errors.iter().map(|e| e.exit_code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|c| *c != 0));
    }

    #[test]
    fn test_signal_exit_description() {
        assert_eq!(describe_exit(None), "no exit code (terminated by signal)");
        assert_eq!(describe_exit(Some(8)), "exit code 8");
    }
}
