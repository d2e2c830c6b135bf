use crate::error::{ExtractorError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

pub const DEFAULT_PROGRAM: &str = "ffmpeg";

/// Resolves the media processor executable.
pub trait ProcessorLocator: Send + Sync {
    fn locate(&self) -> Result<PathBuf>;
}

/// Looks the program up in a search path (`PATH` unless overridden).
pub struct SearchPathLocator {
    program: String,
    search_path: Option<OsString>,
}

impl SearchPathLocator {
    pub fn new() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            search_path: std::env::var_os("PATH"),
        }
    }

    pub fn with_search_path<S: Into<OsString>>(mut self, search_path: S) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    fn executable_name(&self) -> String {
        let suffix = std::env::consts::EXE_SUFFIX;
        if suffix.is_empty() || self.program.ends_with(suffix) {
            self.program.clone()
        } else {
            format!("{}{}", self.program, suffix)
        }
    }
}

impl Default for SearchPathLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessorLocator for SearchPathLocator {
    fn locate(&self) -> Result<PathBuf> {
        let name = self.executable_name();
        let search_path = self.search_path.as_deref().unwrap_or_default();

        for dir in std::env::split_paths(search_path) {
            let candidate = dir.join(&name);
            if candidate.is_file() {
                tracing::debug!("Found {} at {}", self.program, candidate.display());
                return Ok(candidate);
            }
        }

        Err(ExtractorError::ProcessorNotFound {
            program: format!("{} not found on PATH", self.program),
        })
    }
}

/// Uses an explicitly configured executable.
pub struct FixedPathLocator {
    path: PathBuf,
}

impl FixedPathLocator {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl ProcessorLocator for FixedPathLocator {
    fn locate(&self) -> Result<PathBuf> {
        if self.path.is_file() {
            Ok(self.path.clone())
        } else {
            Err(ExtractorError::ProcessorNotFound {
                program: format!("{} does not exist", self.path.display()),
            })
        }
    }
}

/// Runs `<processor> -version` and returns the first line of its output.
pub async fn probe_processor(path: &Path) -> Result<String> {
    let output = Command::new(path)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|e| {
            tracing::debug!("Probe of {} failed to start: {}", path.display(), e);
            ExtractorError::ProcessorNotFound {
                program: format!("{} could not be executed", path.display()),
            }
        })?;

    if !output.status.success() {
        return Err(ExtractorError::ProcessorNotFound {
            program: format!("{} -version failed ({})", path.display(), output.status),
        });
    }

    let version = String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_search_path_finds_program() {
        let temp_dir = TempDir::new().unwrap();
        let name = format!("ffmpeg{}", std::env::consts::EXE_SUFFIX);
        let binary = temp_dir.path().join(&name);
        std::fs::write(&binary, "").unwrap();

        let locator = SearchPathLocator::new().with_search_path(temp_dir.path());
        assert_eq!(locator.locate().unwrap(), binary);
    }

    #[test]
    fn test_search_path_missing_program() {
        let temp_dir = TempDir::new().unwrap();
        let locator = SearchPathLocator::new().with_search_path(temp_dir.path());

        let err = locator.locate().unwrap_err();
        assert!(matches!(err, ExtractorError::ProcessorNotFound { .. }));
    }

    #[test]
    fn test_search_path_ignores_directories() {
        let temp_dir = TempDir::new().unwrap();
        let name = format!("ffmpeg{}", std::env::consts::EXE_SUFFIX);
        std::fs::create_dir(temp_dir.path().join(name)).unwrap();

        let locator = SearchPathLocator::new().with_search_path(temp_dir.path());
        assert!(locator.locate().is_err());
    }

    #[test]
    fn test_fixed_path_locator() {
        let temp_dir = TempDir::new().unwrap();
        let binary = temp_dir.path().join("my-ffmpeg");
        std::fs::write(&binary, "").unwrap();

        assert_eq!(FixedPathLocator::new(&binary).locate().unwrap(), binary);
        assert!(FixedPathLocator::new(temp_dir.path().join("nope"))
            .locate()
            .is_err());
    }

    #[tokio::test]
    async fn test_probe_missing_binary() {
        let err = probe_processor(Path::new("/nonexistent/ffmpeg")).await.unwrap_err();
        assert!(matches!(err, ExtractorError::ProcessorNotFound { .. }));
    }
}
