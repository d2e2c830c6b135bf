use crate::config::DEFAULT_QUALITY;
use crate::error::{ExtractorError, Result};
use crate::format::AudioFormat;
use std::fs::File;
use std::path::{Path, PathBuf};

/// One audio extraction as asked for by the user.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub format: AudioFormat,
    pub quality: String,
    pub show_progress: bool,
}

impl ExtractionRequest {
    pub fn new<P: Into<PathBuf>>(input: P) -> Self {
        Self {
            input: input.into(),
            output: None,
            format: AudioFormat::default(),
            quality: DEFAULT_QUALITY.to_string(),
            show_progress: true,
        }
    }

    pub fn with_output<P: Into<PathBuf>>(mut self, output: Option<P>) -> Self {
        self.output = output.map(Into::into);
        self
    }

    pub fn with_format(mut self, format: AudioFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_quality<S: Into<String>>(mut self, quality: S) -> Self {
        self.quality = quality.into();
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Check the request against the filesystem and resolve the output path.
    pub fn plan(&self) -> Result<ExtractionPlan> {
        let input_size = validate_input(&self.input)?;

        let (output, output_derived) = match self.output {
            Some(ref output) => (validate_output(output, &self.input)?, false),
            None => {
                let derived = derive_output_path(&self.input, self.format);
                if is_same_file(&derived, &self.input) {
                    return Err(ExtractorError::OutputPathInvalid {
                        path: derived,
                        reason: "derived output would overwrite the input file".to_string(),
                    });
                }
                (derived, true)
            }
        };

        Ok(ExtractionPlan {
            input: self.input.clone(),
            input_size,
            output,
            output_derived,
            format: self.format,
            quality: self.quality.clone(),
            show_progress: self.show_progress,
        })
    }
}

/// A validated request, ready to be turned into a processor command.
#[derive(Debug, Clone)]
pub struct ExtractionPlan {
    pub input: PathBuf,
    pub input_size: u64,
    pub output: PathBuf,
    pub output_derived: bool,
    pub format: AudioFormat,
    pub quality: String,
    pub show_progress: bool,
}

impl ExtractionPlan {
    pub fn bitrate(&self) -> Option<&str> {
        if self.format.is_lossless() {
            None
        } else {
            Some(&self.quality)
        }
    }
}

/// `<input-dir>/<input-stem>.<extension>`.
pub fn derive_output_path(input: &Path, format: AudioFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "audio".into());

    let mut file_name = stem;
    file_name.push(".");
    file_name.push(format.extension());

    match input.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// The input must be an existing, readable regular file. Returns its size.
pub fn validate_input(input: &Path) -> Result<u64> {
    let not_found = || ExtractorError::InputNotFound {
        path: input.to_path_buf(),
    };

    let metadata = std::fs::metadata(input).map_err(|_| not_found())?;
    if !metadata.is_file() {
        return Err(not_found());
    }

    File::open(input).map_err(|e| {
        tracing::debug!("Cannot open {}: {}", input.display(), e);
        not_found()
    })?;

    Ok(metadata.len())
}

fn validate_output(output: &Path, input: &Path) -> Result<PathBuf> {
    let invalid = |reason: &str| ExtractorError::OutputPathInvalid {
        path: output.to_path_buf(),
        reason: reason.to_string(),
    };

    if output.as_os_str().is_empty() {
        return Err(invalid("path is empty"));
    }

    if output.is_dir() {
        return Err(invalid("path is a directory"));
    }

    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            return Err(invalid("parent directory does not exist"));
        }
        _ => {}
    }

    if is_same_file(output, input) {
        return Err(invalid("output would overwrite the input file"));
    }

    Ok(output.to_path_buf())
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_input(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"not really a video").unwrap();
        path
    }

    #[test]
    fn test_derive_output_path_for_every_format() {
        for format in AudioFormat::ALL {
            let output = derive_output_path(Path::new("/videos/sample.mp4"), format);
            assert_eq!(
                output,
                PathBuf::from(format!("/videos/sample.{}", format.extension()))
            );
        }
    }

    #[test]
    fn test_derive_output_path_keeps_inner_dots() {
        let output = derive_output_path(Path::new("clips/my.holiday.mkv"), AudioFormat::Wav);
        assert_eq!(output, PathBuf::from("clips/my.holiday.wav"));
    }

    #[test]
    fn test_derive_output_path_relative_bare_name() {
        let output = derive_output_path(Path::new("sample.mkv"), AudioFormat::Flac);
        assert_eq!(output, PathBuf::from("sample.flac"));
    }

    #[test]
    fn test_plan_derives_output_next_to_input() {
        let dir = TempDir::new().unwrap();
        let input = sample_input(&dir, "sample.mp4");

        let plan = ExtractionRequest::new(&input).plan().unwrap();
        assert_eq!(plan.output, dir.path().join("sample.mp3"));
        assert!(plan.output_derived);
        assert_eq!(plan.input_size, 18);
        assert_eq!(plan.bitrate(), Some("192k"));
    }

    #[test]
    fn test_plan_uses_explicit_output_verbatim() {
        let dir = TempDir::new().unwrap();
        let input = sample_input(&dir, "sample.mp4");
        let custom = dir.path().join("custom.ext");

        let plan = ExtractionRequest::new(&input)
            .with_format(AudioFormat::Flac)
            .with_output(Some(&custom))
            .plan()
            .unwrap();
        assert_eq!(plan.output, custom);
        assert!(!plan.output_derived);
        assert_eq!(plan.bitrate(), None);
    }

    #[test]
    fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let err = ExtractionRequest::new(dir.path().join("missing.mp4"))
            .plan()
            .unwrap_err();
        assert!(matches!(err, ExtractorError::InputNotFound { .. }));
    }

    #[test]
    fn test_directory_is_not_an_input() {
        let dir = TempDir::new().unwrap();
        let err = validate_input(dir.path()).unwrap_err();
        assert!(matches!(err, ExtractorError::InputNotFound { .. }));
    }

    #[test]
    fn test_output_parent_must_exist() {
        let dir = TempDir::new().unwrap();
        let input = sample_input(&dir, "sample.mp4");

        let err = ExtractionRequest::new(&input)
            .with_output(Some(dir.path().join("missing").join("out.mp3")))
            .plan()
            .unwrap_err();
        assert!(matches!(err, ExtractorError::OutputPathInvalid { .. }));
    }

    #[test]
    fn test_output_cannot_be_directory_or_input() {
        let dir = TempDir::new().unwrap();
        let input = sample_input(&dir, "sample.mp4");

        let err = ExtractionRequest::new(&input)
            .with_output(Some(dir.path()))
            .plan()
            .unwrap_err();
        assert!(matches!(err, ExtractorError::OutputPathInvalid { .. }));

        let err = ExtractionRequest::new(&input)
            .with_output(Some(&input))
            .plan()
            .unwrap_err();
        assert!(matches!(err, ExtractorError::OutputPathInvalid { .. }));
    }

    #[test]
    fn test_derived_output_cannot_be_input() {
        let dir = TempDir::new().unwrap();
        let input = sample_input(&dir, "song.mp3");

        let err = ExtractionRequest::new(&input).plan().unwrap_err();
        assert!(matches!(err, ExtractorError::OutputPathInvalid { .. }));

        let plan = ExtractionRequest::new(&input)
            .with_format(AudioFormat::Ogg)
            .plan()
            .unwrap();
        assert_eq!(plan.output, dir.path().join("song.ogg"));
    }

    #[test]
    fn test_bare_output_name_uses_current_directory() {
        let dir = TempDir::new().unwrap();
        let input = sample_input(&dir, "sample.mp4");

        let plan = ExtractionRequest::new(&input)
            .with_output(Some("custom.mp3"))
            .plan()
            .unwrap();
        assert_eq!(plan.output, PathBuf::from("custom.mp3"));
    }
}
