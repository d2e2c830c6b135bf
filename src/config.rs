use crate::error::{ExtractorError, Result};
use crate::format::AudioFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_QUALITY: &str = "192k";
pub const DEFAULT_FLAC_COMPRESSION: u8 = 5;
const MAX_FLAC_COMPRESSION: u8 = 12;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub processor: ProcessorConfig,
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Explicit ffmpeg binary; searched on PATH when unset.
    pub path: Option<PathBuf>,
    pub compression_level: u8,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub format: String,
    pub quality: String,
    pub show_progress: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            path: None,
            compression_level: DEFAULT_FLAC_COMPRESSION,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            format: AudioFormat::default().to_string(),
            quality: DEFAULT_QUALITY.to_string(),
            show_progress: true,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ExtractorError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ExtractorError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ExtractorError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["audio-extractor.toml", ".audio-extractor.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref path) = cli_args.processor_path {
            self.processor.path = Some(path.clone());
        }

        if let Some(ref format) = cli_args.format {
            self.defaults.format = format.clone();
        }

        if let Some(ref quality) = cli_args.quality {
            self.defaults.quality = quality.clone();
        }

        if cli_args.no_progress {
            self.defaults.show_progress = false;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| ExtractorError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| ExtractorError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    /// Settings-level checks. The output format is validated at extraction
    /// time and reported as `UnsupportedFormat`.
    pub fn validate(&self) -> Result<()> {
        if self.processor.compression_level > MAX_FLAC_COMPRESSION {
            return Err(ExtractorError::Config {
                message: format!(
                    "FLAC compression level must be between 0 and {} (got {})",
                    MAX_FLAC_COMPRESSION, self.processor.compression_level
                ),
            });
        }

        if let Some(ref path) = self.processor.path {
            if path.as_os_str().is_empty() {
                return Err(ExtractorError::Config {
                    message: "Processor path must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub processor_path: Option<PathBuf>,
    pub format: Option<String>,
    pub quality: Option<String>,
    pub no_progress: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_processor_path(mut self, path: Option<PathBuf>) -> Self {
        self.processor_path = path;
        self
    }

    pub fn with_format(mut self, format: Option<String>) -> Self {
        self.format = format;
        self
    }

    pub fn with_quality(mut self, quality: Option<String>) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_no_progress(mut self, no_progress: bool) -> Self {
        self.no_progress = no_progress;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.defaults.format, "mp3");
        assert_eq!(config.defaults.quality, "192k");
        assert!(config.defaults.show_progress);
        assert_eq!(config.processor.compression_level, 5);
        assert!(config.processor.path.is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.defaults.quality = String::new();
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.processor.compression_level = 13;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_format_is_not_a_config_error() {
        let mut config = Config::default();
        config.defaults.format = "xyz".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_operations() {
        let mut config = Config::default();
        config.defaults.quality = "320k".to_string();
        config.processor.path = Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.defaults.quality, "320k");
        assert_eq!(loaded.processor.path, config.processor.path);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[defaults]\nformat = \"flac\"\n").unwrap();

        let loaded = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.defaults.format, "flac");
        assert_eq!(loaded.defaults.quality, "192k");
        assert_eq!(loaded.processor.compression_level, 5);
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::load_from_file("/definitely/not/here.toml");
        assert!(matches!(result, Err(ExtractorError::Config { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_format(Some("wav".to_string()))
            .with_quality(Some("128k".to_string()))
            .with_processor_path(Some(PathBuf::from("/usr/local/bin/ffmpeg")))
            .with_no_progress(true);

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.defaults.format, "wav");
        assert_eq!(config.defaults.quality, "128k");
        assert!(!config.defaults.show_progress);
        assert_eq!(
            config.processor.path,
            Some(PathBuf::from("/usr/local/bin/ffmpeg"))
        );
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(sample.contains("[processor]"));
        assert!(sample.contains("[defaults]"));
        assert!(sample.contains("quality = \"192k\""));
    }
}
