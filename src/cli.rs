use crate::config::{CliOverrides, Config};
use crate::error::{ExtractorError, Result};
use crate::extractor::ExtractionRequest;
use crate::format::AudioFormat;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "audio-extractor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract audio from video files (supports large files 2GB+)")]
#[command(
    long_about = "audio-extractor pulls the audio track out of a video file with ffmpeg, \
                  streaming directly between files so memory use stays constant regardless \
                  of input size."
)]
#[command(after_help = "EXAMPLES:\n  \
    audio-extractor video.mp4\n  \
    audio-extractor video.mp4 -o output.mp3\n  \
    audio-extractor video.mp4 -f wav\n  \
    audio-extractor video.mp4 -f ogg -q 320k\n  \
    audio-extractor video.mkv -f flac --no-progress")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Path to the input video file
    #[arg(value_name = "INPUT", required_unless_present = "generate_config")]
    pub input_file: Option<PathBuf>,

    /// Path to the output audio file (derived from the input if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output audio format: mp3, wav, aac, flac, ogg, m4a (default: mp3)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Audio bitrate (default: 192k), e.g. 128k, 192k, 256k, 320k. Ignored for wav and flac
    #[arg(short, long, value_name = "BITRATE")]
    pub quality: Option<String>,

    /// Hide progress information
    #[arg(long)]
    pub no_progress: bool,

    /// Path to the ffmpeg executable (searched on PATH by default)
    #[arg(long, value_name = "PATH", env = "AUDIO_EXTRACTOR_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show the ffmpeg command without running it)
    #[arg(long, help = "Show what would be run without actually doing it")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_processor_path(self.ffmpeg.clone())
            .with_format(self.format.clone())
            .with_quality(self.quality.clone())
            .with_no_progress(self.no_progress)
    }

    /// Build the extraction request from the arguments and merged settings.
    pub fn to_request(&self, config: &Config) -> Result<ExtractionRequest> {
        let input = self
            .input_file
            .clone()
            .ok_or_else(|| ExtractorError::Config {
                message: "No input file given".to_string(),
            })?;

        let format: AudioFormat = config.defaults.format.parse()?;

        Ok(ExtractionRequest::new(input)
            .with_output(self.output.clone())
            .with_format(format)
            .with_quality(config.defaults.quality.clone())
            .with_progress(config.defaults.show_progress && !self.quiet))
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["audio-extractor"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["video.mp4"]);
        let request = cli.to_request(&Config::default()).unwrap();

        assert_eq!(request.input, PathBuf::from("video.mp4"));
        assert_eq!(request.output, None);
        assert_eq!(request.format, AudioFormat::Mp3);
        assert_eq!(request.quality, "192k");
        assert!(request.show_progress);
    }

    #[test]
    fn test_all_options() {
        let cli = parse(&[
            "video.mkv",
            "-o",
            "out/track.ogg",
            "-f",
            "OGG",
            "-q",
            "320k",
            "--no-progress",
        ]);

        let mut config = Config::default();
        config.merge_with_cli_args(&cli.create_cli_overrides());
        let request = cli.to_request(&config).unwrap();

        assert_eq!(request.output, Some(PathBuf::from("out/track.ogg")));
        assert_eq!(request.format, AudioFormat::Ogg);
        assert_eq!(request.quality, "320k");
        assert!(!request.show_progress);
    }

    #[test]
    fn test_unsupported_format_is_reported_by_request() {
        let cli = parse(&["video.mp4", "-f", "xyz"]);
        let mut config = Config::default();
        config.merge_with_cli_args(&cli.create_cli_overrides());

        let err = cli.to_request(&config).unwrap_err();
        assert!(matches!(err, ExtractorError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_config_defaults_apply_without_flags() {
        let cli = parse(&["video.mp4"]);
        let mut config = Config::default();
        config.defaults.format = "flac".to_string();
        config.defaults.show_progress = false;

        let request = cli.to_request(&config).unwrap();
        assert_eq!(request.format, AudioFormat::Flac);
        assert!(!request.show_progress);
    }

    #[test]
    fn test_generate_config_needs_no_input() {
        let cli = parse(&["--generate-config"]);
        assert!(cli.generate_config);
        assert!(cli.input_file.is_none());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["audio-extractor", "video.mp4", "--quiet", "-v"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbosity_level() {
        assert_eq!(parse(&["video.mp4", "-vv"]).verbosity_level(), 2);
        assert_eq!(parse(&["video.mp4", "--quiet"]).verbosity_level(), 0);
        assert_eq!(parse(&["video.mp4"]).verbosity_level(), 0);
    }
}
