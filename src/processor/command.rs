use crate::config::{DEFAULT_FLAC_COMPRESSION, DEFAULT_QUALITY};
use crate::format::AudioFormat;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// An ffmpeg invocation that extracts one audio stream into one file.
#[derive(Debug, Clone)]
pub struct ExtractionCommand {
    program: PathBuf,
    input: PathBuf,
    output: PathBuf,
    format: AudioFormat,
    quality: String,
    compression_level: u8,
    show_stats: bool,
}

impl ExtractionCommand {
    pub fn new<P, I, O>(program: P, input: I, output: O, format: AudioFormat) -> Self
    where
        P: Into<PathBuf>,
        I: Into<PathBuf>,
        O: Into<PathBuf>,
    {
        Self {
            program: program.into(),
            input: input.into(),
            output: output.into(),
            format,
            quality: DEFAULT_QUALITY.to_string(),
            compression_level: DEFAULT_FLAC_COMPRESSION,
            show_stats: true,
        }
    }

    pub fn with_quality<S: Into<String>>(mut self, quality: S) -> Self {
        self.quality = quality.into();
        self
    }

    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = level;
        self
    }

    /// Periodic `time=` stats on stderr; disabled with `-nostats`.
    pub fn with_stats(mut self, show_stats: bool) -> Self {
        self.show_stats = show_stats;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Bitrate actually passed to ffmpeg; `None` for lossless formats.
    pub fn bitrate(&self) -> Option<&str> {
        if self.format.is_lossless() {
            None
        } else {
            Some(&self.quality)
        }
    }

    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-hide_banner".into(),
            "-i".into(),
            self.input.clone().into_os_string(),
            "-vn".into(),
            "-acodec".into(),
            self.format.codec().into(),
        ];

        if let Some(bitrate) = self.bitrate() {
            args.push("-ab".into());
            args.push(bitrate.into());
        }

        if self.format == AudioFormat::Flac {
            args.push("-compression_level".into());
            args.push(self.compression_level.to_string().into());
        }

        args.push("-y".into());

        if !self.show_stats {
            args.push("-nostats".into());
        }

        args.push(self.output.clone().into_os_string());
        args
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.args().iter().any(|arg| arg == flag)
    }

    /// Shell-style rendering for logs and dry runs.
    pub fn display_line(&self) -> String {
        std::iter::once(self.program.clone().into_os_string())
            .chain(self.args())
            .map(|arg| quote_arg(&arg.to_string_lossy()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn to_command(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command.args(self.args());
        command
    }
}

fn quote_arg(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_alphanumeric() || "-_./:=+,@%".contains(c));

    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
