use crate::error::{ExtractorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output audio formats understood by the extractor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Wav,
    Aac,
    Flac,
    Ogg,
    M4a,
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 6] = [
        AudioFormat::Mp3,
        AudioFormat::Wav,
        AudioFormat::Aac,
        AudioFormat::Flac,
        AudioFormat::Ogg,
        AudioFormat::M4a,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::Aac => "aac",
            AudioFormat::Flac => "flac",
            AudioFormat::Ogg => "ogg",
            AudioFormat::M4a => "m4a",
        }
    }

    /// File extension written for this format.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// ffmpeg encoder name passed to `-acodec`.
    pub fn codec(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "libmp3lame",
            AudioFormat::Wav => "pcm_s16le",
            AudioFormat::Aac => "aac",
            AudioFormat::Flac => "flac",
            AudioFormat::Ogg => "libvorbis",
            AudioFormat::M4a => "aac",
        }
    }

    /// Lossless formats ignore the bitrate setting.
    pub fn is_lossless(&self) -> bool {
        matches!(self, AudioFormat::Wav | AudioFormat::Flac)
    }

    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for AudioFormat {
    type Err = ExtractorError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == normalized)
            .ok_or_else(|| ExtractorError::UnsupportedFormat {
                format: s.to_string(),
            })
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("MP3".parse::<AudioFormat>().unwrap(), AudioFormat::Mp3);
        assert_eq!(" Flac ".parse::<AudioFormat>().unwrap(), AudioFormat::Flac);
        assert_eq!("m4a".parse::<AudioFormat>().unwrap(), AudioFormat::M4a);
    }

    #[test]
    fn test_unsupported_format() {
        let err = "xyz".parse::<AudioFormat>().unwrap_err();
        assert!(matches!(err, ExtractorError::UnsupportedFormat { ref format } if format == "xyz"));
        assert!("".parse::<AudioFormat>().is_err());
        assert!("mp4".parse::<AudioFormat>().is_err());
    }

    #[test]
    fn test_codec_table() {
        assert_eq!(AudioFormat::Mp3.codec(), "libmp3lame");
        assert_eq!(AudioFormat::Wav.codec(), "pcm_s16le");
        assert_eq!(AudioFormat::Flac.codec(), "flac");
        assert_eq!(AudioFormat::Aac.codec(), "aac");
        assert_eq!(AudioFormat::Ogg.codec(), "libvorbis");
        assert_eq!(AudioFormat::M4a.codec(), "aac");
    }

    #[test]
    fn test_lossless_formats() {
        let lossless: Vec<_> = AudioFormat::ALL.iter().filter(|f| f.is_lossless()).collect();
        assert_eq!(lossless, vec![&AudioFormat::Wav, &AudioFormat::Flac]);
    }

    #[test]
    fn test_every_format_parses_from_its_extension() {
        for format in AudioFormat::ALL {
            assert_eq!(format.extension().parse::<AudioFormat>().unwrap(), format);
        }
    }
}
