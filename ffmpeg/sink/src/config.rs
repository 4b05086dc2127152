/*!
    Output container selection.
*/

use std::path::Path;

/**
    Container format for output.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContainerFormat {
    /// MP4 container (most compatible).
    Mp4,
    /// Matroska container (most flexible).
    Matroska,
    /// MPEG transport stream.
    MpegTs,
    /// Raw AAC with ADTS headers.
    Adts,
    /// MPEG audio layer 3.
    Mp3,
    /// RIFF WAVE, for PCM audio.
    Wav,
    /// FFmpeg's own container, accepts any codec.
    Nut,
    /// Any other muxer, by FFmpeg short name.
    Named(String),
}

impl ContainerFormat {
    /**
        Get the FFmpeg format name for this container.
    */
    pub fn ffmpeg_format_name(&self) -> &str {
        match self {
            Self::Mp4 => "mp4",
            Self::Matroska => "matroska",
            Self::MpegTs => "mpegts",
            Self::Adts => "adts",
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Nut => "nut",
            Self::Named(name) => name,
        }
    }

    /**
        Get the typical file extension for this container.
    */
    pub fn extension(&self) -> &str {
        match self {
            Self::Mp4 => "mp4",
            Self::Matroska => "mkv",
            Self::MpegTs => "ts",
            Self::Adts => "aac",
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Nut => "nut",
            Self::Named(name) => name,
        }
    }

    /**
        Pick a container from a file extension, if it is a known one.
    */
    pub fn from_extension(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        Some(match ext.as_str() {
            "mp4" | "m4a" | "m4v" | "mov" => Self::Mp4,
            "mkv" | "mka" | "webm" => Self::Matroska,
            "ts" | "m2ts" => Self::MpegTs,
            "aac" | "adts" => Self::Adts,
            "mp3" => Self::Mp3,
            "wav" => Self::Wav,
            "nut" => Self::Nut,
            _ => return None,
        })
    }
}

impl From<&str> for ContainerFormat {
    fn from(name: &str) -> Self {
        match name {
            "mp4" => Self::Mp4,
            "matroska" | "mkv" => Self::Matroska,
            "mpegts" => Self::MpegTs,
            "adts" => Self::Adts,
            "mp3" => Self::Mp3,
            "wav" => Self::Wav,
            "nut" => Self::Nut,
            other => Self::Named(other.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names() {
        assert_eq!(ContainerFormat::Mp4.ffmpeg_format_name(), "mp4");
        assert_eq!(ContainerFormat::Matroska.ffmpeg_format_name(), "matroska");
        assert_eq!(ContainerFormat::Adts.ffmpeg_format_name(), "adts");
        assert_eq!(
            ContainerFormat::Named("flv".into()).ffmpeg_format_name(),
            "flv"
        );
    }

    #[test]
    fn extensions() {
        assert_eq!(ContainerFormat::Matroska.extension(), "mkv");
        assert_eq!(ContainerFormat::MpegTs.extension(), "ts");
        assert_eq!(ContainerFormat::Adts.extension(), "aac");
    }

    #[test]
    fn from_extension() {
        assert_eq!(
            ContainerFormat::from_extension("out/Movie.MKV"),
            Some(ContainerFormat::Matroska)
        );
        assert_eq!(
            ContainerFormat::from_extension("a.aac"),
            Some(ContainerFormat::Adts)
        );
        assert_eq!(ContainerFormat::from_extension("noext"), None);
        assert_eq!(ContainerFormat::from_extension("file.xyz"), None);
    }

    #[test]
    fn from_name() {
        assert_eq!(ContainerFormat::from("mkv"), ContainerFormat::Matroska);
        assert_eq!(
            ContainerFormat::from("ogg"),
            ContainerFormat::Named("ogg".into())
        );
    }
}
