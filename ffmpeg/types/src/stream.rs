/*!
    Stream kinds handled by the pipeline.
*/

use std::fmt;

/**
    Kind of elementary stream the reader and writer pipelines handle.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamType {
    /// Video stream
    Video,
    /// Audio stream
    Audio,
}

impl StreamType {
    /**
        Returns the lowercase name of this stream type.
    */
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_type_names() {
        assert_eq!(StreamType::Video.to_string(), "video");
        assert_eq!(StreamType::Audio.as_str(), "audio");
        assert_ne!(StreamType::Video, StreamType::Audio);
    }
}
