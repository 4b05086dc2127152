/*!
    Encoder configuration types.
*/

use ffmpeg_core::{ChannelLayout, Codec, CodecId, PixelFormat, Rational, SampleFormat};

/**
    How to pick an encoder implementation.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncoderSelector {
    /// The preferred encoder for a codec, e.g. `CodecId::AAC`.
    Id(CodecId),
    /// A specific encoder by name, e.g. `"libx264"`.
    Name(String),
}

impl EncoderSelector {
    /**
        Look up the encoder, `None` if this FFmpeg build lacks it.
    */
    pub fn find(&self) -> Option<Codec> {
        match self {
            Self::Id(id) => Codec::find_encoder(*id),
            Self::Name(name) => Codec::find_encoder_by_name(name),
        }
    }
}

impl From<CodecId> for EncoderSelector {
    fn from(id: CodecId) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for EncoderSelector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for EncoderSelector {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/**
    Configuration for a video output stream.
*/
#[derive(Clone, Debug)]
pub struct VideoEncoderConfig {
    /// Encoder to use.
    pub encoder: EncoderSelector,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format of the frames that will be written.
    pub pixel_format: PixelFormat,
    /// Time base of the frames' timestamps.
    pub time_base: Rational,
    /// Nominal frame rate, if known.
    pub frame_rate: Option<Rational>,
    /// Target bit rate in bits per second (0 = encoder default).
    pub bit_rate: i64,
    /// Distance between keyframes.
    pub gop_size: i32,
    /// Maximum consecutive B-frames.
    pub max_b_frames: i32,
    /// Encoder worker threads (None = let FFmpeg decide).
    pub threads: Option<u32>,
    /// Encoder private options, e.g. `("preset", "fast")`.
    pub options: Vec<(String, String)>,
}

impl VideoEncoderConfig {
    /**
        Create a config with a keyframe every 12 frames and no B-frames.
    */
    pub fn new(
        encoder: impl Into<EncoderSelector>,
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
        time_base: Rational,
    ) -> Self {
        Self {
            encoder: encoder.into(),
            width,
            height,
            pixel_format,
            time_base,
            frame_rate: None,
            bit_rate: 0,
            gop_size: 12,
            max_b_frames: 0,
            threads: None,
            options: Vec::new(),
        }
    }

    pub fn with_frame_rate(mut self, frame_rate: Rational) -> Self {
        self.frame_rate = Some(frame_rate);
        self
    }

    pub fn with_bit_rate(mut self, bit_rate: i64) -> Self {
        self.bit_rate = bit_rate;
        self
    }

    pub fn with_gop_size(mut self, gop_size: i32) -> Self {
        self.gop_size = gop_size;
        self
    }

    pub fn with_max_b_frames(mut self, max_b_frames: i32) -> Self {
        self.max_b_frames = max_b_frames;
        self
    }

    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = Some(threads);
        self
    }

    /**
        Add an encoder option.
    */
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((key.into(), value.into()));
        self
    }
}

/**
    Configuration for an audio output stream.
*/
#[derive(Clone, Debug)]
pub struct AudioEncoderConfig {
    /// Encoder to use.
    pub encoder: EncoderSelector,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Sample format of the frames that will be written.
    pub sample_format: SampleFormat,
    /// Channel layout of the frames that will be written.
    pub channel_layout: ChannelLayout,
    /// Time base of the frames' timestamps, usually `1/sample_rate`.
    pub time_base: Rational,
    /// Target bit rate in bits per second (0 = encoder default).
    pub bit_rate: i64,
    /// Encoder private options.
    pub options: Vec<(String, String)>,
}

impl AudioEncoderConfig {
    pub fn new(
        encoder: impl Into<EncoderSelector>,
        sample_rate: u32,
        sample_format: SampleFormat,
        channel_layout: ChannelLayout,
        time_base: Rational,
    ) -> Self {
        Self {
            encoder: encoder.into(),
            sample_rate,
            sample_format,
            channel_layout,
            time_base,
            bit_rate: 0,
            options: Vec::new(),
        }
    }

    pub fn with_bit_rate(mut self, bit_rate: i64) -> Self {
        self.bit_rate = bit_rate;
        self
    }

    /**
        Add an encoder option.
    */
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((key.into(), value.into()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_defaults() {
        let config = VideoEncoderConfig::new(
            CodecId::MPEG4,
            640,
            480,
            PixelFormat::YUV420P,
            Rational::new(1, 25),
        );
        assert_eq!(config.gop_size, 12);
        assert_eq!(config.max_b_frames, 0);
        assert_eq!(config.bit_rate, 0);
        assert_eq!(config.frame_rate, None);
        assert_eq!(config.encoder, EncoderSelector::Id(CodecId::MPEG4));
    }

    #[test]
    fn video_builder() {
        let config = VideoEncoderConfig::new(
            "libx264",
            1280,
            720,
            PixelFormat::YUV420P,
            Rational::new(1, 30),
        )
        .with_frame_rate(Rational::new(30, 1))
        .with_bit_rate(2_000_000)
        .with_gop_size(60)
        .with_max_b_frames(2)
        .with_option("preset", "fast");
        assert_eq!(config.encoder, EncoderSelector::Name("libx264".into()));
        assert_eq!(config.gop_size, 60);
        assert_eq!(config.max_b_frames, 2);
        assert_eq!(config.options, vec![("preset".into(), "fast".into())]);
    }

    #[test]
    fn selectors_find_builtin_encoders() {
        assert!(EncoderSelector::from("pcm_s16le").find().is_some());
        assert!(EncoderSelector::from("definitely_not_an_encoder").find().is_none());
    }
}
