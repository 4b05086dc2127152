/*!
    Media encoding for the ffmpeg crate ecosystem.

    This crate turns raw frames into a finished media file. A
    [`MediaWriter`] owns the output container and one encoder per
    declared stream; every frame written is encoded, and the resulting
    packets are rescaled into the stream's time base and muxed.

    # Example

    ```ignore
    use ffmpeg_core::{CodecId, PixelFormat, Rational};
    use ffmpeg_encode::{MediaWriter, VideoEncoderConfig};

    let mut writer = MediaWriter::create("out.mp4", None)?;
    writer.add_video_stream(VideoEncoderConfig::new(
        CodecId::MPEG4,
        640,
        480,
        PixelFormat::YUV420P,
        Rational::new(1, 25),
    ))?;
    writer.start()?;

    for frame in frames {
        writer.write_video_frame(&frame)?;
    }

    // Flushes the encoders and writes the trailer
    writer.finish()?;
    ```
*/

pub use ffmpeg_core::{Error, Result};

mod config;
mod writer;

pub use config::{AudioEncoderConfig, EncoderSelector, VideoEncoderConfig};
pub use writer::MediaWriter;

static_assertions::assert_impl_all!(MediaWriter: Send);
static_assertions::assert_impl_all!(VideoEncoderConfig: Send, Sync, Clone);
