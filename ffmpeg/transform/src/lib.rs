/*!
    Frame transformation stages for the ffmpeg crate ecosystem.

    Decoders output frames in whatever shape the codec chose; encoders
    and consumers usually want another. This crate sits in between:

    - [`VideoScaler`] - resizing and pixel format conversion
    - [`AudioResampler`] - sample rate, sample format and channel layout conversion
    - [`AudioFifo`] - re-chunking audio into the frame size an encoder requires
    - [`FilterGraph`] - arbitrary FFmpeg filter chains, e.g. `"scale=320:240,hflip"`

    # Stateless vs Stateful

    **Scaling is stateless**: each frame converts independently.

    **Resampling and filtering are stateful**: both keep history between
    frames. Feed frames in order, and at the end of the stream call
    [`AudioResampler::flush`] or [`FilterGraph::push_eof`] to get the
    buffered remainder.

    # Example

    ```ignore
    use ffmpeg_transform::{ScalingAlgorithm, VideoScaler};
    use ffmpeg_core::PixelFormat;

    let mut scaler = VideoScaler::new(
        1920, 1080, PixelFormat::NV12,
        640, 360, PixelFormat::YUV420P,
        ScalingAlgorithm::default(),
    )?;
    let small = scaler.scale_to_new(&decoded)?;
    ```
*/

mod fifo;
mod filter;
mod resampler;
mod scaler;

pub use ffmpeg_core::{ChannelLayout, Error, Frame, PixelFormat, Result, SampleFormat, Status};

pub use self::fifo::AudioFifo;
pub use self::filter::FilterGraph;
pub use self::resampler::{AudioFormat, AudioResampler};
pub use self::scaler::{ScalingAlgorithm, VideoScaler};

static_assertions::assert_impl_all!(VideoScaler: Send);
static_assertions::assert_impl_all!(AudioResampler: Send);
static_assertions::assert_impl_all!(AudioFifo: Send);
static_assertions::assert_impl_all!(FilterGraph: Send);
static_assertions::assert_not_impl_any!(FilterGraph: Sync, Clone);
