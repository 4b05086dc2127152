/*!
    Media decoding for the ffmpeg crate ecosystem.

    This crate turns an input file into a stream of decoded frames. A
    [`MediaReader`] opens the container, attaches a decoder to the best
    video and audio streams, and hands out frames through lazy iterators.

    # Example

    ```ignore
    use ffmpeg_decode::{MediaReader, ReaderConfig};

    let mut reader = MediaReader::open_with("video.mp4", ReaderConfig::new().with_threads(4))?;
    println!("duration: {:?}", reader.duration());

    for frame in reader.video_frames() {
        let frame = frame?;
        println!("{}x{} pts={:?}", frame.width(), frame.height(), frame.pts());
    }
    ```

    # Video and Audio Together

    Each of [`MediaReader::video_frames`] and [`MediaReader::audio_frames`]
    reads the whole container and discards the other kind's packets. To
    consume both in one pass use [`MediaReader::frames`], which yields
    each frame tagged with its [`StreamType`]:

    ```ignore
    for item in reader.frames() {
        match item? {
            (StreamType::Video, frame) => { /* ... */ }
            (StreamType::Audio, frame) => { /* ... */ }
        }
    }
    ```

    At the end of the input the decoders are flushed, so frames buffered
    inside the codec are still delivered before the iterator ends.
*/

pub use ffmpeg_core::{Error, Frame, Result, StreamType};

mod config;
mod owned;
mod reader;

pub use config::ReaderConfig;
pub use owned::OwnedFrame;
pub use reader::{Frames, MediaReader, StreamFrames};

static_assertions::assert_impl_all!(OwnedFrame: Send);
static_assertions::assert_impl_all!(MediaReader: Send);
static_assertions::assert_not_impl_any!(OwnedFrame: Clone, Sync);
