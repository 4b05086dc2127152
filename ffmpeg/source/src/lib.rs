/*!
    Media input and demuxing for the ffmpeg crate ecosystem.

    This crate handles the input side of the media pipeline. It opens a
    container (a local file or any protocol URL FFmpeg understands),
    describes its streams and reads compressed packets in file order.

    # Basic Usage

    ```ignore
    use ffmpeg_source::InputContext;
    use ffmpeg_core::{MediaType, Packet};

    let mut input = InputContext::open("movie.mp4")?;
    let audio = input.find_best_stream(MediaType::Audio)?;

    let mut packet = Packet::new()?;
    while input.read_packet(&mut packet)? {
        if packet.stream_index() == audio {
            // hand the packet to a decoder
        }
    }
    ```

    Stream metadata is returned as [`StreamInfo`] snapshots, so it can be
    kept around after the container is gone. Codec parameters are borrowed
    from the container through [`InputContext::parameters`].
*/

mod input;
mod stream;

pub use input::{InputContext, SeekFlags};
pub use stream::StreamInfo;

static_assertions::assert_impl_all!(InputContext: Send);
static_assertions::assert_impl_all!(StreamInfo: Send, Sync, Clone);
