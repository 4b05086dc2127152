/*!
    Media output and muxing for the ffmpeg crate ecosystem.

    This crate handles the output side of the media pipeline. It takes
    encoded packets and writes them into container formats: MP4 files,
    MKV files, raw ADTS streams, etc.

    # Basic Usage

    ```ignore
    use ffmpeg_sink::{ContainerFormat, OutputContext};

    let mut output = OutputContext::with_format("out.aac", &ContainerFormat::Adts)?;
    let stream = output.add_stream(None)?;
    output.copy_parameters_from(stream, &input, audio_index)?;

    output.open_io()?;
    output.write_header(None)?;

    // Packets must carry the output stream index and its time base
    packet.set_stream_index(stream);
    output.write_interleaved(&mut packet)?;

    // Finalize the file (critical!)
    output.write_trailer()?;
    ```

    # Finalization

    Always write the trailer to properly finalize the container. Without it:
    - Duration may be unknown to players
    - Seeking may not work
    - Some players won't open the file
*/

mod config;
mod output;

pub use config::ContainerFormat;
pub use output::OutputContext;

static_assertions::assert_impl_all!(OutputContext: Send);
static_assertions::assert_impl_all!(ContainerFormat: Send, Sync, Clone);
