use std::path::Path;

use anyhow::{Context, Result, bail};
use ffmpeg_core::{CodecId, MediaType, Packet};
use ffmpeg_sink::{ContainerFormat, OutputContext};
use ffmpeg_source::InputContext;

use crate::output_url;

pub fn run(input: &str, output: &Path) -> Result<()> {
    let mut input_ctx =
        InputContext::open(input).with_context(|| format!("failed to open {input}"))?;
    let audio_index = input_ctx
        .find_best_stream(MediaType::Audio)
        .context("no audio stream found")?;
    let audio_stream = input_ctx
        .stream(audio_index)
        .context("audio stream disappeared")?;

    if audio_stream.codec_id != CodecId::AAC {
        bail!(
            "input audio codec is {:?}, only AAC can be remuxed to ADTS",
            audio_stream.codec_id
        );
    }

    let mut output_ctx = OutputContext::with_format(output_url(output)?, &ContainerFormat::Adts)?;
    let out_index = output_ctx.add_stream(None)?;
    output_ctx.copy_parameters_from(out_index, &input_ctx, audio_index)?;

    output_ctx.open_io()?;
    output_ctx.write_header(None)?;
    let out_time_base = output_ctx.stream_time_base(out_index)?;

    let mut packet = Packet::new()?;
    let mut packets = 0usize;
    while input_ctx.read_packet(&mut packet)? {
        if packet.stream_index() != audio_index {
            continue;
        }
        packet.rescale_ts(audio_stream.time_base, out_time_base);
        packet.set_stream_index(out_index);
        output_ctx.write_interleaved(&mut packet)?;
        packets += 1;
    }

    output_ctx.write_trailer()?;
    tracing::debug!(packets, "remux complete");
    println!("Wrote ADTS to {}", output.display());
    Ok(())
}
