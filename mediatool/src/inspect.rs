use anyhow::{Context, Result};
use ffmpeg_source::InputContext;

pub fn run(input: &str) -> Result<()> {
    let ctx = InputContext::open(input).with_context(|| format!("failed to open {input}"))?;

    println!("Input: {input}");
    println!("Format: {}", ctx.format_name());
    println!(
        "Duration (s): {}",
        ctx.duration().map_or(-1.0, |d| d.as_secs_f64())
    );
    println!("Streams: {}", ctx.stream_count());

    for stream in ctx.streams() {
        println!(
            "#{} type={} codec={} timeBase={}",
            stream.index,
            format!("{:?}", stream.media_type).to_ascii_lowercase(),
            format!("{:?}", stream.codec_id).to_ascii_lowercase(),
            stream.time_base,
        );
    }

    for (key, value) in ctx.metadata() {
        println!("{key}: {value}");
    }

    Ok(())
}
