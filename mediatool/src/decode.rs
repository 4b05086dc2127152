use anyhow::{Context, Result};
use ffmpeg_decode::MediaReader;

use crate::format_pts;

pub fn run(input: &str, max_frames: usize) -> Result<()> {
    let mut reader =
        MediaReader::open(input).with_context(|| format!("failed to open {input}"))?;

    println!("Input: {input}");
    println!(
        "Duration (s): {}",
        reader.duration().map_or(-1.0, |d| d.as_secs_f64())
    );

    let mut count = 0;
    for frame in reader.video_frames() {
        if count >= max_frames {
            break;
        }
        let frame = frame.context("decoding failed")?;
        println!(
            "frame {count}: {}x{} pts={}",
            frame.width(),
            frame.height(),
            format_pts(frame.pts())
        );
        count += 1;
    }

    println!("Decoded frames: {count}");
    Ok(())
}
