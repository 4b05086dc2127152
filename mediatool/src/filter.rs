use anyhow::{Context, Result};
use ffmpeg_core::{Frame, Status};
use ffmpeg_decode::MediaReader;
use ffmpeg_transform::FilterGraph;

use crate::format_pts;

pub fn run(input: &str, description: &str, max_frames: usize) -> Result<()> {
    let mut reader =
        MediaReader::open(input).with_context(|| format!("failed to open {input}"))?;
    let mut graph = FilterGraph::new()?;
    let mut filtered = Frame::new()?;

    println!("Input: {input}");

    let mut count = 0;
    for frame in reader.video_frames() {
        let frame = frame.context("decoding failed")?;

        if !graph.is_configured() {
            graph
                .configure_video(
                    description,
                    frame.width(),
                    frame.height(),
                    frame.pixel_format(),
                    frame.time_base(),
                )
                .with_context(|| format!("invalid filter graph {description:?}"))?;
        }

        graph.push(&frame)?;
        count += print_filtered(&mut graph, &mut filtered, count, max_frames)?;
        if count >= max_frames {
            break;
        }
    }

    // Filters like reverse or tpad hold frames back until the input ends.
    if graph.is_configured() && count < max_frames {
        graph.push_eof()?;
        count += print_filtered(&mut graph, &mut filtered, count, max_frames)?;
    }

    println!("Filtered frames: {count}");
    Ok(())
}

/**
    Pull and print every frame the graph has ready, stopping at `max_frames`.

    Returns how many frames were printed.
*/
fn print_filtered(
    graph: &mut FilterGraph,
    filtered: &mut Frame,
    start: usize,
    max_frames: usize,
) -> Result<usize> {
    let mut count = start;
    while count < max_frames && graph.pull(filtered)? == Status::Success {
        println!(
            "filtered {count}: {}x{} pts={}",
            filtered.width(),
            filtered.height(),
            format_pts(filtered.pts())
        );
        count += 1;
    }
    Ok(count - start)
}
