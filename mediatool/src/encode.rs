use std::path::Path;

use anyhow::{Context, Result, bail};
use ffmpeg_core::{Codec, CodecId, PixelFormat};
use ffmpeg_decode::MediaReader;
use ffmpeg_encode::{MediaWriter, VideoEncoderConfig};
use ffmpeg_transform::{ScalingAlgorithm, VideoScaler};

use crate::output_url;

const TARGET_FORMAT: PixelFormat = PixelFormat::YUV420P;

/**
    H.264 when this FFmpeg build has an encoder for it, MPEG-4 part 2 otherwise.
*/
fn pick_encoder() -> Result<CodecId> {
    [CodecId::H264, CodecId::MPEG4]
        .into_iter()
        .find(|id| Codec::find_encoder(*id).is_some())
        .context("no H.264 or MPEG-4 encoder in this FFmpeg build")
}

pub fn run(input: &str, output: &Path, max_frames: usize) -> Result<()> {
    let mut reader =
        MediaReader::open(input).with_context(|| format!("failed to open {input}"))?;
    let Some(stream_index) = reader.video_stream_index() else {
        bail!("no video stream found");
    };
    let stream = reader
        .input()
        .stream(stream_index)
        .context("video stream disappeared")?;
    let encoder = pick_encoder()?;
    let url = output_url(output)?;

    let mut writer: Option<MediaWriter> = None;
    let mut scaler: Option<VideoScaler> = None;
    let mut count = 0;

    for frame in reader.video_frames() {
        if count >= max_frames {
            break;
        }
        let frame = frame.context("decoding failed")?;

        let writer = match writer.as_mut() {
            Some(writer) => writer,
            None => {
                let mut config = VideoEncoderConfig::new(
                    encoder,
                    frame.width(),
                    frame.height(),
                    TARGET_FORMAT,
                    stream.time_base,
                );
                if stream.average_frame_rate.is_valid() {
                    config = config.with_frame_rate(stream.average_frame_rate);
                }
                let mut created = MediaWriter::create(url, None)?;
                created.add_video_stream(config)?;
                created.start()?;
                tracing::debug!(?encoder, width = frame.width(), height = frame.height(), "started encoding");
                writer.insert(created)
            }
        };

        if frame.pixel_format() == TARGET_FORMAT {
            writer.write_video_frame(&frame)?;
        } else {
            let scaler = match scaler.as_mut() {
                Some(scaler) => scaler,
                None => scaler.insert(VideoScaler::new(
                    frame.width(),
                    frame.height(),
                    frame.pixel_format(),
                    frame.width(),
                    frame.height(),
                    TARGET_FORMAT,
                    ScalingAlgorithm::Bicubic,
                )?),
            };
            let converted = scaler.scale_to_new(&frame)?;
            writer.write_video_frame(&converted)?;
        }
        count += 1;
    }

    if let Some(writer) = writer.as_mut() {
        writer.finish()?;
    }
    println!("Wrote {count} frames to {}", output.display());
    Ok(())
}
