use std::path::Path;

use anyhow::{Context, Result, bail};
use ffmpeg_core::{ChannelLayout, Codec, CodecId, Frame, Pts, Rational, SampleFormat, SampleLayout};
use ffmpeg_decode::MediaReader;
use ffmpeg_encode::{AudioEncoderConfig, MediaWriter};
use ffmpeg_transform::{AudioFifo, AudioFormat, AudioResampler};

use crate::output_url;

const TARGET_FORMAT: SampleFormat = SampleFormat::I16(SampleLayout::Planar);
const FALLBACK_SAMPLE_RATE: u32 = 44_100;
const FALLBACK_FRAME_SIZE: usize = 1152;

/**
    MP3 carries at most two channels; anything wider is downmixed.
*/
fn preferred_layout(source: &ChannelLayout) -> ChannelLayout {
    match source.channels() {
        1 | 2 => source.clone(),
        _ => ChannelLayout::stereo(),
    }
}

/**
    Encoder state, created from the first decoded frame.
*/
struct Output {
    writer: MediaWriter,
    resampler: Option<AudioResampler>,
    fifo: AudioFifo,
    frame_size: usize,
    time_base: Rational,
    next_pts: i64,
}

impl Output {
    fn create(url: &str, first: &Frame, bit_rate: i64) -> Result<Self> {
        let source = AudioFormat::new(
            if first.sample_rate() > 0 {
                first.sample_rate()
            } else {
                FALLBACK_SAMPLE_RATE
            },
            first.sample_format(),
            match first.channel_layout()? {
                layout if layout.channels() > 0 => layout,
                _ => ChannelLayout::stereo(),
            },
        );
        let target = AudioFormat::new(
            source.sample_rate,
            TARGET_FORMAT,
            preferred_layout(&source.channel_layout),
        );
        let time_base = Rational::new(1, target.sample_rate as i32);

        let mut writer = MediaWriter::create(url, Some("mp3"))?;
        writer.add_audio_stream(
            AudioEncoderConfig::new(
                CodecId::MP3,
                target.sample_rate,
                target.sample_format,
                target.channel_layout.clone(),
                time_base,
            )
            .with_bit_rate(bit_rate),
        )?;
        writer.start()?;

        let frame_size = writer
            .audio_encoder()
            .map(|encoder| encoder.frame_size())
            .filter(|&size| size > 0)
            .unwrap_or(FALLBACK_FRAME_SIZE);

        let resampler = if source == target {
            None
        } else {
            Some(AudioResampler::new(source, target.clone())?)
        };
        let fifo = AudioFifo::new(target.sample_format, target.channel_layout, target.sample_rate)?;

        tracing::debug!(frame_size, resampling = resampler.is_some(), "started mp3 encoding");
        Ok(Self {
            writer,
            resampler,
            fifo,
            frame_size,
            time_base,
            next_pts: 0,
        })
    }

    fn push(&mut self, frame: &Frame) -> Result<()> {
        match self.resampler.as_mut() {
            Some(resampler) => {
                let converted = resampler.convert_to_new(frame)?;
                self.fifo.write(&converted)?;
            }
            None => self.fifo.write(frame)?,
        }
        while let Some(chunk) = self.fifo.read(self.frame_size)? {
            self.write(chunk)?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        if let Some(resampler) = self.resampler.as_mut() {
            while let Some(tail) = resampler.flush_to_new()? {
                self.fifo.write(&tail)?;
            }
        }
        while let Some(chunk) = self.fifo.read_up_to(self.frame_size)? {
            self.write(chunk)?;
        }
        self.writer.finish()?;
        Ok(())
    }

    /**
        Stamp a chunk with the running sample count and encode it.
    */
    fn write(&mut self, mut chunk: Frame) -> Result<()> {
        chunk.set_pts(Some(Pts(self.next_pts)));
        chunk.set_time_base(self.time_base);
        self.next_pts += chunk.samples() as i64;
        self.writer.write_audio_frame(&chunk)?;
        Ok(())
    }
}

pub fn run(input: &str, output: &Path, max_frames: Option<usize>, bit_rate: i64) -> Result<()> {
    if Codec::find_encoder(CodecId::MP3).is_none() {
        bail!("MP3 encoder not available in this FFmpeg build (for example, build with libmp3lame)");
    }

    let mut reader =
        MediaReader::open(input).with_context(|| format!("failed to open {input}"))?;
    if reader.audio_stream_index().is_none() {
        bail!("no audio stream found");
    }
    let url = output_url(output)?;

    let mut state: Option<Output> = None;
    let mut count = 0;

    for frame in reader.audio_frames() {
        if max_frames.is_some_and(|limit| count >= limit) {
            break;
        }
        let frame = frame.context("decoding failed")?;

        let state = match state.as_mut() {
            Some(state) => state,
            None => state.insert(Output::create(url, &frame, bit_rate)?),
        };
        state.push(&frame)?;
        count += 1;
    }

    if let Some(state) = state {
        state.finish()?;
    }
    println!("Wrote MP3 audio to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_layouts_downmix_to_stereo() {
        assert_eq!(preferred_layout(&ChannelLayout::mono()), ChannelLayout::mono());
        assert_eq!(
            preferred_layout(&ChannelLayout::stereo()),
            ChannelLayout::stereo()
        );
        assert_eq!(
            preferred_layout(&ChannelLayout::default_for(6)),
            ChannelLayout::stereo()
        );
    }
}
