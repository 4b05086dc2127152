/*!
    Encode and mux pipeline.
*/

use std::fmt;

use ffmpeg_core::{
    CodecContext, Dictionary, Error, Frame, Packet, Rational, Result, Status, StreamType, library,
};
use ffmpeg_sink::{ContainerFormat, OutputContext};

use crate::{AudioEncoderConfig, EncoderSelector, VideoEncoderConfig};

/**
    Encoder feeding one output stream.
*/
struct StreamEncoder {
    index: usize,
    context: CodecContext,
}

impl StreamEncoder {
    /**
        Receive every ready packet and write it to the output.

        Returns the number of packets written.
    */
    fn drain(&mut self, output: &mut OutputContext, packet: &mut Packet) -> Result<usize> {
        let mut written = 0;
        loop {
            packet.unref();
            if self.context.receive_packet(packet)? != Status::Success {
                return Ok(written);
            }
            // The muxer may have replaced the requested time base in write_header.
            let stream_time_base = output.stream_time_base(self.index)?;
            packet.set_stream_index(self.index);
            packet.rescale_ts(self.context.time_base(), stream_time_base);
            output.write_interleaved(packet)?;
            written += 1;
        }
    }

    fn encode(&mut self, frame: &Frame, output: &mut OutputContext, packet: &mut Packet) -> Result<()> {
        match self.context.send_frame(frame)? {
            Status::Success => {}
            Status::NeedsMoreInput => {
                // The encoder is full: make room, then retry once.
                self.drain(output, packet)?;
                match self.context.send_frame(frame)? {
                    Status::Success => {}
                    Status::NeedsMoreInput => return Err(Error::again()),
                    Status::EndOfStream => return Err(Error::eof()),
                }
            }
            Status::EndOfStream => return Err(Error::eof()),
        }
        self.drain(output, packet)?;
        Ok(())
    }

    fn flush(&mut self, output: &mut OutputContext, packet: &mut Packet) -> Result<()> {
        self.context.send_flush_frame()?;
        let written = self.drain(output, packet)?;
        tracing::debug!(index = self.index, packets = written, "flushed encoder");
        Ok(())
    }
}

/**
    High-level media file writer that encodes frames and muxes the packets.

    Lifecycle: declare streams, [`MediaWriter::start`], write frames, then
    [`MediaWriter::finish`]. Dropping a writer without finishing releases
    everything but leaves the file without a trailer.
*/
pub struct MediaWriter {
    output: OutputContext,
    video: Option<StreamEncoder>,
    audio: Option<StreamEncoder>,
    packet: Packet,
    /// Set once a stream was declared but could not be set up.
    broken: bool,
    finished: bool,
    /// First failure of `finish`, returned again on later calls.
    finish_error: Option<Error>,
}

impl MediaWriter {
    /**
        Create a writer for a file or URL.

        The container is chosen by `format` name, or guessed from the url's
        extension when `None`.
    */
    pub fn create(url: &str, format: Option<&str>) -> Result<Self> {
        library::init()?;
        Ok(Self {
            output: OutputContext::new(url, format)?,
            video: None,
            audio: None,
            packet: Packet::new()?,
            broken: false,
            finished: false,
            finish_error: None,
        })
    }

    /**
        Create a writer for a known container.
    */
    pub fn create_with_format(url: &str, format: &ContainerFormat) -> Result<Self> {
        Self::create(url, Some(format.ffmpeg_format_name()))
    }

    /**
        The underlying output container.
    */
    pub fn output(&self) -> &OutputContext {
        &self.output
    }

    pub fn video_stream_index(&self) -> Option<usize> {
        self.video.as_ref().map(|e| e.index)
    }

    pub fn audio_stream_index(&self) -> Option<usize> {
        self.audio.as_ref().map(|e| e.index)
    }

    /**
        The opened video encoder.
    */
    pub fn video_encoder(&self) -> Option<&CodecContext> {
        self.video.as_ref().map(|e| &e.context)
    }

    /**
        The opened audio encoder, e.g. to read the `frame_size` it expects.
    */
    pub fn audio_encoder(&self) -> Option<&CodecContext> {
        self.audio.as_ref().map(|e| &e.context)
    }

    fn check_declarable(&self, existing: &Option<StreamEncoder>) -> Result<()> {
        if self.broken {
            return Err(Error::InvalidState("writer unusable after a failed stream setup"));
        }
        if self.output.header_written() || self.finished {
            return Err(Error::InvalidState("streams must be added before start"));
        }
        if existing.is_some() {
            return Err(Error::InvalidState("stream of this kind already added"));
        }
        Ok(())
    }

    /**
        Declare the video stream and open its encoder.

        Returns the output stream index.
    */
    pub fn add_video_stream(&mut self, config: VideoEncoderConfig) -> Result<usize> {
        self.check_declarable(&self.video)?;
        check_time_base(config.time_base)?;

        let codec = find_encoder(&config.encoder)?;
        let mut context = CodecContext::new(&codec)?;
        context.set_width(config.width);
        context.set_height(config.height);
        context.set_pixel_format(config.pixel_format);
        context.set_time_base(config.time_base);
        if let Some(frame_rate) = config.frame_rate {
            context.set_frame_rate(frame_rate);
        }
        context.set_bit_rate(config.bit_rate);
        context.set_gop_size(config.gop_size);
        context.set_max_b_frames(config.max_b_frames);
        if let Some(threads) = config.threads {
            context.set_thread_count(threads);
        }

        let index = self.open_stream(&mut context, &config.options, config.time_base)?;
        tracing::debug!(
            index,
            encoder = %codec.name(),
            width = config.width,
            height = config.height,
            "added video stream"
        );
        self.video = Some(StreamEncoder { index, context });
        Ok(index)
    }

    /**
        Declare the audio stream and open its encoder.

        Returns the output stream index.
    */
    pub fn add_audio_stream(&mut self, config: AudioEncoderConfig) -> Result<usize> {
        self.check_declarable(&self.audio)?;
        check_time_base(config.time_base)?;

        let codec = find_encoder(&config.encoder)?;
        let mut context = CodecContext::new(&codec)?;
        context.set_sample_rate(config.sample_rate);
        context.set_sample_format(config.sample_format);
        context.set_channel_layout(&config.channel_layout)?;
        context.set_time_base(config.time_base);
        context.set_bit_rate(config.bit_rate);

        let index = self.open_stream(&mut context, &config.options, config.time_base)?;
        tracing::debug!(
            index,
            encoder = %codec.name(),
            sample_rate = config.sample_rate,
            channels = config.channel_layout.channels(),
            frame_size = context.frame_size(),
            "added audio stream"
        );
        self.audio = Some(StreamEncoder { index, context });
        Ok(index)
    }

    /**
        Open a configured encoder and attach it to a new output stream.
    */
    fn open_stream(
        &mut self,
        context: &mut CodecContext,
        options: &[(String, String)],
        time_base: Rational,
    ) -> Result<usize> {
        if self.output.requires_global_header() {
            context.enable_global_header();
        }

        let mut options =
            Dictionary::from_pairs(options.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        context.open(Some(&mut options))?;
        for (key, _) in options.entries() {
            tracing::warn!(option = %key, "encoder option was not used");
        }

        // Everything that can be rejected is checked above; a declared stream
        // cannot be removed again, so a failure from here on breaks the writer.
        let codec = context.codec();
        let index = self.output.add_stream(Some(&codec))?;
        let attached = self
            .output
            .set_parameters_from_encoder(index, context)
            .and_then(|()| self.output.set_stream_time_base(index, time_base));
        if let Err(e) = attached {
            tracing::warn!(index, error = %e, "output stream setup failed");
            self.broken = true;
            return Err(e);
        }
        Ok(index)
    }

    /**
        Open the output and write the container header.

        Call once, after all streams have been added.
    */
    pub fn start(&mut self) -> Result<()> {
        if self.broken {
            return Err(Error::InvalidState("writer unusable after a failed stream setup"));
        }
        if self.finished {
            return Err(Error::InvalidState("writer already finished"));
        }
        if self.output.header_written() {
            return Err(Error::InvalidState("writer already started"));
        }
        self.output.open_io()?;
        self.output.write_header(None)?;
        Ok(())
    }

    /**
        Encode a video frame and write the resulting packets.
    */
    pub fn write_video_frame(&mut self, frame: &Frame) -> Result<()> {
        self.write_frame(StreamType::Video, frame)
    }

    /**
        Encode an audio frame and write the resulting packets.

        Unless the encoder accepts any frame size, the frame must hold
        exactly [`CodecContext::frame_size`] samples (the last frame may
        be shorter).
    */
    pub fn write_audio_frame(&mut self, frame: &Frame) -> Result<()> {
        self.write_frame(StreamType::Audio, frame)
    }

    fn write_frame(&mut self, kind: StreamType, frame: &Frame) -> Result<()> {
        let encoder = match kind {
            StreamType::Video => self.video.as_mut(),
            StreamType::Audio => self.audio.as_mut(),
        };
        let Some(encoder) = encoder else {
            return Err(Error::encoder_not_found());
        };
        if self.finished {
            return Err(Error::InvalidState("writer already finished"));
        }
        if !self.output.header_written() {
            return Err(Error::InvalidState("writer not started"));
        }
        encoder.encode(frame, &mut self.output, &mut self.packet)
    }

    /**
        Flush all encoders and write the container trailer.

        The trailer is only written if [`MediaWriter::start`] succeeded.
        Every encoder is flushed and the trailer attempted even if an
        earlier step fails; the first failure is returned, now and on
        every later call. After a successful finish, calling this again
        does nothing.
    */
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return match &self.finish_error {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            };
        }
        self.finished = true;

        let mut first_error = None;
        for encoder in [self.video.as_mut(), self.audio.as_mut()].into_iter().flatten() {
            if let Err(e) = encoder.flush(&mut self.output, &mut self.packet) {
                tracing::warn!(index = encoder.index, error = %e, "encoder flush failed");
                first_error.get_or_insert(e);
            }
        }
        if self.output.header_written() {
            if let Err(e) = self.output.write_trailer() {
                first_error.get_or_insert(e);
            }
        }

        self.finish_error = first_error.clone();
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for MediaWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaWriter")
            .field("output", &self.output)
            .field("video_stream_index", &self.video_stream_index())
            .field("audio_stream_index", &self.audio_stream_index())
            .field("finished", &self.finished)
            .finish()
    }
}

fn check_time_base(time_base: Rational) -> Result<()> {
    if time_base.num <= 0 || time_base.den <= 0 {
        return Err(Error::InvalidArgument(format!(
            "invalid encoder time base {time_base}"
        )));
    }
    Ok(())
}

fn find_encoder(selector: &EncoderSelector) -> Result<ffmpeg_core::Codec> {
    selector.find().ok_or_else(|| {
        tracing::debug!(?selector, "encoder not available");
        Error::encoder_not_found()
    })
}

#[cfg(test)]
mod tests {
    use ffmpeg_core::{CodecId, PixelFormat};

    use super::*;

    fn video_config() -> VideoEncoderConfig {
        VideoEncoderConfig::new(
            CodecId::MPEG4,
            64,
            48,
            PixelFormat::YUV420P,
            Rational::new(1, 25),
        )
    }

    #[test]
    fn missing_encoder_is_reported() {
        let mut writer = MediaWriter::create("unused.mkv", None).unwrap();
        let config = VideoEncoderConfig::new(
            "definitely_not_an_encoder",
            64,
            48,
            PixelFormat::YUV420P,
            Rational::new(1, 25),
        );
        assert_eq!(
            writer.add_video_stream(config),
            Err(Error::encoder_not_found())
        );
        assert_eq!(writer.video_stream_index(), None);
    }

    #[test]
    fn write_without_stream_is_encoder_not_found() {
        let mut writer = MediaWriter::create("unused.mkv", None).unwrap();
        let frame = Frame::new().unwrap();
        assert_eq!(
            writer.write_audio_frame(&frame),
            Err(Error::encoder_not_found())
        );
    }

    #[test]
    fn write_before_start_is_invalid() {
        let mut writer = MediaWriter::create("unused.mkv", None).unwrap();
        writer.add_video_stream(video_config()).unwrap();
        let frame = Frame::new_video(64, 48, PixelFormat::YUV420P).unwrap();
        assert_eq!(
            writer.write_video_frame(&frame),
            Err(Error::InvalidState("writer not started"))
        );
    }

    #[test]
    fn duplicate_stream_kind_is_invalid() {
        let mut writer = MediaWriter::create("unused.mkv", None).unwrap();
        assert_eq!(writer.add_video_stream(video_config()).unwrap(), 0);
        assert!(matches!(
            writer.add_video_stream(video_config()),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn rejected_stream_leaves_no_output_stream() {
        let mut writer = MediaWriter::create("unused.mkv", None).unwrap();
        let mut config = video_config();
        config.time_base = Rational::new(0, 0);
        assert!(matches!(
            writer.add_video_stream(config),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(writer.output().stream_count(), 0);
        assert_eq!(writer.video_stream_index(), None);

        // A retry declares the first stream, not a second one.
        assert_eq!(writer.add_video_stream(video_config()).unwrap(), 0);
        assert_eq!(writer.output().stream_count(), 1);
    }

    #[test]
    fn failed_finish_is_reported_again() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.mkv");
        let mut writer = MediaWriter::create(path.to_str().unwrap(), None).unwrap();
        // B-frames make the encoder hold packets back until the flush.
        writer
            .add_video_stream(video_config().with_max_b_frames(2))
            .unwrap();
        writer.start().unwrap();
        for i in 0..3 {
            let mut frame = Frame::new_video(64, 48, PixelFormat::YUV420P).unwrap();
            frame.set_pts(Some(ffmpeg_core::Pts(i)));
            writer.write_video_frame(&frame).unwrap();
        }

        // Route the flushed packets to a stream that does not exist.
        if let Some(encoder) = writer.video.as_mut() {
            encoder.index = 7;
        }
        let first = writer.finish().unwrap_err();
        assert!(matches!(first, Error::InvalidArgument(_)));
        assert_eq!(writer.finish(), Err(first));
        assert!(matches!(
            writer.write_video_frame(&Frame::new().unwrap()),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn finish_without_start_skips_trailer() {
        let mut writer = MediaWriter::create("unused.mkv", None).unwrap();
        writer.add_video_stream(video_config()).unwrap();
        writer.finish().unwrap();
        writer.finish().unwrap();
        assert!(!writer.output().header_written());
    }
}
