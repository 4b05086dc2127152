/*!
    Demux and decode pipeline.
*/

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use ffmpeg_core::{
    Codec, CodecContext, Dictionary, Error, Frame, Packet, Pts, Rational, Result, Status,
    StreamType, library, media_type_of,
};
use ffmpeg_source::{InputContext, SeekFlags, StreamInfo};

use crate::{OwnedFrame, ReaderConfig};

/**
    Decoder attached to one input stream.
*/
struct StreamDecoder {
    index: usize,
    time_base: Rational,
    context: CodecContext,
}

impl StreamDecoder {
    fn open(input: &InputContext, index: usize, threads: Option<u32>) -> Result<Self> {
        let params = input.parameters(index).ok_or_else(Error::stream_not_found)?;
        let info = input.stream(index).ok_or_else(Error::stream_not_found)?;

        let codec = Codec::find_decoder(params.codec_id()).ok_or_else(|| {
            tracing::debug!(index, codec = ?params.codec_id(), "no decoder for stream");
            Error::decoder_not_found()
        })?;

        let mut context = CodecContext::new(&codec)?;
        context.set_parameters(params)?;
        context.set_time_base(info.time_base);
        context.set_packet_time_base(info.time_base);
        if let Some(threads) = threads {
            context.set_thread_count(threads);
        }
        context.open(None)?;

        tracing::debug!(
            index,
            decoder = %codec.name(),
            time_base = %info.time_base,
            "opened decoder"
        );

        Ok(Self {
            index,
            time_base: info.time_base,
            context,
        })
    }

    /**
        Receive every frame the decoder has ready.

        Returns the status that ended the drain.
    */
    fn drain(
        &mut self,
        kind: StreamType,
        scratch: &mut Frame,
        out: &mut VecDeque<(StreamType, OwnedFrame)>,
    ) -> Result<Status> {
        loop {
            scratch.unref();
            match self.context.receive_frame(scratch)? {
                Status::Success => {
                    if !scratch.time_base().is_valid() {
                        scratch.set_time_base(self.time_base);
                    }
                    out.push_back((kind, OwnedFrame::take_from(scratch)?));
                }
                status => return Ok(status),
            }
        }
    }

    /**
        Send a packet, draining first if the decoder is full.
    */
    fn decode(
        &mut self,
        kind: StreamType,
        packet: &Packet,
        scratch: &mut Frame,
        out: &mut VecDeque<(StreamType, OwnedFrame)>,
    ) -> Result<Status> {
        let mut sent = self.context.send_packet(packet)?;
        if sent == Status::NeedsMoreInput {
            self.drain(kind, scratch, out)?;
            sent = self.context.send_packet(packet)?;
        }
        if sent != Status::EndOfStream {
            self.drain(kind, scratch, out)?;
        }
        Ok(sent)
    }

    fn flush(
        &mut self,
        kind: StreamType,
        scratch: &mut Frame,
        out: &mut VecDeque<(StreamType, OwnedFrame)>,
    ) -> Result<()> {
        self.context.send_eof()?;
        self.drain(kind, scratch, out)?;
        tracing::debug!(index = self.index, stream = %kind, "flushed decoder");
        Ok(())
    }
}

/**
    High-level media file reader producing decoded frames.

    Opens the input, picks the best video and audio streams and attaches
    a decoder to each. A missing stream kind is not an error; its frame
    sequence is simply empty.

    Frame sequences share the reader's container, so each borrows the
    reader mutably. Use [`MediaReader::frames`] to consume video and audio
    together in one pass.
*/
pub struct MediaReader {
    input: InputContext,
    video: Option<StreamDecoder>,
    audio: Option<StreamDecoder>,
    packet: Packet,
    scratch: Frame,
}

impl MediaReader {
    /**
        Open a media file or URL with default settings.
    */
    pub fn open(url: &str) -> Result<Self> {
        Self::open_with(url, ReaderConfig::default())
    }

    /**
        Open a media file or URL.
    */
    pub fn open_with(url: &str, config: ReaderConfig) -> Result<Self> {
        library::init()?;

        let mut options =
            Dictionary::from_pairs(config.options.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        let input = InputContext::open_with_options(url, Some(&mut options))?;
        for (key, _) in options.entries() {
            tracing::warn!(option = %key, "input option was not used");
        }

        let video = Self::open_decoder(&input, StreamType::Video, config.threads)?;
        let audio = Self::open_decoder(&input, StreamType::Audio, config.threads)?;

        Ok(Self {
            input,
            video,
            audio,
            packet: Packet::new()?,
            scratch: Frame::new()?,
        })
    }

    fn open_decoder(
        input: &InputContext,
        kind: StreamType,
        threads: Option<u32>,
    ) -> Result<Option<StreamDecoder>> {
        match input.find_best_stream(media_type_of(kind)) {
            Ok(index) => StreamDecoder::open(input, index, threads).map(Some),
            Err(e) => {
                tracing::debug!(stream = %kind, error = %e, "no stream of this kind");
                Ok(None)
            }
        }
    }

    fn decoder(&self, kind: StreamType) -> Option<&StreamDecoder> {
        match kind {
            StreamType::Video => self.video.as_ref(),
            StreamType::Audio => self.audio.as_ref(),
        }
    }

    /**
        The underlying input container.
    */
    pub fn input(&self) -> &InputContext {
        &self.input
    }

    pub fn video_stream_index(&self) -> Option<usize> {
        self.video.as_ref().map(|d| d.index)
    }

    pub fn audio_stream_index(&self) -> Option<usize> {
        self.audio.as_ref().map(|d| d.index)
    }

    pub fn video_time_base(&self) -> Option<Rational> {
        self.video.as_ref().map(|d| d.time_base)
    }

    pub fn audio_time_base(&self) -> Option<Rational> {
        self.audio.as_ref().map(|d| d.time_base)
    }

    /**
        The opened video decoder, e.g. to read the frame dimensions.
    */
    pub fn video_decoder(&self) -> Option<&CodecContext> {
        self.video.as_ref().map(|d| &d.context)
    }

    /**
        The opened audio decoder, e.g. to read the sample rate.
    */
    pub fn audio_decoder(&self) -> Option<&CodecContext> {
        self.audio.as_ref().map(|d| &d.context)
    }

    /**
        Descriptors for all streams in the input.
    */
    pub fn streams(&self) -> Vec<StreamInfo> {
        self.input.streams()
    }

    /**
        Total duration of the input, if known.
    */
    pub fn duration(&self) -> Option<Duration> {
        self.input.duration()
    }

    /**
        Decoded frames of the video stream.
    */
    pub fn video_frames(&mut self) -> StreamFrames<'_> {
        StreamFrames {
            inner: Decoding::new(self, Selection::Only(StreamType::Video)),
        }
    }

    /**
        Decoded frames of the audio stream.
    */
    pub fn audio_frames(&mut self) -> StreamFrames<'_> {
        StreamFrames {
            inner: Decoding::new(self, Selection::Only(StreamType::Audio)),
        }
    }

    /**
        Decoded frames of both streams, in container order.
    */
    pub fn frames(&mut self) -> Frames<'_> {
        Frames {
            inner: Decoding::new(self, Selection::Both),
        }
    }

    /**
        Seek to the nearest keyframe at or before `position` and reset
        the decoders.
    */
    pub fn seek(&mut self, position: Duration) -> Result<()> {
        let target = Pts::from_duration(position, Rational::TIME_BASE);
        self.input.seek(None, target.0, SeekFlags::BACKWARD)?;
        for decoder in [self.video.as_mut(), self.audio.as_mut()].into_iter().flatten() {
            decoder.context.flush_buffers();
        }
        Ok(())
    }
}

impl fmt::Debug for MediaReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaReader")
            .field("input", &self.input)
            .field("video_stream_index", &self.video_stream_index())
            .field("audio_stream_index", &self.audio_stream_index())
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Selection {
    Only(StreamType),
    Both,
}

impl Selection {
    fn kinds(self) -> &'static [StreamType] {
        match self {
            Self::Only(StreamType::Video) => &[StreamType::Video],
            Self::Only(StreamType::Audio) => &[StreamType::Audio],
            Self::Both => &[StreamType::Video, StreamType::Audio],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Reading,
    Flushing,
    Done,
}

/**
    Shared state machine behind the frame iterators.
*/
struct Decoding<'a> {
    reader: &'a mut MediaReader,
    selection: Selection,
    pending: VecDeque<(StreamType, OwnedFrame)>,
    state: State,
}

impl<'a> Decoding<'a> {
    fn new(reader: &'a mut MediaReader, selection: Selection) -> Self {
        let any = selection
            .kinds()
            .iter()
            .any(|&kind| reader.decoder(kind).is_some());
        Self {
            reader,
            selection,
            pending: VecDeque::new(),
            state: if any { State::Reading } else { State::Done },
        }
    }

    fn selected(&self, stream_index: usize) -> Option<StreamType> {
        self.selection.kinds().iter().copied().find(|&kind| {
            self.reader
                .decoder(kind)
                .is_some_and(|d| d.index == stream_index)
        })
    }

    /**
        Read one packet and decode it if it belongs to a selected stream.
    */
    fn step(&mut self) -> Result<()> {
        let reader = &mut *self.reader;
        if !reader.input.read_packet(&mut reader.packet)? {
            self.state = State::Flushing;
            return Ok(());
        }

        let Some(kind) = self.selected(self.reader.packet.stream_index()) else {
            return Ok(());
        };

        let reader = &mut *self.reader;
        let decoder = match kind {
            StreamType::Video => reader.video.as_mut(),
            StreamType::Audio => reader.audio.as_mut(),
        };
        if let Some(decoder) = decoder {
            let status = decoder.decode(kind, &reader.packet, &mut reader.scratch, &mut self.pending)?;
            if status == Status::EndOfStream {
                tracing::debug!(stream = %kind, "decoder reached end of stream");
                self.state = State::Flushing;
            }
        }
        reader.packet.unref();
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.state = State::Done;
        let reader = &mut *self.reader;
        for &kind in self.selection.kinds() {
            let decoder = match kind {
                StreamType::Video => reader.video.as_mut(),
                StreamType::Audio => reader.audio.as_mut(),
            };
            if let Some(decoder) = decoder {
                decoder.flush(kind, &mut reader.scratch, &mut self.pending)?;
            }
        }
        Ok(())
    }

    fn next_frame(&mut self) -> Option<Result<(StreamType, OwnedFrame)>> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(Ok(item));
            }
            let result = match self.state {
                State::Reading => self.step(),
                State::Flushing => self.flush(),
                State::Done => return None,
            };
            if let Err(e) = result {
                self.state = State::Done;
                self.pending.clear();
                return Some(Err(e));
            }
        }
    }
}

/**
    Iterator over the decoded frames of one stream.

    Created by [`MediaReader::video_frames`] and [`MediaReader::audio_frames`].
    Packets of other streams are read and discarded. Yields at most one
    error, after which it is exhausted.
*/
pub struct StreamFrames<'a> {
    inner: Decoding<'a>,
}

impl Iterator for StreamFrames<'_> {
    type Item = Result<OwnedFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next_frame()
            .map(|item| item.map(|(_, frame)| frame))
    }
}

/**
    Iterator over the decoded frames of both streams, tagged with their kind.

    Created by [`MediaReader::frames`].
*/
pub struct Frames<'a> {
    inner: Decoding<'a>,
}

impl Iterator for Frames<'_> {
    type Item = Result<(StreamType, OwnedFrame)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next_frame()
    }
}
