/*!
    Stream descriptors.
*/

use std::time::Duration;

use ffmpeg_core::convert::from_av_rational;
use ffmpeg_core::{CodecId, MediaDuration, MediaType, Pts, Rational};
use ffmpeg_next::ffi;

/**
    Snapshot of one stream's metadata.

    Copied out of the container when requested, so it stays valid after
    the container is closed.
*/
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    /// Position of the stream within the container.
    pub index: usize,
    /// Video, audio, subtitle...
    pub media_type: MediaType,
    /// Codec of the stream's packets.
    pub codec_id: CodecId,
    /// Unit of the stream's timestamps.
    pub time_base: Rational,
    /// Duration in time base units, if known.
    pub duration: Option<MediaDuration>,
    /// Number of frames, 0 if unknown.
    pub frame_count: i64,
    /// Timestamp of the first frame, if known.
    pub start_time: Option<Pts>,
    /// Average frame rate, `0/0` if unknown.
    pub average_frame_rate: Rational,
    /// Lowest frame rate that represents all timestamps exactly.
    pub real_frame_rate: Rational,
}

impl StreamInfo {
    /**
        Copy the descriptor out of an `AVStream`.

        # Safety

        `stream` must point to a valid stream with codec parameters.
    */
    pub(crate) unsafe fn from_raw(stream: *const ffi::AVStream) -> Self {
        // SAFETY: guaranteed by the caller.
        unsafe {
            let s = &*stream;
            let par = &*s.codecpar;
            Self {
                index: s.index.max(0) as usize,
                media_type: MediaType::from(par.codec_type),
                codec_id: CodecId::from(par.codec_id),
                time_base: from_av_rational(s.time_base),
                duration: Pts::from_raw(s.duration).map(|d| MediaDuration(d.0)),
                frame_count: s.nb_frames,
                start_time: Pts::from_raw(s.start_time),
                average_frame_rate: from_av_rational(s.avg_frame_rate),
                real_frame_rate: from_av_rational(s.r_frame_rate),
            }
        }
    }

    pub fn is_video(&self) -> bool {
        self.media_type == MediaType::Video
    }

    pub fn is_audio(&self) -> bool {
        self.media_type == MediaType::Audio
    }

    pub fn is_subtitle(&self) -> bool {
        self.media_type == MediaType::Subtitle
    }

    /**
        Stream duration as wall time, zero if unknown.
    */
    pub fn duration_as_time(&self) -> Duration {
        self.duration
            .map(|d| d.to_duration(self.time_base))
            .unwrap_or(Duration::ZERO)
    }
}
