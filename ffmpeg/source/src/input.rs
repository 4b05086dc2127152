/*!
    Demuxing input container.
*/

use std::fmt;
use std::ops::BitOr;
use std::os::raw::c_int;
use std::ptr;
use std::time::Duration;

use ffmpeg_core::convert::{from_cstr, to_cstring};
use ffmpeg_core::{
    Dictionary, Error, MediaType, Packet, Parameters, Result, check, entries_of, library,
};
use ffmpeg_next::ffi;

use crate::StreamInfo;

/**
    Flags for [`InputContext::seek`].
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeekFlags(i32);

impl SeekFlags {
    /// Seek to the nearest position at or before the target.
    pub const BACKWARD: Self = Self(ffi::AVSEEK_FLAG_BACKWARD as i32);
    /// Allow landing on non-keyframes.
    pub const ANY: Self = Self(ffi::AVSEEK_FLAG_ANY as i32);
    /// Interpret the timestamp as a frame number.
    pub const FRAME: Self = Self(ffi::AVSEEK_FLAG_FRAME as i32);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> i32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SeekFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/**
    An opened input container.

    Reads packets sequentially from all streams in container order. The
    native context is closed when this value is dropped.
*/
pub struct InputContext {
    ptr: *mut ffi::AVFormatContext,
    url: String,
}

// SAFETY: the context is exclusively owned and mutated through &mut self only.
unsafe impl Send for InputContext {}

impl InputContext {
    /**
        Open a file or URL and probe its streams.
    */
    pub fn open(url: &str) -> Result<Self> {
        Self::open_with_options(url, None)
    }

    /**
        Open a file or URL, passing demuxer or protocol options.

        Recognized options are consumed from the dictionary.
    */
    pub fn open_with_options(url: &str, options: Option<&mut Dictionary>) -> Result<Self> {
        library::init()?;

        let c_url = to_cstring(url)?;
        let options = match options {
            Some(dict) => dict.as_mut_ptr(),
            None => ptr::null_mut(),
        };

        let mut raw: *mut ffi::AVFormatContext = ptr::null_mut();
        // SAFETY: on failure avformat_open_input frees the context and
        // leaves the pointer null.
        check(unsafe { ffi::avformat_open_input(&mut raw, c_url.as_ptr(), ptr::null_mut(), options) })
            .inspect_err(|e| tracing::debug!(url, error = %e, "failed to open input"))?;
        if raw.is_null() {
            return Err(Error::unknown());
        }

        let input = Self {
            ptr: raw,
            url: url.to_owned(),
        };
        check(unsafe { ffi::avformat_find_stream_info(input.ptr, ptr::null_mut()) })?;

        tracing::debug!(
            url,
            format = %input.format_name(),
            streams = input.stream_count(),
            "opened input"
        );
        Ok(input)
    }

    pub fn as_ptr(&self) -> *const ffi::AVFormatContext {
        self.ptr
    }

    pub fn as_mut_ptr(&mut self) -> *mut ffi::AVFormatContext {
        self.ptr
    }

    /**
        The url this input was opened from.
    */
    pub fn url(&self) -> &str {
        &self.url
    }

    /**
        Short name of the detected container format, e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`.
    */
    pub fn format_name(&self) -> String {
        unsafe {
            let format = (*self.ptr).iformat;
            if format.is_null() {
                return String::new();
            }
            from_cstr((*format).name).unwrap_or_default()
        }
    }

    pub fn stream_count(&self) -> usize {
        unsafe { (*self.ptr).nb_streams as usize }
    }

    fn raw_stream(&self, index: usize) -> Option<*mut ffi::AVStream> {
        if index >= self.stream_count() {
            return None;
        }
        let stream = unsafe { *(*self.ptr).streams.add(index) };
        (!stream.is_null()).then_some(stream)
    }

    /**
        Descriptors for all streams, in container order.
    */
    pub fn streams(&self) -> Vec<StreamInfo> {
        (0..self.stream_count())
            .filter_map(|index| self.stream(index))
            .collect()
    }

    /**
        Descriptor for the stream at `index`.
    */
    pub fn stream(&self, index: usize) -> Option<StreamInfo> {
        let stream = self.raw_stream(index)?;
        // SAFETY: streams of an opened input always have codec parameters.
        Some(unsafe { StreamInfo::from_raw(stream) })
    }

    /**
        Codec parameters of the stream at `index`.
    */
    pub fn parameters(&self, index: usize) -> Option<Parameters<'_>> {
        let stream = self.raw_stream(index)?;
        // SAFETY: the parameters live as long as the container borrow.
        Some(unsafe { Parameters::from_raw((*stream).codecpar) })
    }

    /**
        Index of the "best" stream of a media type, as chosen by FFmpeg.

        Fails with the stream-not-found error if there is none.
    */
    pub fn find_best_stream(&self, media_type: MediaType) -> Result<usize> {
        let index = check(unsafe {
            ffi::av_find_best_stream(self.ptr, media_type.into(), -1, -1, ptr::null_mut(), 0)
        })?;
        Ok(index as usize)
    }

    /**
        Total duration in microseconds, if known.
    */
    pub fn duration_micros(&self) -> Option<i64> {
        let duration = unsafe { (*self.ptr).duration };
        (duration != ffi::AV_NOPTS_VALUE).then_some(duration)
    }

    /**
        Total duration, if known.
    */
    pub fn duration(&self) -> Option<Duration> {
        self.duration_micros()
            .map(|micros| Duration::from_micros(micros.max(0) as u64))
    }

    /**
        Container-level metadata tags.
    */
    pub fn metadata(&self) -> Vec<(String, String)> {
        unsafe { entries_of((*self.ptr).metadata) }
    }

    /**
        Read the next packet into `packet`, replacing its contents.

        Returns `false` at end of input.
    */
    pub fn read_packet(&mut self, packet: &mut Packet) -> Result<bool> {
        packet.unref();
        let ret = unsafe { ffi::av_read_frame(self.ptr, packet.as_mut_ptr()) };
        if ret == ffi::AVERROR_EOF {
            return Ok(false);
        }
        check(ret)?;
        tracing::trace!(
            stream = packet.stream_index(),
            pts = ?packet.pts(),
            size = packet.size(),
            "read packet"
        );
        Ok(true)
    }

    /**
        Seek to a timestamp.

        With a stream index the timestamp is in that stream's time base,
        without one it is in microseconds.
    */
    pub fn seek(&mut self, stream: Option<usize>, timestamp: i64, flags: SeekFlags) -> Result<()> {
        let stream_index = match stream {
            Some(index) if index < self.stream_count() => index as c_int,
            Some(index) => {
                return Err(Error::InvalidArgument(format!(
                    "stream index {index} out of range"
                )));
            }
            None => -1,
        };
        check(unsafe { ffi::av_seek_frame(self.ptr, stream_index, timestamp, flags.bits()) })?;
        tracing::debug!(stream = stream_index, timestamp, "seeked input");
        Ok(())
    }
}

impl Drop for InputContext {
    fn drop(&mut self) {
        unsafe { ffi::avformat_close_input(&mut self.ptr) }
    }
}

impl fmt::Debug for InputContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputContext")
            .field("url", &self.url)
            .field("format", &self.format_name())
            .field("streams", &self.stream_count())
            .finish()
    }
}
