/*!
    Muxing output container.
*/

use std::fmt;
use std::os::raw::c_int;
use std::ptr;

use ffmpeg_core::convert::{from_av_rational, from_cstr, to_av_rational, to_cstring};
use ffmpeg_core::{
    Codec, CodecContext, Dictionary, Error, Packet, Parameters, Rational, Result, check,
    copy_parameters, library,
};
use ffmpeg_next::ffi;
use ffmpeg_source::InputContext;

use crate::ContainerFormat;

/**
    An output container being written.

    Lifecycle: declare streams with [`OutputContext::add_stream`], open the
    IO with [`OutputContext::open_io`], write the header, write packets,
    then write the trailer. Dropping the context closes the IO and frees
    the native context, whether or not the trailer was written.
*/
pub struct OutputContext {
    ptr: *mut ffi::AVFormatContext,
    url: String,
    header_written: bool,
    trailer_written: bool,
}

// SAFETY: the context is exclusively owned and mutated through &mut self only.
unsafe impl Send for OutputContext {}

impl OutputContext {
    /**
        Allocate an output context.

        The muxer is chosen by `format` name, or guessed from the url's
        extension when `None`.
    */
    pub fn new(url: &str, format: Option<&str>) -> Result<Self> {
        library::init()?;

        let c_url = to_cstring(url)?;
        let c_format = format.map(to_cstring).transpose()?;
        let format_ptr = c_format.as_ref().map_or(ptr::null(), |f| f.as_ptr());

        let mut raw: *mut ffi::AVFormatContext = ptr::null_mut();
        check(unsafe {
            ffi::avformat_alloc_output_context2(&mut raw, ptr::null_mut(), format_ptr, c_url.as_ptr())
        })
        .inspect_err(|e| tracing::debug!(url, ?format, error = %e, "no muxer for output"))?;
        if raw.is_null() {
            return Err(Error::muxer_not_found());
        }

        let output = Self {
            ptr: raw,
            url: url.to_owned(),
            header_written: false,
            trailer_written: false,
        };
        tracing::debug!(url, format = %output.format_name(), "created output");
        Ok(output)
    }

    /**
        Allocate an output context for a known container.
    */
    pub fn with_format(url: &str, format: &ContainerFormat) -> Result<Self> {
        Self::new(url, Some(format.ffmpeg_format_name()))
    }

    pub fn as_ptr(&self) -> *const ffi::AVFormatContext {
        self.ptr
    }

    pub fn as_mut_ptr(&mut self) -> *mut ffi::AVFormatContext {
        self.ptr
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /**
        Short name of the muxer, e.g. `"mp4"`.
    */
    pub fn format_name(&self) -> String {
        unsafe { from_cstr((*(*self.ptr).oformat).name) }.unwrap_or_default()
    }

    fn format_flags(&self) -> c_int {
        unsafe { (*(*self.ptr).oformat).flags }
    }

    /**
        Returns true if encoders feeding this muxer must emit global headers.
    */
    pub fn requires_global_header(&self) -> bool {
        self.format_flags() & ffi::AVFMT_GLOBALHEADER as c_int != 0
    }

    /**
        Returns true if the muxer does its own IO and needs no opened file.
    */
    pub fn is_nofile(&self) -> bool {
        self.format_flags() & ffi::AVFMT_NOFILE as c_int != 0
    }

    pub fn header_written(&self) -> bool {
        self.header_written
    }

    pub fn stream_count(&self) -> usize {
        unsafe { (*self.ptr).nb_streams as usize }
    }

    fn raw_stream(&self, index: usize) -> Result<*mut ffi::AVStream> {
        if index >= self.stream_count() {
            return Err(Error::InvalidArgument(format!(
                "stream index {index} out of range"
            )));
        }
        Ok(unsafe { *(*self.ptr).streams.add(index) })
    }

    /**
        Declare a new output stream and return its index.
    */
    pub fn add_stream(&mut self, codec: Option<&Codec>) -> Result<usize> {
        if self.header_written {
            return Err(Error::InvalidState("streams must be added before the header"));
        }
        let codec = codec.map_or(ptr::null(), |c| c.as_ptr());
        let stream = unsafe { ffi::avformat_new_stream(self.ptr, codec) };
        if stream.is_null() {
            return Err(Error::no_memory());
        }
        let index = unsafe { (*stream).index.max(0) as usize };
        tracing::debug!(index, "added output stream");
        Ok(index)
    }

    /**
        Time base of a stream. The muxer may change it when writing the header.
    */
    pub fn stream_time_base(&self, index: usize) -> Result<Rational> {
        let stream = self.raw_stream(index)?;
        Ok(from_av_rational(unsafe { (*stream).time_base }))
    }

    /**
        Request a time base for a stream, before writing the header.
    */
    pub fn set_stream_time_base(&mut self, index: usize, time_base: Rational) -> Result<()> {
        if time_base.num <= 0 || time_base.den <= 0 {
            return Err(Error::InvalidArgument(format!(
                "invalid stream time base {time_base}"
            )));
        }
        let stream = self.raw_stream(index)?;
        unsafe { (*stream).time_base = to_av_rational(time_base) };
        Ok(())
    }

    /**
        Codec parameters of an output stream.
    */
    pub fn stream_parameters(&self, index: usize) -> Result<Parameters<'_>> {
        let stream = self.raw_stream(index)?;
        // SAFETY: the parameters live as long as the container borrow.
        Ok(unsafe { Parameters::from_raw((*stream).codecpar) })
    }

    /**
        Copy the codec parameters of an input stream, for remuxing without
        re-encoding.
    */
    pub fn copy_parameters_from(
        &mut self,
        index: usize,
        input: &InputContext,
        input_index: usize,
    ) -> Result<()> {
        let source = input.parameters(input_index).ok_or_else(|| {
            Error::InvalidArgument(format!("input stream index {input_index} out of range"))
        })?;
        let stream = self.raw_stream(index)?;
        // SAFETY: both parameter sets are valid and belong to different containers.
        unsafe {
            copy_parameters((*stream).codecpar, source.as_ptr())?;
            // The source container's codec tag may not be valid in this one.
            (*(*stream).codecpar).codec_tag = 0;
        }
        Ok(())
    }

    /**
        Copy an opened encoder's negotiated parameters into a stream.
    */
    pub fn set_parameters_from_encoder(&mut self, index: usize, encoder: &CodecContext) -> Result<()> {
        let stream = self.raw_stream(index)?;
        // SAFETY: the stream's codec parameters are valid and writable.
        unsafe { encoder.copy_parameters_to((*stream).codecpar) }
    }

    /**
        Open the output file, unless the muxer does its own IO.
    */
    pub fn open_io(&mut self) -> Result<()> {
        if self.is_nofile() {
            return Ok(());
        }
        let url = to_cstring(&self.url)?;
        check(unsafe {
            ffi::avio_open(&mut (*self.ptr).pb, url.as_ptr(), ffi::AVIO_FLAG_WRITE as c_int)
        })?;
        Ok(())
    }

    /**
        Write the container header. Must follow all stream declarations.
    */
    pub fn write_header(&mut self, options: Option<&mut Dictionary>) -> Result<()> {
        if self.header_written {
            return Err(Error::InvalidState("header already written"));
        }
        let options = match options {
            Some(dict) => dict.as_mut_ptr(),
            None => ptr::null_mut(),
        };
        check(unsafe { ffi::avformat_write_header(self.ptr, options) })?;
        self.header_written = true;
        tracing::debug!(url = %self.url, streams = self.stream_count(), "wrote header");
        Ok(())
    }

    /**
        Write a packet, letting the muxer interleave streams.

        The packet's timestamps must already be in the stream's time base.
        The muxer takes the packet's data; the packet is left empty.
    */
    pub fn write_interleaved(&mut self, packet: &mut Packet) -> Result<()> {
        if !self.header_written {
            return Err(Error::InvalidState("header not written"));
        }
        if packet.stream_index() >= self.stream_count() {
            return Err(Error::InvalidArgument(format!(
                "packet stream index {} out of range",
                packet.stream_index()
            )));
        }
        if packet.pts().is_none() && packet.dts().is_none() {
            tracing::warn!(stream = packet.stream_index(), "writing packet without timestamps");
        }
        tracing::trace!(
            stream = packet.stream_index(),
            pts = ?packet.pts(),
            dts = ?packet.dts(),
            size = packet.size(),
            "write packet"
        );
        check(unsafe { ffi::av_interleaved_write_frame(self.ptr, packet.as_mut_ptr()) })?;
        Ok(())
    }

    /**
        Flush interleaving queues and write the container trailer.
    */
    pub fn write_trailer(&mut self) -> Result<()> {
        if !self.header_written {
            return Err(Error::InvalidState("header not written"));
        }
        if self.trailer_written {
            return Err(Error::InvalidState("trailer already written"));
        }
        check(unsafe { ffi::av_write_trailer(self.ptr) })?;
        self.trailer_written = true;
        tracing::debug!(url = %self.url, "wrote trailer");
        Ok(())
    }
}

impl Drop for OutputContext {
    fn drop(&mut self) {
        unsafe {
            if !self.is_nofile() && !(*self.ptr).pb.is_null() {
                ffi::avio_closep(&mut (*self.ptr).pb);
            }
            ffi::avformat_free_context(self.ptr);
        }
    }
}

impl fmt::Debug for OutputContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputContext")
            .field("url", &self.url)
            .field("format", &self.format_name())
            .field("streams", &self.stream_count())
            .field("header_written", &self.header_written)
            .finish()
    }
}
