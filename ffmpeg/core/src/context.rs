/*!
    Codec sessions: one opened decoder or encoder.
*/

use std::fmt;
use std::os::raw::c_int;
use std::ptr;

use ffmpeg_next::ffi;
use ffmpeg_types::{Rational, Status};

use crate::convert::{from_av_rational, to_av_rational};
use crate::{
    ChannelLayout, Codec, Dictionary, Error, Frame, MediaType, Packet, Parameters, PixelFormat,
    Result, SampleFormat, check, status,
};

/**
    An owned `AVCodecContext`.

    Created unopened from a [`Codec`]; configure it through the setters
    (or [`CodecContext::set_parameters`] for decoders), then call
    [`CodecContext::open`]. The send/receive calls report backpressure
    and end of stream as [`Status`] values rather than errors.
*/
pub struct CodecContext {
    ptr: *mut ffi::AVCodecContext,
    codec: Codec,
}

// SAFETY: the context is exclusively owned and only touched through &mut self
// for anything that mutates it.
unsafe impl Send for CodecContext {}

impl CodecContext {
    /**
        Allocate a context for the given codec.
    */
    pub fn new(codec: &Codec) -> Result<Self> {
        let ptr = unsafe { ffi::avcodec_alloc_context3(codec.as_ptr()) };
        if ptr.is_null() {
            return Err(Error::no_memory());
        }
        Ok(Self { ptr, codec: *codec })
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn as_ptr(&self) -> *const ffi::AVCodecContext {
        self.ptr
    }

    pub fn as_mut_ptr(&mut self) -> *mut ffi::AVCodecContext {
        self.ptr
    }

    /**
        Fill the context from stream parameters, typically before opening a decoder.
    */
    pub fn set_parameters(&mut self, params: Parameters<'_>) -> Result<()> {
        check(unsafe { ffi::avcodec_parameters_to_context(self.ptr, params.as_ptr()) })?;
        Ok(())
    }

    /**
        Write the context's negotiated parameters into a parameters struct.

        # Safety

        `dst` must point to valid, writable `AVCodecParameters`.
    */
    pub unsafe fn copy_parameters_to(&self, dst: *mut ffi::AVCodecParameters) -> Result<()> {
        // SAFETY: guaranteed by the caller.
        check(unsafe { ffi::avcodec_parameters_from_context(dst, self.ptr) })?;
        Ok(())
    }

    /**
        Open the codec. Options FFmpeg recognizes are consumed from the
        dictionary; the rest are left in it.
    */
    pub fn open(&mut self, options: Option<&mut Dictionary>) -> Result<()> {
        let options = match options {
            Some(dict) => dict.as_mut_ptr(),
            None => ptr::null_mut(),
        };
        check(unsafe { ffi::avcodec_open2(self.ptr, self.codec.as_ptr(), options) })?;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        unsafe { ffi::avcodec_is_open(self.ptr) != 0 }
    }

    pub fn codec_type(&self) -> MediaType {
        MediaType::from(unsafe { (*self.ptr).codec_type })
    }

    pub fn width(&self) -> u32 {
        unsafe { (*self.ptr).width.max(0) as u32 }
    }

    pub fn set_width(&mut self, width: u32) {
        unsafe { (*self.ptr).width = width as c_int }
    }

    pub fn height(&self) -> u32 {
        unsafe { (*self.ptr).height.max(0) as u32 }
    }

    pub fn set_height(&mut self, height: u32) {
        unsafe { (*self.ptr).height = height as c_int }
    }

    pub fn pixel_format(&self) -> PixelFormat {
        PixelFormat::from(unsafe { (*self.ptr).pix_fmt })
    }

    pub fn set_pixel_format(&mut self, format: PixelFormat) {
        unsafe { (*self.ptr).pix_fmt = format.into() }
    }

    pub fn sample_format(&self) -> SampleFormat {
        SampleFormat::from(unsafe { (*self.ptr).sample_fmt })
    }

    pub fn set_sample_format(&mut self, format: SampleFormat) {
        unsafe { (*self.ptr).sample_fmt = format.into() }
    }

    pub fn sample_rate(&self) -> u32 {
        unsafe { (*self.ptr).sample_rate.max(0) as u32 }
    }

    pub fn set_sample_rate(&mut self, rate: u32) {
        unsafe { (*self.ptr).sample_rate = rate as c_int }
    }

    pub fn channel_layout(&self) -> Result<ChannelLayout> {
        // SAFETY: ch_layout is initialized in an allocated context.
        unsafe { ChannelLayout::copy_from_raw(&(*self.ptr).ch_layout) }
    }

    pub fn set_channel_layout(&mut self, layout: &ChannelLayout) -> Result<()> {
        // SAFETY: ch_layout is initialized in an allocated context.
        unsafe { layout.copy_into_raw(&mut (*self.ptr).ch_layout) }
    }

    pub fn time_base(&self) -> Rational {
        from_av_rational(unsafe { (*self.ptr).time_base })
    }

    pub fn set_time_base(&mut self, time_base: Rational) {
        unsafe { (*self.ptr).time_base = to_av_rational(time_base) }
    }

    /**
        Time base of packets fed to a decoder.
    */
    pub fn packet_time_base(&self) -> Rational {
        from_av_rational(unsafe { (*self.ptr).pkt_timebase })
    }

    pub fn set_packet_time_base(&mut self, time_base: Rational) {
        unsafe { (*self.ptr).pkt_timebase = to_av_rational(time_base) }
    }

    pub fn frame_rate(&self) -> Rational {
        from_av_rational(unsafe { (*self.ptr).framerate })
    }

    pub fn set_frame_rate(&mut self, rate: Rational) {
        unsafe { (*self.ptr).framerate = to_av_rational(rate) }
    }

    pub fn bit_rate(&self) -> i64 {
        unsafe { (*self.ptr).bit_rate }
    }

    pub fn set_bit_rate(&mut self, bit_rate: i64) {
        unsafe { (*self.ptr).bit_rate = bit_rate }
    }

    pub fn gop_size(&self) -> i32 {
        unsafe { (*self.ptr).gop_size }
    }

    pub fn set_gop_size(&mut self, gop_size: i32) {
        unsafe { (*self.ptr).gop_size = gop_size }
    }

    pub fn max_b_frames(&self) -> i32 {
        unsafe { (*self.ptr).max_b_frames }
    }

    pub fn set_max_b_frames(&mut self, max_b_frames: i32) {
        unsafe { (*self.ptr).max_b_frames = max_b_frames }
    }

    /**
        Raw `AV_CODEC_FLAG_*` bits.
    */
    pub fn flags(&self) -> i32 {
        unsafe { (*self.ptr).flags }
    }

    pub fn set_flags(&mut self, flags: i32) {
        unsafe { (*self.ptr).flags = flags }
    }

    /**
        Place codec headers in extradata instead of every keyframe, as
        required by muxers with the `AVFMT_GLOBALHEADER` flag.
    */
    pub fn enable_global_header(&mut self) {
        let flags = self.flags() | ffi::AV_CODEC_FLAG_GLOBAL_HEADER as c_int;
        self.set_flags(flags);
    }

    /**
        Samples per channel an audio encoder expects in each frame.

        Zero means any frame size is accepted.
    */
    pub fn frame_size(&self) -> usize {
        unsafe { (*self.ptr).frame_size.max(0) as usize }
    }

    pub fn thread_count(&self) -> u32 {
        unsafe { (*self.ptr).thread_count.max(0) as u32 }
    }

    /**
        Number of worker threads, 0 lets FFmpeg decide.
    */
    pub fn set_thread_count(&mut self, threads: u32) {
        unsafe { (*self.ptr).thread_count = threads as c_int }
    }

    /**
        Feed one compressed packet to a decoder.
    */
    pub fn send_packet(&mut self, packet: &Packet) -> Result<Status> {
        status(unsafe { ffi::avcodec_send_packet(self.ptr, packet.as_ptr()) })
    }

    /**
        Signal end of input to a decoder, so buffered frames can be drained.
    */
    pub fn send_eof(&mut self) -> Result<Status> {
        status(unsafe { ffi::avcodec_send_packet(self.ptr, ptr::null()) })
    }

    /**
        Take the next decoded frame, if one is ready.
    */
    pub fn receive_frame(&mut self, frame: &mut Frame) -> Result<Status> {
        status(unsafe { ffi::avcodec_receive_frame(self.ptr, frame.as_mut_ptr()) })
    }

    /**
        Feed one raw frame to an encoder.
    */
    pub fn send_frame(&mut self, frame: &Frame) -> Result<Status> {
        status(unsafe { ffi::avcodec_send_frame(self.ptr, frame.as_ptr()) })
    }

    /**
        Signal end of input to an encoder, so buffered packets can be drained.
    */
    pub fn send_flush_frame(&mut self) -> Result<Status> {
        status(unsafe { ffi::avcodec_send_frame(self.ptr, ptr::null()) })
    }

    /**
        Take the next encoded packet, if one is ready.
    */
    pub fn receive_packet(&mut self, packet: &mut Packet) -> Result<Status> {
        status(unsafe { ffi::avcodec_receive_packet(self.ptr, packet.as_mut_ptr()) })
    }

    /**
        Drop all buffered data, e.g. after seeking.
    */
    pub fn flush_buffers(&mut self) {
        unsafe { ffi::avcodec_flush_buffers(self.ptr) }
    }
}

impl Drop for CodecContext {
    fn drop(&mut self) {
        unsafe { ffi::avcodec_free_context(&mut self.ptr) }
    }
}

impl fmt::Debug for CodecContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecContext")
            .field("codec", &self.codec.name())
            .field("codec_type", &self.codec_type())
            .field("time_base", &self.time_base())
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use ffmpeg_types::Pts;

    use super::*;
    use crate::CodecId;

    fn mpeg4_encoder() -> Option<CodecContext> {
        let codec = Codec::find_encoder(CodecId::MPEG4)?;
        let mut ctx = CodecContext::new(&codec).unwrap();
        ctx.set_width(64);
        ctx.set_height(48);
        ctx.set_pixel_format(PixelFormat::YUV420P);
        ctx.set_time_base(Rational::new(1, 25));
        ctx.set_frame_rate(Rational::new(25, 1));
        ctx.set_gop_size(12);
        ctx.set_max_b_frames(0);
        Some(ctx)
    }

    #[test]
    fn setters_round_trip() {
        let Some(ctx) = mpeg4_encoder() else { return };
        assert_eq!(ctx.width(), 64);
        assert_eq!(ctx.height(), 48);
        assert_eq!(ctx.pixel_format(), PixelFormat::YUV420P);
        assert_eq!(ctx.time_base(), Rational::new(1, 25));
        assert_eq!(ctx.gop_size(), 12);
        assert_eq!(ctx.max_b_frames(), 0);
        assert_eq!(ctx.codec_type(), MediaType::Video);
        assert!(!ctx.is_open());
    }

    #[test]
    fn global_header_flag() {
        let Some(mut ctx) = mpeg4_encoder() else { return };
        ctx.enable_global_header();
        assert_ne!(
            ctx.flags() & ffi::AV_CODEC_FLAG_GLOBAL_HEADER as c_int,
            0
        );
    }

    #[test]
    fn encode_then_drain_is_idempotent() {
        let Some(mut ctx) = mpeg4_encoder() else { return };
        ctx.open(None).unwrap();
        assert!(ctx.is_open());

        let mut packet = Packet::new().unwrap();
        let mut packets = 0;
        for i in 0..5 {
            let mut frame = Frame::new_video(64, 48, PixelFormat::YUV420P).unwrap();
            frame.set_pts(Some(Pts(i)));
            assert_eq!(ctx.send_frame(&frame).unwrap(), Status::Success);
            while ctx.receive_packet(&mut packet).unwrap() == Status::Success {
                packets += 1;
                packet.unref();
            }
        }

        assert_eq!(ctx.send_flush_frame().unwrap(), Status::Success);
        while ctx.receive_packet(&mut packet).unwrap() == Status::Success {
            packets += 1;
            packet.unref();
        }
        assert_eq!(packets, 5);

        // Draining again produces nothing.
        assert_eq!(
            ctx.receive_packet(&mut packet).unwrap(),
            Status::EndOfStream
        );
        assert_eq!(
            ctx.receive_packet(&mut packet).unwrap(),
            Status::EndOfStream
        );
    }

    #[test]
    fn negotiated_parameters_are_copied() {
        let Some(mut ctx) = mpeg4_encoder() else { return };
        ctx.open(None).unwrap();
        unsafe {
            let mut params = ffi::avcodec_parameters_alloc();
            assert!(!params.is_null());
            ctx.copy_parameters_to(params).unwrap();
            let view = Parameters::from_raw(params);
            assert_eq!(view.codec_id(), CodecId::MPEG4);
            assert_eq!(view.media_type(), MediaType::Video);
            assert_eq!(view.width(), 64);
            assert_eq!(view.height(), 48);
            assert_eq!(view.pixel_format(), PixelFormat::YUV420P);
            ffi::avcodec_parameters_free(&mut params);
        }
    }

    #[test]
    fn decoder_receive_before_input_needs_more() {
        let codec = Codec::find_decoder(CodecId::MPEG4).unwrap();
        let mut ctx = CodecContext::new(&codec).unwrap();
        ctx.open(None).unwrap();
        let mut frame = Frame::new().unwrap();
        assert_eq!(
            ctx.receive_frame(&mut frame).unwrap(),
            Status::NeedsMoreInput
        );
        assert_eq!(ctx.send_eof().unwrap(), Status::Success);
        assert_eq!(
            ctx.receive_frame(&mut frame).unwrap(),
            Status::EndOfStream
        );
    }
}
