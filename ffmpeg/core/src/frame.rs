/*!
    Owned `AVFrame` handle.
*/

use std::fmt;
use std::mem;
use std::os::raw::c_int;

use ffmpeg_next::ffi;
use ffmpeg_types::{Pts, Rational};

use crate::convert::{from_av_rational, to_av_rational};
use crate::{ChannelLayout, Error, PixelFormat, Result, SampleFormat, check};

/**
    A decoded (raw) media frame: video pixels or audio samples.

    Owns exactly one `AVFrame`, freed on drop. Frames are move-only;
    hand a frame's data to another owner with [`Frame::move_ref_from`].
*/
pub struct Frame {
    ptr: *mut ffi::AVFrame,
}

// SAFETY: the frame is exclusively owned and FFmpeg's buffer references are
// atomically reference counted.
unsafe impl Send for Frame {}

impl Frame {
    /**
        Allocate a new empty frame.
    */
    pub fn new() -> Result<Self> {
        let ptr = unsafe { ffi::av_frame_alloc() };
        if ptr.is_null() {
            return Err(Error::no_memory());
        }
        Ok(Self { ptr })
    }

    /**
        Allocate a video frame with buffers for the given shape.
    */
    pub fn new_video(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        let mut frame = Self::new()?;
        frame.set_width(width);
        frame.set_height(height);
        frame.set_pixel_format(format);
        frame.allocate_buffers(0)?;
        Ok(frame)
    }

    /**
        Allocate an audio frame with buffers for the given shape.
    */
    pub fn new_audio(
        samples: usize,
        sample_rate: u32,
        format: SampleFormat,
        layout: &ChannelLayout,
    ) -> Result<Self> {
        let mut frame = Self::new()?;
        frame.set_samples(samples);
        frame.set_sample_rate(sample_rate);
        frame.set_sample_format(format);
        frame.set_channel_layout(layout)?;
        frame.allocate_buffers(0)?;
        Ok(frame)
    }

    /**
        Take ownership of a raw frame pointer.

        # Safety

        `ptr` must be a non-null frame from `av_frame_alloc` that nothing
        else frees.
    */
    pub unsafe fn from_raw(ptr: *mut ffi::AVFrame) -> Self {
        Self { ptr }
    }

    /**
        Release ownership of the raw frame pointer.
    */
    pub fn into_raw(self) -> *mut ffi::AVFrame {
        let ptr = self.ptr;
        mem::forget(self);
        ptr
    }

    pub fn as_ptr(&self) -> *const ffi::AVFrame {
        self.ptr
    }

    pub fn as_mut_ptr(&mut self) -> *mut ffi::AVFrame {
        self.ptr
    }

    /**
        Returns true if the frame holds no data buffers.
    */
    pub fn is_empty(&self) -> bool {
        unsafe { (*self.ptr).buf[0].is_null() }
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

    /**
        The pixel format, for video frames.
    */
    pub fn pixel_format(&self) -> PixelFormat {
        crate::pixel_format_from_raw(unsafe { (*self.ptr).format })
    }

    pub fn set_pixel_format(&mut self, format: PixelFormat) {
        unsafe { (*self.ptr).format = ffi::AVPixelFormat::from(format) as c_int }
    }

    /**
        The sample format, for audio frames.
    */
    pub fn sample_format(&self) -> SampleFormat {
        crate::sample_format_from_raw(unsafe { (*self.ptr).format })
    }

    pub fn set_sample_format(&mut self, format: SampleFormat) {
        unsafe { (*self.ptr).format = ffi::AVSampleFormat::from(format) as c_int }
    }

    pub fn sample_rate(&self) -> u32 {
        unsafe { (*self.ptr).sample_rate.max(0) as u32 }
    }

    pub fn set_sample_rate(&mut self, rate: u32) {
        unsafe { (*self.ptr).sample_rate = rate as c_int }
    }

    /**
        Number of audio samples per channel.
    */
    pub fn samples(&self) -> usize {
        unsafe { (*self.ptr).nb_samples.max(0) as usize }
    }

    pub fn set_samples(&mut self, samples: usize) {
        unsafe { (*self.ptr).nb_samples = samples as c_int }
    }

    /**
        A copy of the audio channel layout.
    */
    pub fn channel_layout(&self) -> Result<ChannelLayout> {
        // SAFETY: ch_layout is always initialized in an allocated frame.
        unsafe { ChannelLayout::copy_from_raw(&(*self.ptr).ch_layout) }
    }

    pub fn set_channel_layout(&mut self, layout: &ChannelLayout) -> Result<()> {
        // SAFETY: ch_layout is always initialized in an allocated frame.
        unsafe { layout.copy_into_raw(&mut (*self.ptr).ch_layout) }
    }

    /**
        Presentation timestamp, or `None` if unset.
    */
    pub fn pts(&self) -> Option<Pts> {
        Pts::from_raw(unsafe { (*self.ptr).pts })
    }

    pub fn set_pts(&mut self, pts: Option<Pts>) {
        unsafe { (*self.ptr).pts = Pts::into_raw(pts) }
    }

    /**
        Frame duration in time base units.
    */
    pub fn duration(&self) -> i64 {
        unsafe { (*self.ptr).duration }
    }

    pub fn set_duration(&mut self, duration: i64) {
        unsafe { (*self.ptr).duration = duration }
    }

    /**
        Time base of `pts` and `duration`.
    */
    pub fn time_base(&self) -> Rational {
        from_av_rational(unsafe { (*self.ptr).time_base })
    }

    pub fn set_time_base(&mut self, time_base: Rational) {
        unsafe { (*self.ptr).time_base = to_av_rational(time_base) }
    }

    pub fn is_key_frame(&self) -> bool {
        unsafe { (*self.ptr).flags & ffi::AV_FRAME_FLAG_KEY as c_int != 0 }
    }

    /**
        Pointer to the start of a data plane, null if the plane is unused.
    */
    pub fn data_ptr(&self, plane: usize) -> *const u8 {
        if plane >= 8 {
            return std::ptr::null();
        }
        unsafe { (*self.ptr).data[plane] }
    }

    /**
        Mutable pointer to the start of a data plane.
    */
    pub fn data_mut_ptr(&mut self, plane: usize) -> *mut u8 {
        if plane >= 8 {
            return std::ptr::null_mut();
        }
        unsafe { (*self.ptr).data[plane] }
    }

    /**
        Size in bytes of one line of a plane (may include padding).
    */
    pub fn linesize(&self, plane: usize) -> i32 {
        if plane >= 8 {
            return 0;
        }
        unsafe { (*self.ptr).linesize[plane] }
    }

    /**
        Allocate data buffers for the current format and dimensions.

        Pass `0` as `align` to let FFmpeg choose.
    */
    pub fn allocate_buffers(&mut self, align: i32) -> Result<()> {
        check(unsafe { ffi::av_frame_get_buffer(self.ptr, align) })?;
        Ok(())
    }

    /**
        Ensure the data is not shared with another frame, copying if needed.
    */
    pub fn make_writable(&mut self) -> Result<()> {
        check(unsafe { ffi::av_frame_make_writable(self.ptr) })?;
        Ok(())
    }

    /**
        Copy metadata (timestamps, time base, flags...) but not data.
    */
    pub fn copy_properties_from(&mut self, source: &Frame) -> Result<()> {
        check(unsafe { ffi::av_frame_copy_props(self.ptr, source.ptr) })?;
        Ok(())
    }

    /**
        Move all buffer references out of `source` into this frame.

        Anything this frame held is released first. `source` is left empty.
    */
    pub fn move_ref_from(&mut self, source: &mut Frame) {
        unsafe {
            ffi::av_frame_unref(self.ptr);
            ffi::av_frame_move_ref(self.ptr, source.ptr);
        }
    }

    /**
        Release all buffers and reset fields to defaults.
    */
    pub fn unref(&mut self) {
        unsafe { ffi::av_frame_unref(self.ptr) }
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        unsafe { ffi::av_frame_free(&mut self.ptr) }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("samples", &self.samples())
            .field("sample_rate", &self.sample_rate())
            .field("pts", &self.pts())
            .field("time_base", &self.time_base())
            .finish_non_exhaustive()
    }
}
