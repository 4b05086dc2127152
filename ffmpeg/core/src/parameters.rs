/*!
    Borrowed views of `AVCodecParameters`.
*/

use std::fmt;
use std::marker::PhantomData;

use ffmpeg_next::ffi;

use crate::{ChannelLayout, CodecId, MediaType, PixelFormat, Result, SampleFormat, check};

/**
    Read-only view of a stream's codec parameters.

    Borrowed from the container or codec context that owns them.
*/
#[derive(Clone, Copy)]
pub struct Parameters<'a> {
    ptr: *const ffi::AVCodecParameters,
    _owner: PhantomData<&'a ffi::AVCodecParameters>,
}

impl Parameters<'_> {
    /**
        Wrap a borrowed parameters pointer.

        # Safety

        `ptr` must be non-null and stay valid for the chosen lifetime.
    */
    pub unsafe fn from_raw(ptr: *const ffi::AVCodecParameters) -> Self {
        Self {
            ptr,
            _owner: PhantomData,
        }
    }

    pub fn as_ptr(&self) -> *const ffi::AVCodecParameters {
        self.ptr
    }

    pub fn media_type(&self) -> MediaType {
        MediaType::from(unsafe { (*self.ptr).codec_type })
    }

    pub fn codec_id(&self) -> CodecId {
        CodecId::from(unsafe { (*self.ptr).codec_id })
    }

    pub fn width(&self) -> u32 {
        unsafe { (*self.ptr).width.max(0) as u32 }
    }

    pub fn height(&self) -> u32 {
        unsafe { (*self.ptr).height.max(0) as u32 }
    }

    /**
        Pixel format, meaningful for video streams.
    */
    pub fn pixel_format(&self) -> PixelFormat {
        crate::pixel_format_from_raw(unsafe { (*self.ptr).format })
    }

    /**
        Sample format, meaningful for audio streams.
    */
    pub fn sample_format(&self) -> SampleFormat {
        crate::sample_format_from_raw(unsafe { (*self.ptr).format })
    }

    pub fn sample_rate(&self) -> u32 {
        unsafe { (*self.ptr).sample_rate.max(0) as u32 }
    }

    pub fn channel_layout(&self) -> Result<ChannelLayout> {
        // SAFETY: ch_layout is initialized in allocated parameters.
        unsafe { ChannelLayout::copy_from_raw(&(*self.ptr).ch_layout) }
    }

    pub fn bit_rate(&self) -> i64 {
        unsafe { (*self.ptr).bit_rate }
    }

    /**
        Audio samples per frame, 0 if variable or unknown.
    */
    pub fn frame_size(&self) -> usize {
        unsafe { (*self.ptr).frame_size.max(0) as usize }
    }
}

/**
    Copy every field of `src` into `dst`, replacing what `dst` held.

    # Safety

    Both pointers must be valid, and `dst` must not alias `src`.
*/
pub unsafe fn copy_parameters(
    dst: *mut ffi::AVCodecParameters,
    src: *const ffi::AVCodecParameters,
) -> Result<()> {
    // SAFETY: guaranteed by the caller.
    check(unsafe { ffi::avcodec_parameters_copy(dst, src) })?;
    Ok(())
}

impl fmt::Debug for Parameters<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Parameters");
        s.field("media_type", &self.media_type())
            .field("codec_id", &self.codec_id());
        match self.media_type() {
            MediaType::Video => s
                .field("width", &self.width())
                .field("height", &self.height())
                .field("pixel_format", &self.pixel_format()),
            MediaType::Audio => s
                .field("sample_rate", &self.sample_rate())
                .field("sample_format", &self.sample_format()),
            _ => &mut s,
        };
        s.finish_non_exhaustive()
    }
}
