/*!
    Codec lookup.
*/

use std::fmt;
use std::os::raw::c_int;

use ffmpeg_next::ffi;

use crate::convert::{from_cstr, to_cstring};
use crate::{CodecId, MediaType};

/**
    A registered FFmpeg codec implementation (decoder or encoder).

    Codecs are static descriptors owned by FFmpeg, so this is a plain
    copyable reference that is never released.
*/
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    ptr: *const ffi::AVCodec,
}

// SAFETY: codec descriptors are immutable statics inside FFmpeg.
unsafe impl Send for Codec {}
unsafe impl Sync for Codec {}

impl Codec {
    fn wrap(ptr: *const ffi::AVCodec) -> Option<Self> {
        if ptr.is_null() {
            None
        } else {
            Some(Self { ptr })
        }
    }

    /**
        Find the preferred decoder for a codec id.
    */
    pub fn find_decoder(id: CodecId) -> Option<Self> {
        Self::wrap(unsafe { ffi::avcodec_find_decoder(id.into()) })
    }

    /**
        Find a decoder by name, e.g. `"h264"`.
    */
    pub fn find_decoder_by_name(name: &str) -> Option<Self> {
        let name = to_cstring(name).ok()?;
        Self::wrap(unsafe { ffi::avcodec_find_decoder_by_name(name.as_ptr()) })
    }

    /**
        Find the preferred encoder for a codec id.
    */
    pub fn find_encoder(id: CodecId) -> Option<Self> {
        Self::wrap(unsafe { ffi::avcodec_find_encoder(id.into()) })
    }

    /**
        Find an encoder by name, e.g. `"libx264"`.
    */
    pub fn find_encoder_by_name(name: &str) -> Option<Self> {
        let name = to_cstring(name).ok()?;
        Self::wrap(unsafe { ffi::avcodec_find_encoder_by_name(name.as_ptr()) })
    }

    pub fn as_ptr(&self) -> *const ffi::AVCodec {
        self.ptr
    }

    /**
        Short name, e.g. `"aac"`.
    */
    pub fn name(&self) -> String {
        unsafe { from_cstr((*self.ptr).name) }.unwrap_or_default()
    }

    /**
        Descriptive name, e.g. `"AAC (Advanced Audio Coding)"`.
    */
    pub fn long_name(&self) -> String {
        unsafe { from_cstr((*self.ptr).long_name) }.unwrap_or_default()
    }

    pub fn id(&self) -> CodecId {
        CodecId::from(unsafe { (*self.ptr).id })
    }

    pub fn media_type(&self) -> MediaType {
        MediaType::from(unsafe { (*self.ptr).type_ })
    }

    pub fn is_encoder(&self) -> bool {
        unsafe { ffi::av_codec_is_encoder(self.ptr) != 0 }
    }

    pub fn is_decoder(&self) -> bool {
        unsafe { ffi::av_codec_is_decoder(self.ptr) != 0 }
    }

    /**
        Raw `AV_CODEC_CAP_*` bits.
    */
    pub fn capabilities(&self) -> i32 {
        unsafe { (*self.ptr).capabilities }
    }

    /**
        Returns true if the encoder accepts audio frames of any size.
    */
    pub fn has_variable_frame_size(&self) -> bool {
        self.capabilities() & ffi::AV_CODEC_CAP_VARIABLE_FRAME_SIZE as c_int != 0
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("name", &self.name())
            .field("id", &self.id())
            .field("media_type", &self.media_type())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_builtin_codecs() {
        let decoder = Codec::find_decoder(CodecId::AAC).unwrap();
        assert!(decoder.is_decoder());
        assert_eq!(decoder.id(), CodecId::AAC);
        assert_eq!(decoder.media_type(), MediaType::Audio);
        assert!(!decoder.long_name().is_empty());

        let encoder = Codec::find_encoder_by_name("mpeg4").unwrap();
        assert!(encoder.is_encoder());
        assert_eq!(encoder.name(), "mpeg4");
        assert_eq!(encoder.media_type(), MediaType::Video);
    }

    #[test]
    fn pcm_has_variable_frame_size() {
        let encoder = Codec::find_encoder_by_name("pcm_s16le").unwrap();
        assert!(encoder.has_variable_frame_size());
    }

    #[test]
    fn missing_codecs_are_none() {
        assert!(Codec::find_encoder_by_name("definitely_not_a_codec").is_none());
        assert!(Codec::find_decoder_by_name("definitely_not_a_codec").is_none());
        assert!(Codec::find_encoder_by_name("bad\0name").is_none());
    }
}
