/*!
    Owned FFmpeg handles and codec sessions.

    Every native resource is wrapped in a move-only type that releases it
    exactly once in `Drop`. Status codes are translated into [`Error`],
    except for the try-again and end-of-stream codes of the send/receive
    calls, which come back as [`Status`] values.

    # Handles

    - [`Frame`] and [`Packet`] - raw and compressed media units
    - [`Dictionary`] - string options passed to open calls
    - [`ChannelLayout`] - audio channel layouts
    - [`Codec`] and [`CodecContext`] - codec lookup and one codec session
    - [`Parameters`] - borrowed view of a stream's codec parameters
*/

mod codec;
mod context;
mod dictionary;
mod error;
mod frame;
mod layout;
mod packet;
mod parameters;

pub mod convert;
pub mod library;

use std::os::raw::c_int;

use ffmpeg_next::ffi;

pub use self::codec::Codec;
pub use self::context::CodecContext;
pub use self::dictionary::{Dictionary, entries_of};
pub use self::error::{Error, Result, check, describe, status};
pub use self::frame::Frame;
pub use self::layout::ChannelLayout;
pub use self::packet::Packet;
pub use self::parameters::{Parameters, copy_parameters};

pub use ffmpeg_types::{MediaDuration, Pts, Rational, Status, StreamType};

/// Pixel formats, as enumerated by FFmpeg.
pub type PixelFormat = ffmpeg_next::format::Pixel;
/// Audio sample formats, as enumerated by FFmpeg.
pub type SampleFormat = ffmpeg_next::format::Sample;
/// Whether a sample format stores channels interleaved or in planes.
pub type SampleLayout = ffmpeg_next::format::sample::Type;
/// Codec identifiers.
pub type CodecId = ffmpeg_next::codec::Id;
/// Stream and codec media kinds.
pub type MediaType = ffmpeg_next::media::Type;

/**
    Interpret the untyped `format` field of a video frame or parameters.
*/
pub fn pixel_format_from_raw(raw: c_int) -> PixelFormat {
    if !(0..ffi::AVPixelFormat::AV_PIX_FMT_NB as c_int).contains(&raw) {
        return PixelFormat::None;
    }
    // SAFETY: the value is within the contiguous range of declared variants.
    PixelFormat::from(unsafe { std::mem::transmute::<c_int, ffi::AVPixelFormat>(raw) })
}

/**
    Interpret the untyped `format` field of an audio frame or parameters.
*/
pub fn sample_format_from_raw(raw: c_int) -> SampleFormat {
    if !(0..ffi::AVSampleFormat::AV_SAMPLE_FMT_NB as c_int).contains(&raw) {
        return SampleFormat::None;
    }
    // SAFETY: the value is within the contiguous range of declared variants.
    SampleFormat::from(unsafe { std::mem::transmute::<c_int, ffi::AVSampleFormat>(raw) })
}

/**
    Media type of a stream kind.
*/
pub fn media_type_of(kind: StreamType) -> MediaType {
    match kind {
        StreamType::Video => MediaType::Video,
        StreamType::Audio => MediaType::Audio,
    }
}

static_assertions::assert_impl_all!(Frame: Send);
static_assertions::assert_impl_all!(Packet: Send);
static_assertions::assert_impl_all!(CodecContext: Send);
static_assertions::assert_impl_all!(Dictionary: Send);
static_assertions::assert_impl_all!(ChannelLayout: Send, Clone);
static_assertions::assert_impl_all!(Codec: Send, Sync, Copy);
static_assertions::assert_impl_all!(Error: Send, Sync, std::error::Error);
static_assertions::assert_not_impl_any!(Frame: Sync, Clone);
static_assertions::assert_not_impl_any!(Packet: Sync, Clone);
