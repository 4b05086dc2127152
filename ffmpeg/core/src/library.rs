/*!
    Process-wide FFmpeg state: initialization, versions and log level.

    FFmpeg keeps its log level and registration state globally. Nothing
    here runs implicitly; call [`init`] once at process start (the reader
    and writer constructors do so as well).
*/

use std::os::raw::c_int;
use std::sync::OnceLock;

use ffmpeg_next::ffi;
use tracing::debug;

use crate::convert::from_cstr;
use crate::{Error, Result};

static INIT: OnceLock<Result<()>> = OnceLock::new();

/**
    Initialize FFmpeg. Safe to call any number of times.
*/
pub fn init() -> Result<()> {
    INIT.get_or_init(|| {
        ffmpeg_next::init().map_err(|e| Error::from_code(e.into()))?;
        debug!(
            version = %version_info(),
            avcodec = avcodec_version(),
            avformat = avformat_version(),
            "initialized ffmpeg"
        );
        Ok(())
    })
    .clone()
}

/**
    The FFmpeg release string, e.g. `"7.1"` or `"n8.0"`.
*/
pub fn version_info() -> String {
    // SAFETY: av_version_info returns a static NUL-terminated string.
    unsafe { from_cstr(ffi::av_version_info()) }.unwrap_or_default()
}

/**
    The libavutil version number.
*/
pub fn avutil_version() -> u32 {
    unsafe { ffi::avutil_version() }
}

/**
    The libavcodec version number.
*/
pub fn avcodec_version() -> u32 {
    unsafe { ffi::avcodec_version() }
}

/**
    The libavformat version number.
*/
pub fn avformat_version() -> u32 {
    unsafe { ffi::avformat_version() }
}

/**
    FFmpeg log levels.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Quiet,
    Panic,
    Fatal,
    Error,
    Warning,
    Info,
    Verbose,
    Debug,
    Trace,
}

impl LogLevel {
    /**
        The raw `AV_LOG_*` value.
    */
    pub const fn as_raw(self) -> c_int {
        match self {
            Self::Quiet => -8,
            Self::Panic => 0,
            Self::Fatal => 8,
            Self::Error => 16,
            Self::Warning => 24,
            Self::Info => 32,
            Self::Verbose => 40,
            Self::Debug => 48,
            Self::Trace => 56,
        }
    }

    /**
        Map a raw `AV_LOG_*` value to the closest level at or below it.
    */
    pub const fn from_raw(raw: c_int) -> Self {
        match raw {
            i32::MIN..0 => Self::Quiet,
            0..8 => Self::Panic,
            8..16 => Self::Fatal,
            16..24 => Self::Error,
            24..32 => Self::Warning,
            32..40 => Self::Info,
            40..48 => Self::Verbose,
            48..56 => Self::Debug,
            _ => Self::Trace,
        }
    }
}

/**
    Set FFmpeg's global log level.
*/
pub fn set_log_level(level: LogLevel) {
    unsafe { ffi::av_log_set_level(level.as_raw()) }
}

/**
    Get FFmpeg's global log level.
*/
pub fn log_level() -> LogLevel {
    LogLevel::from_raw(unsafe { ffi::av_log_get_level() })
}
