/*!
    Error translation for native FFmpeg status codes.
*/

use std::borrow::Borrow;
use std::ffi::CStr;
use std::os::raw::{c_char, c_int};

use ffmpeg_next::ffi;
use ffmpeg_types::Status;
use thiserror::Error;

const DESCRIPTION_LEN: usize = 64;

/**
    Error type for the ffmpeg crate ecosystem.

    Every negative status returned by FFmpeg becomes [`Error::Native`],
    rendered through FFmpeg's own description lookup. The remaining
    variants describe misuse that the wrappers catch before calling
    into FFmpeg.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Negative status code returned by an FFmpeg call.
    #[error("{}", describe(.code))]
    Native { code: i32 },
    /// The operation is not valid in the current lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
    /// An argument could not be passed to FFmpeg.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /**
        Create an error from a native status code.
    */
    #[inline]
    pub const fn from_code(code: i32) -> Self {
        Self::Native { code }
    }

    /// End of file (`AVERROR_EOF`).
    pub fn eof() -> Self {
        Self::from_code(ffi::AVERROR_EOF)
    }

    /// Resource temporarily unavailable (`EAGAIN`).
    pub fn again() -> Self {
        Self::from_code(ffi::AVERROR(ffi::EAGAIN as c_int))
    }

    /// Invalid data found when processing input.
    pub fn invalid_data() -> Self {
        Self::from_code(ffi::AVERROR_INVALIDDATA)
    }

    /// No decoder is registered for the requested codec.
    pub fn decoder_not_found() -> Self {
        Self::from_code(ffi::AVERROR_DECODER_NOT_FOUND)
    }

    /// No encoder is registered for the requested codec.
    pub fn encoder_not_found() -> Self {
        Self::from_code(ffi::AVERROR_ENCODER_NOT_FOUND)
    }

    /// No demuxer matches the input.
    pub fn demuxer_not_found() -> Self {
        Self::from_code(ffi::AVERROR_DEMUXER_NOT_FOUND)
    }

    /// No muxer matches the requested output format.
    pub fn muxer_not_found() -> Self {
        Self::from_code(ffi::AVERROR_MUXER_NOT_FOUND)
    }

    /// A named filter does not exist.
    pub fn filter_not_found() -> Self {
        Self::from_code(ffi::AVERROR_FILTER_NOT_FOUND)
    }

    /// No stream of the requested kind exists.
    pub fn stream_not_found() -> Self {
        Self::from_code(ffi::AVERROR_STREAM_NOT_FOUND)
    }

    /// The url's protocol is not supported.
    pub fn protocol_not_found() -> Self {
        Self::from_code(ffi::AVERROR_PROTOCOL_NOT_FOUND)
    }

    /// An option name was not recognized.
    pub fn option_not_found() -> Self {
        Self::from_code(ffi::AVERROR_OPTION_NOT_FOUND)
    }

    /// Internal FFmpeg bug.
    pub fn bug() -> Self {
        Self::from_code(ffi::AVERROR_BUG)
    }

    /// Allocation failure (`ENOMEM`).
    pub fn no_memory() -> Self {
        Self::from_code(ffi::AVERROR(ffi::ENOMEM as c_int))
    }

    /// Unknown error.
    pub fn unknown() -> Self {
        Self::from_code(ffi::AVERROR_UNKNOWN)
    }

    /**
        Returns the native status code, if this error came from FFmpeg.
    */
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Native { code } => Some(*code),
            _ => None,
        }
    }

    /**
        Returns true if this is the end-of-file status.
    */
    pub fn is_eof(&self) -> bool {
        self.code() == Some(ffi::AVERROR_EOF)
    }

    /**
        Returns true if this is the try-again status.
    */
    pub fn is_again(&self) -> bool {
        self.code() == Some(ffi::AVERROR(ffi::EAGAIN as c_int))
    }
}

/**
    Result type alias for the ffmpeg crate ecosystem.
*/
pub type Result<T> = std::result::Result<T, Error>;

/**
    Check an FFmpeg return code, passing non-negative values through.
*/
#[inline]
pub fn check(code: c_int) -> Result<c_int> {
    if code < 0 {
        Err(Error::from_code(code))
    } else {
        Ok(code)
    }
}

/**
    Classify the return code of a send, receive or pull call.

    `EAGAIN` and `AVERROR_EOF` are control flow, not failures.
*/
#[inline]
pub fn status(code: c_int) -> Result<Status> {
    if code == ffi::AVERROR(ffi::EAGAIN as c_int) {
        Ok(Status::NeedsMoreInput)
    } else if code == ffi::AVERROR_EOF {
        Ok(Status::EndOfStream)
    } else {
        check(code).map(|_| Status::Success)
    }
}

/**
    Look up FFmpeg's human-readable description of a status code.
*/
pub fn describe(code: impl Borrow<i32>) -> String {
    let code = *code.borrow();
    let mut buf = [0 as c_char; DESCRIPTION_LEN];
    // SAFETY: the buffer is writable for its full length and
    // av_strerror always NUL-terminates within that length.
    unsafe {
        if ffi::av_strerror(code, buf.as_mut_ptr(), buf.len()) < 0 {
            return format!("unknown error code {code}");
        }
        CStr::from_ptr(buf.as_ptr()).to_string_lossy().into_owned()
    }
}
