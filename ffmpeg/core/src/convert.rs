/*!
    Conversions between the shared value types and their FFmpeg equivalents.
*/

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use ffmpeg_next::ffi;
use ffmpeg_types::Rational;

use crate::{Error, Result};

/**
    Convert a [`Rational`] into an `AVRational`.
*/
#[inline]
pub fn to_av_rational(r: Rational) -> ffi::AVRational {
    ffi::AVRational {
        num: r.num,
        den: r.den,
    }
}

/**
    Convert an `AVRational` into a [`Rational`].
*/
#[inline]
pub fn from_av_rational(r: ffi::AVRational) -> Rational {
    Rational::new(r.num, r.den)
}

/**
    Build a C string for passing to FFmpeg.
*/
pub fn to_cstring(s: &str) -> Result<CString> {
    CString::new(s).map_err(|_| Error::InvalidArgument(format!("string contains NUL: {s:?}")))
}

/**
    Copy a C string returned by FFmpeg, if the pointer is non-null.

    # Safety

    `ptr` must be null or point to a NUL-terminated string.
*/
pub unsafe fn from_cstr(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: guaranteed by the caller.
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}
