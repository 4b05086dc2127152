/*!
    Audio channel layouts.
*/

use std::fmt;
use std::mem;
use std::os::raw::{c_char, c_int};

use ffmpeg_next::ffi;

use crate::convert::{from_cstr, to_cstring};
use crate::{Error, Result, check};

const DESCRIPTION_LEN: usize = 128;

/**
    An owned `AVChannelLayout`.

    Layouts with a custom channel order hold an allocation, so the layout
    is released in `Drop` and copied through FFmpeg on `Clone`.
*/
pub struct ChannelLayout {
    raw: ffi::AVChannelLayout,
}

// SAFETY: the layout owns its (optional) channel map exclusively.
unsafe impl Send for ChannelLayout {}

impl ChannelLayout {
    /**
        The default layout for the given number of channels.
    */
    pub fn default_for(channels: u32) -> Self {
        // SAFETY: an all-zero AVChannelLayout is the valid "unspecified" layout,
        // which av_channel_layout_default overwrites.
        unsafe {
            let mut raw: ffi::AVChannelLayout = mem::zeroed();
            ffi::av_channel_layout_default(&mut raw, channels as c_int);
            Self { raw }
        }
    }

    /**
        Single channel layout.
    */
    pub fn mono() -> Self {
        Self::default_for(1)
    }

    /**
        Two channel layout.
    */
    pub fn stereo() -> Self {
        Self::default_for(2)
    }

    /**
        Parse a layout from a name such as `"stereo"` or `"5.1"`.
    */
    pub fn from_name(name: &str) -> Result<Self> {
        let name = to_cstring(name)?;
        // SAFETY: zeroed is a valid starting value; on failure the layout
        // is uninitialized again by Drop.
        unsafe {
            let mut layout = Self {
                raw: mem::zeroed(),
            };
            check(ffi::av_channel_layout_from_string(
                &mut layout.raw,
                name.as_ptr(),
            ))?;
            Ok(layout)
        }
    }

    /**
        Copy a layout out of an FFmpeg struct.

        # Safety

        `src` must point to a valid, initialized `AVChannelLayout`.
    */
    pub unsafe fn copy_from_raw(src: *const ffi::AVChannelLayout) -> Result<Self> {
        // SAFETY: guaranteed by the caller.
        unsafe {
            let mut layout = Self {
                raw: mem::zeroed(),
            };
            check(ffi::av_channel_layout_copy(&mut layout.raw, src))?;
            Ok(layout)
        }
    }

    /**
        Copy this layout into an FFmpeg struct, releasing what it held.

        # Safety

        `dst` must point to a valid, initialized `AVChannelLayout`.
    */
    pub unsafe fn copy_into_raw(&self, dst: *mut ffi::AVChannelLayout) -> Result<()> {
        // SAFETY: guaranteed by the caller; av_channel_layout_copy
        // uninitializes dst before copying.
        check(unsafe { ffi::av_channel_layout_copy(dst, &self.raw) })?;
        Ok(())
    }

    /**
        Number of channels.
    */
    pub fn channels(&self) -> u32 {
        self.raw.nb_channels.max(0) as u32
    }

    /**
        Human-readable description, e.g. `"stereo"`.
    */
    pub fn describe(&self) -> String {
        let mut buf = [0 as c_char; DESCRIPTION_LEN];
        // SAFETY: the buffer is writable for its full length.
        unsafe {
            if ffi::av_channel_layout_describe(&self.raw, buf.as_mut_ptr(), buf.len()) < 0 {
                return format!("{} channels", self.channels());
            }
            from_cstr(buf.as_ptr()).unwrap_or_default()
        }
    }

    /**
        Pointer to the underlying struct, for FFmpeg calls.
    */
    pub fn as_ptr(&self) -> *const ffi::AVChannelLayout {
        &self.raw
    }
}

impl Clone for ChannelLayout {
    fn clone(&self) -> Self {
        // SAFETY: self.raw is initialized.
        unsafe { Self::copy_from_raw(&self.raw) }
            .unwrap_or_else(|_| Self::default_for(self.channels()))
    }
}

impl PartialEq for ChannelLayout {
    fn eq(&self, other: &Self) -> bool {
        // SAFETY: both layouts are initialized.
        unsafe { ffi::av_channel_layout_compare(&self.raw, &other.raw) == 0 }
    }
}

impl Eq for ChannelLayout {}

impl Drop for ChannelLayout {
    fn drop(&mut self) {
        unsafe { ffi::av_channel_layout_uninit(&mut self.raw) }
    }
}

impl fmt::Debug for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelLayout")
            .field("channels", &self.channels())
            .field("description", &self.describe())
            .finish()
    }
}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl TryFrom<&str> for ChannelLayout {
    type Error = Error;

    fn try_from(name: &str) -> Result<Self> {
        Self::from_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layouts() {
        assert_eq!(ChannelLayout::mono().channels(), 1);
        assert_eq!(ChannelLayout::stereo().channels(), 2);
        assert_eq!(ChannelLayout::stereo().describe(), "stereo");
        assert_eq!(ChannelLayout::mono().to_string(), "mono");
    }

    #[test]
    fn parse_by_name() {
        let layout = ChannelLayout::from_name("stereo").unwrap();
        assert_eq!(layout, ChannelLayout::stereo());
        assert_ne!(layout, ChannelLayout::mono());
        assert!(ChannelLayout::from_name("definitely not a layout").is_err());
    }

    #[test]
    fn clone_is_equal() {
        let layout = ChannelLayout::default_for(6);
        let copy = layout.clone();
        assert_eq!(copy.channels(), 6);
        assert_eq!(copy, layout);
    }
}
