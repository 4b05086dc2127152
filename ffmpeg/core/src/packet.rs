/*!
    Owned `AVPacket` handle.
*/

use std::fmt;
use std::os::raw::c_int;
use std::slice;

use ffmpeg_next::ffi;
use ffmpeg_types::{Pts, Rational};

use crate::convert::to_av_rational;
use crate::{Error, Result};

/**
    A compressed (encoded) media packet.

    Owns exactly one `AVPacket`, freed on drop.
*/
pub struct Packet {
    ptr: *mut ffi::AVPacket,
}

// SAFETY: the packet is exclusively owned and its buffer reference is
// atomically reference counted.
unsafe impl Send for Packet {}

impl Packet {
    /**
        Allocate a new empty packet.
    */
    pub fn new() -> Result<Self> {
        let ptr = unsafe { ffi::av_packet_alloc() };
        if ptr.is_null() {
            return Err(Error::no_memory());
        }
        Ok(Self { ptr })
    }

    pub fn as_ptr(&self) -> *const ffi::AVPacket {
        self.ptr
    }

    pub fn as_mut_ptr(&mut self) -> *mut ffi::AVPacket {
        self.ptr
    }

    /**
        Index of the stream this packet belongs to.
    */
    pub fn stream_index(&self) -> usize {
        unsafe { (*self.ptr).stream_index.max(0) as usize }
    }

    pub fn set_stream_index(&mut self, index: usize) {
        unsafe { (*self.ptr).stream_index = index as c_int }
    }

    pub fn pts(&self) -> Option<Pts> {
        Pts::from_raw(unsafe { (*self.ptr).pts })
    }

    pub fn set_pts(&mut self, pts: Option<Pts>) {
        unsafe { (*self.ptr).pts = Pts::into_raw(pts) }
    }

    /**
        Decompression timestamp, or `None` if unset.
    */
    pub fn dts(&self) -> Option<Pts> {
        Pts::from_raw(unsafe { (*self.ptr).dts })
    }

    pub fn set_dts(&mut self, dts: Option<Pts>) {
        unsafe { (*self.ptr).dts = Pts::into_raw(dts) }
    }

    pub fn duration(&self) -> i64 {
        unsafe { (*self.ptr).duration }
    }

    pub fn set_duration(&mut self, duration: i64) {
        unsafe { (*self.ptr).duration = duration }
    }

    /**
        Payload size in bytes.
    */
    pub fn size(&self) -> usize {
        unsafe { (*self.ptr).size.max(0) as usize }
    }

    /**
        The payload, empty if the packet holds no data.
    */
    pub fn data(&self) -> &[u8] {
        // SAFETY: data is valid for size bytes while the packet holds
        // its buffer reference, which outlives this borrow.
        unsafe {
            let data = (*self.ptr).data;
            if data.is_null() {
                return &[];
            }
            slice::from_raw_parts(data, self.size())
        }
    }

    /**
        Raw `AV_PKT_FLAG_*` bits.
    */
    pub fn flags(&self) -> i32 {
        unsafe { (*self.ptr).flags }
    }

    pub fn is_key_frame(&self) -> bool {
        self.flags() & ffi::AV_PKT_FLAG_KEY as c_int != 0
    }

    /**
        Convert pts, dts and duration from one time base to another.

        Unset timestamps stay unset.
    */
    pub fn rescale_ts(&mut self, from: Rational, to: Rational) {
        unsafe { ffi::av_packet_rescale_ts(self.ptr, to_av_rational(from), to_av_rational(to)) }
    }

    /**
        Release the payload and reset fields to defaults.
    */
    pub fn unref(&mut self) {
        unsafe { ffi::av_packet_unref(self.ptr) }
    }
}

impl Drop for Packet {
    fn drop(&mut self) {
        unsafe { ffi::av_packet_free(&mut self.ptr) }
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("stream_index", &self.stream_index())
            .field("pts", &self.pts())
            .field("dts", &self.dts())
            .field("duration", &self.duration())
            .field("size", &self.size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_packet_is_empty() {
        let packet = Packet::new().unwrap();
        assert_eq!(packet.size(), 0);
        assert!(packet.data().is_empty());
        assert_eq!(packet.pts(), None);
        assert_eq!(packet.dts(), None);
        assert!(!packet.is_key_frame());
    }

    #[test]
    fn field_assignment() {
        let mut packet = Packet::new().unwrap();
        packet.set_stream_index(3);
        packet.set_pts(Some(Pts(10)));
        packet.set_dts(Some(Pts(9)));
        packet.set_duration(1);
        assert_eq!(packet.stream_index(), 3);
        assert_eq!(packet.pts(), Some(Pts(10)));
        assert_eq!(packet.dts(), Some(Pts(9)));
        assert_eq!(packet.duration(), 1);
    }

    #[test]
    fn rescale_keeps_unset_timestamps() {
        let mut packet = Packet::new().unwrap();
        packet.set_pts(Some(Pts(2)));
        packet.set_duration(1);
        packet.rescale_ts(Rational::new(1, 25), Rational::new(1, 90000));
        assert_eq!(packet.pts(), Some(Pts(7200)));
        assert_eq!(packet.dts(), None);
        assert_eq!(packet.duration(), 3600);
    }

    #[test]
    fn unref_resets_fields() {
        let mut packet = Packet::new().unwrap();
        packet.set_pts(Some(Pts(5)));
        packet.unref();
        assert_eq!(packet.pts(), None);
    }
}
