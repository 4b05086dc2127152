/*!
    Owned `AVDictionary`, used for passing options to FFmpeg.
*/

use std::fmt;
use std::ptr;

use ffmpeg_next::ffi;

use crate::convert::{from_cstr, to_cstring};
use crate::{Result, check};

/**
    A string key/value map in FFmpeg's own representation.

    Options that FFmpeg recognizes are removed from the dictionary when
    it is passed to an open call, so anything left afterwards was unused.
*/
pub struct Dictionary {
    ptr: *mut ffi::AVDictionary,
}

// SAFETY: the dictionary is exclusively owned.
unsafe impl Send for Dictionary {}

impl Dictionary {
    pub fn new() -> Self {
        Self {
            ptr: ptr::null_mut(),
        }
    }

    /**
        Build a dictionary from key/value pairs.
    */
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let mut dict = Self::new();
        for (key, value) in pairs {
            dict.set(key, value)?;
        }
        Ok(dict)
    }

    /**
        Insert or replace a value.
    */
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let key = to_cstring(key)?;
        let value = to_cstring(value)?;
        check(unsafe { ffi::av_dict_set(&mut self.ptr, key.as_ptr(), value.as_ptr(), 0) })?;
        Ok(())
    }

    /**
        Look up a value by exact key.
    */
    pub fn get(&self, key: &str) -> Option<String> {
        let key = to_cstring(key).ok()?;
        // SAFETY: a null dictionary is valid for lookups.
        unsafe {
            let entry = ffi::av_dict_get(self.ptr, key.as_ptr(), ptr::null_mut(), 0);
            if entry.is_null() {
                return None;
            }
            from_cstr((*entry).value)
        }
    }

    pub fn len(&self) -> usize {
        unsafe { ffi::av_dict_count(self.ptr).max(0) as usize }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /**
        All entries, in insertion order.
    */
    pub fn entries(&self) -> Vec<(String, String)> {
        // SAFETY: the dictionary pointer is null or valid.
        unsafe { entries_of(self.ptr) }
    }

    /**
        Slot for FFmpeg calls that take `AVDictionary **`.
    */
    pub fn as_mut_ptr(&mut self) -> *mut *mut ffi::AVDictionary {
        &mut self.ptr
    }
}

/**
    Copy every entry out of a borrowed FFmpeg dictionary.

    # Safety

    `dict` must be null or a valid dictionary.
*/
pub unsafe fn entries_of(dict: *const ffi::AVDictionary) -> Vec<(String, String)> {
    let mut out = Vec::new();
    if dict.is_null() {
        return out;
    }
    let empty = c"";
    let mut entry: *const ffi::AVDictionaryEntry = ptr::null();
    loop {
        // SAFETY: guaranteed by the caller; entry is null or the previous result.
        entry = unsafe {
            ffi::av_dict_get(
                dict,
                empty.as_ptr(),
                entry,
                ffi::AV_DICT_IGNORE_SUFFIX as i32,
            ) as *const ffi::AVDictionaryEntry
        };
        if entry.is_null() {
            break;
        }
        let (key, value) = unsafe { (from_cstr((*entry).key), from_cstr((*entry).value)) };
        if let (Some(key), Some(value)) = (key, value) {
            out.push((key, value));
        }
    }
    out
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Dictionary {
    fn drop(&mut self) {
        unsafe { ffi::av_dict_free(&mut self.ptr) }
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}
