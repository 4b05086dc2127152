/*!
    Sample FIFO for re-chunking audio into fixed-size frames.
*/

use std::fmt;
use std::os::raw::{c_int, c_void};

use ffmpeg_core::{ChannelLayout, Error, Frame, Result, SampleFormat, check};
use ffmpeg_next::ffi;

const INITIAL_CAPACITY: c_int = 1024;

/**
    A first-in first-out buffer of audio samples.

    Encoders without variable frame size support need every frame to
    hold exactly `frame_size` samples. Write whatever the decoder or
    resampler produces, then read back chunks of the required size.
*/
pub struct AudioFifo {
    ptr: *mut ffi::AVAudioFifo,
    format: SampleFormat,
    layout: ChannelLayout,
    sample_rate: u32,
}

// SAFETY: the fifo is exclusively owned and only used through &mut self.
unsafe impl Send for AudioFifo {}

impl AudioFifo {
    pub fn new(format: SampleFormat, layout: ChannelLayout, sample_rate: u32) -> Result<Self> {
        let ptr = unsafe {
            ffi::av_audio_fifo_alloc(format.into(), layout.channels() as c_int, INITIAL_CAPACITY)
        };
        if ptr.is_null() {
            return Err(Error::no_memory());
        }
        Ok(Self {
            ptr,
            format,
            layout,
            sample_rate,
        })
    }

    /**
        Number of samples per channel currently buffered.
    */
    pub fn size(&self) -> usize {
        unsafe { ffi::av_audio_fifo_size(self.ptr).max(0) as usize }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /**
        Append all samples of `frame`, which must match the fifo's format.
    */
    pub fn write(&mut self, frame: &Frame) -> Result<()> {
        if frame.sample_format() != self.format {
            return Err(Error::InvalidArgument(format!(
                "fifo holds {:?} samples, got {:?}",
                self.format,
                frame.sample_format()
            )));
        }
        let samples = frame.samples() as c_int;
        if samples == 0 {
            return Ok(());
        }
        let written = check(unsafe {
            ffi::av_audio_fifo_write(
                self.ptr,
                (*frame.as_ptr()).extended_data as *const *mut c_void,
                samples,
            )
        })?;
        if written < samples {
            return Err(Error::no_memory());
        }
        Ok(())
    }

    /**
        Read exactly `samples` samples into a new frame.

        Returns `None` if fewer than `samples` are buffered.
    */
    pub fn read(&mut self, samples: usize) -> Result<Option<Frame>> {
        if samples == 0 || self.size() < samples {
            return Ok(None);
        }
        self.read_up_to(samples)
    }

    /**
        Read up to `samples` samples into a new frame, `None` when empty.

        Used at the end of a stream to drain the remainder.
    */
    pub fn read_up_to(&mut self, samples: usize) -> Result<Option<Frame>> {
        let count = samples.min(self.size());
        if count == 0 {
            return Ok(None);
        }
        let mut frame = Frame::new_audio(count, self.sample_rate, self.format, &self.layout)?;
        let read = check(unsafe {
            ffi::av_audio_fifo_read(
                self.ptr,
                (*frame.as_mut_ptr()).extended_data as *const *mut c_void,
                count as c_int,
            )
        })?;
        frame.set_samples(read as usize);
        Ok(Some(frame))
    }

    /**
        Discard everything buffered.
    */
    pub fn clear(&mut self) {
        unsafe { ffi::av_audio_fifo_reset(self.ptr) }
    }
}

impl Drop for AudioFifo {
    fn drop(&mut self) {
        unsafe { ffi::av_audio_fifo_free(self.ptr) }
    }
}

impl fmt::Debug for AudioFifo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioFifo")
            .field("format", &self.format)
            .field("layout", &self.layout)
            .field("sample_rate", &self.sample_rate)
            .field("size", &self.size())
            .finish()
    }
}
