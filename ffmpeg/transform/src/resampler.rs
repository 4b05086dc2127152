/*!
    Audio resampling and sample format conversion.
*/

use std::fmt;
use std::os::raw::c_int;
use std::ptr;

use ffmpeg_core::{ChannelLayout, Error, Frame, Result, SampleFormat, check};
use ffmpeg_next::ffi;

/**
    Sample rate, sample format and channel layout of an audio stream.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub sample_format: SampleFormat,
    pub channel_layout: ChannelLayout,
}

impl AudioFormat {
    pub fn new(sample_rate: u32, sample_format: SampleFormat, channel_layout: ChannelLayout) -> Self {
        Self {
            sample_rate,
            sample_format,
            channel_layout,
        }
    }

    /**
        The format of an audio frame.
    */
    pub fn of_frame(frame: &Frame) -> Result<Self> {
        Ok(Self::new(
            frame.sample_rate(),
            frame.sample_format(),
            frame.channel_layout()?,
        ))
    }
}

/**
    Converts audio between sample rates, formats and channel layouts.

    The resampler is stateful: it buffers samples between calls, so feed
    frames in order and call [`AudioResampler::flush`] at the end of the
    stream to get the remainder.
*/
pub struct AudioResampler {
    ctx: *mut ffi::SwrContext,
    src: AudioFormat,
    dst: AudioFormat,
}

// SAFETY: the context is exclusively owned and only used through &mut self.
unsafe impl Send for AudioResampler {}

impl AudioResampler {
    /**
        Create a resampler from one audio format to another.
    */
    pub fn new(src: AudioFormat, dst: AudioFormat) -> Result<Self> {
        let mut ctx: *mut ffi::SwrContext = ptr::null_mut();
        check(unsafe {
            ffi::swr_alloc_set_opts2(
                &mut ctx,
                dst.channel_layout.as_ptr(),
                dst.sample_format.into(),
                dst.sample_rate as c_int,
                src.channel_layout.as_ptr(),
                src.sample_format.into(),
                src.sample_rate as c_int,
                0,
                ptr::null_mut(),
            )
        })?;
        if ctx.is_null() {
            return Err(Error::no_memory());
        }

        // Owned from here on, so a failed init is released by Drop.
        let resampler = Self { ctx, src, dst };
        check(unsafe { ffi::swr_init(resampler.ctx) })?;

        tracing::debug!(
            src_rate = resampler.src.sample_rate,
            src_format = ?resampler.src.sample_format,
            src_layout = %resampler.src.channel_layout,
            dst_rate = resampler.dst.sample_rate,
            dst_format = ?resampler.dst.sample_format,
            dst_layout = %resampler.dst.channel_layout,
            "created resampler"
        );
        Ok(resampler)
    }

    pub fn source_format(&self) -> &AudioFormat {
        &self.src
    }

    pub fn destination_format(&self) -> &AudioFormat {
        &self.dst
    }

    /**
        Convert the samples of `source` into `destination`.

        `destination` must have buffers allocated in the destination
        format; its sample count is the capacity. On return its sample
        count is the number of samples written, which is also returned.
    */
    pub fn convert(&mut self, source: &Frame, destination: &mut Frame) -> Result<usize> {
        let written = check(unsafe {
            ffi::swr_convert(
                self.ctx,
                (*destination.as_mut_ptr()).extended_data,
                destination.samples() as c_int,
                (*source.as_ptr()).extended_data as *const *const u8,
                source.samples() as c_int,
            )
        })?;
        destination.set_samples(written as usize);
        Ok(written as usize)
    }

    /**
        Write out the samples still buffered inside the resampler.

        Same contract as [`AudioResampler::convert`]; returns 0 once empty.
    */
    pub fn flush(&mut self, destination: &mut Frame) -> Result<usize> {
        let written = check(unsafe {
            ffi::swr_convert(
                self.ctx,
                (*destination.as_mut_ptr()).extended_data,
                destination.samples() as c_int,
                ptr::null(),
                0,
            )
        })?;
        destination.set_samples(written as usize);
        Ok(written as usize)
    }

    /**
        Convert into a newly allocated frame sized for the output.
    */
    pub fn convert_to_new(&mut self, source: &Frame) -> Result<Frame> {
        let mut destination = self.allocate(self.output_samples(source.samples()))?;
        self.convert(source, &mut destination)?;
        Ok(destination)
    }

    /**
        Flush into a newly allocated frame, `None` when nothing was buffered.
    */
    pub fn flush_to_new(&mut self) -> Result<Option<Frame>> {
        let capacity = self.output_samples(0);
        if capacity == 0 {
            return Ok(None);
        }
        let mut destination = self.allocate(capacity)?;
        let written = self.flush(&mut destination)?;
        Ok((written > 0).then_some(destination))
    }

    fn allocate(&self, samples: usize) -> Result<Frame> {
        Frame::new_audio(
            samples.max(1),
            self.dst.sample_rate,
            self.dst.sample_format,
            &self.dst.channel_layout,
        )
    }

    /**
        Buffered delay, expressed in samples at `sample_rate`.
    */
    pub fn delay(&self, sample_rate: u32) -> i64 {
        unsafe { ffi::swr_get_delay(self.ctx, sample_rate as i64) }
    }

    /**
        Upper bound of the samples produced by converting `input_samples`
        more samples, including what is buffered.
    */
    pub fn output_samples(&self, input_samples: usize) -> usize {
        let n = unsafe { ffi::swr_get_out_samples(self.ctx, input_samples as c_int) };
        n.max(0) as usize
    }
}

impl Drop for AudioResampler {
    fn drop(&mut self) {
        unsafe { ffi::swr_free(&mut self.ctx) }
    }
}

impl fmt::Debug for AudioResampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioResampler")
            .field("src", &self.src)
            .field("dst", &self.dst)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use ffmpeg_core::SampleLayout;

    use super::*;

    fn silent(samples: usize, format: &AudioFormat) -> Frame {
        let mut frame = Frame::new_audio(
            samples,
            format.sample_rate,
            format.sample_format,
            &format.channel_layout,
        )
        .unwrap();
        let planes = if format.sample_format.is_planar() {
            format.channel_layout.channels() as usize
        } else {
            1
        };
        for plane in 0..planes {
            let len = frame.linesize(0) as usize;
            unsafe { ptr::write_bytes(frame.data_mut_ptr(plane), 0, len) };
        }
        frame
    }

    fn s16_stereo(rate: u32) -> AudioFormat {
        AudioFormat::new(
            rate,
            SampleFormat::I16(SampleLayout::Packed),
            ChannelLayout::stereo(),
        )
    }

    #[test]
    fn format_only_conversion_keeps_sample_count() {
        let src = s16_stereo(48000);
        let dst = AudioFormat::new(
            48000,
            SampleFormat::F32(SampleLayout::Planar),
            ChannelLayout::stereo(),
        );
        let mut resampler = AudioResampler::new(src.clone(), dst).unwrap();

        let converted = resampler.convert_to_new(&silent(1024, &src)).unwrap();
        assert_eq!(converted.samples(), 1024);
        assert_eq!(converted.sample_format(), SampleFormat::F32(SampleLayout::Planar));
        assert_eq!(resampler.delay(48000), 0);
        assert!(resampler.flush_to_new().unwrap().is_none());
    }

    #[test]
    fn rate_conversion_and_flush() {
        let src = s16_stereo(48000);
        let dst = AudioFormat::new(
            44100,
            SampleFormat::I16(SampleLayout::Planar),
            ChannelLayout::mono(),
        );
        let mut resampler = AudioResampler::new(src.clone(), dst).unwrap();
        assert!(resampler.output_samples(1024) >= 940);

        let mut total = 0;
        for _ in 0..10 {
            let frame = resampler.convert_to_new(&silent(1024, &src)).unwrap();
            assert_eq!(frame.channel_layout().unwrap().channels(), 1);
            total += frame.samples();
        }
        while let Some(tail) = resampler.flush_to_new().unwrap() {
            total += tail.samples();
        }
        // 10240 samples at 48 kHz is 9408 at 44.1 kHz
        assert!((9380..=9440).contains(&total), "got {total} samples");
    }

    #[test]
    fn invalid_format_fails() {
        let src = AudioFormat::new(0, SampleFormat::None, ChannelLayout::stereo());
        assert!(AudioResampler::new(src, s16_stereo(48000)).is_err());
    }
}
