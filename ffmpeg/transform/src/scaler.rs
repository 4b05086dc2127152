/*!
    Video scaling and pixel format conversion.
*/

use std::fmt;
use std::os::raw::c_int;
use std::ptr;

use ffmpeg_core::{Error, Frame, PixelFormat, Result, check};
use ffmpeg_next::ffi;
use ffmpeg_next::software::scaling::Flags;

/**
    Interpolation used when resizing.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScalingAlgorithm {
    /// Fastest, lowest quality.
    FastBilinear,
    /// Good balance of speed and quality.
    #[default]
    Bilinear,
    /// Sharper than bilinear.
    Bicubic,
    /// Nearest neighbor, no interpolation.
    Point,
    /// Averaging, good for downscaling.
    Area,
    /// Highest quality, slowest.
    Lanczos,
}

impl ScalingAlgorithm {
    fn flags(self) -> Flags {
        match self {
            Self::FastBilinear => Flags::FAST_BILINEAR,
            Self::Bilinear => Flags::BILINEAR,
            Self::Bicubic => Flags::BICUBIC,
            Self::Point => Flags::POINT,
            Self::Area => Flags::AREA,
            Self::Lanczos => Flags::LANCZOS,
        }
    }
}

/**
    Converts video frames between sizes and pixel formats.

    The source shape is fixed at creation; frames of another shape are
    rejected.
*/
pub struct VideoScaler {
    ctx: *mut ffi::SwsContext,
    src: (u32, u32, PixelFormat),
    dst: (u32, u32, PixelFormat),
}

// SAFETY: the context is exclusively owned and only used through &mut self.
unsafe impl Send for VideoScaler {}

impl VideoScaler {
    /**
        Create a scaler from one frame shape to another.
    */
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        src_width: u32,
        src_height: u32,
        src_format: PixelFormat,
        dst_width: u32,
        dst_height: u32,
        dst_format: PixelFormat,
        algorithm: ScalingAlgorithm,
    ) -> Result<Self> {
        let ctx = unsafe {
            ffi::sws_getContext(
                src_width as c_int,
                src_height as c_int,
                src_format.into(),
                dst_width as c_int,
                dst_height as c_int,
                dst_format.into(),
                algorithm.flags().bits() as c_int,
                ptr::null_mut(),
                ptr::null_mut(),
                ptr::null(),
            )
        };
        if ctx.is_null() {
            tracing::debug!(
                ?src_format,
                ?dst_format,
                src_width,
                src_height,
                dst_width,
                dst_height,
                "unsupported scaling"
            );
            return Err(Error::InvalidArgument(format!(
                "cannot scale {src_width}x{src_height} {src_format:?} to {dst_width}x{dst_height} {dst_format:?}"
            )));
        }
        Ok(Self {
            ctx,
            src: (src_width, src_height, src_format),
            dst: (dst_width, dst_height, dst_format),
        })
    }

    pub fn source_format(&self) -> (u32, u32, PixelFormat) {
        self.src
    }

    pub fn destination_format(&self) -> (u32, u32, PixelFormat) {
        self.dst
    }

    /**
        Scale `source` into `destination`.

        Destination buffers are allocated if it has none, using the
        scaler's destination shape.
    */
    pub fn scale(&mut self, source: &Frame, destination: &mut Frame) -> Result<()> {
        let (width, height, format) = self.src;
        if source.width() != width || source.height() != height || source.pixel_format() != format {
            return Err(Error::InvalidArgument(format!(
                "frame is {}x{} {:?}, scaler expects {width}x{height} {format:?}",
                source.width(),
                source.height(),
                source.pixel_format()
            )));
        }
        if destination.is_empty() {
            let (width, height, format) = self.dst;
            destination.set_width(width);
            destination.set_height(height);
            destination.set_pixel_format(format);
        }
        check(unsafe { ffi::sws_scale_frame(self.ctx, destination.as_mut_ptr(), source.as_ptr()) })?;
        Ok(())
    }

    /**
        Scale into a newly allocated frame, carrying over timestamps and
        other frame properties.
    */
    pub fn scale_to_new(&mut self, source: &Frame) -> Result<Frame> {
        let (width, height, format) = self.dst;
        let mut destination = Frame::new_video(width, height, format)?;
        self.scale(source, &mut destination)?;
        destination.copy_properties_from(source)?;
        Ok(destination)
    }
}

impl Drop for VideoScaler {
    fn drop(&mut self) {
        unsafe { ffi::sws_freeContext(self.ctx) }
    }
}

impl fmt::Debug for VideoScaler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoScaler")
            .field("src", &self.src)
            .field("dst", &self.dst)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use ffmpeg_core::Pts;

    use super::*;

    fn source_frame() -> Frame {
        let mut frame = Frame::new_video(64, 48, PixelFormat::YUV420P).unwrap();
        for (plane, rows) in [(0, 48), (1, 24), (2, 24)] {
            let len = frame.linesize(plane) as usize * rows;
            unsafe { ptr::write_bytes(frame.data_mut_ptr(plane), 128, len) };
        }
        frame.set_pts(Some(Pts(5)));
        frame
    }

    #[test]
    fn scale_to_new_converts_shape() {
        let mut scaler = VideoScaler::new(
            64,
            48,
            PixelFormat::YUV420P,
            32,
            24,
            PixelFormat::RGB24,
            ScalingAlgorithm::Bilinear,
        )
        .unwrap();
        let scaled = scaler.scale_to_new(&source_frame()).unwrap();
        assert_eq!(scaled.width(), 32);
        assert_eq!(scaled.height(), 24);
        assert_eq!(scaled.pixel_format(), PixelFormat::RGB24);
        assert_eq!(scaled.pts(), Some(Pts(5)));
    }

    #[test]
    fn scale_allocates_empty_destination() {
        let mut scaler = VideoScaler::new(
            64,
            48,
            PixelFormat::YUV420P,
            128,
            96,
            PixelFormat::YUV420P,
            ScalingAlgorithm::Point,
        )
        .unwrap();
        let mut destination = Frame::new().unwrap();
        scaler.scale(&source_frame(), &mut destination).unwrap();
        assert!(!destination.is_empty());
        assert_eq!(destination.width(), 128);
        assert_eq!(destination.height(), 96);
    }

    #[test]
    fn mismatched_source_is_rejected() {
        let mut scaler = VideoScaler::new(
            32,
            32,
            PixelFormat::YUV420P,
            16,
            16,
            PixelFormat::YUV420P,
            ScalingAlgorithm::default(),
        )
        .unwrap();
        let mut destination = Frame::new().unwrap();
        assert!(matches!(
            scaler.scale(&source_frame(), &mut destination),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn invalid_dimensions_fail() {
        assert!(VideoScaler::new(
            0,
            0,
            PixelFormat::YUV420P,
            16,
            16,
            PixelFormat::RGB24,
            ScalingAlgorithm::Bilinear,
        )
        .is_err());
    }
}
