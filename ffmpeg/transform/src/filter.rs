/*!
    Filter graphs described with FFmpeg's filter syntax.
*/

use std::fmt;
use std::os::raw::c_char;
use std::ptr;

use ffmpeg_core::convert::{from_av_rational, to_cstring};
use ffmpeg_core::{
    ChannelLayout, Error, Frame, PixelFormat, Rational, Result, SampleFormat, Status, check,
    status,
};
use ffmpeg_next::ffi;

/**
    A configured chain of filters with one input and one output.

    Built from a description such as `"scale=320:240,hflip"` or
    `"volume=0.5"`. The graph starts unconfigured; call
    [`FilterGraph::configure_video`] or [`FilterGraph::configure_audio`]
    exactly once, then push frames in and pull filtered frames out.
*/
pub struct FilterGraph {
    graph: *mut ffi::AVFilterGraph,
    source: *mut ffi::AVFilterContext,
    sink: *mut ffi::AVFilterContext,
}

// SAFETY: the graph and its filter contexts are exclusively owned.
unsafe impl Send for FilterGraph {}

impl FilterGraph {
    pub fn new() -> Result<Self> {
        let graph = unsafe { ffi::avfilter_graph_alloc() };
        if graph.is_null() {
            return Err(Error::no_memory());
        }
        Ok(Self {
            graph,
            source: ptr::null_mut(),
            sink: ptr::null_mut(),
        })
    }

    /**
        Returns true once a configure call has succeeded.
    */
    pub fn is_configured(&self) -> bool {
        !self.source.is_null() && !self.sink.is_null()
    }

    /**
        Configure the graph for video input of the given shape.
    */
    pub fn configure_video(
        &mut self,
        description: &str,
        width: u32,
        height: u32,
        format: PixelFormat,
        time_base: Rational,
    ) -> Result<()> {
        let args = format!(
            "video_size={width}x{height}:pix_fmt={}:time_base={}/{}",
            ffi::AVPixelFormat::from(format) as i32,
            time_base.num,
            time_base.den
        );
        self.configure(description, "buffer", "buffersink", &args)
    }

    /**
        Configure the graph for audio input of the given shape.
    */
    pub fn configure_audio(
        &mut self,
        description: &str,
        sample_rate: u32,
        format: SampleFormat,
        layout: &ChannelLayout,
        time_base: Rational,
    ) -> Result<()> {
        let args = format!(
            "sample_rate={sample_rate}:sample_fmt={}:channel_layout={}:time_base={}/{}",
            format.name(),
            layout.describe(),
            time_base.num,
            time_base.den
        );
        self.configure(description, "abuffer", "abuffersink", &args)
    }

    fn configure(
        &mut self,
        description: &str,
        source_name: &str,
        sink_name: &str,
        args: &str,
    ) -> Result<()> {
        if self.is_configured() {
            return Err(Error::InvalidState("filter graph already configured"));
        }

        let c_description = to_cstring(description)?;
        let c_args = to_cstring(args)?;

        let source = self.create_filter(source_name, "in", c_args.as_ptr())?;
        let sink = self.create_filter(sink_name, "out", ptr::null())?;

        // The description's unlabeled input connects to our source ("in")
        // and its unlabeled output to our sink ("out").
        let mut outputs = Inouts::single("in", source)?;
        let mut inputs = Inouts::single("out", sink)?;

        check(unsafe {
            ffi::avfilter_graph_parse_ptr(
                self.graph,
                c_description.as_ptr(),
                &mut inputs.ptr,
                &mut outputs.ptr,
                ptr::null_mut(),
            )
        })?;
        check(unsafe { ffi::avfilter_graph_config(self.graph, ptr::null_mut()) })?;

        self.source = source;
        self.sink = sink;

        tracing::debug!(description, args, "configured filter graph");
        Ok(())
    }

    fn create_filter(
        &mut self,
        filter_name: &str,
        instance_name: &str,
        args: *const c_char,
    ) -> Result<*mut ffi::AVFilterContext> {
        let c_filter = to_cstring(filter_name)?;
        let c_instance = to_cstring(instance_name)?;

        let filter = unsafe { ffi::avfilter_get_by_name(c_filter.as_ptr()) };
        if filter.is_null() {
            return Err(Error::filter_not_found());
        }

        let mut ctx: *mut ffi::AVFilterContext = ptr::null_mut();
        check(unsafe {
            ffi::avfilter_graph_create_filter(
                &mut ctx,
                filter,
                c_instance.as_ptr(),
                args,
                ptr::null_mut(),
                self.graph,
            )
        })?;
        Ok(ctx)
    }

    /**
        Time base of frames coming out of the graph.
    */
    pub fn output_time_base(&self) -> Result<Rational> {
        if !self.is_configured() {
            return Err(Error::InvalidState("filter graph not configured"));
        }
        Ok(from_av_rational(unsafe {
            ffi::av_buffersink_get_time_base(self.sink)
        }))
    }

    /**
        Feed one frame into the graph. The frame itself is not consumed.
    */
    pub fn push(&mut self, frame: &Frame) -> Result<()> {
        if !self.is_configured() {
            return Err(Error::InvalidState("filter graph not configured"));
        }
        check(unsafe { ffi::av_buffersrc_write_frame(self.source, frame.as_ptr()) })?;
        Ok(())
    }

    /**
        Signal the end of input; buffered frames can still be pulled.
    */
    pub fn push_eof(&mut self) -> Result<()> {
        if !self.is_configured() {
            return Err(Error::InvalidState("filter graph not configured"));
        }
        check(unsafe { ffi::av_buffersrc_add_frame(self.source, ptr::null_mut()) })?;
        Ok(())
    }

    /**
        Pull one filtered frame into `frame`.

        [`Status::NeedsMoreInput`] means push more frames first,
        [`Status::EndOfStream`] means the graph is fully drained.
    */
    pub fn pull(&mut self, frame: &mut Frame) -> Result<Status> {
        if !self.is_configured() {
            return Err(Error::InvalidState("filter graph not configured"));
        }
        frame.unref();
        let result = status(unsafe { ffi::av_buffersink_get_frame(self.sink, frame.as_mut_ptr()) })?;
        if result == Status::Success {
            frame.set_time_base(from_av_rational(unsafe {
                ffi::av_buffersink_get_time_base(self.sink)
            }));
        }
        Ok(result)
    }
}

impl Drop for FilterGraph {
    fn drop(&mut self) {
        // Frees every filter context in the graph as well.
        unsafe { ffi::avfilter_graph_free(&mut self.graph) }
    }
}

impl fmt::Debug for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterGraph")
            .field("configured", &self.is_configured())
            .finish()
    }
}

/**
    An owned `AVFilterInOut` list, freed on drop.
*/
struct Inouts {
    ptr: *mut ffi::AVFilterInOut,
}

impl Inouts {
    fn single(name: &str, ctx: *mut ffi::AVFilterContext) -> Result<Self> {
        let c_name = to_cstring(name)?;
        let ptr = unsafe { ffi::avfilter_inout_alloc() };
        if ptr.is_null() {
            return Err(Error::no_memory());
        }
        let inouts = Self { ptr };
        unsafe {
            (*ptr).name = ffi::av_strdup(c_name.as_ptr());
            (*ptr).filter_ctx = ctx;
            (*ptr).pad_idx = 0;
            (*ptr).next = ptr::null_mut();
            if (*ptr).name.is_null() {
                return Err(Error::no_memory());
            }
        }
        Ok(inouts)
    }
}

impl Drop for Inouts {
    fn drop(&mut self) {
        unsafe { ffi::avfilter_inout_free(&mut self.ptr) }
    }
}

#[cfg(test)]
mod tests {
    use ffmpeg_core::{Pts, SampleLayout};

    use super::*;

    fn video_frame(pts: i64) -> Frame {
        let mut frame = Frame::new_video(64, 48, PixelFormat::YUV420P).unwrap();
        frame.set_pts(Some(Pts(pts)));
        frame
    }

    #[test]
    fn video_graph_scales_and_drains() {
        let mut graph = FilterGraph::new().unwrap();
        assert!(!graph.is_configured());
        graph
            .configure_video(
                "scale=32:24,hflip",
                64,
                48,
                PixelFormat::YUV420P,
                Rational::new(1, 25),
            )
            .unwrap();
        assert!(graph.is_configured());
        assert_eq!(graph.output_time_base().unwrap(), Rational::new(1, 25));

        let mut out = Frame::new().unwrap();
        graph.push(&video_frame(0)).unwrap();
        assert_eq!(graph.pull(&mut out).unwrap(), Status::Success);
        assert_eq!((out.width(), out.height()), (32, 24));
        assert_eq!(out.pts(), Some(Pts(0)));
        assert_eq!(graph.pull(&mut out).unwrap(), Status::NeedsMoreInput);

        graph.push(&video_frame(1)).unwrap();
        graph.push_eof().unwrap();
        let mut pulled = 0;
        loop {
            match graph.pull(&mut out).unwrap() {
                Status::Success => pulled += 1,
                Status::EndOfStream => break,
                Status::NeedsMoreInput => panic!("graph wants input after eof"),
            }
        }
        assert_eq!(pulled, 1);
        assert_eq!(graph.pull(&mut out).unwrap(), Status::EndOfStream);
    }

    #[test]
    fn audio_graph_passes_samples() {
        let layout = ChannelLayout::stereo();
        let format = SampleFormat::F32(SampleLayout::Planar);
        let mut graph = FilterGraph::new().unwrap();
        graph
            .configure_audio("volume=0.5", 48000, format, &layout, Rational::new(1, 48000))
            .unwrap();

        let mut frame = Frame::new_audio(1024, 48000, format, &layout).unwrap();
        frame.set_pts(Some(Pts(0)));
        graph.push(&frame).unwrap();
        graph.push_eof().unwrap();

        let mut out = Frame::new().unwrap();
        let mut samples = 0;
        while graph.pull(&mut out).unwrap() == Status::Success {
            samples += out.samples();
        }
        assert_eq!(samples, 1024);
    }

    #[test]
    fn invalid_description_fails() {
        let mut graph = FilterGraph::new().unwrap();
        let result = graph.configure_video(
            "definitely_not_a_filter=1",
            64,
            48,
            PixelFormat::YUV420P,
            Rational::new(1, 25),
        );
        assert!(result.is_err());
        assert!(!graph.is_configured());
    }

    #[test]
    fn use_before_configure_is_invalid_state() {
        let mut graph = FilterGraph::new().unwrap();
        let mut out = Frame::new().unwrap();
        assert!(matches!(
            graph.push(&video_frame(0)),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(graph.push_eof(), Err(Error::InvalidState(_))));
        assert!(matches!(graph.pull(&mut out), Err(Error::InvalidState(_))));
    }

    #[test]
    fn configure_twice_is_invalid_state() {
        let mut graph = FilterGraph::new().unwrap();
        graph
            .configure_video("null", 16, 16, PixelFormat::YUV420P, Rational::new(1, 25))
            .unwrap();
        let again =
            graph.configure_video("null", 16, 16, PixelFormat::YUV420P, Rational::new(1, 25));
        assert!(matches!(again, Err(Error::InvalidState(_))));
    }
}
