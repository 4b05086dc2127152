/*!
    Transferable decoded frames.
*/

use std::ops::Deref;

use ffmpeg_core::{Frame, Result};

/**
    A decoded frame handed out by the reader.

    Holds its own `AVFrame`, into which the buffer references of the
    decoder's frame were moved, so it can outlive the reader and be sent
    to another thread. Read it through `Deref<Target = Frame>`, or take
    the frame with [`OwnedFrame::into_frame`].
*/
#[derive(Debug)]
pub struct OwnedFrame {
    frame: Frame,
}

impl OwnedFrame {
    /**
        Move the data of `source` into a new owned frame.

        `source` is left empty and can be reused.
    */
    pub fn take_from(source: &mut Frame) -> Result<Self> {
        let mut frame = Frame::new()?;
        frame.move_ref_from(source);
        Ok(Self { frame })
    }

    /**
        Unwrap into a plain frame, e.g. to pass it to an encoder.
    */
    pub fn into_frame(self) -> Frame {
        self.frame
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.frame
    }
}

impl Deref for OwnedFrame {
    type Target = Frame;

    fn deref(&self) -> &Frame {
        &self.frame
    }
}

impl From<OwnedFrame> for Frame {
    fn from(owned: OwnedFrame) -> Self {
        owned.into_frame()
    }
}
