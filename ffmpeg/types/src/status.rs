/*!
    The tri-state result of codec and filter pull operations.
*/

/**
    Outcome of a send, receive or pull call against a codec or filter graph.

    FFmpeg reports "try again" and "end of file" through negative status
    codes. Neither is a failure: callers loop on [`Status::NeedsMoreInput`]
    and stop on [`Status::EndOfStream`]. Real failures are returned as errors.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /**
        A frame or packet was produced (or the input was accepted).
    */
    Success,
    /**
        No output is available until more input is sent (`EAGAIN`).
    */
    NeedsMoreInput,
    /**
        The stream has been fully drained (`AVERROR_EOF`).
    */
    EndOfStream,
}

impl Status {
    /**
        Returns true for [`Status::Success`].
    */
    #[inline]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /**
        Returns true for [`Status::EndOfStream`].
    */
    #[inline]
    pub const fn is_end_of_stream(self) -> bool {
        matches!(self, Self::EndOfStream)
    }
}
