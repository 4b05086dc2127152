/*!
    Shared value types for the ffmpeg crate ecosystem.

    This crate defines the vocabulary that crosses crate boundaries. It has
    no dependency on FFmpeg, so it stays lightweight and its behavior can be
    tested without the native libraries installed.

    # Core Types

    - [`Rational`] - Rational numbers for time bases and frame rates
    - [`Pts`] and [`MediaDuration`] - Timestamps in time_base units
    - [`Status`] - The success / needs-more-input / end-of-stream result
      shared by decoders, encoders and filter graphs
    - [`StreamType`] - Video or audio stream selector
*/

mod rational;
mod status;
mod stream;
mod timestamp;

pub use rational::Rational;
pub use status::Status;
pub use stream::StreamType;
pub use timestamp::{MediaDuration, NOPTS_VALUE, Pts};

static_assertions::assert_impl_all!(Rational: Send, Sync, Copy);
static_assertions::assert_impl_all!(Status: Send, Sync, Copy);
