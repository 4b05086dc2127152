/*!
    Reader configuration types.
*/

/**
    Configuration for a [`MediaReader`](crate::MediaReader).
*/
#[derive(Clone, Debug, Default)]
pub struct ReaderConfig {
    /// Decoder worker threads (None = let FFmpeg decide).
    pub threads: Option<u32>,
    /// Demuxer and protocol options, passed when opening the input.
    pub options: Vec<(String, String)>,
}

impl ReaderConfig {
    /**
        Create a new config with default settings.
    */
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Set the number of decoder threads.
    */
    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = Some(threads);
        self
    }

    /**
        Add a demuxer or protocol option, e.g. `("probesize", "32")`.
    */
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((key.into(), value.into()));
        self
    }
}
