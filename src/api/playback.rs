use tracing::debug;

use crate::error::TimelineResult;

use super::{PlaybackMode, StreamSelector, TimeWindowController};

/// Produces the stream URI the video player should open for a mode.
///
/// Implemented by the host; the controller only decides which mode to ask for.
pub trait PlaybackUriBuilder {
    fn build_playback_uri(
        &self,
        mode: PlaybackMode,
        stream: StreamSelector,
    ) -> TimelineResult<String>;
}

impl<F> PlaybackUriBuilder for F
where
    F: Fn(PlaybackMode, StreamSelector) -> TimelineResult<String>,
{
    fn build_playback_uri(
        &self,
        mode: PlaybackMode,
        stream: StreamSelector,
    ) -> TimelineResult<String> {
        self(mode, stream)
    }
}

impl TimeWindowController {
    /// URI for the current playback mode and configured stream.
    pub fn playback_uri(&self, builder: &dyn PlaybackUriBuilder) -> TimelineResult<String> {
        let uri = builder.build_playback_uri(self.mode, self.config.stream)?;
        debug!(mode = ?self.mode, %uri, "playback uri built");
        Ok(uri)
    }
}
