//! Fixed delays inserted between outbound destination calls.

use std::time::Duration;

/// Points in a transfer where a pause is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaceEvent {
    PlaylistCreated,
    PlaylistCreateFailed,
    TrackSearched,
    VideoFallback,
    PlaylistFinished,
}

/// Maps each pace event to an unconditional delay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingPolicy {
    pub after_create: Duration,
    pub after_create_failure: Duration,
    pub between_searches: Duration,
    pub before_video_fallback: Duration,
    pub between_playlists: Duration,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        PacingPolicy {
            after_create: Duration::from_secs(1),
            after_create_failure: Duration::from_secs(2),
            between_searches: Duration::from_millis(600),
            before_video_fallback: Duration::from_millis(200),
            between_playlists: Duration::from_secs(2),
        }
    }
}

impl PacingPolicy {
    /// No delays at all
    pub fn immediate() -> Self {
        PacingPolicy {
            after_create: Duration::ZERO,
            after_create_failure: Duration::ZERO,
            between_searches: Duration::ZERO,
            before_video_fallback: Duration::ZERO,
            between_playlists: Duration::ZERO,
        }
    }

    pub fn delay(&self, event: PaceEvent) -> Duration {
        match event {
            PaceEvent::PlaylistCreated => self.after_create,
            PaceEvent::PlaylistCreateFailed => self.after_create_failure,
            PaceEvent::TrackSearched => self.between_searches,
            PaceEvent::VideoFallback => self.before_video_fallback,
            PaceEvent::PlaylistFinished => self.between_playlists,
        }
    }

    pub async fn pause(&self, event: PaceEvent) {
        let delay = self.delay(event);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
