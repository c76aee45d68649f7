pub mod bbox;
pub mod config;
pub mod detection;
pub mod error;
pub mod feed;
pub mod frame;
pub mod time;
pub mod tracker;

mod track;

pub use bbox::{BBox, Ltrb, Ltwh, Rect};
pub use config::TrackerConfig;
pub use detection::{Detection, Observation, TrackId};
pub use error::Error;
pub use feed::{BusyGuard, DetectionFeed, RawDetection};
pub use frame::{FrameGeometry, Rotation};
pub use time::{Clock, ManualClock, MonotonicClock, Timestamp};
pub use tracker::{TrackState, TrajectoryTracker};

/// The two call streams a tracker serves.
///
/// `ingest` is driven by the detector at its own irregular pace, `current_render_box`
/// by the display once per frame. Implementations must tolerate both running
/// concurrently.
pub trait Tracking: Send + Sync {
    fn ingest(&self, observation: Observation, observed_at: Timestamp);
    fn current_render_box(&self, now: Timestamp) -> Option<Rect>;
}
