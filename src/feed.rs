use log::{error, trace, warn};
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::bbox::{BBox, Ltrb, Rect};
use crate::detection::{Detection, Observation};
use crate::error::Error;
use crate::frame::FrameGeometry;
use crate::time::Clock;
use crate::Tracking;

/// Detector output as it comes off the worker, boxes in source pixels.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct RawDetection {
    pub tracking_id: Option<i32>,
    pub bbox: BBox<Ltrb>,
    pub frame: FrameGeometry,
}

impl RawDetection {
    pub fn new(
        tracking_id: Option<i32>,
        bbox: BBox<Ltrb>,
        width: u32,
        height: u32,
        rotation_degrees: i32,
    ) -> Result<Self, Error> {
        Ok(Self {
            tracking_id,
            bbox,
            frame: FrameGeometry::new(width, height, rotation_degrees)?,
        })
    }

    /// Canonical observation for the tracker. Objects without a tracking id are not followed.
    pub fn normalize(&self) -> Observation {
        let id = match self.tracking_id {
            Some(id) => id,
            None => {
                trace!("skipping detection without tracking id");
                return None;
            }
        };

        match self.frame.canonicalize(&self.bbox) {
            Ok(bbox) => Some(Detection::new(id, bbox)),
            Err(err) => {
                warn!("dropping detection #{}: {}", id, err);
                None
            }
        }
    }
}

/// Marks a detector run in flight. Dropping it lets the next frame through.
#[derive(Debug)]
pub struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Sits between the detector and the tracker.
///
/// Frames arriving while a detection is in flight are skipped, completed runs are
/// normalized into the canonical space and stamped with the feed's clock.
pub struct DetectionFeed<T: Tracking, C: Clock> {
    tracker: Arc<T>,
    clock: C,
    busy: Arc<AtomicBool>,
}

impl<T: Tracking, C: Clock> DetectionFeed<T, C> {
    pub fn new(tracker: Arc<T>, clock: C) -> Self {
        Self {
            tracker,
            clock,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    #[inline]
    pub fn tracker(&self) -> &Arc<T> {
        &self.tracker
    }

    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[inline]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claims the detector for one frame, `None` if a run is already in flight.
    pub fn try_begin(&self) -> Option<BusyGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard {
                flag: self.busy.clone(),
            })
    }

    /// Hands a finished detector run to the tracker.
    ///
    /// Detector failures are logged and count as "nothing detected".
    pub fn complete<E: fmt::Display>(
        &self,
        guard: BusyGuard,
        result: Result<Option<RawDetection>, E>,
    ) {
        drop(guard);

        let observation = match result {
            Ok(raw) => raw.and_then(|raw| raw.normalize()),
            Err(err) => {
                error!("detection failed: {}", err);
                None
            }
        };

        self.tracker.ingest(observation, self.clock.now());
    }

    #[inline]
    pub fn render_box(&self) -> Option<Rect> {
        self.tracker.current_render_box(self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{ManualClock, Timestamp};
    use crate::tracker::{TrackState, TrajectoryTracker};
    use crate::TrackId;
    use approx::assert_relative_eq;
    use std::time::Duration;

    fn feed() -> DetectionFeed<TrajectoryTracker, ManualClock> {
        DetectionFeed::new(
            Arc::new(TrajectoryTracker::default()),
            ManualClock::new(Timestamp::ZERO),
        )
    }

    fn raw(id: Option<i32>, left: f32) -> RawDetection {
        RawDetection::new(id, BBox::ltrb(left, 0.0, left + 40.0, 20.0), 400, 200, 0).unwrap()
    }

    #[test]
    fn test_busy_guard_skips_overlapping_runs() {
        let feed = feed();

        let guard = feed.try_begin().expect("first run");
        assert!(feed.is_busy());
        assert!(feed.try_begin().is_none());

        feed.complete::<String>(guard, Ok(None));
        assert!(!feed.is_busy());
        assert!(feed.try_begin().is_some());
    }

    #[test]
    fn test_guard_released_on_drop() {
        let feed = feed();

        drop(feed.try_begin());
        assert!(!feed.is_busy());
    }

    #[test]
    fn test_complete_normalizes_and_ingests() {
        let feed = feed();
        feed.clock().set(Timestamp::from_millis(10));

        let guard = feed.try_begin().unwrap();
        feed.complete::<String>(guard, Ok(Some(raw(Some(3), 100.0))));

        assert!(matches!(
            feed.tracker().state(),
            TrackState::Active { id: TrackId(3), .. }
        ));

        let r = feed.render_box().unwrap();
        assert_relative_eq!(r.left(), 0.25, epsilon = 1e-6);
        assert_relative_eq!(r.width(), 0.1, epsilon = 1e-6);
        assert_relative_eq!(r.height(), 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_failure_counts_as_missed() {
        let feed = feed();

        let guard = feed.try_begin().unwrap();
        feed.complete::<String>(guard, Ok(Some(raw(Some(1), 0.0))));

        feed.clock().advance(Duration::from_millis(30));
        let guard = feed.try_begin().unwrap();
        feed.complete(guard, Err("model not loaded"));

        assert!(!feed.is_busy());
        assert!(matches!(
            feed.tracker().state(),
            TrackState::Active { missed: 1, .. }
        ));
    }

    #[test]
    fn test_untracked_detection_is_not_followed() {
        assert_eq!(raw(None, 0.0).normalize(), None);
    }

    #[test]
    fn test_unsupported_rotation() {
        let res = RawDetection::new(Some(1), BBox::ltrb(0.0, 0.0, 1.0, 1.0), 10, 10, 45);

        assert!(matches!(res, Err(Error::UnsupportedRotation(45))));
    }

    #[test]
    fn test_empty_frame_dropped() {
        let det = RawDetection::new(Some(1), BBox::ltrb(0.0, 0.0, 1.0, 1.0), 0, 0, 0).unwrap();

        assert_eq!(det.normalize(), None);
    }

    #[test]
    fn test_guard_crosses_threads() {
        let feed = Arc::new(feed());
        let guard = feed.try_begin().unwrap();

        let worker = {
            let feed = feed.clone();
            std::thread::spawn(move || {
                feed.complete::<String>(guard, Ok(Some(raw(Some(9), 0.0))));
            })
        };
        worker.join().unwrap();

        assert!(!feed.is_busy());
        assert!(matches!(
            feed.tracker().state(),
            TrackState::Active { id: TrackId(9), .. }
        ));
    }
}
