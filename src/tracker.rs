use log::{debug, trace, warn};
use parking_lot::Mutex;

use crate::bbox::Rect;
use crate::config::TrackerConfig;
use crate::detection::{Observation, TrackId};
use crate::error::Error;
use crate::time::Timestamp;
use crate::track::{Sample, Track};

/// Snapshot of the tracker's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackState {
    Empty,
    Active {
        id: TrackId,
        samples: usize,
        missed: u32,
        created_at: Timestamp,
        last_seen_at: Timestamp,
    },
}

/// Follows a single object through a sparse, irregular stream of detections
/// and answers render queries at display rate.
///
/// Both entry points take `&self`; share the tracker between the detector
/// context and the render context through an `Arc`.
#[derive(Debug)]
pub struct TrajectoryTracker {
    config: TrackerConfig,
    track: Mutex<Option<Track>>,
}

impl TrajectoryTracker {
    pub fn new(config: TrackerConfig) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            config,
            track: Mutex::new(None),
        })
    }

    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn ingest(&self, observation: Observation, observed_at: Timestamp) {
        let mut slot = self.track.lock();

        if let Some(track) = slot.as_ref() {
            if observed_at < track.last_seen_at {
                warn!(
                    "discarding observation at {:?}: older than last sample of {} at {:?}",
                    observed_at.as_duration(),
                    track.id,
                    track.last_seen_at.as_duration()
                );
                return;
            }

            if track.is_stale(observed_at, self.config.staleness_timeout) {
                debug!("track {} expired", track.id);
                *slot = None;
            }
        }

        let detection = observation.and_then(|det| match det.bbox.sanitized() {
            Some(bbox) => Some((det.id, bbox)),
            None => {
                warn!("discarding malformed box for {}: {:?}", det.id, det.bbox);
                None
            }
        });

        let (id, bbox) = match detection {
            Some(d) => d,
            None => {
                let lost = match slot.as_mut() {
                    Some(track) => {
                        track.missed += 1;
                        trace!("track {} missed {} detection(s)", track.id, track.missed);

                        match self.config.max_missed_detections {
                            Some(max) if track.missed >= max => {
                                debug!("track {} lost after {} missed detections", track.id, max);
                                true
                            }
                            _ => false,
                        }
                    }
                    None => false,
                };

                if lost {
                    *slot = None;
                }

                return;
            }
        };

        let sample = Sample {
            id,
            bbox,
            captured_at: observed_at,
        };

        match slot.as_mut() {
            Some(track) if track.id == id => {
                track.refresh(sample, self.config.min_sample_interval);
                trace!("track {} refreshed: {:?}", id, bbox);
                return;
            }
            Some(track) => debug!("identity switch {} -> {}", track.id, id),
            None => debug!("new track {}", id),
        }

        *slot = Some(Track::new(sample));
    }

    /// Box to draw at `now`, or `None` when nothing is being followed.
    ///
    /// Clears the track once it has gone stale.
    pub fn current_render_box(&self, now: Timestamp) -> Option<Rect> {
        let mut slot = self.track.lock();
        let track = slot.as_ref()?;

        if track.is_stale(now, self.config.staleness_timeout) {
            debug!("track {} expired", track.id);
            *slot = None;
            return None;
        }

        Some(track.extrapolate(now, self.config.max_extrapolation_window))
    }

    pub fn state(&self) -> TrackState {
        match self.track.lock().as_ref() {
            Some(track) => TrackState::Active {
                id: track.id,
                samples: track.num_samples(),
                missed: track.missed,
                created_at: track.created_at,
                last_seen_at: track.last_seen_at,
            },
            None => TrackState::Empty,
        }
    }

    pub fn reset(&self) {
        if let Some(track) = self.track.lock().take() {
            debug!("track {} reset", track.id);
        }
    }
}

impl Default for TrajectoryTracker {
    fn default() -> Self {
        Self {
            config: TrackerConfig::default(),
            track: Mutex::new(None),
        }
    }
}

impl crate::Tracking for TrajectoryTracker {
    #[inline]
    fn ingest(&self, observation: Observation, observed_at: Timestamp) {
        TrajectoryTracker::ingest(self, observation, observed_at)
    }

    #[inline]
    fn current_render_box(&self, now: Timestamp) -> Option<Rect> {
        TrajectoryTracker::current_render_box(self, now)
    }
}
