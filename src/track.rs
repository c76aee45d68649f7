use nalgebra as na;
use std::time::Duration;

use crate::bbox::Rect;
use crate::detection::TrackId;
use crate::time::Timestamp;

/// One detector observation of the tracked object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub id: TrackId,
    pub bbox: Rect,
    pub captured_at: Timestamp,
}

/// Live state of the single followed object.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: TrackId,
    pub last: Sample,
    pub previous: Option<Sample>,

    // (dx, dy, dw, dh) per second
    pub velocity: na::Vector4<f32>,

    pub last_seen_at: Timestamp,
    pub created_at: Timestamp,

    // consecutive empty observations since `last`
    pub missed: u32,
}

impl Track {
    pub fn new(sample: Sample) -> Self {
        Self {
            id: sample.id,
            last: sample,
            previous: None,
            velocity: na::Vector4::zeros(),
            last_seen_at: sample.captured_at,
            created_at: sample.captured_at,
            missed: 0,
        }
    }

    #[inline]
    pub fn num_samples(&self) -> usize {
        if self.previous.is_some() {
            2
        } else {
            1
        }
    }

    #[inline]
    pub fn is_stale(&self, now: Timestamp, timeout: Duration) -> bool {
        now.saturating_since(self.last_seen_at) > timeout
    }

    /// Applies a new sample of the same object.
    ///
    /// A sample with the same capture time as `last` replaces it in place.
    pub fn refresh(&mut self, sample: Sample, min_interval: Duration) {
        debug_assert_eq!(sample.id, self.id);

        if sample.captured_at > self.last.captured_at {
            self.previous = Some(self.last);
        }

        self.last = sample;
        self.last_seen_at = sample.captured_at;
        self.missed = 0;

        self.velocity = match self.previous {
            Some(prev) => {
                let dt = self
                    .last
                    .captured_at
                    .saturating_since(prev.captured_at)
                    .max(min_interval)
                    .as_secs_f32();

                let v = (self.last.bbox.as_vector() - prev.bbox.as_vector()) / dt;

                // overflow on huge jumps means no usable motion estimate
                v.map(|c| if c.is_finite() { c } else { 0.0 })
            }
            None => na::Vector4::zeros(),
        };
    }

    /// Box to show at `now`, advanced along the velocity for at most `window`.
    pub fn extrapolate(&self, now: Timestamp, window: Duration) -> Rect {
        if self.previous.is_none() || now <= self.last.captured_at {
            return self.last.bbox;
        }

        let age = now
            .saturating_since(self.last.captured_at)
            .min(window)
            .as_secs_f32();

        let last = self.last.bbox.as_vector();
        let moved = (last + self.velocity * age)
            .zip_map(&last, |m, l| if m.is_finite() { m } else { l });

        Rect::from_vector(&moved)
    }
}
