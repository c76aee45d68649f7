use serde_derive::{Deserialize, Serialize};
use std::fmt;

use crate::bbox::Rect;

/// Identifier the detector keeps for one physical object across frames.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TrackId(pub i64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<i64> for TrackId {
    #[inline]
    fn from(id: i64) -> Self {
        TrackId(id)
    }
}

impl From<i32> for TrackId {
    #[inline]
    fn from(id: i32) -> Self {
        TrackId(id as i64)
    }
}

/// One identified object, box already in the canonical space
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub id: TrackId,
    pub bbox: Rect,
}

impl Detection {
    #[inline]
    pub fn new<I: Into<TrackId>>(id: I, bbox: Rect) -> Self {
        Self {
            id: id.into(),
            bbox,
        }
    }
}

/// What a single detector run reports: at most one object.
pub type Observation = Option<Detection>;
