use nalgebra as na;
use serde_derive::{Deserialize, Serialize};
use std::convert::TryFrom;

use crate::bbox::{BBox, Ltrb, Rect};
use crate::error::Error;

/// Clockwise rotation that turns the source image upright.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(try_from = "i32", into = "i32")]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl TryFrom<i32> for Rotation {
    type Error = Error;

    fn try_from(degrees: i32) -> Result<Self, Error> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(Error::UnsupportedRotation(other)),
        }
    }
}

impl From<Rotation> for i32 {
    fn from(r: Rotation) -> i32 {
        match r {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

impl Rotation {
    #[inline]
    pub fn is_transposed(&self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

/// Size and orientation of the image a detection was made on.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct FrameGeometry {
    pub size: (u32, u32),
    pub rotation: Rotation,
}

impl FrameGeometry {
    pub fn new(width: u32, height: u32, rotation_degrees: i32) -> Result<Self, Error> {
        Ok(Self {
            size: (width, height),
            rotation: Rotation::try_from(rotation_degrees)?,
        })
    }

    /// Size of the frame after it has been turned upright.
    #[inline]
    pub fn upright_size(&self) -> (u32, u32) {
        let (w, h) = self.size;

        if self.rotation.is_transposed() {
            (h, w)
        } else {
            (w, h)
        }
    }

    fn upright_point(&self, p: na::Point2<f32>) -> na::Point2<f32> {
        let (w, h) = (self.size.0 as f32, self.size.1 as f32);

        match self.rotation {
            Rotation::Deg0 => p,
            Rotation::Deg90 => na::Point2::new(h - p.y, p.x),
            Rotation::Deg180 => na::Point2::new(w - p.x, h - p.y),
            Rotation::Deg270 => na::Point2::new(p.y, w - p.x),
        }
    }

    /// Maps a box in source pixels into the upright unit square.
    ///
    /// Boxes from frames with different sizes or rotations become directly comparable.
    pub fn canonicalize(&self, bbox: &BBox<Ltrb>) -> Result<Rect, Error> {
        let (width, height) = self.size;
        if width == 0 || height == 0 {
            return Err(Error::EmptyFrame { width, height });
        }

        let a = self.upright_point(na::Point2::new(bbox.left(), bbox.top()));
        let b = self.upright_point(na::Point2::new(bbox.right(), bbox.bottom()));
        let upright = BBox::from_corners(a, b);

        let (uw, uh) = self.upright_size();
        let (uw, uh) = (uw as f32, uh as f32);

        Ok(BBox::ltrb(
            upright.left() / uw,
            upright.top() / uh,
            upright.right() / uw,
            upright.bottom() / uh,
        )
        .as_ltwh())
    }
}
