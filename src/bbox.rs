use nalgebra as na;
use serde_derive::{Deserialize, Serialize};
use std::marker::PhantomData;

pub trait BBoxFormat: std::fmt::Debug + Copy + PartialEq {}

/// Left-top-width-height format, contains left top corner and width-height
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Ltwh;
impl BBoxFormat for Ltwh {}

/// Left-top-right-bottom format, contains left top and right bottom corners
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Ltrb;
impl BBoxFormat for Ltrb {}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct BBox<F: BBoxFormat>([f32; 4], PhantomData<F>);

/// The box the tracker stores and renders.
pub type Rect = BBox<Ltwh>;

impl<F: BBoxFormat> From<BBox<F>> for [f32; 4] {
    fn from(bbox: BBox<F>) -> Self {
        bbox.0
    }
}

impl<F: BBoxFormat> BBox<F> {
    #[inline]
    pub fn as_slice(&self) -> &[f32; 4] {
        &self.0
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl BBox<Ltwh> {
    #[inline]
    pub fn ltwh(left: f32, top: f32, width: f32, height: f32) -> Self {
        BBox([left, top, width, height], PhantomData)
    }

    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn width(&self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.0[3]
    }

    #[inline]
    pub fn as_ltrb(&self) -> BBox<Ltrb> {
        self.into()
    }

    /// The box as a `(x, y, w, h)` 4-vector, the space velocities live in.
    #[inline]
    pub fn as_vector(&self) -> na::Vector4<f32> {
        na::Vector4::new(self.0[0], self.0[1], self.0[2], self.0[3])
    }

    /// Builds a box back from a 4-vector. Size never goes below zero.
    #[inline]
    pub fn from_vector(v: &na::Vector4<f32>) -> Self {
        Self::ltwh(v[0], v[1], v[2].max(0.0), v[3].max(0.0))
    }

    /// Returns a box that is safe to store, or `None` when any component is not finite.
    ///
    /// Negative sizes are floored at zero. A negative left/top edge is moved to zero
    /// while the right/bottom edge stays where it was.
    pub fn sanitized(&self) -> Option<Self> {
        if !self.is_finite() {
            return None;
        }

        let (mut l, mut t) = (self.left(), self.top());
        let (mut w, mut h) = (self.width().max(0.0), self.height().max(0.0));

        if l < 0.0 {
            w = (w + l).max(0.0);
            l = 0.0;
        }

        if t < 0.0 {
            h = (h + t).max(0.0);
            t = 0.0;
        }

        Some(Self::ltwh(l, t, w, h))
    }

    /// Maps a unit-square box into a view of the given pixel size.
    #[inline]
    pub fn scale(&self, view_w: f32, view_h: f32) -> Self {
        Self::ltwh(
            self.left() * view_w,
            self.top() * view_h,
            self.width() * view_w,
            self.height() * view_h,
        )
    }
}

impl BBox<Ltrb> {
    #[inline]
    pub fn ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        BBox([left, top, right, bottom], PhantomData)
    }

    #[inline]
    pub fn as_ltwh(&self) -> BBox<Ltwh> {
        self.into()
    }

    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn right(&self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn bottom(&self) -> f32 {
        self.0[3]
    }

    /// Box spanned by two opposite corners given in any order.
    #[inline]
    pub fn from_corners(a: na::Point2<f32>, b: na::Point2<f32>) -> Self {
        Self::ltrb(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }
}

impl<'a> From<&'a BBox<Ltwh>> for BBox<Ltrb> {
    #[inline]
    fn from(v: &'a BBox<Ltwh>) -> Self {
        Self(
            [v.0[0], v.0[1], v.0[2] + v.0[0], v.0[3] + v.0[1]],
            PhantomData,
        )
    }
}

impl<'a> From<&'a BBox<Ltrb>> for BBox<Ltwh> {
    #[inline]
    fn from(v: &'a BBox<Ltrb>) -> Self {
        Self(
            [v.0[0], v.0[1], v.0[2] - v.0[0], v.0[3] - v.0[1]],
            PhantomData,
        )
    }
}
