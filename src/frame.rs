//! Frames and rigid transforms.
//!
//! A [`Frame`] is an oriented coordinate system given by an origin and two
//! orthonormal axes; the third axis is derived by the cross product, so every
//! frame is right-handed. A [`Transform`] is a rigid map between two coordinate
//! systems. Transforms compose with `*` in the usual matrix convention: `a * b`
//! applies `b` first.

use std::fmt;

use approx::AbsDiffEq;
use nalgebra::{Isometry3, Point3, Rotation3, Translation3, Unit, UnitQuaternion, Vector3};

use crate::error::GeometryError;

/// Rigid transform between two coordinate systems.
pub type Transform = Isometry3<f64>;

/// How far frame axes may stray from unit length and orthogonality.
pub const FRAME_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    origin: Point3<f64>,
    xaxis: Unit<Vector3<f64>>,
    yaxis: Unit<Vector3<f64>>,
}

impl Frame {
    /// Builds a frame from an origin and two axes. The axes must already be
    /// orthonormal within [`FRAME_TOLERANCE`]; they are not repaired here.
    pub fn new(
        origin: Point3<f64>,
        xaxis: Vector3<f64>,
        yaxis: Vector3<f64>,
    ) -> Result<Self, GeometryError> {
        if !origin.iter().all(|c| c.is_finite()) {
            return Err(GeometryError::NonFinite);
        }
        let xaxis = unit_axis(xaxis)?;
        let yaxis = unit_axis(yaxis)?;
        let dot = xaxis.dot(&yaxis.into_inner());
        if dot.abs() > FRAME_TOLERANCE {
            return Err(GeometryError::NotOrthogonal(dot));
        }
        Ok(Self {
            origin,
            xaxis,
            yaxis,
        })
    }

    /// The world XY frame: origin at zero, axes along X and Y.
    pub fn world_xy() -> Self {
        Self {
            origin: Point3::origin(),
            xaxis: Vector3::x_axis(),
            yaxis: Vector3::y_axis(),
        }
    }

    /// The frame a transform carries the world frame onto.
    pub fn from_transform(transform: &Transform) -> Self {
        Self::world_xy().transformed_by(transform)
    }

    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    pub fn xaxis(&self) -> Unit<Vector3<f64>> {
        self.xaxis
    }

    pub fn yaxis(&self) -> Unit<Vector3<f64>> {
        self.yaxis
    }

    pub fn zaxis(&self) -> Unit<Vector3<f64>> {
        Unit::new_normalize(self.xaxis.cross(&self.yaxis.into_inner()))
    }

    /// Transform mapping coordinates expressed in this frame to world coordinates.
    pub fn to_transform(&self) -> Transform {
        let rotation = Rotation3::from_basis_unchecked(&[
            self.xaxis.into_inner(),
            self.yaxis.into_inner(),
            self.zaxis().into_inner(),
        ]);
        Isometry3::from_parts(
            Translation3::from(self.origin.coords),
            UnitQuaternion::from_rotation_matrix(&rotation),
        )
    }

    /// Returns a new frame with origin and axes mapped through `transform`.
    /// The axes are re-orthonormalized to absorb numerical drift.
    pub fn transformed_by(&self, transform: &Transform) -> Self {
        let origin = transform.transform_point(&self.origin);
        let xaxis = Unit::new_normalize(transform.transform_vector(&self.xaxis));
        let y = transform.transform_vector(&self.yaxis);
        let yaxis = Unit::new_normalize(y - xaxis.into_inner() * xaxis.dot(&y));
        Self {
            origin,
            xaxis,
            yaxis,
        }
    }
}

/// Origins and axes agree component-wise within `epsilon`.
impl AbsDiffEq for Frame {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        FRAME_TOLERANCE
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.origin.abs_diff_eq(&other.origin, epsilon)
            && self.xaxis.abs_diff_eq(&other.xaxis, epsilon)
            && self.yaxis.abs_diff_eq(&other.yaxis, epsilon)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::world_xy()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(4);
        let o = self.origin;
        let x = self.xaxis;
        let y = self.yaxis;
        write!(
            f,
            "[[{:.p$}, {:.p$}, {:.p$}], [{:.p$}, {:.p$}, {:.p$}], [{:.p$}, {:.p$}, {:.p$}]]",
            o.x,
            o.y,
            o.z,
            x.x,
            x.y,
            x.z,
            y.x,
            y.y,
            y.z,
            p = precision
        )
    }
}

fn unit_axis(axis: Vector3<f64>) -> Result<Unit<Vector3<f64>>, GeometryError> {
    if !axis.iter().all(|c| c.is_finite()) {
        return Err(GeometryError::NonFinite);
    }
    let norm = axis.norm();
    if norm < f64::EPSILON {
        return Err(GeometryError::ZeroLengthAxis);
    }
    if (norm - 1.0).abs() > FRAME_TOLERANCE {
        return Err(GeometryError::NotUnitLength(norm));
    }
    Ok(Unit::new_normalize(axis))
}

/// Transform mapping coordinates expressed in `frame` to world coordinates.
pub fn from_frame(frame: &Frame) -> Transform {
    frame.to_transform()
}

/// Transform mapping coordinates expressed in frame `a` to coordinates
/// expressed in frame `b`. `from_frame_to_frame(a, b)` is the inverse of
/// `from_frame_to_frame(b, a)`.
pub fn from_frame_to_frame(a: &Frame, b: &Frame) -> Transform {
    b.to_transform().inverse() * a.to_transform()
}

/// Applies `first`, then `second`.
pub fn compose(first: &Transform, second: &Transform) -> Transform {
    second * first
}
