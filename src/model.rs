//! Already-parsed robot description, as handed over by a model loader.

use crate::error::ModelError;
use crate::frame::Transform;

/// Source of a robot description. [`crate::urdf::UrdfLoader`] reads URDF;
/// other formats plug in by implementing this trait.
pub trait ModelLoader {
    fn load_model(&self) -> Result<ModelDescription, ModelError>;
}

#[derive(Debug, Clone, Default)]
pub struct ModelDescription {
    pub name: String,
    /// Root link as declared by the source, if it declares one.
    pub root: Option<String>,
    pub links: Vec<LinkDescription>,
    pub joints: Vec<JointDescription>,
}

#[derive(Debug, Clone, Default)]
pub struct LinkDescription {
    pub name: String,
    pub visuals: Vec<Geometry>,
    pub collisions: Vec<Geometry>,
}

impl LinkDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct JointDescription {
    pub name: String,
    pub joint_type: JointType,
    /// Pose of the joint frame relative to the parent link.
    pub origin: Origin,
    /// Motion axis in the joint frame; `None` means the default X axis.
    pub axis: Option<[f64; 3]>,
    pub parent: String,
    pub child: String,
}

impl JointDescription {
    pub fn new(
        name: impl Into<String>,
        joint_type: JointType,
        parent: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            joint_type,
            origin: Origin::default(),
            axis: None,
            parent: parent.into(),
            child: child.into(),
        }
    }

    pub fn with_origin(mut self, xyz: [f64; 3], rpy: [f64; 3]) -> Self {
        self.origin = Origin { xyz, rpy };
        self
    }

    pub fn with_axis(mut self, axis: [f64; 3]) -> Self {
        self.axis = Some(axis);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointType {
    Fixed,
    Revolute,
    Continuous,
    Prismatic,
    Planar,
    Floating,
    Spherical,
}

/// 6-DOF pose: translation plus roll, pitch, yaw (radians, fixed axes X-Y-Z).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Origin {
    pub xyz: [f64; 3],
    pub rpy: [f64; 3],
}

/// Shape payload attached to a link. The kinematics never looks inside; it
/// only places the payload at its link's pose.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub name: Option<String>,
    /// Pose of the shape relative to its link.
    pub origin: Transform,
    pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Box { size: [f64; 3] },
    Cylinder { radius: f64, length: f64 },
    Capsule { radius: f64, length: f64 },
    Sphere { radius: f64 },
    Mesh { filename: String, scale: [f64; 3] },
}
