//! Kinematic tree and frame transformations for articulated robots.
//!
//! A robot is a tree of rigid [`Link`]s connected by [`Joint`]s. Given a
//! [`JointState`], forward kinematics resolves the pose of every link and
//! joint; [`SemanticsResolver`] answers planning-group and end-effector
//! queries from [`RobotSemantics`]; [`FrameConverter`] maps frames between
//! world, robot-local, tool flange and tool center point.
//!
//! ```
//! use robot_pose::{JointDescription, JointState, JointType, KinematicTree};
//! use robot_pose::{ForwardKinematicsEngine, LinkDescription, ModelDescription};
//!
//! let model = ModelDescription {
//!     name: "arm".into(),
//!     root: None,
//!     links: vec![LinkDescription::new("base"), LinkDescription::new("tool")],
//!     joints: vec![JointDescription::new("j1", JointType::Revolute, "base", "tool")
//!         .with_axis([0., 0., 1.])],
//! };
//! let tree = KinematicTree::new(model).unwrap();
//! let tool = tree.link_id("tool").unwrap();
//! let mut engine = ForwardKinematicsEngine::new(tree);
//! let poses = engine
//!     .update(&JointState::from_iter([("j1", std::f64::consts::FRAC_PI_2)]))
//!     .unwrap();
//! let pose = poses.link_pose(tool).unwrap();
//! approx::assert_abs_diff_eq!(pose.translation.vector.norm(), 0.0, epsilon = 1e-12);
//! ```

use hashbrown::HashMap;
use nalgebra::{Unit, Vector3};
use petgraph::prelude::*;

mod bfs;
mod converter;
mod error;
mod frame;
mod kinematics;
mod model;
mod robot;
mod semantics;
#[cfg(feature = "srdf")]
mod srdf;
mod tree;
mod urdf;
mod utils;

#[cfg(test)]
mod test_utils;

pub use converter::{FrameConverter, Tool};
pub use error::{Error, GeometryError, KinematicsError, ModelError, Result, SemanticsError};
pub use frame::{compose, from_frame, from_frame_to_frame, Frame, Transform, FRAME_TOLERANCE};
pub use kinematics::{ForwardKinematicsEngine, JointState, PoseCache};
pub use model::{
    Geometry, JointDescription, JointType, LinkDescription, ModelDescription, ModelLoader, Origin,
    Shape,
};
pub use robot::Robot;
pub use semantics::{Chain, PlanningGroup, RobotSemantics, SemanticsLoader, SemanticsResolver};
#[cfg(feature = "srdf")]
pub use srdf::SrdfLoader;
pub use urdf::UrdfLoader;

/// Motion model of a joint. Axes are unit vectors in the joint frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointKind {
    Fixed,
    Revolute { axis: Unit<Vector3<f64>> },
    /// Revolute without position limits.
    Continuous { axis: Unit<Vector3<f64>> },
    Prismatic { axis: Unit<Vector3<f64>> },
    Planar { normal: Unit<Vector3<f64>> },
    Floating,
    Spherical,
}

impl JointKind {
    pub fn name(&self) -> &'static str {
        match self {
            JointKind::Fixed => "fixed",
            JointKind::Revolute { .. } => "revolute",
            JointKind::Continuous { .. } => "continuous",
            JointKind::Prismatic { .. } => "prismatic",
            JointKind::Planar { .. } => "planar",
            JointKind::Floating => "floating",
            JointKind::Spherical => "spherical",
        }
    }

    pub fn axis(&self) -> Option<Unit<Vector3<f64>>> {
        match *self {
            JointKind::Revolute { axis }
            | JointKind::Continuous { axis }
            | JointKind::Prismatic { axis } => Some(axis),
            JointKind::Planar { normal } => Some(normal),
            JointKind::Fixed | JointKind::Floating | JointKind::Spherical => None,
        }
    }

    /// Whether the joint takes a scalar position value.
    pub fn is_configurable(&self) -> bool {
        matches!(
            self,
            JointKind::Revolute { .. } | JointKind::Continuous { .. } | JointKind::Prismatic { .. }
        )
    }

    pub fn is_revolute(&self) -> bool {
        matches!(self, JointKind::Revolute { .. })
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, JointKind::Fixed)
    }
}

#[derive(Debug, Clone)]
pub struct Joint {
    pub name: String,
    pub kind: JointKind,

    // zero pose relative to parent link
    pub origin: Transform,

    pub parent_link: usize,
    pub child_link: usize,
}

impl Joint {
    /// Static origin as a frame in the parent link's coordinates.
    pub fn origin_frame(&self) -> Frame {
        Frame::from_transform(&self.origin)
    }
}

#[derive(Debug, Clone)]
pub struct Link {
    pub name: String,

    // incoming joint, none for the root
    pub parent_joint: Option<usize>,
    // outgoing joints in declaration order
    pub child_joints: Vec<usize>,

    pub visuals: Vec<Geometry>,
    pub collisions: Vec<Geometry>,
}

/// Rooted tree of links and joints, stored as arenas indexed by position.
/// Topology and static origins never change after construction.
#[derive(Debug, Clone, Default)]
pub struct KinematicTree {
    name: String,
    links: Vec<Link>,
    joints: Vec<Joint>,
    // link_id -> link_id, weighted by joint_id
    link_graph: DiGraphMap<usize, usize>,
    // links root first, every parent before its children
    bfs: Vec<usize>,
    // joints in the order their parent links appear in bfs
    joint_order: Vec<usize>,
    link_index: HashMap<String, usize>,
    joint_index: HashMap<String, usize>,
}
