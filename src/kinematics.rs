//! Forward kinematics over a [`KinematicTree`].
//!
//! Every update walks the tree root first and composes, for each joint,
//! `parent link pose * static origin * joint motion`. A link's pose is the
//! pose of its incoming joint; the root link sits at the base transform.

use std::sync::Arc;

use hashbrown::HashMap;
use nalgebra::{Isometry3, Point3, Translation3, Unit, UnitQuaternion, Vector3};
use tracing::{debug, trace};

use crate::error::KinematicsError;
use crate::frame::{Frame, Transform};
use crate::model::Geometry;
use crate::{Joint, JointKind, KinematicTree};

/// Joint positions by joint name: radians for revolute and continuous joints,
/// length units for prismatic ones. Joints without an entry are at zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointState {
    values: HashMap<String, f64>,
}

impl JointState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a joint position, returning the previous one.
    pub fn insert(&mut self, joint: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(joint.into(), value)
    }

    pub fn get(&self, joint: &str) -> Option<f64> {
        self.values.get(joint).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.values.iter().map(|(name, &value)| (name.as_str(), value))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for JointState {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }
}

/// Absolute poses produced by one forward kinematics update, indexed by link
/// and joint id. Retaining an old cache keeps the poses of that configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseCache {
    base: Transform,
    links: Vec<Transform>,
    joints: Vec<Transform>,
    // joint positions the poses were computed with
    positions: Vec<f64>,
}

impl PoseCache {
    /// True if no poses have been computed.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn base(&self) -> &Transform {
        &self.base
    }

    pub fn link_pose(&self, link: usize) -> Option<&Transform> {
        self.links.get(link)
    }

    pub fn joint_pose(&self, joint: usize) -> Option<&Transform> {
        self.joints.get(joint)
    }

    /// Position a joint had in this update; zero for joints without a value.
    pub fn position(&self, joint: usize) -> Option<f64> {
        self.positions.get(joint).copied()
    }

    pub fn link_frame(&self, tree: &KinematicTree, name: &str) -> Option<Frame> {
        let pose = self.link_pose(tree.link_id(name)?)?;
        Some(Frame::from_transform(pose))
    }

    /// Absolute frame of every joint, in tree order.
    pub fn frames(&self, tree: &KinematicTree) -> Vec<Frame> {
        tree.joint_tree_order()
            .iter()
            .filter_map(|&joint| self.joint_pose(joint))
            .map(Frame::from_transform)
            .collect()
    }

    /// Absolute direction of every joint that has a motion axis, in tree order.
    pub fn axes(&self, tree: &KinematicTree) -> Vec<Unit<Vector3<f64>>> {
        tree.joint_tree_order()
            .iter()
            .filter_map(|&id| {
                let axis = tree.joints()[id].kind.axis()?;
                let pose = self.joint_pose(id)?;
                Some(Unit::new_normalize(pose.transform_vector(&axis)))
            })
            .collect()
    }

    /// Maps a point given in a link's frame to the base frame.
    pub fn transform_point(&self, link: usize, point: &Point3<f64>) -> Option<Point3<f64>> {
        self.link_pose(link).map(|pose| pose.transform_point(point))
    }

    /// Visual geometry of every link with its absolute pose, in tree order.
    pub fn visual_poses<'t>(
        &self,
        tree: &'t KinematicTree,
    ) -> Vec<(&'t str, &'t Geometry, Transform)> {
        self.geometry_poses(tree, |link| &link.visuals)
    }

    /// Collision geometry of every link with its absolute pose, in tree order.
    pub fn collision_poses<'t>(
        &self,
        tree: &'t KinematicTree,
    ) -> Vec<(&'t str, &'t Geometry, Transform)> {
        self.geometry_poses(tree, |link| &link.collisions)
    }

    fn geometry_poses<'t>(
        &self,
        tree: &'t KinematicTree,
        select: impl Fn(&'t crate::Link) -> &'t Vec<Geometry>,
    ) -> Vec<(&'t str, &'t Geometry, Transform)> {
        let mut poses = Vec::new();
        for &id in tree.tree_order() {
            let link = &tree.links()[id];
            let Some(pose) = self.link_pose(id) else {
                continue;
            };
            for geometry in select(link) {
                poses.push((link.name.as_str(), geometry, pose * geometry.origin));
            }
        }
        poses
    }
}

/// Motion of a joint at position `value`, expressed in the joint frame.
fn joint_motion(joint: &Joint, value: f64) -> Result<Transform, KinematicsError> {
    match joint.kind {
        JointKind::Fixed => Ok(Transform::identity()),
        JointKind::Revolute { axis } | JointKind::Continuous { axis } => Ok(Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(&axis, value),
        )),
        JointKind::Prismatic { axis } => Ok(Isometry3::from_parts(
            Translation3::from(axis.into_inner() * value),
            UnitQuaternion::identity(),
        )),
        JointKind::Planar { .. } | JointKind::Floating | JointKind::Spherical => {
            Err(KinematicsError::UnsupportedJointType {
                joint: joint.name.clone(),
                kind: joint.kind.name(),
            })
        }
    }
}

impl KinematicTree {
    /// Computes the absolute pose of every link and joint for `state`, with the
    /// root link placed at `base`. An empty tree gives an empty cache.
    pub fn forward_kinematics(
        &self,
        state: &JointState,
        base: &Transform,
    ) -> Result<PoseCache, KinematicsError> {
        let mut cache = PoseCache {
            base: *base,
            ..Default::default()
        };
        let Some(root) = self.root_id() else {
            return Ok(cache);
        };

        let links = self.links();
        let joints = self.joints();
        cache.links = vec![Transform::identity(); links.len()];
        cache.joints = vec![Transform::identity(); joints.len()];
        cache.positions = vec![0.0; joints.len()];
        cache.links[root] = *base;

        for &link in self.tree_order() {
            let parent_pose = cache.links[link];
            for &id in &links[link].child_joints {
                let joint = &joints[id];
                let value = if joint.kind.is_configurable() {
                    state.get(&joint.name).unwrap_or(0.0)
                } else {
                    0.0
                };
                let pose = parent_pose * joint.origin * joint_motion(joint, value)?;
                cache.joints[id] = pose;
                cache.links[joint.child_link] = pose;
                cache.positions[id] = value;
            }
        }

        for (name, _) in state.iter() {
            if !self.joint(name).is_some_and(|j| j.kind.is_configurable()) {
                trace!(joint = name, "ignoring joint state entry");
            }
        }
        Ok(cache)
    }
}

/// Keeps the poses of the last successful update of one tree.
///
/// Updates are serialized through `&mut self`; a failed update leaves the
/// previous poses in place. Use one engine per concurrent consumer.
#[derive(Debug, Clone)]
pub struct ForwardKinematicsEngine {
    tree: Arc<KinematicTree>,
    base: Transform,
    cache: PoseCache,
}

impl ForwardKinematicsEngine {
    pub fn new(tree: impl Into<Arc<KinematicTree>>) -> Self {
        Self {
            tree: tree.into(),
            base: Transform::identity(),
            cache: PoseCache::default(),
        }
    }

    pub fn with_base(mut self, base: Transform) -> Self {
        self.base = base;
        self
    }

    /// Base transform used by following updates; cached poses are not touched.
    pub fn set_base(&mut self, base: Transform) {
        self.base = base;
    }

    pub fn base(&self) -> &Transform {
        &self.base
    }

    pub fn tree(&self) -> &Arc<KinematicTree> {
        &self.tree
    }

    /// Recomputes all poses for `state` and replaces the cache.
    pub fn update(&mut self, state: &JointState) -> Result<&PoseCache, KinematicsError> {
        let cache = self.tree.forward_kinematics(state, &self.base)?;
        debug!(
            robot = self.tree.name(),
            joints = state.len(),
            links = cache.links.len(),
            "forward kinematics update"
        );
        self.cache = cache;
        Ok(&self.cache)
    }

    /// Poses of the last successful update.
    pub fn poses(&self) -> &PoseCache {
        &self.cache
    }
}
