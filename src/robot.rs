use nalgebra::{Unit, Vector3};
use tracing::debug;

use crate::converter::{FrameConverter, Tool};
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::kinematics::{ForwardKinematicsEngine, JointState, PoseCache};
use crate::model::ModelLoader;
use crate::semantics::{RobotSemantics, SemanticsLoader, SemanticsResolver};
use crate::urdf::UrdfLoader;
use crate::KinematicTree;

/// A kinematic tree placed in the world, with optional semantics and tool.
///
/// The robot coordinate frame (RCF) is the robot base expressed in the world
/// coordinate frame (WCF). Poses from [`Robot::update`] are in world space.
#[derive(Debug, Clone)]
pub struct Robot {
    engine: ForwardKinematicsEngine,
    semantics: Option<RobotSemantics>,
    converter: FrameConverter,
}

impl Robot {
    pub fn new(tree: KinematicTree) -> Self {
        Self {
            engine: ForwardKinematicsEngine::new(tree),
            semantics: None,
            converter: FrameConverter::default(),
        }
    }

    pub fn from_loader(loader: &impl ModelLoader) -> Result<Self> {
        Ok(Self::new(KinematicTree::from_loader(loader)?))
    }

    pub fn from_urdf_string(urdf: &str) -> Result<Self> {
        Self::from_loader(&UrdfLoader::from_urdf_string(urdf)?)
    }

    /// Robot from URDF and SRDF documents.
    #[cfg(feature = "srdf")]
    pub fn from_urdf_and_srdf_strings(urdf: &str, srdf: &str) -> Result<Self> {
        let mut robot = Self::from_urdf_string(urdf)?;
        robot.load_semantics(&crate::srdf::SrdfLoader::from_srdf_string(srdf))?;
        Ok(robot)
    }

    pub fn with_semantics(mut self, semantics: RobotSemantics) -> Self {
        self.semantics = Some(semantics);
        self
    }

    pub fn load_semantics(&mut self, loader: &impl SemanticsLoader) -> Result<()> {
        self.semantics = Some(loader.load_semantics()?);
        Ok(())
    }

    pub fn name(&self) -> &str {
        self.tree().name()
    }

    pub fn tree(&self) -> &KinematicTree {
        self.engine.tree()
    }

    pub fn semantics(&self) -> Option<&RobotSemantics> {
        self.semantics.as_ref()
    }

    /// Resolver over this robot's tree and semantics.
    pub fn resolver(&self) -> Result<SemanticsResolver<'_>> {
        let semantics = self.semantics.as_ref().ok_or(Error::MissingSemantics)?;
        Ok(SemanticsResolver::new(self.tree(), semantics))
    }

    pub fn group_names(&self) -> Result<Vec<&str>> {
        Ok(self.resolver()?.planning_groups())
    }

    pub fn main_group_name(&self) -> Result<Option<&str>> {
        Ok(self.resolver()?.main_group())
    }

    /// Revolute joints of `group`, or of the main group when `group` is
    /// `None`. `None` for an unknown group.
    ///
    /// Unlike [`SemanticsResolver::joint_names_for`], `None` does not mean the
    /// whole tree: only when no group has a chain does this fall back to every
    /// revolute joint of the tree.
    pub fn configurable_joint_names(&self, group: Option<&str>) -> Result<Option<Vec<&str>>> {
        let resolver = self.resolver()?;
        let group = group.or_else(|| resolver.main_group());
        Ok(resolver.joint_names_for(group))
    }

    /// Static attachment frame of the end effector. See
    /// [`SemanticsResolver::end_effector_frame`].
    pub fn end_effector_frame(&self) -> Result<Frame> {
        Ok(self.resolver()?.end_effector_frame()?)
    }

    pub fn base_frame(&self) -> Result<Frame> {
        Ok(self.resolver()?.base_frame())
    }

    /// Last link of `group`, or of the main group when `group` is `None`.
    /// Without any chained group, the end effector the semantics declare.
    pub fn end_effector_link_name(&self, group: Option<&str>) -> Result<Option<&str>> {
        let resolver = self.resolver()?;
        Ok(match group.or_else(|| resolver.main_group()) {
            Some(group) => resolver.end_effector_link_name_for(group),
            None => Some(resolver.end_effector_link_name()).filter(|name| !name.is_empty()),
        })
    }

    /// First link of `group`, or of the main group when `group` is `None`.
    pub fn base_link_name(&self, group: Option<&str>) -> Result<Option<&str>> {
        let resolver = self.resolver()?;
        Ok(match group.or_else(|| resolver.main_group()) {
            Some(group) => resolver.base_link_name_for(group),
            None => resolver.base_link_name(),
        })
    }

    /// Places the robot: `frame` is the robot coordinate frame in world
    /// coordinates. Takes effect on the next update.
    pub fn set_rcf(&mut self, frame: Frame) {
        self.converter.set_base_frame(frame);
        self.engine.set_base(*self.converter.local_to_world());
    }

    pub fn rcf(&self) -> &Frame {
        self.converter.base_frame()
    }

    /// Re-expresses a world frame in robot coordinates.
    pub fn represent_frame_in_rcf(&self, frame_wcf: &Frame) -> Frame {
        self.converter.to_local(frame_wcf)
    }

    /// Re-expresses a robot frame in world coordinates.
    pub fn represent_frame_in_wcf(&self, frame_rcf: &Frame) -> Frame {
        self.converter.to_world(frame_rcf)
    }

    pub fn attach_tool(&mut self, tool: Tool) {
        self.converter.attach_tool(tool);
    }

    pub fn detach_tool(&mut self) -> Option<Tool> {
        self.converter.detach_tool()
    }

    pub fn converter(&self) -> &FrameConverter {
        &self.converter
    }

    /// Runs forward kinematics; link and joint poses are in world coordinates.
    pub fn update(&mut self, state: &JointState) -> Result<&PoseCache> {
        Ok(self.engine.update(state)?)
    }

    pub fn poses(&self) -> &PoseCache {
        self.engine.poses()
    }

    /// World frames of all joints at the last update, in tree order.
    pub fn frames(&self) -> Vec<Frame> {
        self.poses().frames(self.tree())
    }

    /// World directions of all joint axes at the last update, in tree order.
    pub fn axes(&self) -> Vec<Unit<Vector3<f64>>> {
        self.poses().axes(self.tree())
    }

    /// Current positions of the joints of `group` (see
    /// [`Robot::configurable_joint_names`]). Joints are at zero before the
    /// first update.
    pub fn configuration(&self, group: Option<&str>) -> Result<Option<JointState>> {
        let Some(names) = self.configurable_joint_names(group)? else {
            return Ok(None);
        };
        let tree = self.tree();
        let poses = self.poses();
        let state = names
            .into_iter()
            .map(|name| {
                let value = tree
                    .joint_id(name)
                    .and_then(|id| poses.position(id))
                    .unwrap_or(0.0);
                (name, value)
            })
            .collect::<JointState>();
        debug!(robot = self.name(), joints = state.len(), "read configuration");
        Ok(Some(state))
    }
}
