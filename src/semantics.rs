//! Robot semantics: planning groups, chain boundaries and the end effector,
//! and the queries that resolve them against a [`KinematicTree`].

use tracing::warn;

use crate::error::SemanticsError;
use crate::frame::Frame;
use crate::{KinematicTree, Link};

/// Source of robot semantics. [`crate::SrdfLoader`] reads SRDF.
pub trait SemanticsLoader {
    fn load_semantics(&self) -> Result<RobotSemantics, SemanticsError>;
}

/// Serial chain of a planning group, from `base_link` to `tip_link`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub base_link: String,
    pub tip_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanningGroup {
    pub name: String,
    /// `None` if the group is not a single serial chain.
    pub chain: Option<Chain>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotSemantics {
    /// Groups in declaration order.
    pub groups: Vec<PlanningGroup>,
    pub end_effector: String,
    /// Joints that are not actuated; never listed as a group's joints.
    pub passive_joints: Vec<String>,
}

impl RobotSemantics {
    pub fn group(&self, name: &str) -> Option<&PlanningGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub fn is_passive(&self, joint: &str) -> bool {
        self.passive_joints.iter().any(|passive| passive == joint)
    }
}

/// Answers semantic queries against one tree.
#[derive(Debug, Clone, Copy)]
pub struct SemanticsResolver<'a> {
    tree: &'a KinematicTree,
    semantics: &'a RobotSemantics,
}

impl<'a> SemanticsResolver<'a> {
    pub fn new(tree: &'a KinematicTree, semantics: &'a RobotSemantics) -> Self {
        Self { tree, semantics }
    }

    /// Group names in declaration order.
    pub fn planning_groups(&self) -> Vec<&'a str> {
        self.semantics
            .groups
            .iter()
            .map(|group| group.name.as_str())
            .collect()
    }

    /// Names of the revolute joints of a group.
    ///
    /// Without a group, every revolute joint of the tree in tree order. For a
    /// group without a chain, an empty list. Otherwise links are walked in tree
    /// order; capturing starts at the chain's base link and ends after the tip
    /// link, and the revolute outgoing joints of every captured link are
    /// collected, leaving out passive joints. Returns `None` for an unknown
    /// group.
    pub fn joint_names_for(&self, group: Option<&str>) -> Option<Vec<&'a str>> {
        let tree: &'a KinematicTree = self.tree;
        let Some(group) = group else {
            return Some(
                tree.iter_joints()
                    .filter(|joint| joint.kind.is_revolute())
                    .map(|joint| joint.name.as_str())
                    .collect(),
            );
        };
        let links = self.captured_links(group)?;
        Some(
            links
                .into_iter()
                .flat_map(|link| link.child_joints.iter())
                .map(|&id| &tree.joints()[id])
                .filter(|joint| joint.kind.is_revolute() && !self.semantics.is_passive(&joint.name))
                .map(|joint| joint.name.as_str())
                .collect(),
        )
    }

    /// Names of the links a group's chain captures, in tree order.
    pub fn link_names_for(&self, group: &str) -> Option<Vec<&'a str>> {
        let links = self.captured_links(group)?;
        Some(links.into_iter().map(|link| link.name.as_str()).collect())
    }

    /// The group whose chain spans the most links; the first one on ties.
    pub fn main_group(&self) -> Option<&'a str> {
        let mut best: Option<(&'a str, usize)> = None;
        for group in &self.semantics.groups {
            if group.chain.is_none() {
                continue;
            }
            let count = self.captured_links(&group.name).map_or(0, |links| links.len());
            if best.map_or(true, |(_, most)| count > most) {
                best = Some((group.name.as_str(), count));
            }
        }
        best.map(|(name, _)| name)
    }

    fn captured_links(&self, group: &str) -> Option<Vec<&'a Link>> {
        let tree: &'a KinematicTree = self.tree;
        let group = self.semantics.group(group)?;
        let Some(chain) = &group.chain else {
            return Some(Vec::new());
        };

        let mut captured = Vec::new();
        let mut capture = false;
        let mut reached_tip = false;
        for link in tree.iter_links() {
            if link.name == chain.base_link {
                capture = true;
            }
            if capture {
                captured.push(link);
            }
            if capture && link.name == chain.tip_link {
                capture = false;
                reached_tip = true;
            }
        }
        if !captured.is_empty() && !reached_tip {
            warn!(
                group = %group.name,
                tip_link = %chain.tip_link,
                "chain tip link not reached, captured to the end of the tree"
            );
        }
        Some(captured)
    }

    pub fn end_effector_link_name(&self) -> &'a str {
        &self.semantics.end_effector
    }

    pub fn end_effector_link(&self) -> Result<&'a Link, SemanticsError> {
        let name = self.end_effector_link_name();
        self.tree
            .link(name)
            .ok_or_else(|| SemanticsError::UnknownLink(name.to_string()))
    }

    /// Static origin of the joint attaching the end-effector link, relative to
    /// its parent link. This is not the current world pose: compose it with a
    /// forward kinematics result for that.
    pub fn end_effector_frame(&self) -> Result<Frame, SemanticsError> {
        let link = self.end_effector_link()?;
        match self.tree.parent_joint(link) {
            Some(joint) => Ok(joint.origin_frame()),
            None => {
                warn!(link = %link.name, "end effector is the root link, using world frame");
                Ok(Frame::world_xy())
            }
        }
    }

    /// Last link a group's chain captures. `None` for an unknown group or one
    /// that captures nothing.
    pub fn end_effector_link_name_for(&self, group: &str) -> Option<&'a str> {
        let links = self.captured_links(group)?;
        links.last().map(|&link| link.name.as_str())
    }

    /// First link a group's chain captures. `None` for an unknown group or one
    /// that captures nothing.
    pub fn base_link_name_for(&self, group: &str) -> Option<&'a str> {
        let links = self.captured_links(group)?;
        links.first().map(|&link| link.name.as_str())
    }

    /// Base link of the first group that has a chain.
    pub fn base_link_name(&self) -> Option<&'a str> {
        self.semantics
            .groups
            .iter()
            .find_map(|group| group.chain.as_ref())
            .map(|chain| chain.base_link.as_str())
    }

    /// Origin of the fixed joint attaching the base link, or the world frame
    /// if there is no chain, no such link or no fixed attachment.
    pub fn base_frame(&self) -> Frame {
        let Some(name) = self.base_link_name() else {
            return Frame::world_xy();
        };
        let Some(link) = self.tree.link(name) else {
            warn!(link = name, "base link not in tree, using world frame");
            return Frame::world_xy();
        };
        match self.tree.parent_joint(link) {
            Some(joint) if joint.kind.is_fixed() => joint.origin_frame(),
            _ => Frame::world_xy(),
        }
    }
}
