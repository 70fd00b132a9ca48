use hashbrown::HashMap;
use petgraph::algo::is_cyclic_directed;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use super::bfs::bfs;
use super::error::ModelError;
use super::model::{ModelDescription, ModelLoader};
use super::utils::{joint_kind, origin_to_transform};
use super::{Joint, KinematicTree, Link};

impl KinematicTree {
    /// Builds and validates a tree from a parsed robot description.
    ///
    /// Fails if a joint names a link that does not exist, a link has two
    /// incoming joints, the link graph has a cycle, or there is not exactly
    /// one root. A description with no links gives an empty tree.
    pub fn new(model: ModelDescription) -> Result<Self, ModelError> {
        let ModelDescription {
            name,
            root: declared_root,
            links: link_descriptions,
            joints: joint_descriptions,
        } = model;

        let mut link_index = HashMap::with_capacity(link_descriptions.len());
        let mut links = Vec::with_capacity(link_descriptions.len());
        for (id, link) in link_descriptions.into_iter().enumerate() {
            if link_index.insert(link.name.clone(), id).is_some() {
                return Err(ModelError::DuplicateLink(link.name));
            }
            links.push(Link {
                name: link.name,
                parent_joint: None,
                child_joints: Vec::new(),
                visuals: link.visuals,
                collisions: link.collisions,
            });
        }

        let mut link_graph = DiGraphMap::new();
        for id in 0..links.len() {
            link_graph.add_node(id);
        }

        let mut joint_index = HashMap::with_capacity(joint_descriptions.len());
        let mut joints = Vec::with_capacity(joint_descriptions.len());
        for (id, joint) in joint_descriptions.iter().enumerate() {
            if joint_index.insert(joint.name.clone(), id).is_some() {
                return Err(ModelError::DuplicateJoint(joint.name.clone()));
            }
            let find = |link: &str| {
                link_index
                    .get(link)
                    .copied()
                    .ok_or_else(|| ModelError::DanglingJointReference {
                        joint: joint.name.clone(),
                        link: link.to_string(),
                    })
            };
            let parent = find(&joint.parent)?;
            let child = find(&joint.child)?;

            if links[child].parent_joint.is_some() {
                return Err(ModelError::MultipleParents {
                    link: joint.child.clone(),
                });
            }
            links[child].parent_joint = Some(id);
            links[parent].child_joints.push(id);
            link_graph.add_edge(parent, child, id);

            joints.push(Joint {
                name: joint.name.clone(),
                kind: joint_kind(joint)?,
                origin: origin_to_transform(&joint.origin),
                parent_link: parent,
                child_link: child,
            });
        }

        if links.is_empty() {
            debug!(robot = %name, "empty kinematic tree");
            return Ok(Self {
                name,
                ..Default::default()
            });
        }

        if is_cyclic_directed(&link_graph) {
            return Err(ModelError::CyclicTree);
        }

        // find the links that have no parent link
        let roots = links
            .iter()
            .enumerate()
            .filter(|(_, link)| link.parent_joint.is_none())
            .map(|(id, _)| id)
            .collect::<Vec<_>>();
        let root = match roots.as_slice() {
            [] => return Err(ModelError::NoRoot),
            [root] => *root,
            _ => {
                return Err(ModelError::MultipleRoots(
                    roots.iter().map(|&id| links[id].name.clone()).collect(),
                ))
            }
        };
        if let Some(declared) = declared_root {
            if declared != links[root].name {
                return Err(ModelError::RootMismatch {
                    declared,
                    found: links[root].name.clone(),
                });
            }
        }

        let bfs = bfs(&link_graph, root);
        let joint_order = bfs
            .iter()
            .flat_map(|&link| links[link].child_joints.iter().copied())
            .collect::<Vec<_>>();

        debug!(
            robot = %name,
            root = %links[root].name,
            links = links.len(),
            joints = joints.len(),
            "built kinematic tree"
        );

        Ok(Self {
            name,
            links,
            joints,
            link_graph,
            bfs,
            joint_order,
            link_index,
            joint_index,
        })
    }

    pub fn from_loader(loader: &impl ModelLoader) -> Result<Self, ModelError> {
        Self::new(loader.load_model()?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn root_id(&self) -> Option<usize> {
        self.bfs.first().copied()
    }

    pub fn root(&self) -> Option<&Link> {
        self.root_id().map(|id| &self.links[id])
    }

    /// Links in insertion order; a link's id is its position here.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Joints in insertion order; a joint's id is its position here.
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Link ids in tree order: breadth first from the root, siblings in the
    /// order their joints were declared.
    pub fn tree_order(&self) -> &[usize] {
        &self.bfs
    }

    /// Joint ids in tree order: the outgoing joints of each link of
    /// [`Self::tree_order`], in declaration order.
    pub fn joint_tree_order(&self) -> &[usize] {
        &self.joint_order
    }

    pub fn iter_links(&self) -> impl Iterator<Item = &Link> + '_ {
        self.bfs.iter().map(move |&id| &self.links[id])
    }

    pub fn iter_joints(&self) -> impl Iterator<Item = &Joint> + '_ {
        self.joint_order.iter().map(move |&id| &self.joints[id])
    }

    pub fn link_id(&self, name: &str) -> Option<usize> {
        self.link_index.get(name).copied()
    }

    pub fn joint_id(&self, name: &str) -> Option<usize> {
        self.joint_index.get(name).copied()
    }

    pub fn link(&self, name: &str) -> Option<&Link> {
        self.link_id(name).map(|id| &self.links[id])
    }

    pub fn joint(&self, name: &str) -> Option<&Joint> {
        self.joint_id(name).map(|id| &self.joints[id])
    }

    /// Incoming joint of a link, `None` for the root.
    pub fn parent_joint(&self, link: &Link) -> Option<&Joint> {
        link.parent_joint.map(|id| &self.joints[id])
    }

    /// Links directly attached below `link`.
    pub fn child_links(&self, link: usize) -> impl Iterator<Item = &Link> + '_ {
        self.link_graph
            .neighbors_directed(link, petgraph::Direction::Outgoing)
            .map(move |child| &self.links[child])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{JointDescription, JointType, LinkDescription};
    use crate::test_utils::serial_chain;

    fn names<'a>(links: impl Iterator<Item = &'a Link>) -> Vec<&'a str> {
        links.map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn serial_chain_tree_order() {
        let tree = KinematicTree::new(serial_chain(&["L1", "L2", "L3"])).unwrap();
        assert_eq!(tree.root().unwrap().name, "L1");
        assert_eq!(names(tree.iter_links()), vec!["L1", "L2", "L3"]);
        assert_eq!(
            tree.iter_joints().map(|j| j.name.as_str()).collect::<Vec<_>>(),
            vec!["L1_L2", "L2_L3"]
        );
    }

    #[test]
    fn branching_tree_order_is_breadth_first() {
        // declared out of order: children before parents
        let model = ModelDescription {
            name: "branch".into(),
            root: Some("base".into()),
            links: ["left_tip", "right", "base", "left"]
                .into_iter()
                .map(LinkDescription::new)
                .collect(),
            joints: vec![
                JointDescription::new("left_tip_joint", JointType::Fixed, "left", "left_tip"),
                JointDescription::new("left_joint", JointType::Revolute, "base", "left"),
                JointDescription::new("right_joint", JointType::Revolute, "base", "right"),
            ],
        };
        let tree = KinematicTree::new(model).unwrap();
        assert_eq!(names(tree.iter_links()), vec!["base", "left", "right", "left_tip"]);
        assert_eq!(
            tree.iter_joints().map(|j| j.name.as_str()).collect::<Vec<_>>(),
            vec!["left_joint", "right_joint", "left_tip_joint"]
        );
        // insertion order is preserved separately
        assert_eq!(names(tree.links().iter()), vec!["left_tip", "right", "base", "left"]);
        assert_eq!(names(tree.child_links(tree.link_id("base").unwrap())), vec!["left", "right"]);
    }

    #[test]
    fn lookups_by_name() {
        let tree = KinematicTree::new(serial_chain(&["a", "b"])).unwrap();
        let b = tree.link("b").unwrap();
        assert_eq!(tree.parent_joint(b).unwrap().name, "a_b");
        assert_eq!(tree.joint("a_b").unwrap().child_link, tree.link_id("b").unwrap());
        assert!(tree.link("nope").is_none());
        assert!(tree.joint("nope").is_none());
        assert!(tree.parent_joint(tree.root().unwrap()).is_none());
    }

    #[test]
    fn empty_model_gives_empty_tree() {
        let tree = KinematicTree::new(ModelDescription::default()).unwrap();
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert_eq!(tree.iter_links().count(), 0);
    }

    #[test]
    fn dangling_reference_is_rejected() {
        let mut model = serial_chain(&["a", "b"]);
        model.joints[0].child = "ghost".into();
        let err = KinematicTree::new(model).unwrap_err();
        assert!(matches!(err, ModelError::DanglingJointReference { link, .. } if link == "ghost"));
    }

    #[test]
    fn multiple_roots_are_rejected() {
        let mut model = serial_chain(&["a", "b"]);
        model.links.push(LinkDescription::new("floating"));
        let err = KinematicTree::new(model).unwrap_err();
        assert!(matches!(err, ModelError::MultipleRoots(roots) if roots == ["a", "floating"]));
    }

    #[test]
    fn cycle_is_rejected() {
        let mut model = serial_chain(&["a", "b", "c"]);
        model
            .joints
            .push(JointDescription::new("back", JointType::Fixed, "c", "a"));
        assert!(matches!(KinematicTree::new(model), Err(ModelError::CyclicTree)));
    }

    #[test]
    fn second_parent_is_rejected() {
        let mut model = serial_chain(&["a", "b", "c"]);
        model
            .joints
            .push(JointDescription::new("extra", JointType::Fixed, "a", "c"));
        assert!(matches!(
            KinematicTree::new(model),
            Err(ModelError::MultipleParents { link }) if link == "c"
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut model = serial_chain(&["a", "b"]);
        model.links.push(LinkDescription::new("b"));
        assert!(matches!(KinematicTree::new(model), Err(ModelError::DuplicateLink(n)) if n == "b"));

        let mut model = serial_chain(&["a", "b", "c"]);
        model.joints[1].name = "a_b".into();
        assert!(matches!(
            KinematicTree::new(model),
            Err(ModelError::DuplicateJoint(n)) if n == "a_b"
        ));
    }

    #[test]
    fn declared_root_must_match() {
        let mut model = serial_chain(&["a", "b"]);
        model.root = Some("b".into());
        assert!(matches!(
            KinematicTree::new(model),
            Err(ModelError::RootMismatch { declared, found }) if declared == "b" && found == "a"
        ));
    }
}
