//! SRDF reader for robot semantics.
//!
//! Only the parts of SRDF that the semantic queries use are read: every
//! `<group>` with its `<chain>`, every `<passive_joint>`, and the
//! `parent_link` of the first `<end_effector>`. A group counts as a serial
//! chain only if it has exactly one `<chain>` child.

use std::path::Path;

use sxd_document::{dom, parser};
use tracing::{debug, warn};

use crate::error::SemanticsError;
use crate::semantics::{Chain, PlanningGroup, RobotSemantics, SemanticsLoader};

/// [`SemanticsLoader`] holding the text of an SRDF document.
#[derive(Debug, Clone)]
pub struct SrdfLoader {
    xml: String,
}

impl SrdfLoader {
    pub fn from_srdf_string(xml: impl Into<String>) -> Self {
        Self { xml: xml.into() }
    }

    pub fn from_srdf<P: AsRef<Path>>(path: P) -> Result<Self, SemanticsError> {
        Ok(Self::from_srdf_string(std::fs::read_to_string(path)?))
    }
}

impl SemanticsLoader for SrdfLoader {
    fn load_semantics(&self) -> Result<RobotSemantics, SemanticsError> {
        let package = parser::parse(&self.xml).map_err(|e| SemanticsError::Xml(e.to_string()))?;
        let document = package.as_document();
        let root = document
            .root()
            .children()
            .into_iter()
            .find_map(|child| child.element())
            .ok_or_else(|| SemanticsError::Xml("no root element".into()))?;

        let mut groups = Vec::new();
        let mut end_effector = None;
        let mut passive_joints = Vec::new();
        for element in child_elements(root) {
            match element.name().local_part() {
                "group" => groups.push(planning_group(element)?),
                "end_effector" if end_effector.is_none() => {
                    end_effector = Some(attribute(element, "end_effector", "parent_link")?);
                }
                "passive_joint" => {
                    passive_joints.push(attribute(element, "passive_joint", "name")?);
                }
                _ => {}
            }
        }

        let end_effector = end_effector.unwrap_or_else(|| {
            warn!("srdf declares no end effector");
            String::new()
        });
        debug!(
            groups = groups.len(),
            passive_joints = passive_joints.len(),
            end_effector = %end_effector,
            "loaded srdf semantics"
        );

        Ok(RobotSemantics {
            groups,
            end_effector,
            passive_joints,
        })
    }
}

fn child_elements<'d>(element: dom::Element<'d>) -> impl Iterator<Item = dom::Element<'d>> {
    element
        .children()
        .into_iter()
        .filter_map(|child| child.element())
}

fn attribute(
    element: dom::Element,
    element_name: &'static str,
    attribute: &'static str,
) -> Result<String, SemanticsError> {
    element
        .attribute_value(attribute)
        .map(str::to_string)
        .ok_or(SemanticsError::MissingAttribute {
            element: element_name,
            attribute,
        })
}

fn planning_group(element: dom::Element) -> Result<PlanningGroup, SemanticsError> {
    let name = attribute(element, "group", "name")?;
    let chains = child_elements(element)
        .filter(|child| child.name().local_part() == "chain")
        .map(|chain| {
            Ok(Chain {
                base_link: attribute(chain, "chain", "base_link")?,
                tip_link: attribute(chain, "chain", "tip_link")?,
            })
        })
        .collect::<Result<Vec<_>, SemanticsError>>()?;

    let chain = match <[Chain; 1]>::try_from(chains) {
        Ok([chain]) => Some(chain),
        Err(chains) => {
            if chains.len() > 1 {
                debug!(group = %name, chains = chains.len(), "group is not a serial chain");
            }
            None
        }
    };
    Ok(PlanningGroup { name, chain })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ARM_SRDF;

    #[test]
    fn from_srdf_string_test() {
        let semantics = SrdfLoader::from_srdf_string(ARM_SRDF).load_semantics().unwrap();
        assert_eq!(
            semantics.groups.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(),
            vec!["manipulator", "wrist_only", "upper_arm"]
        );
        assert_eq!(
            semantics.group("manipulator").unwrap().chain,
            Some(Chain {
                base_link: "base_link".into(),
                tip_link: "tool0".into(),
            })
        );
        assert!(semantics.group("wrist_only").unwrap().chain.is_none());
        assert_eq!(semantics.end_effector, "tool0");
        assert!(semantics.passive_joints.is_empty());
    }

    #[test]
    fn passive_joints_are_read() {
        let srdf = r#"<robot name="gripper">
            <group name="fingers">
              <chain base_link="palm" tip_link="finger_tip"/>
            </group>
            <end_effector name="hand" parent_link="palm"/>
            <passive_joint name="finger_mimic"/>
            <passive_joint name="wheel"/>
          </robot>"#;
        let semantics = SrdfLoader::from_srdf_string(srdf).load_semantics().unwrap();
        assert_eq!(semantics.passive_joints, vec!["finger_mimic", "wheel"]);
        assert!(semantics.is_passive("wheel"));
        assert!(!semantics.is_passive("palm_joint"));

        let unnamed = r#"<robot><passive_joint/></robot>"#;
        assert!(matches!(
            SrdfLoader::from_srdf_string(unnamed).load_semantics(),
            Err(SemanticsError::MissingAttribute {
                element: "passive_joint",
                attribute: "name"
            })
        ));
    }

    #[test]
    fn multi_chain_group_has_no_chain() {
        let srdf = r#"<robot name="dual">
            <group name="both_arms">
              <chain base_link="torso" tip_link="left_tool"/>
              <chain base_link="torso" tip_link="right_tool"/>
            </group>
            <end_effector name="left" parent_link="left_tool"/>
            <end_effector name="right" parent_link="right_tool"/>
          </robot>"#;
        let semantics = SrdfLoader::from_srdf_string(srdf).load_semantics().unwrap();
        assert!(semantics.groups[0].chain.is_none());
        assert_eq!(semantics.end_effector, "left_tool");
    }

    #[test]
    fn missing_attribute_is_reported() {
        let srdf = r#"<robot><group name="g"><chain base_link="a"/></group></robot>"#;
        assert!(matches!(
            SrdfLoader::from_srdf_string(srdf).load_semantics(),
            Err(SemanticsError::MissingAttribute {
                element: "chain",
                attribute: "tip_link"
            })
        ));
    }

    #[test]
    fn malformed_xml_is_reported() {
        assert!(matches!(
            SrdfLoader::from_srdf_string("<robot><group></robot>").load_semantics(),
            Err(SemanticsError::Xml(_))
        ));
        assert!(matches!(
            SrdfLoader::from_srdf("./does/not/exist.srdf"),
            Err(SemanticsError::Io(_))
        ));
    }
}
