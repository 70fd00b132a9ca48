//! Synthetic robot descriptions shared by the unit tests.

use crate::model::{JointDescription, JointType, LinkDescription, ModelDescription};

/// Serial chain over `links`, each joint revolute about Z with an identity
/// origin and named `<parent>_<child>`.
pub(crate) fn serial_chain(links: &[&str]) -> ModelDescription {
    ModelDescription {
        name: "chain".into(),
        root: None,
        links: links.iter().copied().map(LinkDescription::new).collect(),
        joints: links
            .windows(2)
            .map(|pair| {
                JointDescription::new(
                    format!("{}_{}", pair[0], pair[1]),
                    JointType::Revolute,
                    pair[0],
                    pair[1],
                )
                .with_axis([0., 0., 1.])
            })
            .collect(),
    }
}

/// Small arm with a fixed mount, three revolute joints and a fixed flange:
/// `world -fixed-> base_link -> shoulder -> elbow -> wrist -fixed-> tool0`.
pub(crate) const ARM_URDF: &str = r#"
<robot name="three_axis">
  <link name="world"/>
  <link name="base_link">
    <visual>
      <origin xyz="0 0 0.05" rpy="0 0 0"/>
      <geometry><cylinder radius="0.1" length="0.1"/></geometry>
    </visual>
  </link>
  <link name="shoulder"/>
  <link name="elbow">
    <collision>
      <geometry><box size="0.1 0.1 0.5"/></geometry>
    </collision>
  </link>
  <link name="wrist">
    <visual>
      <geometry><mesh filename="package://arm/wrist.stl" scale="0.001 0.001 0.001"/></geometry>
    </visual>
  </link>
  <link name="tool0"/>
  <joint name="world_joint" type="fixed">
    <parent link="world"/>
    <child link="base_link"/>
    <origin xyz="0 0 0.5" rpy="0 0 0"/>
  </joint>
  <joint name="joint_1" type="revolute">
    <parent link="base_link"/>
    <child link="shoulder"/>
    <origin xyz="0 0 0.1" rpy="0 0 0"/>
    <axis xyz="0 0 1"/>
    <limit lower="-3.14" upper="3.14" effort="0" velocity="1"/>
  </joint>
  <joint name="joint_2" type="revolute">
    <parent link="shoulder"/>
    <child link="elbow"/>
    <origin xyz="0 0 0.2" rpy="0 0 0"/>
    <axis xyz="0 1 0"/>
    <limit lower="-3.14" upper="3.14" effort="0" velocity="1"/>
  </joint>
  <joint name="joint_3" type="revolute">
    <parent link="elbow"/>
    <child link="wrist"/>
    <origin xyz="0 0 0.5" rpy="0 0 0"/>
    <axis xyz="0 1 0"/>
    <limit lower="-3.14" upper="3.14" effort="0" velocity="1"/>
  </joint>
  <joint name="flange" type="fixed">
    <parent link="wrist"/>
    <child link="tool0"/>
    <origin xyz="0.3 0 0" rpy="0 0 0"/>
  </joint>
</robot>
"#;

#[cfg(feature = "srdf")]
pub(crate) const ARM_SRDF: &str = r#"
<robot name="three_axis">
  <group name="manipulator">
    <chain base_link="base_link" tip_link="tool0"/>
  </group>
  <group name="wrist_only">
    <joint name="joint_3"/>
  </group>
  <group name="upper_arm">
    <chain base_link="shoulder" tip_link="elbow"/>
  </group>
  <end_effector name="gripper" parent_link="tool0" group="wrist_only"/>
</robot>
"#;
