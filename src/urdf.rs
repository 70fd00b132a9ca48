use std::path::Path;

use tracing::debug;
use urdf_rs::read_from_string;

use super::error::ModelError;
use super::model::{
    Geometry, JointDescription, JointType, LinkDescription, ModelDescription, ModelLoader, Shape,
};
use super::utils::*;

/// [`ModelLoader`] backed by a parsed URDF document.
#[derive(Debug, Clone)]
pub struct UrdfLoader {
    robot: urdf_rs::Robot,
}

impl UrdfLoader {
    pub fn from_urdf_string(str: &str) -> Result<Self, ModelError> {
        let robot = read_from_string(str).map_err(|e| ModelError::Urdf(e.to_string()))?;
        Ok(Self { robot })
    }

    pub fn from_urdf(path: &str) -> Result<Self, ModelError> {
        if !url_is_urdf_file(path) {
            return Err(ModelError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{path} is not a urdf file"),
            )));
        }
        Self::from_urdf_string(&read_file(Path::new(path))?)
    }

    pub fn robot(&self) -> &urdf_rs::Robot {
        &self.robot
    }
}

impl ModelLoader for UrdfLoader {
    fn load_model(&self) -> Result<ModelDescription, ModelError> {
        let links = self
            .robot
            .links
            .iter()
            .map(|link| LinkDescription {
                name: link.name.clone(),
                visuals: link
                    .visual
                    .iter()
                    .map(|v| geometry(v.name.clone(), &v.origin, &v.geometry))
                    .collect(),
                collisions: link
                    .collision
                    .iter()
                    .map(|c| geometry(c.name.clone(), &c.origin, &c.geometry))
                    .collect(),
            })
            .collect::<Vec<_>>();

        let joints = self
            .robot
            .joints
            .iter()
            .map(|joint| JointDescription {
                name: joint.name.clone(),
                joint_type: joint_type(&joint.joint_type),
                origin: urdf_pose_to_origin(&joint.origin),
                axis: Some(joint.axis.xyz.0),
                parent: joint.parent.link.clone(),
                child: joint.child.link.clone(),
            })
            .collect::<Vec<_>>();

        debug!(
            robot = %self.robot.name,
            links = links.len(),
            joints = joints.len(),
            "loaded urdf model"
        );

        Ok(ModelDescription {
            name: self.robot.name.clone(),
            root: None,
            links,
            joints,
        })
    }
}

fn joint_type(joint_type: &urdf_rs::JointType) -> JointType {
    match joint_type {
        urdf_rs::JointType::Fixed => JointType::Fixed,
        urdf_rs::JointType::Revolute => JointType::Revolute,
        urdf_rs::JointType::Continuous => JointType::Continuous,
        urdf_rs::JointType::Prismatic => JointType::Prismatic,
        urdf_rs::JointType::Planar => JointType::Planar,
        urdf_rs::JointType::Floating => JointType::Floating,
        urdf_rs::JointType::Spherical => JointType::Spherical,
    }
}

fn geometry(
    name: Option<String>,
    origin: &urdf_rs::Pose,
    geometry: &urdf_rs::Geometry,
) -> Geometry {
    let shape = match geometry {
        urdf_rs::Geometry::Box { size } => Shape::Box { size: size.0 },
        urdf_rs::Geometry::Cylinder { radius, length } => Shape::Cylinder {
            radius: *radius,
            length: *length,
        },
        urdf_rs::Geometry::Capsule { radius, length } => Shape::Capsule {
            radius: *radius,
            length: *length,
        },
        urdf_rs::Geometry::Sphere { radius } => Shape::Sphere { radius: *radius },
        urdf_rs::Geometry::Mesh { filename, scale } => Shape::Mesh {
            filename: filename.clone(),
            scale: scale.as_ref().map(|s| s.0).unwrap_or([1., 1., 1.]),
        },
    };
    Geometry {
        name,
        origin: origin_to_transform(&urdf_pose_to_origin(origin)),
        shape,
    }
}
