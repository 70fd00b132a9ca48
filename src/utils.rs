use std::io::Read;

use nalgebra::{Isometry3, Translation3, Unit, UnitQuaternion, Vector3};

use super::error::ModelError;
use super::frame::Transform;
use super::model::{JointDescription, JointType, Origin};
use super::JointKind;

pub(super) fn url_is_urdf_file(url: &str) -> bool {
    std::path::Path::new(url).exists() && (url.ends_with(".urdf") || url.ends_with(".URDF"))
}

pub(super) fn read_file(path: &std::path::Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

pub(super) fn origin_to_transform(origin: &Origin) -> Transform {
    let [x, y, z] = origin.xyz;
    let [roll, pitch, yaw] = origin.rpy;
    Isometry3::from_parts(
        Translation3::new(x, y, z),
        UnitQuaternion::from_euler_angles(roll, pitch, yaw),
    )
}

pub(super) fn urdf_pose_to_origin(pose: &urdf_rs::Pose) -> Origin {
    Origin {
        xyz: pose.xyz.0,
        rpy: pose.rpy.0,
    }
}

// URDF convention: an omitted axis is the X axis
const DEFAULT_AXIS: [f64; 3] = [1., 0., 0.];

fn unit_axis(joint: &JointDescription) -> Result<Unit<Vector3<f64>>, ModelError> {
    let [x, y, z] = joint.axis.unwrap_or(DEFAULT_AXIS);
    Unit::try_new(Vector3::new(x, y, z), f64::EPSILON).ok_or_else(|| ModelError::InvalidAxis {
        joint: joint.name.clone(),
    })
}

pub(super) fn joint_kind(joint: &JointDescription) -> Result<JointKind, ModelError> {
    Ok(match joint.joint_type {
        JointType::Fixed => JointKind::Fixed,
        JointType::Revolute => JointKind::Revolute {
            axis: unit_axis(joint)?,
        },
        JointType::Continuous => JointKind::Continuous {
            axis: unit_axis(joint)?,
        },
        JointType::Prismatic => JointKind::Prismatic {
            axis: unit_axis(joint)?,
        },
        JointType::Planar => JointKind::Planar {
            normal: unit_axis(joint)?,
        },
        JointType::Floating => JointKind::Floating,
        JointType::Spherical => JointKind::Spherical,
    })
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_abs_diff_eq;
    use nalgebra::Point3;

    use super::*;

    #[test]
    fn url_is_file_test() {
        assert!(!url_is_urdf_file("./does/not/exist.urdf"));
        assert!(!url_is_urdf_file("Cargo.toml"));
    }

    #[test]
    fn read_file_test() {
        let contents = read_file(std::path::Path::new("Cargo.toml")).unwrap();
        assert!(contents.contains("robot-pose"));
    }

    #[test]
    fn origin_to_transform_test() {
        let origin = Origin {
            xyz: [1., 2., 3.],
            rpy: [0., 0., FRAC_PI_2],
        };
        let t = origin_to_transform(&origin);
        let p = t.transform_point(&Point3::new(1., 0., 0.));
        assert_abs_diff_eq!(p, Point3::new(1., 3., 3.), epsilon = 1e-12);
    }

    #[test]
    fn joint_kind_normalizes_axis() {
        let joint = JointDescription::new("j", JointType::Prismatic, "a", "b")
            .with_axis([0., 0., 2.]);
        match joint_kind(&joint).unwrap() {
            JointKind::Prismatic { axis } => {
                assert_abs_diff_eq!(axis, Vector3::z_axis(), epsilon = 1e-12)
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn joint_kind_defaults_to_x_axis() {
        let joint = JointDescription::new("j", JointType::Revolute, "a", "b");
        assert_eq!(joint_kind(&joint).unwrap().axis(), Some(Vector3::x_axis()));
    }

    #[test]
    fn joint_kind_rejects_zero_axis() {
        let joint = JointDescription::new("j", JointType::Continuous, "a", "b")
            .with_axis([0., 0., 0.]);
        assert!(matches!(
            joint_kind(&joint),
            Err(ModelError::InvalidAxis { joint }) if joint == "j"
        ));
    }
}
