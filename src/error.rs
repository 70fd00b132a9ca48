use thiserror::Error;

/// Top-level error type for robot-pose.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Kinematics error: {0}")]
    Kinematics(#[from] KinematicsError),

    #[error("Semantics error: {0}")]
    Semantics(#[from] SemanticsError),

    #[error("This operation requires robot semantics, but none were assigned")]
    MissingSemantics,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Structural errors found while building a kinematic tree.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Duplicate link name: {0}")]
    DuplicateLink(String),

    #[error("Duplicate joint name: {0}")]
    DuplicateJoint(String),

    #[error("Joint {joint} references unknown link {link}")]
    DanglingJointReference { joint: String, link: String },

    #[error("Link {link} has more than one incoming joint")]
    MultipleParents { link: String },

    #[error("Link graph contains a cycle")]
    CyclicTree,

    #[error("No root link (every link has an incoming joint)")]
    NoRoot,

    #[error("More than one root link: {0:?}")]
    MultipleRoots(Vec<String>),

    #[error("Declared root {declared} does not match the root of the link graph {found}")]
    RootMismatch { declared: String, found: String },

    #[error("Joint {joint} has a zero-length motion axis")]
    InvalidAxis { joint: String },

    #[error("URDF error: {0}")]
    Urdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Degenerate frame input.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    #[error("Frame axis has zero length")]
    ZeroLengthAxis,

    #[error("Frame axis is not of unit length (norm {0})")]
    NotUnitLength(f64),

    #[error("Frame axes are not orthogonal (dot product {0})")]
    NotOrthogonal(f64),

    #[error("Frame origin or axis has a non-finite component")]
    NonFinite,
}

/// Failures of a forward kinematics update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KinematicsError {
    #[error("Joint {joint} has type {kind} that forward kinematics does not support")]
    UnsupportedJointType { joint: String, kind: &'static str },
}

/// Failures while loading or resolving robot semantics.
#[derive(Debug, Error)]
pub enum SemanticsError {
    #[error("Unknown link: {0}")]
    UnknownLink(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Element <{element}> is missing attribute {attribute}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
