//! Error types of the export pipeline

use crate::assembly::SourceJointKind;
use crate::stl::StlError;

/// Why a joint/link graph is not a valid kinematic tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// The named links form a closed loop
    Cycle(Vec<String>),
    /// A link is the child of more than one joint
    DuplicateParent { link: String, joints: [String; 2] },
    /// The joint's parent is never reached from the root
    Disconnected { joint: String },
    /// The joint references a link that does not exist
    UnknownLink { joint: String, link: String },
    /// Two occurrences map to the same link name
    DuplicateLinkName(String),
    DuplicateJointName(String),
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedReason::Cycle(links) => write!(f, "cycle through {}", links.join(" -> ")),
            MalformedReason::DuplicateParent { link, joints } => write!(
                f,
                "link '{}' has two parent joints ('{}', '{}')",
                link, joints[0], joints[1]
            ),
            MalformedReason::Disconnected { joint } => {
                write!(f, "joint '{}' is not connected to the root", joint)
            }
            MalformedReason::UnknownLink { joint, link } => {
                write!(f, "joint '{}' references unknown link '{}'", joint, link)
            }
            MalformedReason::DuplicateLinkName(name) => {
                write!(f, "link name '{}' is used twice", name)
            }
            MalformedReason::DuplicateJointName(name) => {
                write!(f, "joint name '{}' is used twice", name)
            }
        }
    }
}

fn rooted_at(found: &Option<String>) -> String {
    match found {
        Some(root) => format!(" (tree is rooted at '{}')", root),
        None => String::new(),
    }
}

/// Errors raised while building or writing a robot description
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Degenerate mass for '{link}': {reason}")]
    DegenerateMass { link: String, reason: String },

    #[error("Missing root link '{expected}'{}", rooted_at(.found))]
    MissingRootLink {
        expected: String,
        found: Option<String>,
    },

    #[error("No unique root: candidates {candidates:?}")]
    NoUniqueRoot { candidates: Vec<String> },

    #[error("Malformed tree: {0}")]
    MalformedTree(MalformedReason),

    #[error("Unsupported joint type {} for joint '{joint}'", .kind.display_name())]
    UnsupportedJointType {
        joint: String,
        kind: SourceJointKind,
    },

    #[error("Joint '{joint}' has only one motion limit ({missing} limit missing)")]
    IncompleteLimits { joint: String, missing: &'static str },

    #[error("Joint '{joint}' has a zero-length axis")]
    DegenerateAxis { joint: String },

    #[error("IO error writing {path}: {source}")]
    SerializationIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Mesh export failed: {0}")]
    MeshExport(#[from] StlError),
}

impl ExportError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        ExportError::SerializationIo {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn malformed(reason: MalformedReason) -> Self {
        ExportError::MalformedTree(reason)
    }

    /// Whether the error was detected before anything was written
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            ExportError::SerializationIo { .. } | ExportError::MeshExport(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
