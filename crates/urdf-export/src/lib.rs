//! CAD assembly to URDF translation engine
//!
//! This crate turns an assembly snapshot (occurrences, bodies with mass
//! properties, rigid/revolute/slider joints) into a ROS robot description
//! package:
//! - Transform: rigid transforms and inertia tensor algebra
//! - Inertial: per-link mass aggregation
//! - Tree: rooted link/joint graph and frame resolution
//! - Export: URDF/xacro documents, meshes and package skeleton
//! - Import: reading a produced description back for verification
//!
//! Lengths are centimetres and masses kilograms internally; documents are
//! written in metres.

pub mod assembly;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod inertia;
pub mod inertial;
pub mod naming;
pub mod package;
pub mod pipeline;
pub mod stl;
pub mod transform;
pub mod tree;
pub mod types;

pub use assembly::*;
pub use config::*;
pub use error::*;
pub use export::{Documents, render_documents};
pub use import::{ImportError, RobotDescription, read_description, read_description_file};
pub use inertia::*;
pub use inertial::*;
pub use package::PackageWriter;
pub use pipeline::*;
pub use stl::{MeshExporter, NoMeshExporter, StlError, StlMeshExporter};
pub use transform::*;
pub use tree::*;
pub use types::*;
