//! Shader Cloud core library
//!
//! Exports shading node trees (nested groups and embedded textures included)
//! to the Shader Cloud catalog and rebuilds them from downloaded programs.

pub mod config;
pub mod constants;
pub mod error;
pub mod interchange;
pub mod material;
pub mod nodes;
pub mod remote;
pub mod sync;

// Re-export commonly used types
pub use error::{Error, Result};
pub use interchange::{build_export_package, serialize, ExportMetadata, MaterialPackage, RemoteProgram};
pub use material::Material;
pub use nodes::{NodeGraph, ShaderTree};
pub use remote::{CatalogClient, HttpCatalogClient};
pub use sync::{ExportRequest, MaterialSync};
