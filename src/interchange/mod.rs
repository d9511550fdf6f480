//! Material interchange engine
//!
//! Export: [`package::PackageAssembler`] serializes the node tree and encodes
//! its textures into a [`package::MaterialPackage`]. Import:
//! [`reconstructor::GraphReconstructor`] replays a downloaded
//! [`program::RemoteProgram`] into a node tree.

pub mod image_codec;
pub mod package;
pub mod program;
pub mod reconstructor;
pub mod serializer;

pub use image_codec::{EncodedImage, PngTextureEncoder, TextureEncoder};
pub use package::{build_export_package, image_key, ExportMetadata, MaterialPackage, PackageAssembler};
pub use program::{Instruction, RemoteProgram};
pub use reconstructor::{apply, GraphReconstructor};
pub use serializer::{serialize, SerializedGraph};
