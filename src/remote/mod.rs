//! Catalog service client

pub mod http;
pub mod wire;

use crate::error::Result;
use crate::interchange::{MaterialPackage, RemoteProgram};
use serde::{Deserialize, Serialize};

pub use http::HttpCatalogClient;

/// Identifier of a material in the catalog
pub type RemoteId = i64;

/// A catalog category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Operations the interchange core needs from the catalog
///
/// Calls block until the exchange completes.
pub trait CatalogClient {
    /// Uploads a package, returning the catalog identifier of the material
    fn publish(&self, package: &MaterialPackage) -> Result<RemoteId>;

    /// Downloads the program that rebuilds material `id`
    fn fetch(&self, id: RemoteId) -> Result<RemoteProgram>;

    /// Lists the categories a material can be filed under
    fn categories(&self) -> Result<Vec<Category>>;
}
