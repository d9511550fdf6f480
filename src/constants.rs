//! Application-wide constants and default values
//!
//! Centralized location for all hard-coded values to improve maintainability

/// Catalog service endpoints and form field names
pub mod api {
    /// Default catalog base URL (with trailing slash)
    pub const DEFAULT_API_URL: &str = "https://shader.cloud/";

    /// Upload endpoint, relative to the base URL
    pub const IMPORT_PATH: &str = "api/import";

    /// Download endpoint, relative to the base URL
    pub const DOWNLOAD_PATH: &str = "api/download";

    /// Category listing endpoint, relative to the base URL
    pub const CATEGORIES_PATH: &str = "api/categories";

    /// Default request timeout in seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub const FIELD_XML: &str = "xml";
    pub const FIELD_NAME: &str = "material_name";
    pub const FIELD_DESCRIPTION: &str = "material_description";
    pub const FIELD_CATEGORY: &str = "material_category";
    pub const FIELD_MATERIAL_ID: &str = "material_id";
}

/// Image transport constants
pub mod image {
    /// Prefix of the inline PNG payload
    pub const DATA_URI_PREFIX: &str = "data:image/png;base64,";

    /// Color space assumed when a texture declares none
    pub const DEFAULT_COLOR_SPACE: &str = "sRGB";
}

/// Material document constants
pub mod material {
    /// Custom property holding the catalog identifier of a published material
    pub const REMOTE_ID_KEY: &str = "shadercloud_id";

    /// Version written into saved material documents
    pub const FILE_VERSION: &str = "1.0";

    /// Creator tag written into saved material documents
    pub const CREATOR: &str = "Shader Cloud 0.1.1";
}

/// Serialization constants
pub mod serialize {
    /// Root element wrapping the uploaded graph
    pub const ROOT_LABEL: &str = "ShaderCloud";
}

/// Auto-layout spacing
pub mod layout {
    /// Horizontal distance between node columns
    pub const COLUMN_SPACING: f32 = 300.0;

    /// Vertical distance between nodes in a column
    pub const ROW_SPACING: f32 = 220.0;
}

/// Environment variables consulted by the settings loader
pub mod env {
    pub const API_URL: &str = "SHADERCLOUD_API_URL";
    pub const API_KEY: &str = "SHADERCLOUD_API_KEY";
}
