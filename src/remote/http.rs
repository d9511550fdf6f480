//! Blocking HTTP client for the catalog service
//!
//! Every request carries `Authorization: Bearer <api key>` and asks for JSON.
//! Upload and download are form-encoded POSTs; the category list is a GET.

use super::wire::{check_response, ApiResponse};
use super::{CatalogClient, Category, RemoteId};
use crate::config::Settings;
use crate::constants::api;
use crate::error::{Error, Result};
use crate::interchange::{MaterialPackage, RemoteProgram};
use log::{debug, info};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::ACCEPT;
use std::time::Duration;

/// Catalog client backed by `reqwest`'s blocking API
pub struct HttpCatalogClient {
    /// Base URL with trailing slash
    base_url: String,
    api_key: String,
    client: Client,
}

impl HttpCatalogClient {
    /// Creates a client from validated settings
    pub fn new(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::Network(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self {
            base_url: settings.api_url.clone(),
            api_key: settings.api_key.clone(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "application/json")
    }

    fn send(&self, request: RequestBuilder) -> Result<ApiResponse> {
        let response = self.authorized(request).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        debug!("Catalog answered {} ({} bytes)", status, body.len());
        check_response(status, &body)
    }
}

impl CatalogClient for HttpCatalogClient {
    fn publish(&self, package: &MaterialPackage) -> Result<RemoteId> {
        let fields = package.form_fields();
        debug!(
            "Uploading '{}' ({} field(s), {} image(s))",
            package.name,
            fields.len(),
            package.images.len()
        );
        let request = self.client.post(self.url(api::IMPORT_PATH)).form(&fields);
        let id = self.send(request)?.material_id()?;
        info!("Published '{}' as material {}", package.name, id);
        Ok(id)
    }

    fn fetch(&self, id: RemoteId) -> Result<RemoteProgram> {
        if id <= 0 {
            return Err(Error::validation("You must enter a material ID"));
        }
        let fields = [(api::FIELD_MATERIAL_ID, id.to_string())];
        let request = self.client.post(self.url(api::DOWNLOAD_PATH)).form(&fields);
        let text = self.send(request)?.program_text()?;
        info!("Downloaded material {} ({} bytes of program)", id, text.len());
        Ok(RemoteProgram::new(text))
    }

    fn categories(&self) -> Result<Vec<Category>> {
        let request = self.client.get(self.url(api::CATEGORIES_PATH));
        self.send(request)?.into_categories()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_client() -> HttpCatalogClient {
        // Port 9 (discard) on loopback; nothing should ever be sent
        let settings = Settings {
            api_url: "http://127.0.0.1:9/".to_string(),
            timeout_secs: 1,
            ..Settings::default()
        };
        HttpCatalogClient::new(&settings).unwrap()
    }

    #[test]
    fn test_fetch_rejects_non_positive_ids_before_sending() {
        let client = unreachable_client();
        assert!(matches!(client.fetch(0), Err(Error::Validation(_))));
        assert!(matches!(client.fetch(-5), Err(Error::Validation(_))));
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let client = unreachable_client();
        assert_eq!(client.url(api::DOWNLOAD_PATH), "http://127.0.0.1:9/api/download");
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = Settings {
            api_url: "ftp://shader.cloud/".to_string(),
            ..Settings::default()
        };
        assert!(matches!(HttpCatalogClient::new(&settings), Err(Error::Config(_))));
    }
}
