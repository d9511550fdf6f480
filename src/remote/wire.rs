//! Catalog response bodies and their translation into the error taxonomy

use super::Category;
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

/// Common shape of every catalog response
#[derive(Debug, Default, Deserialize)]
pub struct ApiResponse {
    pub success: Option<bool>,
    #[serde(default)]
    pub material_id: Option<Value>,
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub categories: Option<Vec<Category>>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiResponse {
    /// Service-provided failure text, preferring `error` over `message`
    fn failure_text(&self) -> Option<String> {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .filter(|m| !m.trim().is_empty())
    }

    /// Identifier assigned to an uploaded material
    pub fn material_id(&self) -> Result<i64> {
        let id = match &self.material_id {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        id.filter(|id| *id > 0)
            .ok_or_else(|| Error::Network("response is missing a valid material_id".to_string()))
    }

    /// Downloaded program text; structured programs are re-encoded as JSON
    pub fn program_text(&self) -> Result<String> {
        match &self.code {
            Some(Value::String(text)) => Ok(text.clone()),
            Some(Value::Null) | None => Err(Error::Network("response is missing code".to_string())),
            Some(other) => Ok(other.to_string()),
        }
    }

    pub fn into_categories(self) -> Result<Vec<Category>> {
        self.categories
            .ok_or_else(|| Error::Network("response is missing categories".to_string()))
    }
}

/// Interprets a raw HTTP exchange
///
/// Non-success statuses and `success: false` bodies become `Error::Api`; an
/// unreadable body on a success status becomes `Error::Network`.
pub fn check_response(status: u16, body: &str) -> Result<ApiResponse> {
    let is_success_status = (200..300).contains(&status);
    let parsed: Option<ApiResponse> = serde_json::from_str(body).ok();

    if !is_success_status {
        let message = parsed
            .as_ref()
            .and_then(ApiResponse::failure_text)
            .unwrap_or_else(|| format!("request failed with status {}", status));
        return Err(Error::Api { code: status, message });
    }

    let response =
        parsed.ok_or_else(|| Error::Network("catalog returned a malformed response".to_string()))?;
    match response.success {
        Some(true) => Ok(response),
        Some(false) => Err(Error::Api {
            code: status,
            message: response
                .failure_text()
                .unwrap_or_else(|| "the catalog reported a failure".to_string()),
        }),
        None => Err(Error::Network("response is missing the success flag".to_string())),
    }
}
