//! Provider record submitted to the pipeline.

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};

/// The provider record a run is started with.
///
/// Only `name` is required; absent fields are left out of the request body.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
pub struct ProviderInput {
    #[builder(into)]
    pub name: String,
    /// National Provider Identifier.
    #[builder(into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npi: Option<String>,
    #[builder(into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[builder(into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[builder(into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    /// State license number.
    #[builder(into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

impl ProviderInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            npi: None,
            address: None,
            phone: None,
            specialty: None,
            license: None,
        }
    }

    /// Trim every field, drop blank optional fields, and reject a blank name.
    pub fn prepare(&self) -> Result<Self> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(StudioError::InvalidInput("provider name is required".into()));
        }
        Ok(Self {
            name: name.to_string(),
            npi: non_blank(&self.npi),
            address: non_blank(&self.address),
            phone: non_blank(&self.phone),
            specialty: non_blank(&self.specialty),
            license: non_blank(&self.license),
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
