// Core data contracts shared by the upload surface, the workflow and the API client

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// A file picked by the operator, held until extraction completes
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    pub size: usize,
    #[serde(skip, default = "empty_content")]
    content: Arc<[u8]>,
}

fn empty_content() -> Arc<[u8]> {
    Arc::from(Vec::new())
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: Option<&str>, content: Vec<u8>) -> Self {
        let name = name.into();
        let mime = match mime {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => mime_hint(&name).to_string(),
        };
        Self {
            size: content.len(),
            content: Arc::from(content),
            name,
            mime,
        }
    }

    /// Read a file from disk, taking the MIME hint from its extension
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(name, None, content))
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("size", &self.size)
            .finish()
    }
}

/// Advisory MIME type derived from the file extension
pub fn mime_hint(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Structured fields extracted from a scanned plot contract
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContractData {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub contract_holder: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub plot_number: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub contract_date: String,
    #[serde(default, deserialize_with = "lenient_fee")]
    pub perpetual_lease_fee: Option<u64>,
    #[serde(default, deserialize_with = "lenient_fee")]
    pub management_fee: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub management_fee_cycle: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub transfer_conditions: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cancellation_conditions: String,
    #[serde(default, deserialize_with = "lenient_score")]
    pub confidence_score: Option<f64>,
}

/// Outcome of the inheritance eligibility check
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InheritanceChecklist {
    #[serde(default, deserialize_with = "null_as_empty_list")]
    pub required_documents: Vec<String>,
    pub can_transfer: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
}

/// Relation of the prospective heir to the current contract holder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeirRelationship {
    #[default]
    Spouse,
    Child,
    ThirdParty,
}

impl HeirRelationship {
    pub const ALL: [HeirRelationship; 3] = [Self::Spouse, Self::Child, Self::ThirdParty];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spouse => "spouse",
            Self::Child => "child",
            Self::ThirdParty => "third_party",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Spouse => "配偶者への承継",
            Self::Child => "子への承継",
            Self::ThirdParty => "第三者への承継 (親族外)",
        }
    }
}

impl fmt::Display for HeirRelationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown heir relationship '{0}' (expected spouse, child or third_party)")]
pub struct ParseRelationshipError(pub String);

impl FromStr for HeirRelationship {
    type Err = ParseRelationshipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "spouse" => Ok(Self::Spouse),
            "child" => Ok(Self::Child),
            "third_party" => Ok(Self::ThirdParty),
            _ => Err(ParseRelationshipError(s.to_string())),
        }
    }
}

/// Body of the eligibility check request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityRequest {
    pub contract_id: i64,
    pub heir_relationship: HeirRelationship,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract: Option<ContractData>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_empty_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

// Any finite number is a score; strings, booleans and the like are treated as absent
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().filter(|f| f.is_finite()),
        _ => None,
    })
}

// Fees arrive as integers or integral floats; anything else is treated as absent
fn lenient_fee<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => {
            if let Some(v) = n.as_u64() {
                Some(v)
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                    .map(|f| f as u64)
            }
        }
        _ => None,
    })
}
