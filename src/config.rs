// Configuration module: settings for one publish run, loaded from a JSON
// file. The shape mirrors what the SharePoint REST calls need (see `api`)
// plus the optional-stage flags the sync flow checks (see `sync`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-filename metadata entry. `name` is matched case-insensitively
/// against the uploaded filename; `metadata` is the odata document sent
/// to the service as-is (we never look inside it).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MetadataRecord {
    pub name: String,
    pub metadata: serde_json::Value,
}

/// Settings for a single file upload run. Immutable once loaded.
///
/// `content` lets a caller embed the file bytes directly instead of
/// reading `file` from disk (see `files::resolve`); the config file
/// normally leaves it out.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Settings {
    /// Site collection URL, e.g. `https://tenant.example.com/sites/x`.
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub username: String,
    /// May be empty in the config file; the UI prompts for it then.
    #[serde(default)]
    pub password: String,
    /// Local path of the file to upload.
    pub file: String,
    /// Server-relative destination folder, e.g. `sites/x/Shared Documents/reports`.
    pub library: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<u8>>,
    #[serde(default)]
    pub update_metadata: bool,
    #[serde(default)]
    pub files_metadata: Vec<MetadataRecord>,
    #[serde(default)]
    pub publish: bool,
    #[serde(default)]
    pub verbose: bool,
}

impl Settings {
    /// Load settings from a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let json = r#"{
            "site": "https://tenant.example.com/sites/x",
            "username": "user",
            "password": "pass",
            "file": "out/report.pdf",
            "library": "sites/x/Shared Documents"
        }"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert!(!s.update_metadata);
        assert!(!s.publish);
        assert!(!s.verbose);
        assert!(s.files_metadata.is_empty());
        assert!(s.content.is_none());
    }

    #[test]
    fn parses_metadata_records() {
        let json = r#"{
            "file": "report.pdf",
            "library": "sites/x/Shared Documents",
            "update_metadata": true,
            "files_metadata": [
                { "name": "Report.PDF", "metadata": { "Title": "Quarterly report" } }
            ]
        }"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert!(s.update_metadata);
        assert_eq!(s.files_metadata.len(), 1);
        assert_eq!(s.files_metadata[0].name, "Report.PDF");
        assert_eq!(s.files_metadata[0].metadata["Title"], "Quarterly report");
    }
}
