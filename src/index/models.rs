//! Package index records.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::version::compare_version_strings;

/// A search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IndexPackage {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

/// Full metadata for the latest release of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_python: Option<String>,
    #[serde(default)]
    pub classifiers: Vec<String>,
}

/// Metadata plus every published version, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PackageDetails {
    pub metadata: PackageMetadata,
    pub releases: Vec<String>,
}

/// `GET /pypi/<name>/json` response body, reduced to what is used.
#[derive(Debug, Deserialize)]
pub(crate) struct ProjectResponse {
    pub info: ProjectInfo,
    #[serde(default)]
    pub releases: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectInfo {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub home_page: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub requires_python: Option<String>,
    #[serde(default)]
    pub classifiers: Option<Vec<String>>,
}

/// The index sends empty strings for unset fields.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl ProjectResponse {
    pub(crate) fn into_search_hit(self) -> IndexPackage {
        let info = self.info;
        IndexPackage {
            name: info.name,
            version: info.version,
            summary: non_empty(info.summary),
            author: non_empty(info.author),
            home_page: non_empty(info.home_page),
            license: non_empty(info.license),
        }
    }

    pub(crate) fn into_details(self) -> PackageDetails {
        let mut releases: Vec<String> = self.releases.into_keys().collect();
        releases.sort_by(|a, b| compare_version_strings(b, a));

        let info = self.info;
        PackageDetails {
            metadata: PackageMetadata {
                name: info.name,
                version: info.version,
                summary: non_empty(info.summary),
                description: non_empty(info.description),
                author: non_empty(info.author),
                home_page: non_empty(info.home_page),
                license: non_empty(info.license),
                requires_python: non_empty(info.requires_python),
                classifiers: info.classifiers.unwrap_or_default(),
            },
            releases,
        }
    }
}
